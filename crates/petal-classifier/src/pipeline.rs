//! Per-request classification pipeline
//!
//! Chains the stages that follow input validation:
//! feature vector -> input tensor -> inference -> formatted response.

use petal_core::{ClassCatalog, ClassificationResponse, FeatureVector, Result};
use std::sync::Arc;

use crate::formatter::format_output;
use crate::invoker::InferenceInvoker;
use crate::lifecycle::ModelLifecycle;
use crate::tensor::InputTensor;

/// Everything needed to classify one feature vector
///
/// Cheap to clone; the model lifecycle is shared, everything per request is
/// created inside [`ClassificationPipeline::classify`].
#[derive(Debug, Clone)]
pub struct ClassificationPipeline {
    model: Arc<ModelLifecycle>,
    invoker: InferenceInvoker,
    catalog: ClassCatalog,
}

impl ClassificationPipeline {
    /// Create a new pipeline
    pub fn new(model: Arc<ModelLifecycle>, invoker: InferenceInvoker, catalog: ClassCatalog) -> Self {
        Self {
            model,
            invoker,
            catalog,
        }
    }

    /// The shared model lifecycle
    pub fn model(&self) -> &Arc<ModelLifecycle> {
        &self.model
    }

    /// The class catalog used to name outputs
    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Whether the model is loaded
    pub fn is_ready(&self) -> bool {
        self.model.is_ready()
    }

    /// Classify one feature vector
    pub async fn classify(&self, features: &FeatureVector) -> Result<ClassificationResponse> {
        let tensor = InputTensor::from_features(features);
        let raw = self.invoker.invoke(&self.model, tensor).await?;
        format_output(&raw, &self.catalog)
    }
}

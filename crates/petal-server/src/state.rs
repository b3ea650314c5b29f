//! Shared application state

use metrics_exporter_prometheus::PrometheusHandle;
use petal_classifier::{ClassificationPipeline, InferenceInvoker, ModelLifecycle};
use petal_core::Result;
use std::sync::Arc;

use crate::config::ServerConfig;

/// State handed to every handler
///
/// Cloned per request; the model itself lives behind the pipeline's
/// shared [`ModelLifecycle`].
#[derive(Clone)]
pub struct AppState {
    /// Classification pipeline for `/iris`
    pub pipeline: ClassificationPipeline,

    /// Prometheus handle for rendering `/metrics`, when metrics are enabled
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around an existing pipeline
    pub fn new(pipeline: ClassificationPipeline, metrics_handle: Option<PrometheusHandle>) -> Self {
        Self {
            pipeline,
            metrics_handle,
        }
    }

    /// Build state with an unloaded model from configuration
    pub fn from_config(config: &ServerConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        let catalog = config.model.catalog()?;
        let invoker = InferenceInvoker::from_config(&config.inference);
        let pipeline = ClassificationPipeline::new(Arc::new(ModelLifecycle::new()), invoker, catalog);
        Ok(Self::new(pipeline, metrics_handle))
    }

    /// The shared model lifecycle
    pub fn model(&self) -> &Arc<ModelLifecycle> {
        self.pipeline.model()
    }
}

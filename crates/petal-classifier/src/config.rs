//! Configuration for model loading and inference

use petal_core::{ClassCatalog, Error, Result, FEATURE_COUNT, IRIS_CLASSES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where the model lives and how to interpret its outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX model file
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    /// Class names in model output order
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,

    /// Number of features the model takes
    #[serde(default = "default_input_width")]
    pub input_width: usize,

    /// Intra-op thread count for the runtime (runtime default when unset)
    #[serde(default)]
    pub intra_threads: Option<usize>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            classes: default_classes(),
            input_width: default_input_width(),
            intra_threads: None,
        }
    }
}

impl ModelConfig {
    /// Create a configuration for a model file with the default iris classes
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Build the class catalog
    pub fn catalog(&self) -> Result<ClassCatalog> {
        ClassCatalog::new(self.classes.iter().cloned())
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.input_width != FEATURE_COUNT {
            return Err(Error::config(format!(
                "input_width must be {}, got {}",
                FEATURE_COUNT, self.input_width
            )));
        }
        if self.intra_threads == Some(0) {
            return Err(Error::config("intra_threads must be at least 1"));
        }
        self.catalog().map(|_| ())
    }
}

/// Optional limits on inference calls
///
/// Both limits are off by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Maximum number of inference calls running at once
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// Per-call timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl InferenceConfig {
    /// Per-call timeout, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == Some(0) {
            return Err(Error::config("max_in_flight must be at least 1"));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::config("timeout_ms must be at least 1"));
        }
        Ok(())
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("iris_knn_model.onnx")
}

fn default_classes() -> Vec<String> {
    IRIS_CLASSES.iter().map(|s| s.to_string()).collect()
}

fn default_input_width() -> usize {
    FEATURE_COUNT
}

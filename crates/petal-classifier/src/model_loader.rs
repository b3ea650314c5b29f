//! Backend selection and loading

use petal_core::Result;
use std::sync::Arc;

use crate::backend::InferenceBackend;
use crate::config::ModelConfig;

/// Load the configured model into a shareable backend
///
/// Blocking; call it from [`ModelLifecycle::initialize`](crate::ModelLifecycle::initialize),
/// which moves it onto the blocking pool.
#[cfg(feature = "onnx")]
pub fn load_backend(config: &ModelConfig) -> Result<Arc<dyn InferenceBackend>> {
    config.validate()?;
    let backend = crate::onnx::OnnxBackend::load(config)?;
    Ok(Arc::new(backend))
}

/// Load the configured model into a shareable backend
///
/// This build has no inference runtime, so loading always fails and the
/// service stays not-ready.
#[cfg(not(feature = "onnx"))]
pub fn load_backend(config: &ModelConfig) -> Result<Arc<dyn InferenceBackend>> {
    config.validate()?;
    Err(petal_core::Error::model_load(format!(
        "cannot load {}: built without the `onnx` feature",
        config.path.display()
    )))
}

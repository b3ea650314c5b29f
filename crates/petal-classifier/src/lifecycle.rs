//! Model lifecycle management
//!
//! The model moves through `Uninitialized -> Loading -> Ready | Failed`
//! exactly once per process. [`ModelLifecycle`] is the only writer of that
//! state; everything else reads it through [`ModelLifecycle::is_ready`],
//! [`ModelLifecycle::handle`], or [`ModelLifecycle::status`].

use parking_lot::RwLock;
use petal_core::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::backend::InferenceBackend;

/// Current state of the process-wide model
#[derive(Clone, Default)]
pub enum ModelState {
    #[default]
    Uninitialized,
    Loading,
    Ready(Arc<dyn InferenceBackend>),
    Failed(String),
}

/// Serializable snapshot of [`ModelState`] without the handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ModelStatus {
    Uninitialized,
    Loading,
    Ready,
    Failed { error: String },
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Owner of the process-wide model state
#[derive(Default)]
pub struct ModelLifecycle {
    state: RwLock<ModelState>,
}

impl ModelLifecycle {
    /// Create a lifecycle with no model loaded yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lifecycle that is already ready with the given backend
    pub fn with_backend(backend: Arc<dyn InferenceBackend>) -> Self {
        metrics::gauge!("petal_model_ready").set(1.0);
        Self {
            state: RwLock::new(ModelState::Ready(backend)),
        }
    }

    /// Load the model with `loader` and record the outcome
    ///
    /// The loader runs on the blocking thread pool so requests keep being
    /// answered while a native runtime loads. Only the first call may run;
    /// later calls fail without touching the state. A load failure leaves the
    /// lifecycle in `Failed` permanently.
    pub async fn initialize<F>(&self, loader: F) -> Result<()>
    where
        F: FnOnce() -> Result<Arc<dyn InferenceBackend>> + Send + 'static,
    {
        self.begin_loading()?;
        info!("Loading model");
        let start = Instant::now();

        let outcome = match tokio::task::spawn_blocking(loader).await {
            Ok(result) => result,
            Err(e) => Err(Error::model_load(format!("model loader panicked: {}", e))),
        };

        match outcome {
            Ok(backend) => {
                info!(
                    backend = backend.name(),
                    input = backend.input_name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Model loaded successfully"
                );
                *self.state.write() = ModelState::Ready(backend);
                metrics::gauge!("petal_model_ready").set(1.0);
                Ok(())
            }
            Err(e) => {
                let message = match e {
                    Error::ModelLoad(msg) => msg,
                    other => other.to_string(),
                };
                error!(error = %message, "Failed to load model");
                *self.state.write() = ModelState::Failed(message.clone());
                metrics::gauge!("petal_model_ready").set(0.0);
                Err(Error::ModelLoad(message))
            }
        }
    }

    fn begin_loading(&self) -> Result<()> {
        let mut state = self.state.write();
        match *state {
            ModelState::Uninitialized => {
                *state = ModelState::Loading;
                Ok(())
            }
            _ => Err(Error::internal("model lifecycle has already been initialized")),
        }
    }

    /// True only once the model is loaded
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), ModelState::Ready(_))
    }

    /// Shared handle to the loaded model
    ///
    /// Returns [`Error::NotReady`] in every state but `Ready`.
    pub fn handle(&self) -> Result<Arc<dyn InferenceBackend>> {
        match &*self.state.read() {
            ModelState::Ready(backend) => Ok(Arc::clone(backend)),
            _ => Err(Error::NotReady),
        }
    }

    /// Snapshot of the current state
    pub fn status(&self) -> ModelStatus {
        match &*self.state.read() {
            ModelState::Uninitialized => ModelStatus::Uninitialized,
            ModelState::Loading => ModelStatus::Loading,
            ModelState::Ready(_) => ModelStatus::Ready,
            ModelState::Failed(error) => ModelStatus::Failed {
                error: error.clone(),
            },
        }
    }
}

impl std::fmt::Debug for ModelLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLifecycle")
            .field("status", &self.status())
            .finish()
    }
}

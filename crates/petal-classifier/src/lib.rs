//! Petal Classifier
//!
//! The inference side of a request: everything between a validated feature
//! vector and a readable classification.
//!
//! - [`ModelLifecycle`] owns the one process-wide model and its load state
//! - [`InputTensor`] shapes features into the model's `[1, 4]` float32 input
//! - [`InferenceInvoker`] runs the model once per request
//! - [`format_output`] maps raw outputs to class names and percentages
//!
//! Models run behind the [`InferenceBackend`] trait. The ONNX Runtime
//! implementation is compiled with the `onnx` feature.

pub mod backend;
pub mod config;
pub mod formatter;
pub mod invoker;
pub mod lifecycle;
pub mod model_loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod output;
pub mod pipeline;
pub mod tensor;

pub use backend::InferenceBackend;
pub use config::{InferenceConfig, ModelConfig};
pub use formatter::{format_output, LABEL_OUTPUT, PROBABILITIES_OUTPUT};
pub use invoker::InferenceInvoker;
pub use lifecycle::{ModelLifecycle, ModelState, ModelStatus};
pub use model_loader::load_backend;
#[cfg(feature = "onnx")]
pub use onnx::OnnxBackend;
pub use output::{OutputBuffer, RawInferenceOutput, MAX_SAFE_INTEGER};
pub use pipeline::ClassificationPipeline;
pub use tensor::{InputTensor, INPUT_SHAPE};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::backend::InferenceBackend;
    pub use crate::lifecycle::{ModelLifecycle, ModelStatus};
    pub use crate::output::{OutputBuffer, RawInferenceOutput};
    pub use crate::pipeline::ClassificationPipeline;
    pub use crate::tensor::InputTensor;
}

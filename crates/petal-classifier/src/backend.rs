//! Inference backend trait

use async_trait::async_trait;
use petal_core::Result;

use crate::output::RawInferenceOutput;
use crate::tensor::InputTensor;

/// A loaded model that can turn an input tensor into named outputs
///
/// Implementations are shared read-only across requests, so `run` takes
/// `&self`. Backends wrapping a runtime that needs exclusive access keep
/// their own lock.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run the model once on a single input tensor
    async fn run(&self, input: InputTensor) -> Result<RawInferenceOutput>;

    /// Get the backend name, used in logs
    fn name(&self) -> &str;

    /// Name of the model input the tensor is bound to
    fn input_name(&self) -> &str;
}

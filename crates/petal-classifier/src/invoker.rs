//! Single-shot inference invocation

use petal_core::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::InferenceConfig;
use crate::lifecycle::ModelLifecycle;
use crate::output::RawInferenceOutput;
use crate::tensor::InputTensor;

/// Submits input tensors to the loaded model
///
/// Each call makes at most one attempt. Every failure from the backend is
/// reported as [`Error::Inference`] (or [`Error::Timeout`] when a deadline is
/// configured), except model contract violations which pass through as-is.
#[derive(Debug, Clone, Default)]
pub struct InferenceInvoker {
    limiter: Option<Arc<Semaphore>>,
    timeout: Option<Duration>,
}

impl InferenceInvoker {
    /// Create an invoker with no concurrency limit and no timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an invoker applying the configured limits
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self {
            limiter: config
                .max_in_flight
                .map(|permits| Arc::new(Semaphore::new(permits))),
            timeout: config.timeout(),
        }
    }

    /// Limit concurrent inference calls
    pub fn with_max_in_flight(mut self, permits: usize) -> Self {
        self.limiter = Some(Arc::new(Semaphore::new(permits)));
        self
    }

    /// Fail calls that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run the model once on `input`
    ///
    /// Fails with [`Error::NotReady`] when the model is not loaded, whether or
    /// not the caller checked readiness first.
    pub async fn invoke(
        &self,
        model: &ModelLifecycle,
        input: InputTensor,
    ) -> Result<RawInferenceOutput> {
        let backend = model.handle()?;

        let permit = match &self.limiter {
            Some(limiter) => Some(
                Arc::clone(limiter)
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::internal("inference limiter closed"))?,
            ),
            None => None,
        };

        let start = Instant::now();

        // The task owns the permit, so a call that outlives its timeout keeps
        // counting against the limit until the backend returns.
        let task_backend = Arc::clone(&backend);
        let mut run = tokio::spawn(async move {
            let _permit = permit;
            task_backend.run(input).await
        });

        let joined = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, &mut run).await {
                Ok(joined) => Some(joined),
                Err(_) => None,
            },
            None => Some(run.await),
        };
        let result = match joined {
            Some(Ok(result)) => result,
            Some(Err(e)) => Err(Error::inference(format!("inference task failed: {}", e))),
            None => Err(Error::Timeout),
        };
        let latency = start.elapsed();

        metrics::histogram!("petal_inference_latency_us", "backend" => backend.name().to_string())
            .record(latency.as_micros() as f64);
        debug!(
            backend = backend.name(),
            latency_us = latency.as_micros() as u64,
            ok = result.is_ok(),
            "Inference finished"
        );

        result.map_err(classify_failure)
    }
}

fn classify_failure(error: Error) -> Error {
    match error {
        Error::Inference(_) | Error::Timeout | Error::ModelContract(_) | Error::NotReady => error,
        other => Error::inference(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_classified_as_inference_errors() {
        assert!(matches!(
            classify_failure(Error::internal("session poisoned")),
            Error::Inference(_)
        ));
        assert!(matches!(
            classify_failure(Error::Io(std::io::Error::other("device lost"))),
            Error::Inference(_)
        ));
        assert!(matches!(classify_failure(Error::Timeout), Error::Timeout));
        assert!(matches!(
            classify_failure(Error::model_contract("bad label")),
            Error::ModelContract(_)
        ));
    }

    #[tokio::test]
    async fn test_invoke_before_ready_is_not_ready() {
        let invoker = InferenceInvoker::new();
        let model = ModelLifecycle::new();
        let input = InputTensor::from_features(&Default::default());

        assert!(matches!(
            invoker.invoke(&model, input).await,
            Err(Error::NotReady)
        ));
    }
}

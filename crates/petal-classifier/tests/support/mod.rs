//! Mock backends shared by the classifier and server tests
//!
//! Provides configurable implementations of the InferenceBackend trait for
//! testing the lifecycle, invoker, formatter, and their error paths without
//! an ONNX runtime.

#![allow(dead_code)]

use async_trait::async_trait;
use petal_classifier::{
    InferenceBackend, InputTensor, OutputBuffer, RawInferenceOutput, LABEL_OUTPUT,
    PROBABILITIES_OUTPUT,
};
use petal_core::{Error, Result};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Per-class feature means of the iris data set
pub const IRIS_CENTROIDS: [[f32; 4]; 3] = [
    [5.006, 3.428, 1.462, 0.246],
    [5.936, 2.770, 4.260, 1.326],
    [6.588, 2.974, 5.552, 2.026],
];

/// Tracks how many calls are running at once
#[derive(Default)]
pub struct ConcurrencyGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyGauge {
    fn enter(&self) {
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Nearest-centroid outputs for one input, shaped like a scikit-learn export
///
/// Probabilities are weighted by inverse squared distance; the label is the
/// most probable class as int64.
pub fn centroid_outputs(input: &InputTensor) -> RawInferenceOutput {
    let weights: Vec<f32> = IRIS_CENTROIDS
        .iter()
        .map(|centroid| {
            let d2: f32 = centroid
                .iter()
                .zip(input.data())
                .map(|(c, x)| (c - x) * (c - x))
                .sum();
            1.0 / (d2 + 1e-6)
        })
        .collect();
    let total: f32 = weights.iter().sum();
    let probabilities: Vec<f32> = weights.iter().map(|w| w / total).collect();

    let label = probabilities
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i as i64)
        .unwrap_or(0);

    RawInferenceOutput::new()
        .with_output(LABEL_OUTPUT, OutputBuffer::Int64(vec![label]))
        .with_output(PROBABILITIES_OUTPUT, OutputBuffer::Float32(probabilities))
}

/// Nearest-centroid stand-in for the iris model
pub struct CentroidBackend {
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
    concurrency: ConcurrencyGauge,
}

impl CentroidBackend {
    pub fn new() -> Self {
        Self {
            simulated_latency: None,
            call_count: AtomicU32::new(0),
            concurrency: ConcurrencyGauge::default(),
        }
    }

    /// Set simulated latency for each run
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Get the number of times run was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Highest number of concurrent runs observed
    pub fn peak_in_flight(&self) -> usize {
        self.concurrency.peak()
    }
}

#[async_trait]
impl InferenceBackend for CentroidBackend {
    async fn run(&self, input: InputTensor) -> Result<RawInferenceOutput> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.concurrency.enter();

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }
        let outputs = centroid_outputs(&input);

        self.concurrency.exit();
        Ok(outputs)
    }

    fn name(&self) -> &str {
        "centroid"
    }

    fn input_name(&self) -> &str {
        "float_input"
    }
}

/// Centroid backend whose work runs on the blocking pool, like a native runtime
///
/// The blocking call cannot be cancelled, so it keeps running after the
/// awaiting future is dropped.
pub struct BlockingBackend {
    work: Duration,
    concurrency: Arc<ConcurrencyGauge>,
}

impl BlockingBackend {
    pub fn new(work: Duration) -> Self {
        Self {
            work,
            concurrency: Arc::new(ConcurrencyGauge::default()),
        }
    }

    /// Highest number of blocking calls running at once
    pub fn peak_native_runs(&self) -> usize {
        self.concurrency.peak()
    }
}

#[async_trait]
impl InferenceBackend for BlockingBackend {
    async fn run(&self, input: InputTensor) -> Result<RawInferenceOutput> {
        let work = self.work;
        let concurrency = Arc::clone(&self.concurrency);

        tokio::task::spawn_blocking(move || {
            concurrency.enter();
            std::thread::sleep(work);
            concurrency.exit();
            centroid_outputs(&input)
        })
        .await
        .map_err(|e| Error::inference(e.to_string()))
    }

    fn name(&self) -> &str {
        "blocking"
    }

    fn input_name(&self) -> &str {
        "float_input"
    }
}

/// A backend that always fails - for testing error paths
pub struct FailingBackend {
    error_message: String,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self {
            error_message: "Simulated runtime failure".to_string(),
        }
    }

    /// Set a custom error message
    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

#[async_trait]
impl InferenceBackend for FailingBackend {
    async fn run(&self, _input: InputTensor) -> Result<RawInferenceOutput> {
        Err(Error::internal(&self.error_message))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn input_name(&self) -> &str {
        "float_input"
    }
}

/// A backend returning fixed outputs, for contract violations
pub struct FixedBackend {
    output: RawInferenceOutput,
}

impl FixedBackend {
    pub fn new(output: RawInferenceOutput) -> Self {
        Self { output }
    }
}

#[async_trait]
impl InferenceBackend for FixedBackend {
    async fn run(&self, _input: InputTensor) -> Result<RawInferenceOutput> {
        Ok(self.output.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }

    fn input_name(&self) -> &str {
        "float_input"
    }
}

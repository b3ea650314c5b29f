//! ONNX Runtime backend
//!
//! Loads a classifier exported to ONNX (for example a scikit-learn model
//! converted with `zipmap` disabled) and runs it on the blocking thread pool.

use async_trait::async_trait;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{DynValue, Tensor, ValueType};
use parking_lot::Mutex;
use petal_core::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::InferenceBackend;
use crate::config::ModelConfig;
use crate::output::{OutputBuffer, RawInferenceOutput};
use crate::tensor::InputTensor;

/// An ONNX Runtime session behind a lock
///
/// `Session::run` needs exclusive access, so calls are serialized on the
/// mutex. The input name comes from the model's own metadata.
pub struct OnnxBackend {
    session: Arc<Mutex<Session>>,
    name: String,
    input_name: String,
    output_names: Vec<String>,
}

impl OnnxBackend {
    /// Load a model from configuration
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let path = config.path.as_path();
        if !path.exists() {
            return Err(Error::model_load(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let mut builder = Session::builder()
            .map_err(load_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_error)?;
        if let Some(threads) = config.intra_threads {
            builder = builder.with_intra_threads(threads).map_err(load_error)?;
        }
        let session = builder.commit_from_file(path).map_err(load_error)?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| Error::model_load("model declares no inputs"))?;
        let input_name = input.name().to_string();

        if let Some(width) = declared_width(input.dtype()) {
            if width != config.input_width {
                return Err(Error::model_load(format!(
                    "model input '{}' takes {} features, expected {}",
                    input_name, width, config.input_width
                )));
            }
        }

        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        info!(
            model = %path.display(),
            input = %input_name,
            outputs = ?output_names,
            "Loaded ONNX model"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            name: model_name(path),
            input_name,
            output_names,
        })
    }
}

#[async_trait]
impl InferenceBackend for OnnxBackend {
    async fn run(&self, input: InputTensor) -> Result<RawInferenceOutput> {
        let session = Arc::clone(&self.session);
        let input_name = self.input_name.clone();
        let output_names = self.output_names.clone();

        tokio::task::spawn_blocking(move || {
            run_session(&session, &input_name, &output_names, &input)
        })
        .await
        .map_err(|e| Error::inference(format!("inference task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_name(&self) -> &str {
        &self.input_name
    }
}

fn run_session(
    session: &Mutex<Session>,
    input_name: &str,
    output_names: &[String],
    input: &InputTensor,
) -> Result<RawInferenceOutput> {
    let [rows, cols] = input.shape();
    let shape = [rows as i64, cols as i64];
    let tensor = Tensor::from_array((shape, input.data().to_vec().into_boxed_slice()))
        .map_err(inference_error)?;

    let mut session = session.lock();
    let outputs = session
        .run(ort::inputs![input_name => tensor])
        .map_err(inference_error)?;

    let mut raw = RawInferenceOutput::new();
    for name in output_names {
        match extract_buffer(&outputs[name.as_str()]) {
            Some(buffer) => raw.insert(name.clone(), buffer),
            None => debug!(output = %name, "Skipping non-numeric model output"),
        }
    }
    Ok(raw)
}

/// Copy a numeric tensor output into an owned buffer
fn extract_buffer(value: &DynValue) -> Option<OutputBuffer> {
    if let Ok((_, data)) = value.try_extract_tensor::<f32>() {
        return Some(OutputBuffer::Float32(data.to_vec()));
    }
    if let Ok((_, data)) = value.try_extract_tensor::<i64>() {
        return Some(OutputBuffer::Int64(data.to_vec()));
    }
    if let Ok((_, data)) = value.try_extract_tensor::<f64>() {
        return Some(OutputBuffer::Float64(data.to_vec()));
    }
    if let Ok((_, data)) = value.try_extract_tensor::<i32>() {
        return Some(OutputBuffer::Int32(data.to_vec()));
    }
    None
}

/// Last input dimension, when the model fixes it
fn declared_width(input_type: &ValueType) -> Option<usize> {
    match input_type {
        ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("onnx")
        .to_string()
}

fn load_error(e: impl std::fmt::Display) -> Error {
    Error::model_load(e.to_string())
}

fn inference_error(e: impl std::fmt::Display) -> Error {
    Error::inference(e.to_string())
}

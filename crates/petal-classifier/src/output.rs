//! Raw model outputs and numeric narrowing
//!
//! ONNX classifiers commonly emit labels as int64. Those values are narrowed
//! to `usize`/`f64` through checked conversions: anything outside the range a
//! double can represent exactly (`±(2^53 - 1)`) is rejected as a model
//! contract violation instead of being silently rounded.

use std::collections::HashMap;

use petal_core::{Error, Result};

/// Largest integer magnitude an `f64` represents exactly
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// A typed numeric buffer produced by the model
#[derive(Debug, Clone, PartialEq)]
pub enum OutputBuffer {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
}

impl OutputBuffer {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Narrow every element to a class index
    ///
    /// Integers must lie in `0..=MAX_SAFE_INTEGER`. Floats must additionally
    /// be integral.
    pub fn to_indices(&self) -> Result<Vec<usize>> {
        match self {
            Self::Int64(v) => v.iter().map(|&x| index_from_i64(x)).collect(),
            Self::Int32(v) => v.iter().map(|&x| index_from_i64(i64::from(x))).collect(),
            Self::Float32(v) => v.iter().map(|&x| index_from_f64(f64::from(x))).collect(),
            Self::Float64(v) => v.iter().map(|&x| index_from_f64(x)).collect(),
        }
    }

    /// Widen every element to `f64`
    ///
    /// Float widening is lossless. Integers outside the safe range are rejected.
    pub fn to_f64(&self) -> Result<Vec<f64>> {
        match self {
            Self::Float32(v) => Ok(v.iter().map(|&x| f64::from(x)).collect()),
            Self::Float64(v) => Ok(v.clone()),
            Self::Int32(v) => Ok(v.iter().map(|&x| f64::from(x)).collect()),
            Self::Int64(v) => v
                .iter()
                .map(|&x| {
                    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&x) {
                        Ok(x as f64)
                    } else {
                        Err(Error::model_contract(format!(
                            "int64 value {} exceeds the exactly representable range",
                            x
                        )))
                    }
                })
                .collect(),
        }
    }
}

fn index_from_i64(value: i64) -> Result<usize> {
    if !(0..=MAX_SAFE_INTEGER).contains(&value) {
        return Err(Error::model_contract(format!(
            "class index {} is outside 0..={}",
            value, MAX_SAFE_INTEGER
        )));
    }
    usize::try_from(value)
        .map_err(|_| Error::model_contract(format!("class index {} does not fit usize", value)))
}

fn index_from_f64(value: f64) -> Result<usize> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::model_contract(format!(
            "class index {} is not an integer",
            value
        )));
    }
    if value < 0.0 || value > MAX_SAFE_INTEGER as f64 {
        return Err(Error::model_contract(format!(
            "class index {} is outside 0..={}",
            value, MAX_SAFE_INTEGER
        )));
    }
    index_from_i64(value as i64)
}

/// Named output buffers from one inference call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInferenceOutput {
    outputs: HashMap<String, OutputBuffer>,
}

impl RawInferenceOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output, replacing any previous output of the same name
    pub fn insert(&mut self, name: impl Into<String>, buffer: OutputBuffer) {
        self.outputs.insert(name.into(), buffer);
    }

    /// Builder-style [`RawInferenceOutput::insert`]
    pub fn with_output(mut self, name: impl Into<String>, buffer: OutputBuffer) -> Self {
        self.insert(name, buffer);
        self
    }

    /// Get an output by name
    pub fn get(&self, name: &str) -> Option<&OutputBuffer> {
        self.outputs.get(name)
    }

    /// Get an output by name, failing when the model did not produce it
    pub fn require(&self, name: &str) -> Result<&OutputBuffer> {
        self.get(name)
            .ok_or_else(|| Error::model_contract(format!("model produced no '{}' output", name)))
    }

    /// Output names, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

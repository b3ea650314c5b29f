//! Petal Core
//!
//! Core types and utilities shared across Petal components.
//!
//! This crate provides:
//! - The error taxonomy every pipeline stage reports through
//! - Feature vectors, the class catalog, and the classification response
//! - Parsing of raw request input into validated feature vectors

pub mod error;
pub mod input;
pub mod types;

pub use error::{Error, Result, VALIDATION_MESSAGE};
pub use input::parse_features;
pub use types::{
    ClassCatalog, ClassProbabilities, ClassProbability, ClassificationResponse, FeatureVector,
    DEFAULT_FEATURES, FEATURE_COUNT, IRIS_CLASSES,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::input::parse_features;
    pub use crate::types::{ClassCatalog, ClassificationResponse, FeatureVector};
}

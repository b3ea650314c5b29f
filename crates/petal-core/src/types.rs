//! Core types for Petal

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Number of measurements the iris model takes per query
pub const FEATURE_COUNT: usize = 4;

/// Feature vector used when a request carries no data
pub const DEFAULT_FEATURES: [f32; FEATURE_COUNT] = [5.1, 3.5, 1.4, 0.2];

/// Class names of the reference iris deployment, in model output order
pub const IRIS_CLASSES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// Ordered mapping from model output index to class name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCatalog {
    names: Arc<[String]>,
}

impl ClassCatalog {
    /// Build a catalog, rejecting empty lists and duplicate names
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(Error::config("class catalog must contain at least one class"));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.trim().is_empty() {
                return Err(Error::config("class names must not be blank"));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::config(format!("duplicate class name '{}'", name)));
            }
        }

        Ok(Self {
            names: names.into(),
        })
    }

    /// Catalog for the reference iris model
    pub fn iris() -> Self {
        Self {
            names: IRIS_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Class name for an output index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a catalog built through [`ClassCatalog::new`]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether the catalog contains a class with this name
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Iterate class names in output order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::iris()
    }
}

/// Validated measurements for one classification query
///
/// Every value is finite as an `f32`; construction fails otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Create a feature vector from raw values
    pub fn new(values: [f32; FEATURE_COUNT]) -> Result<Self> {
        if values.iter().all(|v| v.is_finite()) {
            Ok(Self(values))
        } else {
            Err(Error::invalid_input())
        }
    }

    /// Values in model input order
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Copy of the underlying values
    pub fn values(&self) -> [f32; FEATURE_COUNT] {
        self.0
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self(DEFAULT_FEATURES)
    }
}

/// Probability of one class, as a whole percentage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassProbability {
    /// Class name
    pub class: String,

    /// Rounded percentage (0-100)
    pub percent: u32,
}

/// Per-class percentages, kept in catalog order
///
/// Serializes as a JSON object mapping class name to a string such as `"67%"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassProbabilities(Vec<ClassProbability>);

impl ClassProbabilities {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a class percentage
    pub fn push(&mut self, class: impl Into<String>, percent: u32) {
        self.0.push(ClassProbability {
            class: class.into(),
            percent,
        });
    }

    /// Percentage for a class
    pub fn get(&self, class: &str) -> Option<u32> {
        self.0.iter().find(|p| p.class == class).map(|p| p.percent)
    }

    /// Iterate entries in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &ClassProbability> {
        self.0.iter()
    }

    /// Number of classes present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no class is present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all percentages
    pub fn percent_total(&self) -> u32 {
        self.0.iter().map(|p| p.percent).sum()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.class, &format!("{}%", entry.percent))?;
        }
        map.end()
    }
}

/// Human-readable result of one classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResponse {
    /// Name of the predicted class
    pub predicted: String,

    /// Percentage per class
    pub probabilities: ClassProbabilities,
}

//! Input tensor construction

use petal_core::{FeatureVector, FEATURE_COUNT};

/// Shape the model declares for its input: one row of features
pub const INPUT_SHAPE: [usize; 2] = [1, FEATURE_COUNT];

/// A feature vector shaped as the model's `[1, 4]` float32 input
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: [f32; FEATURE_COUNT],
}

impl InputTensor {
    /// Build the tensor for one feature vector
    pub fn from_features(features: &FeatureVector) -> Self {
        Self {
            data: features.values(),
        }
    }

    /// Tensor shape
    pub fn shape(&self) -> [usize; 2] {
        INPUT_SHAPE
    }

    /// Row-major tensor data
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

impl From<&FeatureVector> for InputTensor {
    fn from(features: &FeatureVector) -> Self {
        Self::from_features(features)
    }
}

//! Request input parsing
//!
//! Turns the raw `data` query value into a [`FeatureVector`]. This is the only
//! place request data enters the pipeline.

use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{FeatureVector, FEATURE_COUNT};

/// Parse optional raw input into a feature vector
///
/// `None` and the empty string both select [`FeatureVector::default`].
/// Anything else must be exactly four comma-separated finite numbers.
pub fn parse_features(raw: Option<&str>) -> Result<FeatureVector> {
    match raw {
        None | Some("") => Ok(FeatureVector::default()),
        Some(raw) => raw.parse(),
    }
}

impl FromStr for FeatureVector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut values = [0.0f32; FEATURE_COUNT];
        let mut count = 0;

        for token in s.split(',') {
            if count == FEATURE_COUNT {
                debug!(input = s, "too many feature values");
                return Err(Error::invalid_input());
            }
            values[count] = parse_value(token)?;
            count += 1;
        }

        if count != FEATURE_COUNT {
            debug!(input = s, count, "wrong number of feature values");
            return Err(Error::invalid_input());
        }

        FeatureVector::new(values)
    }
}

/// Parse one token, requiring a value that stays finite as `f32`
fn parse_value(token: &str) -> Result<f32> {
    let token = token.trim();
    let value: f64 = token.parse().map_err(|_| {
        debug!(token, "feature value is not numeric");
        Error::invalid_input()
    })?;

    let narrowed = value as f32;
    if !narrowed.is_finite() {
        debug!(token, "feature value is not finite");
        return Err(Error::invalid_input());
    }
    Ok(narrowed)
}

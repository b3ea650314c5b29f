//! Conversion of raw model outputs into a readable classification

use petal_core::{ClassCatalog, ClassProbabilities, ClassificationResponse, Error, Result};

use crate::output::RawInferenceOutput;

/// Output holding the predicted class index
pub const LABEL_OUTPUT: &str = "label";

/// Output holding one probability per class
pub const PROBABILITIES_OUTPUT: &str = "probabilities";

/// Slack allowed outside `[0, 1]` for float noise in model probabilities
const PROBABILITY_TOLERANCE: f64 = 1e-4;

/// Turn raw outputs into the predicted class name and per-class percentages
///
/// Any mismatch between the outputs and the catalog (missing outputs, an
/// out-of-range label, a probability vector of the wrong length or with
/// values outside `[0, 1]`) fails with [`Error::ModelContract`].
pub fn format_output(
    raw: &RawInferenceOutput,
    catalog: &ClassCatalog,
) -> Result<ClassificationResponse> {
    let labels = raw.require(LABEL_OUTPUT)?.to_indices()?;
    let label = *labels
        .first()
        .ok_or_else(|| Error::model_contract("label output is empty"))?;

    let predicted = catalog.get(label).ok_or_else(|| {
        Error::model_contract(format!(
            "label {} is outside the class catalog of {} classes",
            label,
            catalog.len()
        ))
    })?;

    let values = raw.require(PROBABILITIES_OUTPUT)?.to_f64()?;
    if values.len() != catalog.len() {
        return Err(Error::model_contract(format!(
            "expected {} probabilities, model produced {}",
            catalog.len(),
            values.len()
        )));
    }

    let mut probabilities = ClassProbabilities::new();
    for (class, &p) in catalog.iter().zip(values.iter()) {
        probabilities.push(class, to_percent(p)?);
    }

    Ok(ClassificationResponse {
        predicted: predicted.to_string(),
        probabilities,
    })
}

/// Probability to whole percent, rounding halves up
///
/// Values within the tolerance of either bound are clamped into `0..=100`.
pub fn to_percent(probability: f64) -> Result<u32> {
    if !probability.is_finite()
        || probability < -PROBABILITY_TOLERANCE
        || probability > 1.0 + PROBABILITY_TOLERANCE
    {
        return Err(Error::model_contract(format!(
            "probability {} is outside [0, 1]",
            probability
        )));
    }
    // Clamped to non-negative, so round() (half away from zero) is half-up
    Ok((probability.max(0.0) * 100.0).round().min(100.0) as u32)
}

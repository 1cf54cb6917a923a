use crate::domain::model::{FeatureVector, RiskLabel};
use crate::domain::ports::Predictor;
use crate::utils::error::{Result, RiskError};

/// Runs the model on one row and returns the raw class together with its label.
pub fn classify<P: Predictor + ?Sized>(
    model: &P,
    vector: &FeatureVector,
) -> Result<(i64, RiskLabel)> {
    let output = model.predict(vector).map_err(|e| match e {
        RiskError::InferenceError { .. } => e,
        other => RiskError::InferenceError {
            message: other.to_string(),
        },
    })?;

    if output != 0 && output != 1 {
        tracing::warn!(
            "Model returned unexpected class {}; reporting it as low risk",
            output
        );
    }

    Ok((output, RiskLabel::from_model_output(output)))
}

pub fn predict_risk<P: Predictor + ?Sized>(
    model: &P,
    vector: &FeatureVector,
) -> Result<RiskLabel> {
    classify(model, vector).map(|(_, label)| label)
}

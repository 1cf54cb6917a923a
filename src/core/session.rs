use crate::core::artifact::ModelArtifact;
use crate::core::encoder::encode;
use crate::core::inference::classify;
use crate::core::provisioner::ArtifactProvisioner;
use crate::domain::model::{Prediction, RawInputs};
use crate::domain::ports::{ConfigProvider, Predictor, Storage};
use crate::utils::error::{Result, RiskError};
use crate::utils::validation::Validate;
use chrono::Utc;

/// Outcome of one row in a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub index: usize,
    pub inputs: RawInputs,
    pub result: Result<Prediction>,
}

/// Holds the loaded model for the lifetime of a session and runs the
/// validate → encode → infer pipeline for every predict action.
///
/// The predictor is only ever read, so one session can be shared across tasks
/// (for example behind an `Arc`).
pub struct RiskSession<P: Predictor> {
    predictor: P,
}

impl RiskSession<ModelArtifact> {
    /// Ensures the artifact is cached, loads it and opens a session around it.
    pub async fn provision<S: Storage, C: ConfigProvider>(
        provisioner: &ArtifactProvisioner<S>,
        config: &C,
    ) -> Result<Self> {
        let artifact = provisioner.provision(config).await?;
        tracing::info!(
            "Model ready ({} from {})",
            artifact.estimator().kind(),
            artifact.source()
        );
        Ok(Self::new(artifact))
    }
}

impl<P: Predictor> RiskSession<P> {
    pub fn new(predictor: P) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// One predict action. Failures affect only this attempt.
    pub fn predict(&self, inputs: &RawInputs) -> Result<Prediction> {
        inputs.validate()?;
        let features = encode(inputs)?;
        tracing::debug!(
            "Encoded features: {}",
            features
                .named_columns()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let (model_output, label) = classify(&self.predictor, &features)?;
        tracing::debug!("Model output {} -> {}", model_output, label);

        Ok(Prediction {
            features,
            model_output,
            label,
            predicted_at: Utc::now(),
        })
    }

    /// Runs every row independently; a failing row does not stop the rest.
    pub fn predict_batch(&self, rows: Vec<RawInputs>) -> Vec<BatchOutcome> {
        rows.into_iter()
            .enumerate()
            .map(|(index, inputs)| {
                let result = self.predict(&inputs);
                if let Err(e) = &result {
                    tracing::warn!("Row {} failed: {}", index + 1, e);
                }
                BatchOutcome {
                    index,
                    inputs,
                    result,
                }
            })
            .collect()
    }
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&RiskError> {
        self.result.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FeatureVector, RiskLabel};
    use std::sync::Mutex;

    /// Records every row it sees and answers with a fixed class.
    struct RecordingPredictor {
        output: i64,
        seen: Mutex<Vec<[f64; 7]>>,
    }

    impl RecordingPredictor {
        fn new(output: i64) -> Self {
            Self {
                output,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Predictor for RecordingPredictor {
        fn predict(&self, features: &FeatureVector) -> Result<i64> {
            self.seen.lock().unwrap().push(features.to_row());
            Ok(self.output)
        }
    }

    #[test]
    fn test_reference_scenario_high_and_low() {
        let high = RiskSession::new(RecordingPredictor::new(1));
        let prediction = high.predict(&RawInputs::default()).unwrap();
        assert_eq!(prediction.label, RiskLabel::High);
        assert_eq!(prediction.label.to_string(), "High Risk");
        assert_eq!(
            high.predictor().seen.lock().unwrap().as_slice(),
            &[[45.0, 12.0, 1.0, 0.0, 0.0, 3.0, 1.0]]
        );

        let low = RiskSession::new(RecordingPredictor::new(0));
        let prediction = low.predict(&RawInputs::default()).unwrap();
        assert_eq!(prediction.label, RiskLabel::Low);
        assert_eq!(prediction.label.to_string(), "Low Risk");
    }

    #[test]
    fn test_out_of_range_input_never_reaches_model() {
        let session = RiskSession::new(RecordingPredictor::new(1));
        let inputs = RawInputs {
            age: 19,
            ..RawInputs::default()
        };

        let err = session.predict(&inputs).unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput { .. }));
        assert!(session.predictor().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_session_stays_usable_after_failure() {
        let session = RiskSession::new(RecordingPredictor::new(0));
        let bad = RawInputs {
            alcohol: "Occasionally".to_string(),
            ..RawInputs::default()
        };

        assert!(session.predict(&bad).is_err());
        assert!(session.predict(&RawInputs::default()).is_ok());
    }

    #[test]
    fn test_batch_keeps_going_past_bad_rows() {
        let session = RiskSession::new(RecordingPredictor::new(1));
        let rows = vec![
            RawInputs::default(),
            RawInputs {
                biopsies: 12,
                ..RawInputs::default()
            },
            RawInputs {
                family_history: "Multiple".to_string(),
                ..RawInputs::default()
            },
        ];

        let outcomes = session.predict_batch(rows);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(outcomes[1].error().is_some());
        assert!(outcomes[2].is_success());
        assert_eq!(outcomes[2].index, 2);
    }
}

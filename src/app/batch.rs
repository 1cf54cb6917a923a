//! CSV batch mode: one patient per row in, one prediction per row out.

use crate::core::session::{BatchOutcome, RiskSession};
use crate::domain::model::{RawInputs, RiskLabel, FEATURE_COLUMNS};
use crate::domain::ports::{Predictor, Storage};
use crate::utils::error::Result;

pub const INPUT_COLUMNS: [&str; 7] = [
    "age",
    "menarche",
    "biopsies",
    "alcohol",
    "tobacco",
    "exercise_hours",
    "family_history",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub high_risk: usize,
    pub low_risk: usize,
    pub failed: usize,
}

/// Parses the input CSV. Malformed CSV (missing columns, non-numeric ages)
/// fails the whole file; out-of-range values are reported per row later.
pub fn parse_rows(data: &[u8]) -> Result<Vec<RawInputs>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.deserialize::<RawInputs>() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Renders outcomes as CSV: the original answers, the encoded columns, the
/// label and the error message (empty on success).
pub fn render_outcomes(outcomes: &[BatchOutcome]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let header: Vec<&str> = std::iter::once("row")
        .chain(INPUT_COLUMNS)
        .chain(FEATURE_COLUMNS)
        .chain(["label", "error"])
        .collect();
    writer.write_record(&header)?;

    for outcome in outcomes {
        let inputs = &outcome.inputs;
        let mut record = vec![
            (outcome.index + 1).to_string(),
            inputs.age.to_string(),
            inputs.menarche.to_string(),
            inputs.biopsies.to_string(),
            inputs.alcohol.clone(),
            inputs.tobacco.clone(),
            inputs.exercise_hours.to_string(),
            inputs.family_history.clone(),
        ];

        match &outcome.result {
            Ok(prediction) => {
                record.extend(prediction.features.to_row().iter().map(|v| v.to_string()));
                record.push(prediction.label.to_string());
                record.push(String::new());
            }
            Err(e) => {
                record.extend(std::iter::repeat(String::new()).take(FEATURE_COLUMNS.len() + 1));
                record.push(e.to_string());
            }
        }

        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| crate::utils::error::RiskError::IoError(e.into_error()))
}

pub fn summarize(outcomes: &[BatchOutcome]) -> BatchSummary {
    outcomes
        .iter()
        .fold(BatchSummary::default(), |mut summary, outcome| {
            summary.total += 1;
            match &outcome.result {
                Ok(p) if p.label == RiskLabel::High => summary.high_risk += 1,
                Ok(_) => summary.low_risk += 1,
                Err(_) => summary.failed += 1,
            }
            summary
        })
}

/// Reads `input_path`, predicts every row and writes the report to `output_path`.
pub async fn run_batch<S: Storage, P: Predictor>(
    storage: &S,
    session: &RiskSession<P>,
    input_path: &str,
    output_path: &str,
) -> Result<BatchSummary> {
    let data = storage.read_file(input_path).await?;
    let rows = parse_rows(&data)?;
    tracing::info!("Read {} patient rows from {}", rows.len(), input_path);

    let outcomes = session.predict_batch(rows);
    let report = render_outcomes(&outcomes)?;

    tracing::debug!("Writing batch report ({} bytes) to {}", report.len(), output_path);
    storage.write_file(output_path, &report).await?;

    let summary = summarize(&outcomes);
    tracing::info!(
        "Batch complete: {} rows, {} high risk, {} low risk, {} failed",
        summary.total,
        summary.high_risk,
        summary.low_risk,
        summary.failed
    );
    Ok(summary)
}

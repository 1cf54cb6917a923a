use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Number of columns the classifier was trained on.
pub const FEATURE_COUNT: usize = 7;

/// Training-time column names, in the order the model consumes them.
/// The model does no name matching at inference time, so this order is the
/// contract.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "age",
    "menarche",
    "biopsies",
    "alcohol_binary",
    "tobacco_binary",
    "exercise_numeric",
    "nrelbc_encoded",
];

pub const AGE_RANGE: RangeInclusive<i64> = 20..=100;
pub const MENARCHE_RANGE: RangeInclusive<i64> = 8..=20;
pub const BIOPSIES_RANGE: RangeInclusive<i64> = 0..=10;
pub const EXERCISE_HOURS_RANGE: RangeInclusive<f64> = 0.0..=50.0;

/// Patient answers as entered, before encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub age: i64,
    pub menarche: i64,
    pub biopsies: i64,
    pub alcohol: String,
    pub tobacco: String,
    pub exercise_hours: f64,
    pub family_history: String,
}

impl Default for RawInputs {
    fn default() -> Self {
        Self {
            age: 45,
            menarche: 12,
            biopsies: 1,
            alcohol: "No".to_string(),
            tobacco: "No".to_string(),
            exercise_hours: 3.0,
            family_history: "None".to_string(),
        }
    }
}

impl Validate for RawInputs {
    fn validate(&self) -> Result<()> {
        validate_range("age", self.age, *AGE_RANGE.start(), *AGE_RANGE.end())?;
        validate_range(
            "menarche",
            self.menarche,
            *MENARCHE_RANGE.start(),
            *MENARCHE_RANGE.end(),
        )?;
        validate_range(
            "biopsies",
            self.biopsies,
            *BIOPSIES_RANGE.start(),
            *BIOPSIES_RANGE.end(),
        )?;
        validate_range(
            "exercise_hours",
            self.exercise_hours,
            *EXERCISE_HOURS_RANGE.start(),
            *EXERCISE_HOURS_RANGE.end(),
        )?;
        Ok(())
    }
}

/// One encoded patient row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age: i64,
    pub menarche: i64,
    pub biopsies: i64,
    pub alcohol_binary: u8,
    pub tobacco_binary: u8,
    pub exercise_hours: f64,
    pub family_history_code: u8,
}

impl FeatureVector {
    /// Numeric row in [`FEATURE_COLUMNS`] order.
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age as f64,
            self.menarche as f64,
            self.biopsies as f64,
            f64::from(self.alcohol_binary),
            f64::from(self.tobacco_binary),
            self.exercise_hours,
            f64::from(self.family_history_code),
        ]
    }

    /// `(column, value)` pairs, mostly for logging and reports.
    pub fn named_columns(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_COLUMNS.into_iter().zip(self.to_row())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    High,
    Low,
}

impl RiskLabel {
    /// Class `1` is the positive (high risk) class; every other output is low.
    pub fn from_model_output(output: i64) -> Self {
        if output == 1 {
            RiskLabel::High
        } else {
            RiskLabel::Low
        }
    }

    pub fn headline(self) -> String {
        format!("Prediction: {} of Breast Cancer", self)
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::High => f.write_str("High Risk"),
            RiskLabel::Low => f.write_str("Low Risk"),
        }
    }
}

/// Result of one predict action.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub features: FeatureVector,
    pub model_output: i64,
    pub label: RiskLabel,
    pub predicted_at: DateTime<Utc>,
}

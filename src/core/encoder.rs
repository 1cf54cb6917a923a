use crate::domain::choices::{FamilyHistory, YesNo};
use crate::domain::model::{FeatureVector, RawInputs};
use crate::utils::error::Result;

/// Maps raw answers to the model's feature vector.
///
/// Numeric fields pass through untouched; range checks belong to the input
/// boundary (see `RawInputs::validate`). Category answers must come from the
/// closed sets in [`crate::domain::choices`].
pub fn encode(raw: &RawInputs) -> Result<FeatureVector> {
    let alcohol = YesNo::parse("alcohol", &raw.alcohol)?;
    let tobacco = YesNo::parse("tobacco", &raw.tobacco)?;
    let family_history = FamilyHistory::parse("family_history", &raw.family_history)?;

    Ok(FeatureVector {
        age: raw.age,
        menarche: raw.menarche,
        biopsies: raw.biopsies,
        alcohol_binary: alcohol.code(),
        tobacco_binary: tobacco.code(),
        exercise_hours: raw.exercise_hours,
        family_history_code: family_history.code(),
    })
}

/// Inverse of [`encode`].
pub fn decode(vector: &FeatureVector) -> Result<RawInputs> {
    let alcohol = YesNo::from_code("alcohol_binary", f64::from(vector.alcohol_binary))?;
    let tobacco = YesNo::from_code("tobacco_binary", f64::from(vector.tobacco_binary))?;
    let family_history =
        FamilyHistory::from_code("nrelbc_encoded", f64::from(vector.family_history_code))?;

    Ok(RawInputs {
        age: vector.age,
        menarche: vector.menarche,
        biopsies: vector.biopsies,
        alcohol: alcohol.label().to_string(),
        tobacco: tobacco.label().to_string(),
        exercise_hours: vector.exercise_hours,
        family_history: family_history.label().to_string(),
    })
}

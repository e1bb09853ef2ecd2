use crate::error::AssessmentError;
use crate::labels::{canonical_key, Level};
use crate::models::ClassificationResult;
use providers::{Probabilities, RawResult};

/// Canonicalizes the labels of one raw result. Values are never touched.
///
/// `Medium` becomes `Mid` in the predicted class and in the probability keys;
/// any other probability key is kept as is. A predicted class outside the
/// three-class taxonomy is rejected.
pub fn normalize(raw: RawResult) -> Result<ClassificationResult, AssessmentError> {
    let predicted_class =
        Level::from_label(&raw.predicted_class).ok_or_else(|| AssessmentError::UnknownClass {
            file: raw.file_name.clone(),
            class: raw.predicted_class.clone(),
        })?;

    let probabilities: Probabilities = raw
        .probabilities
        .iter()
        .map(|(key, value)| (canonical_key(key).to_string(), value))
        .collect();

    Ok(ClassificationResult {
        file_name: raw.file_name,
        predicted_class,
        probabilities,
    })
}

pub fn normalize_all(raw: Vec<RawResult>) -> Result<Vec<ClassificationResult>, AssessmentError> {
    raw.into_iter().map(normalize).collect()
}

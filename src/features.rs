//! Feature columns and request validation
//!
//! Pure functions only: a JSON object goes in, an ordered `FeatureVector`
//! or a `ValidationError` comes out. Nothing here touches the model.

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Number of scores the classifier was trained on
pub const FEATURE_COUNT: usize = 20;

/// Field names in training order
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "TBLANG", "TBMATH", "TBCT", "TMKNM", "TBLT",
    "M17", "M19", "M22", "M30", "M32", "M33",
    "M34", "M35", "M36", "M38", "M41", "M43",
    "M44", "M45", "M47",
];

/// Inclusive bounds for every score
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("No data provided")]
    EmptyPayload,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Score {field} must be between 0 and 10 (received: {value})")]
    OutOfRange { field: String, value: f64 },
}

/// Ordered scores, one per entry of `FEATURE_COLUMNS`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Every field set to the same score
    pub fn uniform(value: f64) -> Self {
        Self([value; FEATURE_COUNT])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// (field, value) pairs in training order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_COLUMNS.iter().copied().zip(self.0.iter().copied())
    }
}

/// Serializes as a JSON object keyed by field name, in training order
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.named())
    }
}

/// Validate a request body and build the feature vector.
///
/// Missing fields are all reported together. Value errors stop at the first
/// offending field, walking the fields in training order.
pub fn validate(payload: &Map<String, Value>) -> Result<FeatureVector, ValidationError> {
    if payload.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }

    let missing: Vec<String> = FEATURE_COLUMNS
        .iter()
        .filter(|field| !payload.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let mut values = [0.0; FEATURE_COUNT];
    for (slot, field) in values.iter_mut().zip(FEATURE_COLUMNS) {
        let raw = &payload[field];
        let value = parse_score(raw).ok_or_else(|| ValidationError::InvalidValue {
            field: field.to_string(),
            value: display_raw(raw),
        })?;

        // NaN fails this check too
        if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
            });
        }
        *slot = value;
    }

    Ok(FeatureVector(values))
}

/// Decode a request body into a JSON object.
///
/// Empty bodies, malformed JSON and non-object documents all count as
/// "no data".
pub fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(ValidationError::EmptyPayload),
    }
}

/// Numbers and numeric strings are accepted; everything else is rejected.
fn parse_score(raw: &Value) -> Option<f64> {
    match raw {
        // Literals beyond f64 range parse to infinity and fail the range check
        Value::Number(n) => n.as_f64().or_else(|| n.to_string().parse().ok()),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        // Booleans are not scores, even though they coerce to 0/1 elsewhere
        Value::Bool(_) => None,
        _ => None,
    }
}

fn display_raw(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Prediction Service
//!
//! Owns the (optional) loaded model and implements the three operations the
//! HTTP layer exposes. Stateless per request; the model is never mutated
//! after construction, so the service is shared behind an `Arc` without locks.

use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::features::{self, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::model::{LoadedModel, ModelError, ModelSource};
use crate::models::{HealthStatus, ModelInfo, PredictionResult};

/// Label for raw class 0
pub const WARNING_LABEL: &str = "warning";

/// Label for raw class 1
pub const SAFE_LABEL: &str = "safe";

/// Human-readable label for a raw class; unknown classes pass through.
pub fn label_for(class: i64) -> String {
    match class {
        0 => WARNING_LABEL.to_string(),
        1 => SAFE_LABEL.to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct PredictionService {
    model: Option<LoadedModel>,
}

impl PredictionService {
    pub fn new(model: Option<LoadedModel>) -> Self {
        Self { model }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Validate-and-Predict
    pub fn predict(&self, payload: &Map<String, Value>) -> AppResult<PredictionResult> {
        let input = features::validate(payload)?;
        let model = self.model.as_ref().ok_or(AppError::ModelUnavailable)?;

        tracing::debug!("Input features: {:?}", input.as_slice());

        let raw = model
            .predict(input.as_slice())
            .map_err(|e| AppError::Prediction(e.to_string()))?;
        let label = label_for(raw);

        let confidence = match model.predict_proba(input.as_slice()) {
            Ok(proba) => Some(
                proba
                    .into_iter()
                    .map(|(class, p)| (label_for(class), p))
                    .collect(),
            ),
            Err(ModelError::ProbabilityUnavailable) => None,
            Err(e) => {
                tracing::warn!("Could not get prediction probabilities: {}", e);
                None
            }
        };

        tracing::info!("Prediction made: {} -> {}", raw, label);

        Ok(PredictionResult {
            prediction: label,
            raw_prediction: raw,
            confidence,
            timestamp: chrono::Utc::now(),
            input_data: input,
        })
    }

    /// Describe-Model
    pub fn describe(&self) -> AppResult<ModelInfo> {
        let model = self.model.as_ref().ok_or(AppError::ModelUnavailable)?;
        let profile = model.profile();

        let feature_importance = profile.feature_importances.as_ref().map(|weights| {
            FEATURE_COLUMNS
                .iter()
                .zip(weights)
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect()
        });

        Ok(ModelInfo {
            model_type: profile.model_type.clone(),
            model_source: match model.source() {
                ModelSource::Artifact(_) => "artifact",
                ModelSource::Synthetic => "synthetic",
            },
            feature_columns: FEATURE_COLUMNS.to_vec(),
            n_features: FEATURE_COUNT,
            classes: profile.classes.clone(),
            n_estimators: profile.n_estimators,
            feature_importance,
        })
    }

    /// Health-Check; never fails
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy",
            model_status: if self.is_loaded() { "loaded" } else { "not loaded" },
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ValidationError;
    use crate::model::{Capability, Classifier};
    use serde_json::json;
    use std::sync::Arc;

    /// Predicts a fixed class; optionally reports probabilities
    struct Fixed {
        class: i64,
        proba: Option<Result<Vec<(i64, f64)>, String>>,
    }

    impl Classifier for Fixed {
        fn model_type(&self) -> &str {
            "Fixed"
        }
        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }
        fn predict(&self, features: &[f64]) -> Result<i64, ModelError> {
            if features.len() != FEATURE_COUNT {
                return Err(ModelError::Inference("wrong length".into()));
            }
            Ok(self.class)
        }
        fn capabilities(&self) -> Vec<Capability> {
            match self.proba {
                Some(_) => vec![Capability::WithProbabilities],
                None => Vec::new(),
            }
        }
        fn predict_proba(&self, _features: &[f64]) -> Result<Vec<(i64, f64)>, ModelError> {
            match &self.proba {
                Some(Ok(p)) => Ok(p.clone()),
                Some(Err(msg)) => Err(ModelError::Inference(msg.clone())),
                None => Err(ModelError::ProbabilityUnavailable),
            }
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn model_type(&self) -> &str {
            "Failing"
        }
        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }
        fn predict(&self, _features: &[f64]) -> Result<i64, ModelError> {
            Err(ModelError::Inference("boom".into()))
        }
    }

    fn service(classifier: impl Classifier + 'static) -> PredictionService {
        PredictionService::new(Some(LoadedModel::new(Arc::new(classifier), ModelSource::Synthetic)))
    }

    fn payload(value: f64) -> Map<String, Value> {
        FEATURE_COLUMNS.iter().map(|f| (f.to_string(), json!(value))).collect()
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(label_for(0), "warning");
        assert_eq!(label_for(1), "safe");
        assert_eq!(label_for(7), "7");
    }

    #[test]
    fn test_predict_with_probabilities() {
        let svc = service(Fixed { class: 1, proba: Some(Ok(vec![(0, 0.1), (1, 0.9)])) });
        let result = svc.predict(&payload(8.0)).unwrap();

        assert_eq!(result.prediction, "safe");
        assert_eq!(result.raw_prediction, 1);
        assert_eq!(
            result.confidence,
            Some(vec![("warning".to_string(), 0.1), ("safe".to_string(), 0.9)])
        );
        assert_eq!(result.input_data.as_slice(), &[8.0; FEATURE_COUNT]);
    }

    #[test]
    fn test_unknown_class_passes_through() {
        let svc = service(Fixed { class: 2, proba: Some(Ok(vec![(0, 0.2), (2, 0.8)])) });
        let result = svc.predict(&payload(3.0)).unwrap();

        assert_eq!(result.prediction, "2");
        assert_eq!(
            result.confidence,
            Some(vec![("warning".to_string(), 0.2), ("2".to_string(), 0.8)])
        );
    }

    #[test]
    fn test_probability_failure_is_not_fatal() {
        let svc = service(Fixed { class: 0, proba: Some(Err("degenerate".into())) });
        let result = svc.predict(&payload(1.0)).unwrap();
        assert_eq!(result.prediction, "warning");
        assert!(result.confidence.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("confidence").is_none());
    }

    #[test]
    fn test_model_without_probabilities() {
        let svc = service(Fixed { class: 0, proba: None });
        assert!(svc.predict(&payload(1.0)).unwrap().confidence.is_none());
    }

    #[test]
    fn test_validation_runs_before_model_check() {
        let svc = PredictionService::new(None);

        let mut bad = payload(5.0);
        bad.insert("M30".into(), json!(10.5));
        assert!(matches!(
            svc.predict(&bad),
            Err(AppError::Validation(ValidationError::OutOfRange { .. }))
        ));

        assert!(matches!(svc.predict(&payload(5.0)), Err(AppError::ModelUnavailable)));
    }

    #[test]
    fn test_inference_failure_becomes_prediction_error() {
        let svc = service(Failing);
        assert!(matches!(svc.predict(&payload(5.0)), Err(AppError::Prediction(_))));
    }

    #[test]
    fn test_describe() {
        let svc = service(Fixed { class: 1, proba: None });
        let info = svc.describe().unwrap();
        assert_eq!(info.model_type, "Fixed");
        assert_eq!(info.model_source, "synthetic");
        assert_eq!(info.n_features, 20);
        assert!(info.classes.is_none());
        assert!(info.feature_importance.is_none());

        assert!(matches!(PredictionService::new(None).describe(), Err(AppError::ModelUnavailable)));
    }

    #[test]
    fn test_health_reflects_model_state() {
        assert_eq!(PredictionService::new(None).health().model_status, "not loaded");
        assert_eq!(service(Failing).health().model_status, "loaded");
    }
}

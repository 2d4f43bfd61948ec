//! Model Module - Classifier interface and inference backends
//!
//! The service only ever sees `LoadedModel`. What a classifier can do
//! beyond `predict` is resolved once, when it is loaded.

pub mod forest;
pub mod loader;
pub mod tree;

use std::sync::Arc;

use thiserror::Error;

// Re-export common types
pub use forest::{ForestParams, RandomForestClassifier};
pub use loader::{load_artifact, load_or_synthesize, train_synthetic, ModelSource};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode model artifact: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Feature count mismatch: expected {expected}, found {found}")]
    FeatureMismatch { expected: usize, found: usize },

    #[error("Cannot train on an empty dataset")]
    EmptyTrainingSet,

    #[error("Training data has {rows} rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },

    #[error("Model does not provide class probabilities")]
    ProbabilityUnavailable,

    #[error("Inference failed: {0}")]
    Inference(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Optional abilities a classifier may have on top of `predict`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    WithProbabilities,
    WithFeatureImportance,
}

/// Trait for classifiers served over HTTP
pub trait Classifier: Send + Sync {
    /// Algorithm name reported by /model-info
    fn model_type(&self) -> &str;

    fn n_features(&self) -> usize;

    /// Raw class label for one feature vector
    fn predict(&self, features: &[f64]) -> Result<i64, ModelError>;

    fn capabilities(&self) -> Vec<Capability> {
        Vec::new()
    }

    /// (class, probability) pairs in class order
    fn predict_proba(&self, _features: &[f64]) -> Result<Vec<(i64, f64)>, ModelError> {
        Err(ModelError::ProbabilityUnavailable)
    }

    fn classes(&self) -> Option<Vec<i64>> {
        None
    }

    fn n_estimators(&self) -> Option<usize> {
        None
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

// ============================================================================
// LOADED MODEL
// ============================================================================

/// Static facts about a classifier, captured at load time
#[derive(Debug, Clone)]
pub struct ModelProfile {
    pub model_type: String,
    pub supports_probabilities: bool,
    pub classes: Option<Vec<i64>>,
    pub n_estimators: Option<usize>,
    pub feature_importances: Option<Vec<f64>>,
}

/// A classifier ready to serve, plus its resolved profile
#[derive(Clone)]
pub struct LoadedModel {
    classifier: Arc<dyn Classifier>,
    profile: ModelProfile,
    source: ModelSource,
}

impl LoadedModel {
    pub fn new(classifier: Arc<dyn Classifier>, source: ModelSource) -> Self {
        let capabilities = classifier.capabilities();
        let feature_importances = if capabilities.contains(&Capability::WithFeatureImportance) {
            classifier.feature_importances()
        } else {
            None
        };

        let profile = ModelProfile {
            model_type: classifier.model_type().to_string(),
            supports_probabilities: capabilities.contains(&Capability::WithProbabilities),
            classes: classifier.classes(),
            n_estimators: classifier.n_estimators(),
            feature_importances,
        };

        Self { classifier, profile, source }
    }

    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn predict(&self, features: &[f64]) -> Result<i64, ModelError> {
        self.classifier.predict(features)
    }

    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<(i64, f64)>, ModelError> {
        if !self.profile.supports_probabilities {
            return Err(ModelError::ProbabilityUnavailable);
        }
        self.classifier.predict_proba(features)
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("profile", &self.profile)
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(i64);

    impl Classifier for Constant {
        fn model_type(&self) -> &str {
            "Constant"
        }
        fn n_features(&self) -> usize {
            20
        }
        fn predict(&self, _features: &[f64]) -> Result<i64, ModelError> {
            Ok(self.0)
        }
        // Implemented but not advertised: the profile must win
        fn predict_proba(&self, _features: &[f64]) -> Result<Vec<(i64, f64)>, ModelError> {
            Ok(vec![(self.0, 1.0)])
        }
    }

    #[test]
    fn test_profile_without_capabilities() {
        let model = LoadedModel::new(Arc::new(Constant(1)), ModelSource::Synthetic);
        let profile = model.profile();
        assert_eq!(profile.model_type, "Constant");
        assert!(!profile.supports_probabilities);
        assert!(profile.classes.is_none());
        assert!(profile.feature_importances.is_none());
        assert!(matches!(
            model.predict_proba(&[0.0; 20]),
            Err(ModelError::ProbabilityUnavailable)
        ));
        assert_eq!(model.predict(&[0.0; 20]).unwrap(), 1);
    }
}

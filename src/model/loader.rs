//! Model loading
//!
//! Startup is a single transition: Unloaded -> Loaded. The artifact at
//! `MODEL_PATH` is tried first; when it is unusable and the fallback is
//! enabled, a throwaway forest is trained on synthetic scores so the API
//! stays exercisable.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::forest::{ForestParams, RandomForestClassifier};
use super::{Classifier, LoadedModel, ModelError};
use crate::config::Config;
use crate::features::{FEATURE_COUNT, MAX_SCORE, MIN_SCORE};

/// Synthetic dataset size
pub const SYNTHETIC_SAMPLES: usize = 1000;

/// Seed for data generation, the train/hold-out shuffle, and the forest
pub const SYNTHETIC_SEED: u64 = 42;

/// Rows whose mean score reaches this are labelled safe (1)
pub const SAFE_MEAN_THRESHOLD: f64 = 6.0;

pub const HOLDOUT_FRACTION: f64 = 0.2;

/// Where the served model came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Artifact(PathBuf),
    Synthetic,
}

/// Synthetic forest plus its accuracy on the held-out rows
#[derive(Debug)]
pub struct SyntheticModel {
    pub model: RandomForestClassifier,
    pub holdout_accuracy: f64,
}

/// Read a JSON forest artifact and check it matches the service's features.
pub fn load_artifact(path: &Path) -> Result<RandomForestClassifier, ModelError> {
    if !path.exists() {
        return Err(ModelError::ArtifactNotFound(path.display().to_string()));
    }

    let reader = BufReader::new(File::open(path)?);
    let model: RandomForestClassifier = serde_json::from_reader(reader)?;

    if model.n_features() != FEATURE_COUNT {
        return Err(ModelError::FeatureMismatch {
            expected: FEATURE_COUNT,
            found: model.n_features(),
        });
    }
    Ok(model)
}

pub fn save_artifact(model: &RandomForestClassifier, path: &Path) -> Result<(), ModelError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, model)?;
    writer.flush()?;
    Ok(())
}

/// Train the fallback forest on uniformly random scores.
pub fn train_synthetic() -> Result<SyntheticModel, ModelError> {
    let mut rng = StdRng::seed_from_u64(SYNTHETIC_SEED);
    let x = Array2::from_shape_fn((SYNTHETIC_SAMPLES, FEATURE_COUNT), |_| {
        rng.gen_range(MIN_SCORE..MAX_SCORE)
    });
    let y: Vec<i64> = x
        .rows()
        .into_iter()
        .map(|row| i64::from(row.mean().unwrap_or(0.0) >= SAFE_MEAN_THRESHOLD))
        .collect();

    let mut order: Vec<usize> = (0..SYNTHETIC_SAMPLES).collect();
    order.shuffle(&mut StdRng::seed_from_u64(SYNTHETIC_SEED));
    let holdout = (SYNTHETIC_SAMPLES as f64 * HOLDOUT_FRACTION).ceil() as usize;
    let (test_rows, train_rows) = order.split_at(holdout);

    let x_train = x.select(Axis(0), train_rows);
    let y_train: Vec<i64> = train_rows.iter().map(|&i| y[i]).collect();
    let x_test = x.select(Axis(0), test_rows);
    let y_test: Vec<i64> = test_rows.iter().map(|&i| y[i]).collect();

    let params = ForestParams {
        seed: SYNTHETIC_SEED,
        ..Default::default()
    };
    let model = RandomForestClassifier::fit(x_train.view(), &y_train, params)?;
    let holdout_accuracy = model.score(x_test.view(), &y_test)?;

    Ok(SyntheticModel { model, holdout_accuracy })
}

/// Resolve the model to serve. `None` leaves the service Unloaded.
pub fn load_or_synthesize(config: &Config) -> Option<LoadedModel> {
    match load_artifact(&config.model_path) {
        Ok(model) => {
            tracing::info!("Model loaded from {}", config.model_path.display());
            return Some(LoadedModel::new(
                Arc::new(model),
                ModelSource::Artifact(config.model_path.clone()),
            ));
        }
        Err(e) => tracing::warn!("Could not load model: {}", e),
    }

    if !config.fallback_enabled {
        tracing::warn!("Synthetic fallback disabled; /predict will be unavailable");
        return None;
    }

    tracing::info!("Training synthetic fallback model...");
    let synthetic = match train_synthetic() {
        Ok(synthetic) => synthetic,
        Err(e) => {
            tracing::error!("Failed to train synthetic model: {}", e);
            return None;
        }
    };
    tracing::info!(
        "Synthetic model ready (hold-out accuracy {:.3})",
        synthetic.holdout_accuracy
    );

    if let Some(path) = &config.synthetic_model_path {
        match save_artifact(&synthetic.model, path) {
            Ok(()) => tracing::info!("Synthetic model written to {}", path.display()),
            Err(e) => tracing::warn!("Could not write synthetic model to {}: {}", path.display(), e),
        }
    }

    Some(LoadedModel::new(Arc::new(synthetic.model), ModelSource::Synthetic))
}

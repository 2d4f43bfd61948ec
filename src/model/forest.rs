//! Random Forest Classifier
//!
//! Bagged CART trees. Probabilities are the mean of the leaf distributions,
//! the predicted class is the most probable one.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use super::{Capability, Classifier, ModelError};

/// Hyperparameters for `RandomForestClassifier::fit`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Defaults to sqrt(n_features)
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    n_features: usize,
    /// Sorted distinct training labels
    classes: Vec<i64>,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForestClassifier {
    pub fn fit(x: ArrayView2<'_, f64>, y: &[i64], params: ForestParams) -> Result<Self, ModelError> {
        let (rows, n_features) = x.dim();
        if rows == 0 || n_features == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if rows != y.len() {
            return Err(ModelError::LabelMismatch { rows, labels: y.len() });
        }

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: params
                .max_features
                .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
                .clamp(1, n_features),
        };

        let mut rng = StdRng::seed_from_u64(params.seed);
        let trees: Vec<DecisionTree> = (0..params.n_estimators.max(1))
            .map(|_| {
                let bootstrap: Vec<usize> = (0..rows).map(|_| rng.gen_range(0..rows)).collect();
                DecisionTree::fit(x, &encoded, classes.len(), bootstrap, tree_params, &mut rng)
            })
            .collect();

        let mut feature_importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, value) in feature_importances.iter_mut().zip(tree.importances()) {
                *total += value;
            }
        }
        let sum: f64 = feature_importances.iter().sum();
        if sum > 0.0 {
            feature_importances.iter_mut().for_each(|v| *v /= sum);
        }

        tracing::debug!(
            "Fitted random forest: {} trees, {} rows, {} classes",
            trees.len(),
            rows,
            classes.len()
        );

        Ok(Self {
            params,
            n_features,
            classes,
            trees,
            feature_importances,
        })
    }

    /// Mean class distribution over all trees
    fn average_distribution(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                found: features.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::Inference("forest has no trees".to_string()));
        }

        let mut average = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let distribution = tree.distribution(features)?;
            if distribution.len() != average.len() {
                return Err(ModelError::Inference(format!(
                    "leaf has {} classes, forest has {}",
                    distribution.len(),
                    average.len()
                )));
            }
            for (total, p) in average.iter_mut().zip(distribution) {
                *total += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        average.iter_mut().for_each(|p| *p /= n_trees);
        Ok(average)
    }

    /// Fraction of rows predicted correctly
    pub fn score(&self, x: ArrayView2<'_, f64>, y: &[i64]) -> Result<f64, ModelError> {
        if x.nrows() != y.len() {
            return Err(ModelError::LabelMismatch { rows: x.nrows(), labels: y.len() });
        }
        if y.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let mut correct = 0usize;
        for (row, expected) in x.rows().into_iter().zip(y) {
            let features = row.to_vec();
            if self.predict(&features)? == *expected {
                correct += 1;
            }
        }
        Ok(correct as f64 / y.len() as f64)
    }
}

impl Classifier for RandomForestClassifier {
    fn model_type(&self) -> &str {
        "RandomForestClassifier"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<i64, ModelError> {
        let average = self.average_distribution(features)?;

        // First class wins ties
        let mut best = 0;
        for (i, p) in average.iter().enumerate() {
            if *p > average[best] {
                best = i;
            }
        }

        self.classes
            .get(best)
            .copied()
            .ok_or_else(|| ModelError::Inference("forest has no classes".to_string()))
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::WithProbabilities, Capability::WithFeatureImportance]
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<(i64, f64)>, ModelError> {
        let average = self.average_distribution(features)?;
        Ok(self.classes.iter().copied().zip(average).collect())
    }

    fn classes(&self) -> Option<Vec<i64>> {
        Some(self.classes.clone())
    }

    fn n_estimators(&self) -> Option<usize> {
        Some(self.trees.len())
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        Some(self.feature_importances.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Label is 1 when feature 0 exceeds 5; feature 1 is noise.
    fn dataset() -> (Array2<f64>, Vec<i64>) {
        let mut rng = StdRng::seed_from_u64(3);
        let x = Array2::from_shape_fn((200, 2), |_| rng.gen_range(0.0..10.0));
        let y = x.rows().into_iter().map(|r| i64::from(r[0] > 5.0)).collect();
        (x, y)
    }

    fn small_params() -> ForestParams {
        ForestParams { n_estimators: 15, ..Default::default() }
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = dataset();
        let forest = RandomForestClassifier::fit(x.view(), &y, small_params()).unwrap();

        assert_eq!(forest.classes(), Some(vec![0, 1]));
        assert_eq!(forest.n_estimators(), Some(15));
        assert_eq!(forest.predict(&[9.0, 2.0]).unwrap(), 1);
        assert_eq!(forest.predict(&[1.0, 8.0]).unwrap(), 0);
        assert!(forest.score(x.view(), &y).unwrap() > 0.95);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = dataset();
        let forest = RandomForestClassifier::fit(x.view(), &y, small_params()).unwrap();

        let proba = forest.predict_proba(&[7.5, 5.0]).unwrap();
        assert_eq!(proba.iter().map(|(c, _)| *c).collect::<Vec<_>>(), vec![0, 1]);
        let total: f64 = proba.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(proba[1].1 > proba[0].1);
    }

    #[test]
    fn test_importance_favours_informative_feature() {
        let (x, y) = dataset();
        let forest = RandomForestClassifier::fit(x.view(), &y, small_params()).unwrap();

        let importances = forest.feature_importances().unwrap();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = dataset();
        let a = RandomForestClassifier::fit(x.view(), &y, small_params()).unwrap();
        let b = RandomForestClassifier::fit(x.view(), &y, small_params()).unwrap();

        for probe in [[4.9, 1.0], [5.1, 9.0], [0.0, 0.0]] {
            assert_eq!(a.predict_proba(&probe).unwrap(), b.predict_proba(&probe).unwrap());
        }
    }

    #[test]
    fn test_single_class_training() {
        let x = Array2::from_elem((4, 2), 1.0);
        let forest = RandomForestClassifier::fit(x.view(), &[1, 1, 1, 1], small_params()).unwrap();
        assert_eq!(forest.predict(&[3.0, 3.0]).unwrap(), 1);
        assert_eq!(forest.predict_proba(&[3.0, 3.0]).unwrap(), vec![(1, 1.0)]);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            RandomForestClassifier::fit(x.view(), &[], small_params()),
            Err(ModelError::EmptyTrainingSet)
        ));

        let x = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            RandomForestClassifier::fit(x.view(), &[0], small_params()),
            Err(ModelError::LabelMismatch { rows: 2, labels: 1 })
        ));

        let (x, y) = dataset();
        let forest = RandomForestClassifier::fit(x.view(), &y, small_params()).unwrap();
        assert!(matches!(
            forest.predict(&[1.0]),
            Err(ModelError::FeatureMismatch { expected: 2, found: 1 })
        ));
    }
}

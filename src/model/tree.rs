//! CART decision tree (Gini impurity)
//!
//! Nodes live in a flat arena; index 0 is the root. Leaves hold the class
//! distribution of the training samples that reached them.

use ndarray::ArrayView2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Externally tagged; arbitrary-precision numbers do not survive the
/// buffering an internally tagged enum needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Non-constant features examined per split
    pub max_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    /// Normalized impurity decrease per feature
    importances: Vec<f64>,
}

/// Training inputs shared by every node of one tree
struct Training<'a> {
    x: ArrayView2<'a, f64>,
    /// Class index per row
    y: &'a [usize],
    n_classes: usize,
    params: TreeParams,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    /// Sum of child impurities weighted by child sample counts
    weighted_impurity: f64,
}

impl DecisionTree {
    /// Grow a tree on `samples` (row indices, repeats allowed for bootstrapping).
    pub fn fit<R: Rng + ?Sized>(
        x: ArrayView2<'_, f64>,
        y: &[usize],
        n_classes: usize,
        mut samples: Vec<usize>,
        params: TreeParams,
        rng: &mut R,
    ) -> Self {
        let training = Training { x: x.view(), y, n_classes, params };
        let mut tree = Self {
            nodes: Vec::new(),
            importances: vec![0.0; x.ncols()],
        };

        tree.grow(&training, &mut samples, 0, rng);

        let total: f64 = tree.importances.iter().sum();
        if total > 0.0 {
            tree.importances.iter_mut().for_each(|v| *v /= total);
        }
        tree
    }

    fn grow<R: Rng + ?Sized>(
        &mut self,
        training: &Training<'_>,
        samples: &mut [usize],
        depth: usize,
        rng: &mut R,
    ) -> usize {
        let n = samples.len();
        let counts = class_counts(samples, training.y, training.n_classes);
        let impurity = gini(&counts, n);

        let depth_left = training.params.max_depth.map_or(true, |max| depth < max);
        let splittable = depth_left && n >= training.params.min_samples_split && impurity > 0.0;

        let split = if splittable {
            best_split(training, samples, &counts, rng)
        } else {
            None
        };

        let Some(split) = split else {
            let distribution = counts.iter().map(|&c| c as f64 / n.max(1) as f64).collect();
            self.nodes.push(Node::Leaf { distribution });
            return self.nodes.len() - 1;
        };

        // Reserve the slot so children get higher indices
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { distribution: Vec::new() });

        self.importances[split.feature] += n as f64 * impurity - split.weighted_impurity;

        let mid = partition(samples, |row| training.x[[row, split.feature]] <= split.threshold);
        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left = self.grow(training, left_samples, depth + 1, rng);
        let right = self.grow(training, right_samples, depth + 1, rng);

        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    /// Class distribution of the leaf `features` falls into
    pub fn distribution(&self, features: &[f64]) -> Result<&[f64], ModelError> {
        let mut index = 0;
        // A well-formed tree never revisits a node
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(Node::Leaf { distribution }) => return Ok(distribution.as_slice()),
                Some(Node::Split { feature, threshold, left, right }) => {
                    let value = features.get(*feature).ok_or_else(|| {
                        ModelError::Inference(format!("split on missing feature {}", feature))
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ModelError::Inference(format!("dangling node index {}", index)));
                }
            }
        }
        Err(ModelError::Inference("tree traversal did not reach a leaf".to_string()))
    }

    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn class_counts(samples: &[usize], y: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &row in samples {
        counts[y[row]] += 1;
    }
    counts
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

/// Move rows matching `goes_left` to the front; returns how many matched.
fn partition(samples: &mut [usize], goes_left: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..samples.len() {
        if goes_left(samples[i]) {
            samples.swap(i, mid);
            mid += 1;
        }
    }
    mid
}

fn best_split<R: Rng + ?Sized>(
    training: &Training<'_>,
    samples: &[usize],
    counts: &[usize],
    rng: &mut R,
) -> Option<Split> {
    let n = samples.len();
    let mut features: Vec<usize> = (0..training.x.ncols()).collect();
    features.shuffle(rng);

    let mut best: Option<Split> = None;
    let mut examined = 0;

    for feature in features {
        if examined >= training.params.max_features {
            break;
        }

        let mut column: Vec<(f64, usize)> = samples
            .iter()
            .map(|&row| (training.x[[row, feature]], training.y[row]))
            .collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Constant features do not count towards max_features
        if column[0].0 >= column[n - 1].0 {
            continue;
        }
        examined += 1;

        let mut left = vec![0usize; training.n_classes];
        let mut right = counts.to_vec();

        for i in 0..n - 1 {
            let (value, class) = column[i];
            left[class] += 1;
            right[class] -= 1;

            let next = column[i + 1].0;
            if value >= next {
                continue;
            }

            let n_left = i + 1;
            let n_right = n - n_left;
            let weighted = n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right);

            if best.map_or(true, |b| weighted < b.weighted_impurity) {
                let mut threshold = (value + next) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(Split { feature, threshold, weighted_impurity: weighted });
            }
        }
    }

    best
}

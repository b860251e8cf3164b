//! Random forest regression
//!
//! Bagged CART regression trees grown on variance reduction. Every tree owns
//! a ChaCha generator seeded from the forest seed plus its index, so a fit is
//! fully reproducible for the same data and configuration.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::TrendError;

/// Impurity / gain below this is treated as zero
const MIN_IMPURITY: f64 = 1e-12;

/// Decision tree configuration
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A single regression tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None }
    }

    /// Grow the tree on the rows named by `indices` (repeats allowed, as in a
    /// bootstrap sample).
    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>, indices: &[usize], rng: &mut ChaCha8Rng) {
        self.root = Some(self.build(x, y, indices, 0, rng));
    }

    fn build(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let n = indices.len();
        let value = mean_of(y, indices);

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || n < self.config.min_samples_split || variance_of(y, indices) < MIN_IMPURITY {
            return Node::Leaf { value };
        }

        let Some((feature, threshold)) = self.find_best_split(x, y, indices, rng) else {
            return Node::Leaf { value };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
            indices.iter().copied().partition(|&i| x[[i, feature]] <= threshold);

        if left_idx.is_empty() || right_idx.is_empty() {
            return Node::Leaf { value };
        }

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.build(x, y, &left_idx, depth + 1, rng)),
            right: Box::new(self.build(x, y, &right_idx, depth + 1, rng)),
        }
    }

    /// Best (feature, threshold) by variance reduction.
    ///
    /// Each candidate feature is sorted once and swept left to right with
    /// running sums, so a node costs O(features * n log n).
    fn find_best_split(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let n_features = x.ncols();
        let max_features = self.config.max_features.unwrap_or(n_features).clamp(1, n_features);
        let min_leaf = self.config.min_samples_leaf.max(1);

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        features.truncate(max_features);

        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_impurity = impurity(total_sum, total_sq, n);

        let mut best_gain = MIN_IMPURITY;
        let mut best: Option<(usize, f64)> = None;
        let mut order = indices.to_vec();

        for &feature in &features {
            order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 0..n - 1 {
                let i = order[k];
                left_sum += y[i];
                left_sq += y[i] * y[i];

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let current = x[[i, feature]];
                let next = x[[order[k + 1], feature]];
                if next <= current {
                    continue;
                }

                let left_impurity = impurity(left_sum, left_sq, n_left);
                let right_impurity = impurity(total_sum - left_sum, total_sq - left_sq, n_right);
                let weighted = (n_left as f64 * left_impurity + n_right as f64 * right_impurity) / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature, (current + next) / 2.0));
                }
            }
        }

        best
    }

    pub fn predict_one(&self, row: ArrayView1<f64>) -> Option<f64> {
        let mut node = self.root.as_ref()?;
        loop {
            match node {
                Node::Leaf { value } => return Some(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        self.root.as_ref().map(depth_of).unwrap_or(0)
    }
}

/// Random forest configuration
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Per-tree growth limits
    pub tree: TreeConfig,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeConfig::default(),
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random forest regressor
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    /// Train the forest. Trees are grown one after another.
    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<(), TrendError> {
        let n = x.nrows();
        if n == 0 {
            return Err(TrendError::Training(
                "cannot fit random forest on an empty training set".to_string(),
            ));
        }
        if y.len() != n {
            return Err(TrendError::Training(format!(
                "feature rows ({}) and targets ({}) differ in length",
                n,
                y.len()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(TrendError::Training(
                "training data contains NaN or infinite values".to_string(),
            ));
        }
        if self.config.n_trees == 0 {
            return Err(TrendError::Training("forest needs at least one tree".to_string()));
        }

        let all_rows: Vec<usize> = (0..n).collect();

        self.trees = (0..self.config.n_trees)
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(i as u64));

                let sample: Vec<usize> = if self.config.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    all_rows.clone()
                };

                let mut tree = DecisionTree::new(self.config.tree.clone());
                tree.fit(x, y, &sample, &mut rng);
                tree
            })
            .collect();
        self.n_features = x.ncols();

        Ok(())
    }

    /// Mean of the per-tree predictions for one row
    pub fn predict_one(&self, row: ArrayView1<f64>) -> Result<f64, TrendError> {
        if self.trees.is_empty() {
            return Err(TrendError::Prediction("model has not been fitted".to_string()));
        }
        if row.len() != self.n_features {
            return Err(TrendError::Prediction(format!(
                "model expects {} features but received {}",
                self.n_features,
                row.len()
            )));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree
                .predict_one(row)
                .ok_or_else(|| TrendError::Prediction("tree has not been fitted".to_string()))?;
        }

        Ok(total / self.trees.len() as f64)
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, TrendError> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_one(row))
            .collect::<Result<Vec<f64>, _>>()
            .map(Array1::from_vec)
    }

    /// Coefficient of determination on (x, y)
    pub fn score(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<f64, TrendError> {
        let predictions = self.predict(x)?;
        r2_score(y, predictions.view())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }
}

/// R² of `y_pred` against `y_true`.
///
/// Constant targets have no variance to explain: a perfect fit scores 1.0
/// and anything else 0.0, so the result is always finite.
pub fn r2_score(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64, TrendError> {
    if y_true.is_empty() {
        return Err(TrendError::Training("cannot score an empty set".to_string()));
    }
    if y_true.len() != y_pred.len() {
        return Err(TrendError::Training(format!(
            "cannot score {} predictions against {} targets",
            y_pred.len(),
            y_true.len()
        )));
    }

    let mean = y_true.sum() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot < MIN_IMPURITY {
        return Ok(if ss_res < MIN_IMPURITY { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

fn mean_of(y: ArrayView1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn variance_of(y: ArrayView1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let mean = mean_of(y, indices);
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / indices.len() as f64
}

/// Population variance from running sums
fn impurity(sum: f64, sum_sq: f64, n: usize) -> f64 {
    let n = n as f64;
    (sum_sq / n - (sum / n).powi(2)).max(0.0)
}

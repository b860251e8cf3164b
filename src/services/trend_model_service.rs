use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::ForecastConfig;
use crate::errors::TrendError;
use crate::models::{FeatureRow, SentimentRecord, SplitStrategy, FEATURE_COUNT, FEATURE_NAMES};
use crate::services::feature_service::build_feature_rows;
use crate::services::random_forest::RandomForest;
use crate::services::scaler::StandardScaler;

/// Fitted scaler + regressor pair. Lives for one forecast request.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    scaler: StandardScaler,
    forest: RandomForest,
}

impl TrainedModel {
    /// Predicted next-period polarity for a feature row
    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64, TrendError> {
        let features = Array1::from(row.to_vector().to_vec());
        let scaled = self.scaler.transform_row(features.view())?;
        let prediction = self.forest.predict_one(scaled.view())?;

        if !prediction.is_finite() {
            return Err(TrendError::Prediction(format!(
                "model produced a non-finite value for {}",
                row.timestamp
            )));
        }

        Ok(prediction)
    }
}

/// A fitted model together with how well it fits
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub train_score: f64,
    pub test_score: f64,
    pub train_size: usize,
    pub test_size: usize,
}

/// Fit the next-period sentiment model on a chronologically ordered series.
///
/// Every row but the last becomes a sample whose target is the following
/// row's polarity. The scaler is learned from the training split only.
pub fn train_prediction_model(
    records: &[SentimentRecord],
    config: &ForecastConfig,
) -> Result<TrainingOutcome, TrendError> {
    let rows = build_feature_rows(records)?;
    let (features, targets) = training_matrix(&rows);

    let (train_idx, test_idx) = split_indices(targets.len(), config.split, config.test_ratio)?;
    debug!(
        "[TREND] split {:?}: {} train / {} test rows",
        config.split,
        train_idx.len(),
        test_idx.len()
    );

    let x_train = features.select(Axis(0), &train_idx);
    let y_train = targets.select(Axis(0), &train_idx);
    let x_test = features.select(Axis(0), &test_idx);
    let y_test = targets.select(Axis(0), &test_idx);

    let scaler = StandardScaler::fit(x_train.view())?;
    debug!("[TREND] feature scaling: {}", describe_scaling(&scaler));
    let x_train_scaled = scaler.transform(x_train.view())?;
    let x_test_scaled = scaler.transform(x_test.view())?;

    let mut forest = RandomForest::new(config.forest());
    forest.fit(x_train_scaled.view(), y_train.view())?;

    let train_score = forest.score(x_train_scaled.view(), y_train.view())?;
    let test_score = forest.score(x_test_scaled.view(), y_test.view())?;

    info!(
        "[TREND] model fitted on {} rows ({} trees, depth {}): train R²={:.3}, test R²={:.3}",
        train_idx.len(),
        forest.n_trees(),
        forest.max_depth(),
        train_score,
        test_score
    );

    Ok(TrainingOutcome {
        model: TrainedModel { scaler, forest },
        train_score,
        test_score,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
    })
}

/// Feature matrix and next-period targets. The final row has no successor
/// and is left out.
pub fn training_matrix(rows: &[FeatureRow]) -> (Array2<f64>, Array1<f64>) {
    let usable = rows.len().saturating_sub(1);
    let vectors: Vec<[f64; FEATURE_COUNT]> = rows[..usable].iter().map(FeatureRow::to_vector).collect();

    let features = Array2::from_shape_fn((usable, FEATURE_COUNT), |(i, j)| vectors[i][j]);
    let targets = Array1::from_shape_fn(usable, |i| rows[i + 1].polarity);

    (features, targets)
}

/// `name=mean±scale` for every model input, in vector order
pub fn describe_scaling(scaler: &StandardScaler) -> String {
    FEATURE_NAMES
        .iter()
        .zip(scaler.mean().iter().zip(scaler.scale().iter()))
        .map(|(name, (mean, scale))| format!("{}={:.3}±{:.3}", name, mean, scale))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Row indices for the training and test sets.
///
/// The test set holds `ceil(n * test_ratio)` rows.
pub fn split_indices(
    n: usize,
    strategy: SplitStrategy,
    test_ratio: f64,
) -> Result<(Vec<usize>, Vec<usize>), TrendError> {
    let test_size = ((n as f64 * test_ratio).ceil() as usize).min(n);
    let train_size = n - test_size;

    if train_size == 0 || test_size == 0 {
        return Err(TrendError::Training(format!(
            "cannot split {} usable rows into non-empty train and test sets (test ratio {})",
            n, test_ratio
        )));
    }

    match strategy {
        SplitStrategy::Chronological => Ok(((0..train_size).collect(), (train_size..n).collect())),
        SplitStrategy::Random { seed } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut permutation: Vec<usize> = (0..n).collect();
            permutation.shuffle(&mut rng);

            let train = permutation.split_off(test_size);
            Ok((train, permutation))
        }
    }
}

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::errors::TrendError;

/// Per-column standardization (zero mean, unit variance) learned from a
/// training matrix and replayed unchanged on any later input.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Learn column means and population standard deviations.
    /// Zero-variance columns get a scale of 1 so they map to 0.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self, TrendError> {
        if x.nrows() == 0 {
            return Err(TrendError::Training(
                "cannot fit feature scaler on zero rows".to_string(),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(TrendError::Training(
                "feature matrix contains NaN or infinite values".to_string(),
            ));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| TrendError::Training("feature matrix has no rows".to_string()))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });

        Ok(Self { mean, scale })
    }

    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    pub fn scale(&self) -> ArrayView1<'_, f64> {
        self.scale.view()
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, TrendError> {
        self.check_width(x.ncols())?;
        Ok((&x - &self.mean) / &self.scale)
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, TrendError> {
        self.check_width(row.len())?;
        Ok((&row - &self.mean) / &self.scale)
    }

    fn check_width(&self, width: usize) -> Result<(), TrendError> {
        if width != self.n_features() {
            return Err(TrendError::Training(format!(
                "scaler was fit on {} features but received {}",
                self.n_features(),
                width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_zero_mean_unit_variance() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        let scaled = scaler.transform(x.view()).unwrap();

        for col in scaled.axis_iter(Axis(1)) {
            assert!(col.mean().unwrap().abs() < 1e-12);
            assert!((col.std(0.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[5.0, 1.0], [5.0, 2.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        let row = scaler.transform_row(array![5.0, 1.5].view()).unwrap();

        assert_eq!(row[0], 0.0);
        assert_eq!(row[1], 0.0);
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let train = array![[0.0], [2.0]];
        let scaler = StandardScaler::fit(train.view()).unwrap();
        let row = scaler.transform_row(array![4.0].view()).unwrap();

        // mean 1, population std 1
        assert!((row[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(empty.view()).is_err());

        let bad = array![[1.0, f64::NAN]];
        assert!(StandardScaler::fit(bad.view()).is_err());
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = StandardScaler::fit(array![[1.0, 2.0]].view()).unwrap();
        assert!(scaler.transform_row(array![1.0].view()).is_err());
    }
}

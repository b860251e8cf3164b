//! Feature engineering for sentiment series
//!
//! Turns an ordered series of scored records into one `FeatureRow` per record:
//! calendar features from the timestamp plus trailing-window statistics over
//! polarity. The same row builder serves historical rows during training and
//! synthetic rows during iterative forecasting.

use crate::errors::TrendError;
use crate::models::{FeatureRow, SentimentRecord};

/// Trailing window size for rolling statistics (current row + 4 prior)
pub const ROLLING_WINDOW: usize = 5;

/// Build one feature row per record.
///
/// Records must already be in timestamp order; equal timestamps are fine and
/// keep their insertion order.
pub fn build_feature_rows(records: &[SentimentRecord]) -> Result<Vec<FeatureRow>, TrendError> {
    validate_series(records)?;

    let polarities: Vec<f64> = records.iter().map(|r| r.polarity).collect();

    Ok(records
        .iter()
        .enumerate()
        .map(|(idx, record)| FeatureRow::from_window(record.timestamp, trailing_window(&polarities, idx)))
        .collect())
}

/// Feature row for a new point at `timestamp` given the series built so far.
///
/// The window ends at the latest row of `rows`, whose polarity becomes the
/// new row's current value. Returns `None` for an empty series.
pub fn next_feature_row(rows: &[FeatureRow], timestamp: chrono::NaiveDateTime) -> Option<FeatureRow> {
    if rows.is_empty() {
        return None;
    }

    let start = rows.len().saturating_sub(ROLLING_WINDOW);
    let window: Vec<f64> = rows[start..].iter().map(|r| r.polarity).collect();

    Some(FeatureRow::from_window(timestamp, &window))
}

/// Up to `ROLLING_WINDOW` values ending at (and including) `idx`
fn trailing_window(values: &[f64], idx: usize) -> &[f64] {
    let start = (idx + 1).saturating_sub(ROLLING_WINDOW);
    &values[start..=idx]
}

/// Reject series the forecaster cannot reason about: non-finite polarity
/// and timestamps that go backwards.
pub fn validate_series(records: &[SentimentRecord]) -> Result<(), TrendError> {
    if let Some((idx, record)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| !r.polarity.is_finite())
    {
        return Err(TrendError::InvalidInput(format!(
            "polarity at position {} is not a finite number ({})",
            idx, record.polarity
        )));
    }

    if let Some(idx) = records
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(TrendError::InvalidInput(format!(
            "records are not in timestamp order: position {} ({}) precedes position {} ({})",
            idx,
            records[idx].timestamp,
            idx + 1,
            records[idx + 1].timestamp
        )));
    }

    Ok(())
}

/// Stable chronological sort; records sharing a timestamp keep their
/// relative order.
pub fn sort_chronologically(records: &mut [SentimentRecord]) {
    records.sort_by_key(|r| r.timestamp);
}

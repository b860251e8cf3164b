use tracing::debug;

use crate::models::{ReputationSummary, SentimentDistribution, SentimentLabel, SentimentRecord};

const OLDEST_WEIGHT: f64 = 0.5;
const NEWEST_WEIGHT: f64 = 1.0;

/// Map a polarity in [-1, 1] onto the 0-100 reputation scale
pub fn polarity_to_score(polarity: f64) -> f64 {
    (polarity + 1.0) * 50.0
}

/// Recency-weighted reputation score, rounded to one decimal.
///
/// Each record's 0-100 score is scaled by a weight running linearly from 0.5
/// for the oldest record to 1.0 for the newest, and the scaled scores are
/// averaged. Weights are not renormalized, so a batch of perfect records
/// scores 75 and a single record scores half its own value.
/// Returns `None` for an empty batch.
pub fn calculate_reputation_score(records: &[SentimentRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }

    let weights = recency_weights(records.len());
    let weighted_total: f64 = records
        .iter()
        .zip(&weights)
        .map(|(record, w)| polarity_to_score(record.polarity) * w)
        .sum();

    Some(round_one_decimal(weighted_total / records.len() as f64))
}

pub fn sentiment_distribution(records: &[SentimentRecord]) -> SentimentDistribution {
    records
        .iter()
        .fold(SentimentDistribution::default(), |mut dist, record| {
            match record.label() {
                SentimentLabel::Positive => dist.positive += 1,
                SentimentLabel::Negative => dist.negative += 1,
                SentimentLabel::Neutral => dist.neutral += 1,
            }
            dist
        })
}

/// Dashboard summary for a batch of records; `None` when the batch is empty
pub fn summarize(records: &[SentimentRecord]) -> Option<ReputationSummary> {
    let reputation_score = calculate_reputation_score(records)?;
    let count = records.len() as f64;

    let average_polarity = records.iter().map(|r| r.polarity).sum::<f64>() / count;

    let subjectivities: Vec<f64> = records.iter().filter_map(|r| r.subjectivity).collect();
    let average_subjectivity = if subjectivities.is_empty() {
        None
    } else {
        Some(subjectivities.iter().sum::<f64>() / subjectivities.len() as f64)
    };

    let summary = ReputationSummary {
        reputation_score,
        record_count: records.len(),
        distribution: sentiment_distribution(records),
        average_polarity,
        average_subjectivity,
    };

    debug!(
        "[REPUTATION] {} records -> score {:.1} ({:?})",
        summary.record_count, summary.reputation_score, summary.distribution
    );

    Some(summary)
}

fn recency_weights(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![OLDEST_WEIGHT];
    }
    let step = (NEWEST_WEIGHT - OLDEST_WEIGHT) / (n - 1) as f64;
    (0..n).map(|i| OLDEST_WEIGHT + step * i as f64).collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn records(polarities: &[f64]) -> Vec<SentimentRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        polarities
            .iter()
            .enumerate()
            .map(|(i, &p)| SentimentRecord::new(start + Duration::hours(i as i64), p))
            .collect()
    }

    #[test]
    fn test_empty_batch_has_no_score() {
        assert_eq!(calculate_reputation_score(&[]), None);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_single_record_is_half_weighted() {
        assert_eq!(calculate_reputation_score(&records(&[0.5])), Some(37.5));
        assert_eq!(calculate_reputation_score(&records(&[-1.0])), Some(0.0));
    }

    #[test]
    fn test_weighted_scores_are_averaged_not_renormalized() {
        // scores 100 with weights 0.5, 0.75, 1.0: (50 + 75 + 100) / 3
        assert_eq!(calculate_reputation_score(&records(&[1.0, 1.0, 1.0])), Some(75.0));
    }

    #[test]
    fn test_newer_records_weigh_more() {
        // weights 0.5 and 1.0: (0 * 0.5 + 100 * 1.0) / 2
        assert_eq!(calculate_reputation_score(&records(&[-1.0, 1.0])), Some(50.0));
        assert_eq!(calculate_reputation_score(&records(&[1.0, -1.0])), Some(25.0));
    }

    #[test]
    fn test_weights_are_linearly_spaced() {
        let weights = recency_weights(3);
        assert_eq!(weights, vec![0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_distribution_prefers_explicit_label() {
        let mut batch = records(&[0.4, -0.2, 0.0, 0.1]);
        batch[3].sentiment = Some(SentimentLabel::Neutral);

        let dist = sentiment_distribution(&batch);
        assert_eq!(
            dist,
            SentimentDistribution {
                positive: 1,
                negative: 1,
                neutral: 2
            }
        );
    }

    #[test]
    fn test_summary_averages() {
        let mut batch = records(&[0.2, 0.4, -0.3]);
        batch[0].subjectivity = Some(0.2);
        batch[2].subjectivity = Some(0.6);

        let summary = summarize(&batch).unwrap();
        assert_eq!(summary.record_count, 3);
        assert!((summary.average_polarity - 0.1).abs() < 1e-12);
        assert!((summary.average_subjectivity.unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_summary_without_subjectivity() {
        let summary = summarize(&records(&[0.0, 0.0])).unwrap();
        assert_eq!(summary.average_subjectivity, None);
        // (50 * 0.5 + 50 * 1.0) / 2
        assert_eq!(summary.reputation_score, 37.5);
    }
}

//! Descriptive statistics of a group's lab values

use serde::Serialize;

/// Count, mean, spread and quartiles of one group
///
/// Every statistic except `count` is absent for an empty group; `std_dev`
/// is also absent for a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl SummaryStatistics {
    /// Computes statistics from unsorted values
    #[must_use]
    pub fn new(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Computes statistics from values sorted in ascending order
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let count = sorted_values.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                std_dev: None,
                min: None,
                q25: None,
                median: None,
                q75: None,
                max: None,
            };
        }

        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let std_dev = (count > 1).then(|| {
            let ss = sorted_values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (n - 1.0)).sqrt()
        });

        Self {
            count,
            mean: Some(mean),
            std_dev,
            min: sorted_values.first().copied(),
            q25: Some(quantile(sorted_values, 0.25)),
            median: Some(quantile(sorted_values, 0.5)),
            q75: Some(quantile(sorted_values, 0.75)),
            max: sorted_values.last().copied(),
        }
    }
}

/// Quantile of non-empty sorted data with linear interpolation between ranks
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn quantile(sorted_values: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted_values.is_empty());
    let position = q.clamp(0.0, 1.0) * (sorted_values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted_values[lower] + (sorted_values[upper] - sorted_values[lower]) * fraction
}

//! Comparison of lab values between cohort and non-cohort patients
//!
//! Statistics, tests and plot data are computed on the numeric lab values of
//! the two label groups of a [`LabeledObservations`] table.

pub mod descriptive;
pub mod distribution;
pub mod hypothesis;
pub mod medication;
pub mod numeric;

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::error::Result;
use crate::labeling::LabeledObservations;

pub use descriptive::SummaryStatistics;
pub use distribution::{DensityCurve, Histogram};
pub use hypothesis::{TestResult, ks_2samp, mann_whitney_u};
pub use medication::{MedicationSummary, summarize_medications};
pub use numeric::parse_value;

/// Values and statistics of one label group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// `HAS_DIAGNOSIS` value of the group
    pub label: u8,
    pub statistics: SummaryStatistics,
    /// Numeric values in table order
    #[serde(skip)]
    pub values: Vec<f64>,
}

impl GroupSummary {
    fn new(label: u8, values: Vec<f64>) -> Self {
        Self {
            label,
            statistics: SummaryStatistics::new(&values),
            values,
        }
    }

    /// Display name of the group
    #[must_use]
    pub const fn name(&self) -> &'static str {
        if self.label == 1 {
            "with diagnosis"
        } else {
            "without diagnosis"
        }
    }
}

/// Both groups and the two-sample tests between them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub lab_code: String,
    pub without_diagnosis: GroupSummary,
    pub with_diagnosis: GroupSummary,
    /// Absent when either group is empty
    pub mann_whitney: Option<TestResult>,
    /// Absent when either group is empty
    pub kolmogorov_smirnov: Option<TestResult>,
    /// Earliest and latest observation date of the labeled rows
    pub observation_period: Option<(NaiveDate, NaiveDate)>,
}

impl GroupComparison {
    /// The groups ordered by label
    #[must_use]
    pub fn groups(&self) -> [&GroupSummary; 2] {
        [&self.without_diagnosis, &self.with_diagnosis]
    }
}

/// Summarise and compare the two label groups
///
/// Every `VALUE` is converted to a number first; the first bad value fails the
/// whole comparison. An empty group is summarised with count 0 and the
/// tests are skipped.
pub fn compare_groups(labeled: &LabeledObservations) -> Result<GroupComparison> {
    let records = labeled.records()?;

    let mut without = Vec::new();
    let mut with = Vec::new();
    for (row, record) in records.iter().enumerate() {
        let value = parse_value(row, record.observation.value.as_deref())?;
        if record.has_diagnosis {
            with.push(value);
        } else {
            without.push(value);
        }
    }

    let observation_period = records
        .iter()
        .filter_map(|r| r.observation.observation_date())
        .minmax()
        .into_option();

    let (mann_whitney, kolmogorov_smirnov) = if without.is_empty() || with.is_empty() {
        log::warn!(
            "Skipping group tests: {} values without and {} values with diagnosis",
            without.len(),
            with.len()
        );
        (None, None)
    } else {
        (
            Some(mann_whitney_u(&without, &with)?),
            Some(ks_2samp(&without, &with)?),
        )
    };

    Ok(GroupComparison {
        lab_code: labeled.lab_code().to_string(),
        without_diagnosis: GroupSummary::new(0, without),
        with_diagnosis: GroupSummary::new(1, with),
        mann_whitney,
        kolmogorov_smirnov,
        observation_period,
    })
}

/// Plot data of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDistribution {
    pub label: u8,
    pub group: &'static str,
    pub density: Option<DensityCurve>,
    pub histogram: Option<Histogram>,
}

/// Density curve and histogram of each group
#[must_use]
pub fn group_distributions(
    comparison: &GroupComparison,
    kde_points: usize,
    histogram_bins: usize,
) -> Vec<GroupDistribution> {
    comparison
        .groups()
        .into_iter()
        .map(|group| GroupDistribution {
            label: group.label,
            group: group.name(),
            density: DensityCurve::gaussian_kde(&group.values, kde_points),
            histogram: Histogram::density(&group.values, histogram_bins),
        })
        .collect()
}

//! The analysis run: load, select, label, compare, report

use crate::analysis::{compare_groups, group_distributions, summarize_medications};
use crate::cohort::{profile_cohort, select_cohort};
use crate::config::CohortConfig;
use crate::error::Result;
use crate::labeling::label_observations;
use crate::loader::{Dataset, DatasetLoader};
use crate::report::{AnalysisReport, CohortReport};

/// Analyse an already loaded extract
///
/// Steps run once, in order, over the in-memory tables; none of them
/// modifies `dataset`.
pub fn analyze(dataset: &Dataset, config: &CohortConfig) -> Result<AnalysisReport> {
    let cohort = select_cohort(&dataset.conditions, &config.diagnosis_code)?;
    let profile = profile_cohort(&dataset.patients, cohort.patients())?;

    let labeled = label_observations(&dataset.observations, &config.lab_code, cohort.patients())?;
    let comparison = compare_groups(&labeled)?;
    let distributions =
        group_distributions(&comparison, config.kde_points, config.histogram_bins);

    let medications = summarize_medications(
        &dataset.medications,
        &config.diagnosis_code,
        config.top_medications,
    )?;

    Ok(AnalysisReport {
        table_rows: dataset
            .row_counts()
            .into_iter()
            .map(|(entity, rows)| (entity.name().to_string(), rows))
            .collect(),
        cohort: CohortReport {
            diagnosis_code: cohort.code().to_string(),
            patients: cohort.patients().len(),
            matching_records: cohort.matching_records(),
            diagnosis_period: cohort.diagnosis_period()?,
            profile,
        },
        labeled_observations: labeled.num_rows(),
        comparison,
        medications,
        distributions,
    })
}

/// Load the configured extract and analyse it
pub async fn run(config: &CohortConfig) -> Result<AnalysisReport> {
    let loader = DatasetLoader::new(config.clone())?;
    let dataset = loader.load().await?;
    analyze(&dataset, config)
}

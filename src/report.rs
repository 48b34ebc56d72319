//! Analysis report: console rendering and output files

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::{GroupComparison, GroupDistribution, MedicationSummary, TestResult};
use crate::cohort::CohortProfile;
use crate::error::Result;

/// File name of the JSON report
pub const REPORT_FILE: &str = "report.json";
/// File name of the density plot data
pub const DENSITY_PLOT_FILE: &str = "density_plot.json";
/// File name of the histogram plot data
pub const HISTOGRAM_PLOT_FILE: &str = "histogram_plot.json";

/// Cohort selection results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortReport {
    pub diagnosis_code: String,
    pub patients: usize,
    pub matching_records: usize,
    pub diagnosis_period: Option<(NaiveDate, NaiveDate)>,
    pub profile: CohortProfile,
}

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Rows per entity table, in load order
    pub table_rows: Vec<(String, usize)>,
    pub cohort: CohortReport,
    pub labeled_observations: usize,
    pub comparison: GroupComparison,
    pub medications: MedicationSummary,
    #[serde(skip)]
    pub distributions: Vec<GroupDistribution>,
}

impl AnalysisReport {
    /// Render the grouped summary table and the test results
    #[must_use]
    pub fn render_summary(&self) -> String {
        self.to_string()
    }

    /// Print the summary to stdout
    pub fn print_summary(&self) {
        print!("{}", self.render_summary());
    }

    /// Write the JSON report and plot data files into `dir`
    pub fn write_outputs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let density = self
            .distributions
            .iter()
            .map(|d| PlotSeries {
                label: d.label,
                group: d.group,
                data: &d.density,
            })
            .collect::<Vec<_>>();
        let histogram = self
            .distributions
            .iter()
            .map(|d| PlotSeries {
                label: d.label,
                group: d.group,
                data: &d.histogram,
            })
            .collect::<Vec<_>>();

        let written = vec![
            write_json(&dir.join(REPORT_FILE), self)?,
            write_json(&dir.join(DENSITY_PLOT_FILE), &density)?,
            write_json(&dir.join(HISTOGRAM_PLOT_FILE), &histogram)?,
        ];
        for path in &written {
            log::info!("Wrote {}", path.display());
        }
        Ok(written)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let comparison = &self.comparison;

        writeln!(
            f,
            "Cohort {}: {} patients ({} condition records)",
            self.cohort.diagnosis_code, self.cohort.patients, self.cohort.matching_records
        )?;
        if let Some(prevalence) = self.cohort.profile.prevalence {
            writeln!(
                f,
                "Prevalence: {:.2}% of {} patients",
                prevalence * 100.0,
                self.cohort.profile.total_patients
            )?;
        }
        writeln!(
            f,
            "\nLab {}: {} observations",
            comparison.lab_code, self.labeled_observations
        )?;
        writeln!(
            f,
            "{:<20}{:>8}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}",
            "group", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for group in comparison.groups() {
            let s = &group.statistics;
            writeln!(
                f,
                "{:<20}{:>8}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}",
                group.name(),
                s.count,
                fmt_stat(s.mean),
                fmt_stat(s.std_dev),
                fmt_stat(s.min),
                fmt_stat(s.q25),
                fmt_stat(s.median),
                fmt_stat(s.q75),
                fmt_stat(s.max),
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{}", fmt_test("Mann-Whitney U", comparison.mann_whitney))?;
        writeln!(
            f,
            "{}",
            fmt_test("Kolmogorov-Smirnov", comparison.kolmogorov_smirnov)
        )?;

        let meds = &self.medications;
        writeln!(
            f,
            "\nMedications for {}: {} prescriptions to {} patients",
            meds.reason_code, meds.prescriptions, meds.patients
        )?;
        for (description, count) in &meds.top_medications {
            writeln!(f, "{count:>8}  {description}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PlotSeries<'a, T> {
    label: u8,
    group: &'a str,
    data: &'a T,
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(path.to_path_buf())
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.3}"))
}

fn fmt_test(name: &str, result: Option<TestResult>) -> String {
    match result {
        Some(r) => format!("{name}: statistic={:.4}, p-value={:.4e}", r.statistic, r.p_value),
        None => format!("{name}: not computed (a group is empty)"),
    }
}

//! Configuration for loading and analysing an EHR extract.

use std::path::PathBuf;

use crate::codes::{HBA1C_LOINC, TYPE_2_DIABETES_SNOMED};
use crate::error::{CohortError, Result};

/// Default number of grid points for the kernel density curve
pub const DEFAULT_KDE_POINTS: usize = 200;

/// Default number of histogram bins
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Default number of medications listed in the summary
pub const DEFAULT_TOP_MEDICATIONS: usize = 10;

/// Where the partition files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A local directory laid out as `{root}/{partition}/{entity}.parquet`
    Local(PathBuf),
    /// A remote URL prefix laid out as `{base_url}/{partition}/{entity}.parquet`
    Remote {
        base_url: String,
        /// Directory downloaded partitions are stored in and reused from
        cache_dir: PathBuf,
    },
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Local(PathBuf::from("data"))
    }
}

/// Configuration for a cohort analysis run
#[derive(Debug, Clone)]
pub struct CohortConfig {
    /// Source of the partition files
    pub source: DataSource,
    /// Partition names; empty means discover them (local sources only)
    pub partitions: Vec<String>,
    /// Diagnosis code selecting the cohort
    pub diagnosis_code: String,
    /// Lab code selecting the observations
    pub lab_code: String,
    /// Record batch size used when decoding Parquet
    pub batch_size: Option<usize>,
    /// Directory the report and plot data are written to
    pub output_dir: Option<PathBuf>,
    /// Grid points of the kernel density curve
    pub kde_points: usize,
    /// Bins of the density histogram
    pub histogram_bins: usize,
    /// Medications listed in the medication summary
    pub top_medications: usize,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            source: DataSource::default(),
            partitions: Vec::new(),
            diagnosis_code: TYPE_2_DIABETES_SNOMED.to_string(),
            lab_code: HBA1C_LOINC.to_string(),
            batch_size: crate::utils::get_batch_size(),
            output_dir: None,
            kde_points: DEFAULT_KDE_POINTS,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            top_medications: DEFAULT_TOP_MEDICATIONS,
        }
    }
}

impl CohortConfig {
    /// Create a configuration reading from a local directory
    #[must_use]
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            source: DataSource::Local(root.into()),
            ..Self::default()
        }
    }

    /// Create a configuration downloading from a URL prefix
    #[must_use]
    pub fn remote(base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: DataSource::Remote {
                base_url: base_url.into(),
                cache_dir: cache_dir.into(),
            },
            ..Self::default()
        }
    }

    /// Set the partitions to load
    #[must_use]
    pub fn with_partitions<I, S>(mut self, partitions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partitions = partitions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the diagnosis code selecting the cohort
    #[must_use]
    pub fn with_diagnosis_code(mut self, code: impl Into<String>) -> Self {
        self.diagnosis_code = code.into();
        self
    }

    /// Set the lab code selecting the observations
    #[must_use]
    pub fn with_lab_code(mut self, code: impl Into<String>) -> Self {
        self.lab_code = code.into();
        self
    }

    /// Set the Parquet batch size
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if matches!(self.source, DataSource::Remote { .. }) && self.partitions.is_empty() {
            return Err(CohortError::ConfigError(
                "a remote source needs at least one partition".to_string(),
            ));
        }
        if self.partitions.iter().any(|p| p.trim().is_empty()) {
            return Err(CohortError::ConfigError(
                "partition names must not be empty".to_string(),
            ));
        }
        if self.kde_points < 2 {
            return Err(CohortError::ConfigError(
                "the density curve needs at least two grid points".to_string(),
            ));
        }
        if self.histogram_bins == 0 {
            return Err(CohortError::ConfigError(
                "the histogram needs at least one bin".to_string(),
            ));
        }
        Ok(())
    }
}

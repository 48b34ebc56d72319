//! Command line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use ehr_cohort::codes::{HBA1C_LOINC, TYPE_2_DIABETES_SNOMED};
use ehr_cohort::config::{
    DEFAULT_HISTOGRAM_BINS, DEFAULT_KDE_POINTS, DEFAULT_TOP_MEDICATIONS,
};
use ehr_cohort::{CohortConfig, DataSource};

#[derive(Debug, Parser)]
#[command(version, about = "Compare lab values between patients with and without a diagnosis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the extract, label observations and compare the groups
    Analyze(AnalyzeArgs),
    /// Download every partition file into the cache directory
    Fetch(FetchArgs),
}

/// Where the partition files come from
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Local directory holding `{partition}/{entity}.parquet`
    #[arg(long, env = "EHR_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// URL prefix to download `{partition}/{entity}.parquet` from
    #[arg(long, env = "EHR_BASE_URL")]
    pub base_url: Option<String>,

    /// Directory downloaded partitions are kept in
    #[arg(long, env = "EHR_CACHE_DIR", default_value = "data/cache")]
    pub cache_dir: PathBuf,

    /// Partition to load; repeat for several. Local directories are scanned when omitted
    #[arg(long = "partition", env = "EHR_PARTITIONS", value_delimiter = ',')]
    pub partitions: Vec<String>,

    /// Record batch size for Parquet decoding
    #[arg(long, env = "PARQUET_BATCH_SIZE")]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// SNOMED CT code selecting the cohort
    #[arg(long, env = "EHR_DIAGNOSIS_CODE", default_value = TYPE_2_DIABETES_SNOMED)]
    pub diagnosis_code: String,

    /// LOINC code selecting the observations
    #[arg(long, env = "EHR_LAB_CODE", default_value = HBA1C_LOINC)]
    pub lab_code: String,

    /// Directory for the JSON report and plot data
    #[arg(long, env = "EHR_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, env = "EHR_KDE_POINTS", default_value_t = DEFAULT_KDE_POINTS)]
    pub kde_points: usize,

    #[arg(long, env = "EHR_HISTOGRAM_BINS", default_value_t = DEFAULT_HISTOGRAM_BINS)]
    pub histogram_bins: usize,

    #[arg(long, env = "EHR_TOP_MEDICATIONS", default_value_t = DEFAULT_TOP_MEDICATIONS)]
    pub top_medications: usize,
}

/// A remote source to download
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// URL prefix to download `{partition}/{entity}.parquet` from
    #[arg(long, env = "EHR_BASE_URL")]
    pub base_url: String,

    /// Directory downloaded partitions are kept in
    #[arg(long, env = "EHR_CACHE_DIR", default_value = "data/cache")]
    pub cache_dir: PathBuf,

    /// Partition to download; repeat for several
    #[arg(
        long = "partition",
        env = "EHR_PARTITIONS",
        value_delimiter = ',',
        required = true
    )]
    pub partitions: Vec<String>,
}

impl SourceArgs {
    /// Configuration with this source and defaults elsewhere
    pub fn to_config(&self) -> CohortConfig {
        let source = match &self.base_url {
            Some(base_url) => DataSource::Remote {
                base_url: base_url.clone(),
                cache_dir: self.cache_dir.clone(),
            },
            None => DataSource::Local(self.data_dir.clone()),
        };
        let mut config = CohortConfig {
            source,
            ..CohortConfig::default()
        }
        .with_partitions(self.partitions.iter().cloned());
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        config
    }
}

impl FetchArgs {
    pub fn to_config(&self) -> CohortConfig {
        CohortConfig::remote(&self.base_url, &self.cache_dir)
            .with_partitions(self.partitions.iter().cloned())
    }
}

impl AnalyzeArgs {
    pub fn to_config(&self) -> CohortConfig {
        let mut config = self
            .source
            .to_config()
            .with_diagnosis_code(&self.diagnosis_code)
            .with_lab_code(&self.lab_code);
        config.output_dir.clone_from(&self.output_dir);
        config.kde_points = self.kde_points;
        config.histogram_bins = self.histogram_bins;
        config.top_medications = self.top_medications;
        config
    }
}

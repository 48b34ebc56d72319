//! Cohort labeling and lab-value group comparison over partitioned Parquet
//! EHR extracts.
//!
//! Patients are selected by a SNOMED CT diagnosis code, observations by a
//! LOINC lab code; each observation is labeled with cohort membership and the
//! two groups are summarised and compared with Mann-Whitney U and
//! Kolmogorov-Smirnov tests.

pub mod analysis;
pub mod codes;
pub mod cohort;
pub mod config;
pub mod error;
pub mod filter;
pub mod labeling;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;

// Core types
pub use config::{CohortConfig, DataSource};
pub use error::{CohortError, Result};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Pipeline steps
pub use analysis::{GroupComparison, compare_groups};
pub use cohort::{Cohort, CohortSet, select_cohort};
pub use labeling::{LabeledObservations, label_observations};
pub use loader::{Dataset, DatasetLoader};
pub use pipeline::{analyze, run};
pub use report::AnalysisReport;

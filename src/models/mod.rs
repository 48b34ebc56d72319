//! Entity tables and typed records of the EHR extract
//!
//! Tables are kept as Arrow record batches for filtering; the typed records
//! here are read from those batches where row-wise access is needed.

pub mod condition;
pub mod entity;
pub mod medication;
pub mod observation;
pub mod patient;

use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::utils::columns::project_as_strings;

pub use condition::ConditionRecord;
pub use entity::Entity;
pub use medication::MedicationRecord;
pub use observation::ObservationRecord;
pub use patient::PatientRecord;

/// A row type that can be read from an extract table
pub trait ExtractRecord: DeserializeOwned {
    /// Columns the record reads; each is rendered as `Utf8` before decoding
    const COLUMNS: &'static [&'static str];

    /// Read every row of `batch` as a record
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        if batch.num_rows() == 0 {
            return Ok(Vec::new());
        }
        let projected = project_as_strings(batch, Self::COLUMNS)?;
        Ok(serde_arrow::from_record_batch::<Vec<Self>>(&projected)?)
    }
}

/// Parse the date part of an extract date or timestamp (`2019-03-04`,
/// `2019-03-04T10:20:00Z`)
pub(crate) fn parse_date(value: &str) -> Option<chrono::NaiveDate> {
    let date = value.get(..10)?;
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

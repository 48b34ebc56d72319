//! Core filtering functionality for extract tables
//!
//! Defines the [`BatchFilter`] trait and the shared mask application used by
//! the code and patient filters.

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::record_batch::RecordBatch;

use crate::error::{CohortError, Result};

/// Filter a record batch based on a boolean mask
///
/// Rows where the mask is false or null are dropped. The schema is preserved.
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(CohortError::SchemaError(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<std::result::Result<_, _>>()?;

    let options = arrow::record_batch::RecordBatchOptions::new()
        .with_row_count(Some(mask.true_count()));
    Ok(RecordBatch::try_new_with_options(
        batch.schema(),
        filtered_columns,
        &options,
    )?)
}

/// Trait for objects that can filter record batches
pub trait BatchFilter: std::fmt::Debug {
    /// Compute the keep-mask for a batch
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray>;

    /// Filter a record batch, returning a new batch holding the kept rows
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.mask(batch)?;
        filter_record_batch(batch, &mask)
    }
}

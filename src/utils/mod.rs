//! Utility functions for working with Parquet files

pub mod columns;
pub mod logging;

use std::fs::File;
use std::path::Path;

use arrow::compute::concat_batches;
use arrow::datatypes::Schema;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use itertools::Itertools;
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};

use crate::error::{CohortError, Result};
pub use logging::{log_operation_complete, log_operation_start, log_warning};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&size| size > 0)
}

/// Validates that a directory exists and is a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(CohortError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    Ok(())
}

/// Helper for creating a projection mask from the wanted schema
///
/// Fields missing from the file are skipped with a warning. When nothing
/// matches, no projection is applied and every column is read.
///
/// # Returns
/// The projection mask, if at least one wanted field exists in the file
#[must_use]
pub fn create_projection(
    schema: &Schema,
    file_schema: &Schema,
    parquet_schema: &parquet::schema::types::SchemaDescriptor,
) -> Option<ProjectionMask> {
    let projection = schema
        .fields()
        .iter()
        .filter_map(|f| {
            let field_name = f.name();
            if let Ok(idx) = file_schema.index_of(field_name) {
                Some(idx)
            } else {
                log_warning(
                    &format!("Field {field_name} not found in parquet file, skipping"),
                    None,
                );
                None
            }
        })
        .collect_vec();

    if projection.is_empty() {
        log_warning(
            "No matching fields found in schema projection, reading all columns",
            None,
        );
        None
    } else {
        Some(ProjectionMask::roots(parquet_schema, projection))
    }
}

/// Read a parquet file into one Arrow record batch
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `schema` - Optional Arrow Schema for projecting specific columns
/// * `batch_size` - Optional decode batch size (defaults to [`DEFAULT_BATCH_SIZE`])
pub fn read_parquet(
    path: &Path,
    schema: Option<&Schema>,
    batch_size: Option<usize>,
) -> Result<RecordBatch> {
    let start = std::time::Instant::now();
    log_operation_start("Reading parquet file", path.display());

    let file = File::open(path).map_err(|e| {
        CohortError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to open file {}: {}", path.display(), e),
        ))
    })?;

    let mut builder = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size.unwrap_or(DEFAULT_BATCH_SIZE));

    if let Some(schema) = schema {
        let projection =
            create_projection(schema, builder.schema().as_ref(), builder.parquet_schema());
        if let Some(mask) = projection {
            builder = builder.with_projection(mask);
        }
    }

    let reader = builder.build()?;
    let file_schema = reader.schema();
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let table = concat_batches(&file_schema, &batches)?;

    log_operation_complete("read", path.display(), table.num_rows(), Some(start.elapsed()));
    Ok(table)
}

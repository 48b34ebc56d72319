//! Column access helpers for Arrow record batches
//!
//! Extract tables store identifiers and codes with whatever type the writer
//! picked (`Utf8`, `LargeUtf8`, integers for numeric SNOMED codes, floats for
//! numeric codes with nulls). Readers in this crate work on the string
//! rendering of a column, so every lookup goes through [`string_column`].

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type};
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{CohortError, Result};

/// Get a column by name, failing with [`CohortError::MissingColumn`]
///
/// # Arguments
/// * `batch` - The record batch containing the column
/// * `table` - Table name used in the error message
/// * `column_name` - The name of the column to extract
pub fn get_column(batch: &RecordBatch, table: &str, column_name: &str) -> Result<ArrayRef> {
    let idx = batch
        .schema()
        .index_of(column_name)
        .map_err(|_| CohortError::missing_column(table, column_name))?;
    Ok(Arc::clone(batch.column(idx)))
}

/// Get a column rendered as a `Utf8` string array
///
/// Non-string columns are cast with Arrow's `cast` kernel, so an `Int64`
/// code `44054006` is seen as `"44054006"`. Nulls stay null.
pub fn string_column(batch: &RecordBatch, table: &str, column_name: &str) -> Result<StringArray> {
    let column = get_column(batch, table, column_name)?;
    to_string_array(&column, column_name)
}

/// Cast an arbitrary array to a `Utf8` string array
///
/// Integral floats render without a fractional part (`44054006.0` becomes
/// `"44054006"`), so codes stored as floats compare equal to their text form.
pub fn to_string_array(column: &ArrayRef, column_name: &str) -> Result<StringArray> {
    if let Some(rendered) = render_floats(column) {
        debug!("Rendering float column '{column_name}' as Utf8");
        return Ok(rendered);
    }

    let converted = if column.data_type() == &DataType::Utf8 {
        Arc::clone(column)
    } else {
        debug!(
            "Casting column '{column_name}' from {:?} to Utf8",
            column.data_type()
        );
        cast(column, &DataType::Utf8)?
    };

    converted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| {
            CohortError::SchemaError(format!("Column '{column_name}' is not a string array"))
        })
}

fn render_floats(column: &ArrayRef) -> Option<StringArray> {
    let values: Vec<Option<f64>> = match column.data_type() {
        DataType::Float64 => column.as_primitive::<Float64Type>().iter().collect(),
        DataType::Float32 => column
            .as_primitive::<Float32Type>()
            .iter()
            .map(|v| v.map(f64::from))
            .collect(),
        _ => return None,
    };
    Some(values.into_iter().map(|v| v.map(render_float)).collect())
}

/// Largest magnitude below which every integer is exactly representable
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn render_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Project a batch to the named columns, rendering each one as `Utf8`
///
/// Columns absent from the batch are skipped; the typed record readers treat
/// them as optional.
pub fn project_as_strings(batch: &RecordBatch, columns: &[&str]) -> Result<RecordBatch> {
    use arrow::datatypes::{Field, Schema};

    let schema = batch.schema();
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

    for &name in columns {
        let Ok(idx) = schema.index_of(name) else {
            continue;
        };
        let array = to_string_array(batch.column(idx), name)?;
        fields.push(Field::new(name, DataType::Utf8, true));
        arrays.push(Arc::new(array));
    }

    if arrays.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

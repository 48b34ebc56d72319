//! Conversion of text-typed lab values to numbers

use crate::error::{CohortError, Result};

/// Convert one recorded value; `row` locates it in error messages
///
/// Surrounding whitespace is ignored. Null, empty, non-numeric and
/// non-finite values fail the conversion.
pub fn parse_value(row: usize, value: Option<&str>) -> Result<f64> {
    let conversion_error = || CohortError::ValueConversion {
        row,
        value: value.unwrap_or("null").to_string(),
    };

    let parsed = value
        .map(str::trim)
        .ok_or_else(conversion_error)?
        .parse::<f64>()
        .map_err(|_| conversion_error())?;

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(conversion_error())
    }
}

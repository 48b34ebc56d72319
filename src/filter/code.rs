//! Exact-match filtering on coded vocabulary columns

use arrow::array::BooleanArray;
use arrow::record_batch::RecordBatch;

use crate::codes::CODE;
use crate::error::Result;
use crate::filter::core::BatchFilter;
use crate::utils::columns::string_column;

/// Keeps rows whose code column equals one code exactly
///
/// No trimming, case folding or prefix matching is applied: `"4548-4"` does
/// not match `"4548-4 "` or `"4548"`. Null codes never match.
#[derive(Debug, Clone)]
pub struct CodeFilter {
    table: String,
    column: String,
    code: String,
}

impl CodeFilter {
    /// Filter on the `CODE` column of `table`
    #[must_use]
    pub fn new(table: impl Into<String>, code: impl Into<String>) -> Self {
        Self::on_column(table, CODE, code)
    }

    /// Filter on an arbitrary column, e.g. `REASONCODE`
    #[must_use]
    pub fn on_column(
        table: impl Into<String>,
        column: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            code: code.into(),
        }
    }

    /// The code rows must equal
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl BatchFilter for CodeFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let codes = string_column(batch, &self.table, &self.column)?;
        let code = self.code.as_str();
        Ok(codes.iter().map(|value| Some(value == Some(code))).collect())
    }
}

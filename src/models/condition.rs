//! Condition (diagnosis) records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::codes::{CODE, DESCRIPTION, PATIENT, START};
use crate::models::{ExtractRecord, parse_date};

/// A diagnosis of one patient; a patient may carry the same code repeatedly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    #[serde(rename = "PATIENT", default)]
    pub patient: Option<String>,
    /// SNOMED CT code
    #[serde(rename = "CODE")]
    pub code: String,
    /// Diagnosis date
    #[serde(rename = "START", default)]
    pub start: Option<String>,
    #[serde(rename = "DESCRIPTION", default)]
    pub description: Option<String>,
}

impl ConditionRecord {
    /// Parsed diagnosis date
    #[must_use]
    pub fn diagnosis_date(&self) -> Option<NaiveDate> {
        self.start.as_deref().and_then(parse_date)
    }
}

impl ExtractRecord for ConditionRecord {
    const COLUMNS: &'static [&'static str] = &[PATIENT, CODE, START, DESCRIPTION];
}

//! Observation (lab and vital) records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::codes::{CODE, DATE, DESCRIPTION, PATIENT, UNITS, VALUE};
use crate::models::{ExtractRecord, parse_date};

/// A recorded lab or vital value; `value` is text and converted on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Absent for unattributed rows, which are never cohort members
    #[serde(rename = "PATIENT", default)]
    pub patient: Option<String>,
    /// LOINC code
    #[serde(rename = "CODE")]
    pub code: String,
    #[serde(rename = "VALUE", default)]
    pub value: Option<String>,
    #[serde(rename = "UNITS", default)]
    pub units: Option<String>,
    #[serde(rename = "DATE", default)]
    pub date: Option<String>,
    #[serde(rename = "DESCRIPTION", default)]
    pub description: Option<String>,
}

impl ObservationRecord {
    /// Parsed observation date
    #[must_use]
    pub fn observation_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }
}

impl ExtractRecord for ObservationRecord {
    const COLUMNS: &'static [&'static str] = &[PATIENT, CODE, VALUE, UNITS, DATE, DESCRIPTION];
}

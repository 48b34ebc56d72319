//! Medication records

use serde::{Deserialize, Serialize};

use crate::codes::{CODE, DESCRIPTION, PATIENT, REASONCODE, REASONDESCRIPTION, START};
use crate::models::ExtractRecord;

/// A prescription, optionally linked to the condition it treats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRecord {
    #[serde(rename = "PATIENT", default)]
    pub patient: Option<String>,
    /// RxNorm code
    #[serde(rename = "CODE", default)]
    pub code: Option<String>,
    #[serde(rename = "DESCRIPTION", default)]
    pub description: Option<String>,
    #[serde(rename = "START", default)]
    pub start: Option<String>,
    /// SNOMED CT code of the treated condition
    #[serde(rename = "REASONCODE", default)]
    pub reason_code: Option<String>,
    #[serde(rename = "REASONDESCRIPTION", default)]
    pub reason_description: Option<String>,
}

impl ExtractRecord for MedicationRecord {
    const COLUMNS: &'static [&'static str] =
        &[PATIENT, CODE, DESCRIPTION, START, REASONCODE, REASONDESCRIPTION];
}

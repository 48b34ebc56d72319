//! Patient records

use serde::{Deserialize, Serialize};

use crate::codes::{BIRTHDATE, GENDER, PATIENT_ID};
use crate::models::ExtractRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "BIRTHDATE", default)]
    pub birthdate: Option<String>,
    #[serde(rename = "GENDER", default)]
    pub gender: Option<String>,
}

impl ExtractRecord for PatientRecord {
    const COLUMNS: &'static [&'static str] = &[PATIENT_ID, BIRTHDATE, GENDER];
}

//! Coded identifiers and column names of the EHR extract.

/// SNOMED CT: Diabetes mellitus type 2
pub const TYPE_2_DIABETES_SNOMED: &str = "44054006";

/// LOINC: Hemoglobin A1c/Hemoglobin.total in Blood
pub const HBA1C_LOINC: &str = "4548-4";

/// Patient identifier column in event tables
pub const PATIENT: &str = "PATIENT";
/// Coded vocabulary column
pub const CODE: &str = "CODE";
/// Human readable code description
pub const DESCRIPTION: &str = "DESCRIPTION";
/// Recorded observation value (text typed)
pub const VALUE: &str = "VALUE";
/// Observation unit
pub const UNITS: &str = "UNITS";
/// Observation timestamp
pub const DATE: &str = "DATE";
/// Condition or medication start date
pub const START: &str = "START";
/// Code of the condition a medication was prescribed for
pub const REASONCODE: &str = "REASONCODE";
/// Description of the condition a medication was prescribed for
pub const REASONDESCRIPTION: &str = "REASONDESCRIPTION";
/// Patient identifier column in the patients table
pub const PATIENT_ID: &str = "Id";
/// Birth date column in the patients table
pub const BIRTHDATE: &str = "BIRTHDATE";
/// Gender column in the patients table
pub const GENDER: &str = "GENDER";

/// Binary cohort membership column appended by the labeler
pub const HAS_DIAGNOSIS: &str = "HAS_DIAGNOSIS";

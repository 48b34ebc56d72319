//! Medications prescribed for the cohort's diagnosis

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use serde::Serialize;

use crate::codes::REASONCODE;
use crate::error::Result;
use crate::filter::{BatchFilter, CodeFilter};
use crate::models::{Entity, ExtractRecord, MedicationRecord};

/// Prescriptions whose reason code is the diagnosis code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicationSummary {
    pub reason_code: String,
    pub prescriptions: usize,
    pub patients: usize,
    /// `(description, prescriptions)`, most prescribed first
    pub top_medications: Vec<(String, usize)>,
}

/// Summarise the medications prescribed for `reason_code`
///
/// `REASONCODE` is matched exactly, like every other code filter. Ties in
/// the ranking are broken by description.
pub fn summarize_medications(
    medications: &RecordBatch,
    reason_code: &str,
    top_n: usize,
) -> Result<MedicationSummary> {
    let filter = CodeFilter::on_column(Entity::Medications.name(), REASONCODE, reason_code);
    let prescribed = MedicationRecord::from_batch(&filter.filter(medications)?)?;

    let patients = prescribed
        .iter()
        .filter_map(|m| m.patient.as_deref())
        .unique()
        .count();
    let top_medications = prescribed
        .iter()
        .map(|m| m.description.as_deref().unwrap_or("unknown"))
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(top_n)
        .map(|(description, count)| (description.to_string(), count))
        .collect();

    Ok(MedicationSummary {
        reason_code: reason_code.to_string(),
        prescriptions: prescribed.len(),
        patients,
        top_medications,
    })
}

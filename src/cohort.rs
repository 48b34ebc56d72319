//! Cohort selection by diagnosis code

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::codes::PATIENT;
use crate::error::Result;
use crate::filter::{BatchFilter, CodeFilter};
use crate::models::{ConditionRecord, Entity, ExtractRecord, PatientRecord};
use crate::utils::columns::string_column;

/// Distinct patient identifiers; membership, not record count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortSet {
    patients: FxHashSet<String>,
}

impl CohortSet {
    /// An empty cohort
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `patient` is a member
    #[must_use]
    pub fn contains(&self, patient: &str) -> bool {
        self.patients.contains(patient)
    }

    /// Number of distinct members
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Add a member, returning whether it was new
    pub fn insert(&mut self, patient: impl Into<String>) -> bool {
        self.patients.insert(patient.into())
    }

    /// Members in ascending order
    #[must_use]
    pub fn sorted(&self) -> Vec<&str> {
        self.patients.iter().map(String::as_str).sorted().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for CohortSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            patients: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Patients selected by a diagnosis code
#[derive(Debug, Clone)]
pub struct Cohort {
    code: String,
    patients: CohortSet,
    matching_conditions: RecordBatch,
}

impl Cohort {
    /// The diagnosis code the cohort was selected by
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The distinct patients
    #[must_use]
    pub const fn patients(&self) -> &CohortSet {
        &self.patients
    }

    /// Condition rows carrying the code; at least [`CohortSet::len`] of them
    #[must_use]
    pub fn matching_records(&self) -> usize {
        self.matching_conditions.num_rows()
    }

    /// The matching condition rows themselves
    #[must_use]
    pub const fn matching_conditions(&self) -> &RecordBatch {
        &self.matching_conditions
    }

    /// Earliest and latest diagnosis date among the matching rows
    pub fn diagnosis_period(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let dates = ConditionRecord::from_batch(&self.matching_conditions)?
            .iter()
            .filter_map(ConditionRecord::diagnosis_date)
            .minmax()
            .into_option();
        Ok(dates)
    }
}

/// Select the patients with a diagnosis code
///
/// A row matches when its `CODE` equals `code` exactly. Repeated diagnoses of
/// one patient collapse to a single member. No matching rows yields an empty
/// cohort, not an error.
pub fn select_cohort(conditions: &RecordBatch, code: &str) -> Result<Cohort> {
    let table = Entity::Conditions.name();
    let matching_conditions = CodeFilter::new(table, code).filter(conditions)?;
    let patient_ids = string_column(&matching_conditions, table, PATIENT)?;

    let patients = (0..patient_ids.len())
        .filter(|&i| !patient_ids.is_null(i))
        .map(|i| patient_ids.value(i))
        .collect::<CohortSet>();

    log::info!(
        "Selected {} patients from {} condition records with code {code}",
        patients.len(),
        matching_conditions.num_rows()
    );

    Ok(Cohort {
        code: code.to_string(),
        patients,
        matching_conditions,
    })
}

/// Size of the cohort relative to the patients table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortProfile {
    pub total_patients: usize,
    pub cohort_patients: usize,
    /// Cohort share of all patients; absent when the patients table is empty
    pub prevalence: Option<f64>,
    /// Cohort members by recorded gender, sorted by gender
    pub gender_counts: Vec<(String, usize)>,
}

/// Profile a cohort against the patients table
///
/// Cohort members absent from the patients table still count towards
/// `cohort_patients` and are reported under gender `"unknown"`.
#[allow(clippy::cast_precision_loss)]
pub fn profile_cohort(patients: &RecordBatch, cohort: &CohortSet) -> Result<CohortProfile> {
    let records = PatientRecord::from_batch(patients)?;
    let total_patients = records.iter().map(|p| p.id.as_str()).unique().count();

    let mut known = FxHashSet::default();
    let mut genders = records
        .iter()
        .filter(|p| cohort.contains(&p.id) && known.insert(p.id.as_str()))
        .map(|p| p.gender.clone().unwrap_or_else(|| "unknown".to_string()))
        .collect_vec();
    genders.extend(
        cohort
            .sorted()
            .into_iter()
            .filter(|id| !known.contains(id))
            .map(|_| "unknown".to_string()),
    );

    let gender_counts = genders
        .into_iter()
        .counts()
        .into_iter()
        .sorted()
        .collect_vec();

    let prevalence = (total_patients > 0).then(|| cohort.len() as f64 / total_patients as f64);

    Ok(CohortProfile {
        total_patients,
        cohort_patients: cohort.len(),
        prevalence,
        gender_counts,
    })
}

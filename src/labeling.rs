//! Observation filtering and cohort labeling
//!
//! The label only tests patient membership. Observation dates are not
//! aligned with diagnosis dates, so an HbA1c measured years before a
//! diagnosis is still labeled 1. This is a known approximation kept so the
//! group comparison stays comparable with earlier analyses of the extract.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, UInt8Array};
use arrow::compute::kernels::cmp::eq;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::codes::{HAS_DIAGNOSIS, PATIENT};
use crate::cohort::CohortSet;
use crate::error::{CohortError, Result};
use crate::filter::{BatchFilter, CodeFilter, filter_record_batch, membership_mask};
use crate::models::{Entity, ExtractRecord, ObservationRecord};
use crate::utils::columns::string_column;

/// An observation with its cohort label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledObservation {
    pub observation: ObservationRecord,
    pub has_diagnosis: bool,
}

/// Observations of one code with the appended `HAS_DIAGNOSIS` column
#[derive(Debug, Clone)]
pub struct LabeledObservations {
    lab_code: String,
    batch: RecordBatch,
}

impl LabeledObservations {
    /// The lab code the observations were filtered to
    #[must_use]
    pub fn lab_code(&self) -> &str {
        &self.lab_code
    }

    /// The labeled table
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// The label column; 1 for cohort members, 0 otherwise
    pub fn labels(&self) -> Result<&UInt8Array> {
        let idx = self
            .batch
            .schema()
            .index_of(HAS_DIAGNOSIS)
            .map_err(|_| CohortError::missing_column(Entity::Observations.name(), HAS_DIAGNOSIS))?;
        self.batch
            .column(idx)
            .as_any()
            .downcast_ref::<UInt8Array>()
            .ok_or_else(|| {
                CohortError::SchemaError(format!("Column {HAS_DIAGNOSIS} is not UInt8"))
            })
    }

    /// Rows carrying `label`
    pub fn group(&self, label: u8) -> Result<RecordBatch> {
        let mask = eq(self.labels()?, &UInt8Array::new_scalar(label))?;
        filter_record_batch(&self.batch, &mask)
    }

    /// Read the rows as typed records, in table order
    pub fn records(&self) -> Result<Vec<LabeledObservation>> {
        let observations = ObservationRecord::from_batch(&self.batch)?;
        let labels = self.labels()?;
        Ok(observations
            .into_iter()
            .zip(labels.values().iter())
            .map(|(observation, &label)| LabeledObservation {
                observation,
                has_diagnosis: label == 1,
            })
            .collect())
    }
}

/// Filter observations to one lab code and label cohort membership
///
/// The result holds exactly the rows whose `CODE` equals `lab_code`, in input
/// order, each carrying `HAS_DIAGNOSIS = 1` when its `PATIENT` is in `cohort`
/// and `0` otherwise. The input table is not modified.
pub fn label_observations(
    observations: &RecordBatch,
    lab_code: &str,
    cohort: &CohortSet,
) -> Result<LabeledObservations> {
    let table = Entity::Observations.name();
    if observations.schema().index_of(HAS_DIAGNOSIS).is_ok() {
        return Err(CohortError::SchemaError(format!(
            "Observations already carry a {HAS_DIAGNOSIS} column"
        )));
    }

    let filtered = CodeFilter::new(table, lab_code).filter(observations)?;
    let patients = string_column(&filtered, table, PATIENT)?;
    let membership = membership_mask(&patients, cohort);

    let labels: UInt8Array = membership
        .values()
        .iter()
        .map(|member| Some(u8::from(member)))
        .collect();

    let schema = filtered.schema();
    let mut fields = schema.fields().iter().cloned().collect::<Vec<_>>();
    fields.push(Arc::new(Field::new(HAS_DIAGNOSIS, DataType::UInt8, false)));
    let mut columns: Vec<ArrayRef> = filtered.columns().to_vec();
    columns.push(Arc::new(labels));

    let batch = RecordBatch::try_new(
        Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone())),
        columns,
    )?;

    log::info!(
        "Labeled {} observations with code {lab_code} ({} from cohort patients)",
        batch.num_rows(),
        membership.true_count()
    );

    Ok(LabeledObservations {
        lab_code: lab_code.to_string(),
        batch,
    })
}

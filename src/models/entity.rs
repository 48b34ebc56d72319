//! Entity types of the EHR extract and their column sets

use std::fmt;
use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::codes::{
    BIRTHDATE, CODE, DATE, DESCRIPTION, GENDER, PATIENT, PATIENT_ID, REASONCODE,
    REASONDESCRIPTION, START, UNITS, VALUE,
};

/// One table of the extract, stored as one Parquet file per partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Patients,
    Conditions,
    Observations,
    Medications,
}

impl Entity {
    /// All entity types in load order
    pub const ALL: [Self; 4] = [
        Self::Patients,
        Self::Conditions,
        Self::Observations,
        Self::Medications,
    ];

    /// Table name, also the Parquet file stem
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Conditions => "conditions",
            Self::Observations => "observations",
            Self::Medications => "medications",
        }
    }

    /// File name of the entity inside a partition
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.parquet", self.name())
    }

    /// Columns read from the partition files
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Patients => &[PATIENT_ID, BIRTHDATE, GENDER],
            Self::Conditions => &[START, PATIENT, CODE, DESCRIPTION],
            Self::Observations => &[DATE, PATIENT, CODE, DESCRIPTION, VALUE, UNITS],
            Self::Medications => &[
                START,
                PATIENT,
                CODE,
                DESCRIPTION,
                REASONCODE,
                REASONDESCRIPTION,
            ],
        }
    }

    /// Projection schema for reading; only the field names are significant
    #[must_use]
    pub fn projection_schema(self) -> SchemaRef {
        let fields = self
            .columns()
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>();
        Arc::new(Schema::new(fields))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

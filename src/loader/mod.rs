//! Loading the partitioned extract into one table per entity
//!
//! Partitions are retrieved one after another; the first failure aborts the
//! load. Each entity's partitions are concatenated into a single record batch.

pub mod source;

use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;

use crate::config::CohortConfig;
use crate::error::{CohortError, Result};
use crate::models::Entity;
use crate::utils::logging::{create_main_progress_bar, finish_and_clear};
use crate::utils::columns::to_string_array;
use crate::utils::read_parquet;

pub use source::PartitionSource;

/// The four entity tables of an extract
#[derive(Debug, Clone)]
pub struct Dataset {
    pub patients: RecordBatch,
    pub conditions: RecordBatch,
    pub observations: RecordBatch,
    pub medications: RecordBatch,
}

impl Dataset {
    /// The table of one entity
    #[must_use]
    pub const fn table(&self, entity: Entity) -> &RecordBatch {
        match entity {
            Entity::Patients => &self.patients,
            Entity::Conditions => &self.conditions,
            Entity::Observations => &self.observations,
            Entity::Medications => &self.medications,
        }
    }

    /// Row count of every table
    #[must_use]
    pub fn row_counts(&self) -> Vec<(Entity, usize)> {
        Entity::ALL
            .iter()
            .map(|&entity| (entity, self.table(entity).num_rows()))
            .collect()
    }
}

/// Loads entity tables from the configured source
#[derive(Debug)]
pub struct DatasetLoader {
    config: CohortConfig,
    source: PartitionSource,
}

impl DatasetLoader {
    /// Create a loader, validating the configuration
    pub fn new(config: CohortConfig) -> Result<Self> {
        config.validate()?;
        let source = PartitionSource::new(&config.source);
        Ok(Self { config, source })
    }

    /// Retrieve every partition file of `entity`, in partition order
    pub async fn fetch_entity(&self, entity: Entity) -> Result<Vec<PathBuf>> {
        let partitions = self.source.partitions(&self.config.partitions, entity)?;
        let pb = create_main_progress_bar(partitions.len() as u64, Some(entity.name()));

        let mut paths = Vec::with_capacity(partitions.len());
        for partition in &partitions {
            pb.set_message(format!(
                "{entity} {}",
                partition.as_deref().unwrap_or("(root)")
            ));
            paths.push(self.source.fetch(partition.as_deref(), entity).await?);
            pb.inc(1);
        }

        finish_and_clear(&pb);
        Ok(paths)
    }

    /// Retrieve the partition files of every entity
    pub async fn fetch_all(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entity in Entity::ALL {
            paths.extend(self.fetch_entity(entity).await?);
        }
        Ok(paths)
    }

    /// Load all partitions of `entity` into one table
    pub async fn load_entity(&self, entity: Entity) -> Result<RecordBatch> {
        let projection = entity.projection_schema();
        let tables = self
            .fetch_entity(entity)
            .await?
            .iter()
            .map(|path| read_parquet(path, Some(projection.as_ref()), self.config.batch_size))
            .collect::<Result<Vec<_>>>()?;

        let table = concat_partitions(entity, &tables)?;
        log::info!(
            "Loaded {} {entity} rows from {} partitions",
            table.num_rows(),
            tables.len()
        );
        Ok(table)
    }

    /// Load all four entity tables
    pub async fn load(&self) -> Result<Dataset> {
        Ok(Dataset {
            patients: self.load_entity(Entity::Patients).await?,
            conditions: self.load_entity(Entity::Conditions).await?,
            observations: self.load_entity(Entity::Observations).await?,
            medications: self.load_entity(Entity::Medications).await?,
        })
    }
}

/// Concatenate partition tables of one entity
///
/// Partitions must have the same column names in the same order. Every
/// column of the result is nullable. A column
/// whose type differs between partitions is cast to `Utf8` everywhere, so a
/// code column written as `Int64` in one partition and `Utf8` in another
/// still combines.
pub fn concat_partitions(entity: Entity, tables: &[RecordBatch]) -> Result<RecordBatch> {
    let Some(first) = tables.first() else {
        return Err(CohortError::SchemaError(format!(
            "No partitions to combine for {entity}"
        )));
    };
    let first_schema = first.schema();

    for (idx, table) in tables.iter().enumerate().skip(1) {
        let names = |schema: &SchemaRef| {
            schema
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect_vec()
        };
        if names(&table.schema()) != names(&first_schema) {
            return Err(CohortError::SchemaError(format!(
                "Partition {idx} of {entity} has columns {:?}, expected {:?}",
                names(&table.schema()),
                names(&first_schema)
            )));
        }
    }

    let target_fields = first_schema
        .fields()
        .iter()
        .enumerate()
        .map(|(col, field)| {
            let uniform = tables
                .iter()
                .all(|t| t.schema().field(col).data_type() == field.data_type());
            if uniform {
                field.as_ref().clone().with_nullable(true)
            } else {
                log::warn!(
                    "Column {} of {entity} has differing types across partitions, reading as Utf8",
                    field.name()
                );
                Field::new(field.name(), DataType::Utf8, true)
            }
        })
        .collect_vec();
    let target = Arc::new(Schema::new(target_fields));

    let aligned = tables
        .iter()
        .map(|table| align_to(table, &target))
        .collect::<Result<Vec<_>>>()?;

    Ok(concat_batches(&target, &aligned)?)
}

fn align_to(table: &RecordBatch, target: &SchemaRef) -> Result<RecordBatch> {
    let columns = table
        .columns()
        .iter()
        .zip(target.fields())
        .map(|(column, field)| {
            if column.data_type() == field.data_type() {
                Ok(Arc::clone(column))
            } else if field.data_type() == &DataType::Utf8 {
                Ok(Arc::new(to_string_array(column, field.name())?) as ArrayRef)
            } else {
                Ok(cast(column, field.data_type())?)
            }
        })
        .collect::<Result<Vec<ArrayRef>>>()?;
    Ok(RecordBatch::try_new(Arc::clone(target), columns)?)
}

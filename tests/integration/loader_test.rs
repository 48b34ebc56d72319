use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ehr_cohort::loader::concat_partitions;
use ehr_cohort::models::Entity;
use ehr_cohort::{CohortConfig, CohortError, DatasetLoader};

use crate::utils::{
    DIABETES, HBA1C, conditions, medications, observations, patients, strings, write_parquet,
    write_partition,
};

fn write_two_partitions(root: &std::path::Path) -> ehr_cohort::Result<()> {
    write_partition(
        root,
        "p1",
        &patients(&[("P1", "F"), ("P2", "M")]),
        &conditions(&[("P1", DIABETES, "2015-02-01")]),
        &observations(&[("P1", HBA1C, "7.5"), ("P2", HBA1C, "5.4")]),
        &medications(&[("P1", "metformin", Some(DIABETES))]),
    )?;
    write_partition(
        root,
        "p2",
        &patients(&[("P3", "F")]),
        &conditions(&[("P3", DIABETES, "2012-11-30")]),
        &observations(&[("P3", HBA1C, "8.1")]),
        &medications(&[("P3", "insulin", Some(DIABETES))]),
    )
}

#[tokio::test]
async fn test_partitions_are_concatenated_in_order() -> ehr_cohort::Result<()> {
    let dir = tempfile::tempdir()?;
    write_two_partitions(dir.path())?;

    let loader = DatasetLoader::new(CohortConfig::local(dir.path()).with_partitions(["p1", "p2"]))?;
    let dataset = loader.load().await?;

    assert_eq!(dataset.patients.num_rows(), 3);
    assert_eq!(dataset.observations.num_rows(), 3);
    assert_eq!(
        strings(&dataset.observations, "PATIENT"),
        vec![Some("P1".into()), Some("P2".into()), Some("P3".into())]
    );
    assert_eq!(
        dataset
            .row_counts()
            .into_iter()
            .map(|(entity, rows)| (entity.name(), rows))
            .collect::<Vec<_>>(),
        vec![
            ("patients", 3),
            ("conditions", 2),
            ("observations", 3),
            ("medications", 2)
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_partitions_are_discovered_when_not_configured() -> ehr_cohort::Result<()> {
    let dir = tempfile::tempdir()?;
    write_two_partitions(dir.path())?;
    std::fs::create_dir_all(dir.path().join("notes"))?;

    let loader = DatasetLoader::new(CohortConfig::local(dir.path()))?;
    let paths = loader.fetch_entity(Entity::Conditions).await?;

    assert_eq!(
        paths,
        vec![
            dir.path().join("p1").join("conditions.parquet"),
            dir.path().join("p2").join("conditions.parquet"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_root_level_files_are_a_partition() -> ehr_cohort::Result<()> {
    let dir = tempfile::tempdir()?;
    write_parquet(
        &dir.path().join("observations.parquet"),
        &observations(&[("P9", HBA1C, "6.0")]),
    )?;

    let loader = DatasetLoader::new(CohortConfig::local(dir.path()))?;
    let table = loader.load_entity(Entity::Observations).await?;
    assert_eq!(table.num_rows(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_partition_file_fails_load() -> ehr_cohort::Result<()> {
    let dir = tempfile::tempdir()?;
    write_two_partitions(dir.path())?;

    let loader =
        DatasetLoader::new(CohortConfig::local(dir.path()).with_partitions(["p1", "p3"]))?;
    let err = loader.load().await.unwrap_err();
    assert!(matches!(err, CohortError::IoError(_)));
    Ok(())
}

#[tokio::test]
async fn test_extra_columns_are_not_read() -> ehr_cohort::Result<()> {
    let dir = tempfile::tempdir()?;
    let table = crate::utils::string_table(&[
        ("PATIENT", vec![Some("P1")]),
        ("CODE", vec![Some(DIABETES)]),
        ("ENCOUNTER", vec![Some("E1")]),
    ]);
    write_parquet(&dir.path().join("p1").join("conditions.parquet"), &table)?;

    let loader = DatasetLoader::new(CohortConfig::local(dir.path()))?;
    let loaded = loader.load_entity(Entity::Conditions).await?;
    assert!(loaded.schema().index_of("ENCOUNTER").is_err());
    assert!(loaded.schema().index_of("CODE").is_ok());
    Ok(())
}

#[test]
fn test_differing_column_types_are_read_as_strings() -> ehr_cohort::Result<()> {
    let numeric = RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("PATIENT", DataType::Utf8, false),
            Field::new("CODE", DataType::Int64, false),
        ])),
        vec![
            Arc::new(StringArray::from(vec!["P1"])),
            Arc::new(Int64Array::from(vec![44_054_006])),
        ],
    )?;
    let text = crate::utils::string_table(&[
        ("PATIENT", vec![Some("P2")]),
        ("CODE", vec![Some(DIABETES)]),
    ]);

    let combined = concat_partitions(Entity::Conditions, &[numeric, text])?;

    assert_eq!(combined.schema().field(1).data_type(), &DataType::Utf8);
    assert_eq!(
        strings(&combined, "CODE"),
        vec![Some(DIABETES.to_string()), Some(DIABETES.to_string())]
    );
    Ok(())
}

#[test]
fn test_float_codes_combine_with_text_codes() -> ehr_cohort::Result<()> {
    let float = RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("PATIENT", DataType::Utf8, true),
            Field::new("REASONCODE", DataType::Float64, true),
        ])),
        vec![
            Arc::new(StringArray::from(vec!["P1", "P2"])),
            Arc::new(Float64Array::from(vec![Some(44_054_006.0), None])),
        ],
    )?;
    let text = crate::utils::string_table(&[
        ("PATIENT", vec![Some("P3")]),
        ("REASONCODE", vec![Some(DIABETES)]),
    ]);

    let combined = concat_partitions(Entity::Medications, &[float, text])?;

    assert_eq!(
        strings(&combined, "REASONCODE"),
        vec![Some(DIABETES.to_string()), None, Some(DIABETES.to_string())]
    );
    Ok(())
}

#[test]
fn test_mismatched_columns_are_rejected() {
    let a = crate::utils::string_table(&[("PATIENT", vec![Some("P1")])]);
    let b = crate::utils::string_table(&[("CODE", vec![Some(DIABETES)])]);
    assert!(matches!(
        concat_partitions(Entity::Conditions, &[a, b]),
        Err(CohortError::SchemaError(_))
    ));
}

#[test]
fn test_remote_source_without_partitions_is_rejected() {
    let config = CohortConfig::remote("https://example.org/ehr", "cache");
    assert!(matches!(
        DatasetLoader::new(config),
        Err(CohortError::ConfigError(_))
    ));
}

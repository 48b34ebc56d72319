use arrow::array::Array;
use ehr_cohort::codes::HAS_DIAGNOSIS;
use ehr_cohort::{CohortError, CohortSet, label_observations};

use crate::utils::{GLUCOSE, HBA1C, observations, strings};

fn cohort(members: &[&str]) -> CohortSet {
    members.iter().copied().collect()
}

#[test]
fn test_labels_follow_cohort_membership() -> ehr_cohort::Result<()> {
    let table = observations(&[
        ("P1", HBA1C, "7.5"),
        ("P2", HBA1C, "5.4"),
        ("P1", GLUCOSE, "130"),
        ("P3", HBA1C, "8.1"),
    ]);

    let labeled = label_observations(&table, HBA1C, &cohort(&["P1", "P3"]))?;

    assert_eq!(labeled.lab_code(), HBA1C);
    assert_eq!(labeled.num_rows(), 3);
    assert_eq!(
        strings(labeled.batch(), "PATIENT"),
        vec![Some("P1".into()), Some("P2".into()), Some("P3".into())]
    );
    assert_eq!(labeled.labels()?.values().to_vec(), vec![1, 0, 1]);
    assert_eq!(labeled.labels()?.null_count(), 0);

    let records = labeled.records()?;
    assert!(records[0].has_diagnosis);
    assert!(!records[1].has_diagnosis);
    assert_eq!(records[2].observation.value.as_deref(), Some("8.1"));
    Ok(())
}

#[test]
fn test_empty_cohort_labels_everything_zero() -> ehr_cohort::Result<()> {
    let table = observations(&[("P1", HBA1C, "7.5"), ("P2", HBA1C, "5.4")]);
    let labeled = label_observations(&table, HBA1C, &CohortSet::new())?;
    assert_eq!(labeled.labels()?.values().to_vec(), vec![0, 0]);
    assert_eq!(labeled.group(1)?.num_rows(), 0);
    assert_eq!(labeled.group(0)?.num_rows(), 2);
    Ok(())
}

#[test]
fn test_label_column_is_appended_and_input_untouched() -> ehr_cohort::Result<()> {
    let table = observations(&[("P1", HBA1C, "7.5")]);
    let labeled = label_observations(&table, HBA1C, &cohort(&["P1"]))?;

    let schema = labeled.batch().schema();
    assert_eq!(schema.fields().len(), table.num_columns() + 1);
    assert_eq!(schema.field(schema.fields().len() - 1).name(), HAS_DIAGNOSIS);
    assert!(table.schema().index_of(HAS_DIAGNOSIS).is_err());
    Ok(())
}

#[test]
fn test_no_matching_lab_code_gives_empty_table() -> ehr_cohort::Result<()> {
    let table = observations(&[("P1", GLUCOSE, "130")]);
    let labeled = label_observations(&table, HBA1C, &cohort(&["P1"]))?;
    assert_eq!(labeled.num_rows(), 0);
    assert!(labeled.records()?.is_empty());
    Ok(())
}

#[test]
fn test_existing_label_column_is_rejected() -> ehr_cohort::Result<()> {
    let table = observations(&[("P1", HBA1C, "7.5")]);
    let labeled = label_observations(&table, HBA1C, &cohort(&["P1"]))?;
    let err = label_observations(labeled.batch(), HBA1C, &cohort(&["P1"])).unwrap_err();
    assert!(matches!(err, CohortError::SchemaError(_)));
    Ok(())
}

#[test]
fn test_only_lab_rows_survive_with_their_labels() -> ehr_cohort::Result<()> {
    let table = observations(&[
        ("P1", HBA1C, "6.1"),
        ("P3", HBA1C, "5.2"),
        ("P2", "0000-0", "9.9"),
    ]);

    let labeled = label_observations(&table, HBA1C, &cohort(&["P1", "P2"]))?;

    let labels = labeled
        .records()?
        .into_iter()
        .map(|r| (r.observation.patient, r.has_diagnosis))
        .collect::<Vec<_>>();
    assert_eq!(
        labels,
        vec![(Some("P1".to_string()), true), (Some("P3".to_string()), false)]
    );
    Ok(())
}

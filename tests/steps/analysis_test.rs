use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ehr_cohort::analysis::{group_distributions, summarize_medications};
use ehr_cohort::{CohortError, CohortSet, compare_groups, label_observations};

use crate::utils::{DIABETES, HBA1C, medications, observations, string_table};

fn members(ids: &[&str]) -> CohortSet {
    ids.iter().copied().collect()
}

#[test]
fn test_groups_are_summarised_and_compared() -> ehr_cohort::Result<()> {
    let table = observations(&[
        ("P1", HBA1C, "6.0"),
        ("P2", HBA1C, "1.0"),
        ("P1", HBA1C, "7.0"),
        ("P2", HBA1C, "2.0"),
        ("P1", HBA1C, "8.0"),
        ("P2", HBA1C, "3.0"),
        ("P1", HBA1C, "9.0"),
        ("P2", HBA1C, "4.0"),
        ("P1", HBA1C, "10.0"),
        ("P2", HBA1C, "5.0"),
    ]);
    let labeled = label_observations(&table, HBA1C, &members(&["P1"]))?;

    let comparison = compare_groups(&labeled)?;

    assert_eq!(comparison.lab_code, HBA1C);
    assert_eq!(comparison.without_diagnosis.statistics.count, 5);
    assert_eq!(comparison.with_diagnosis.statistics.count, 5);
    assert_eq!(comparison.without_diagnosis.statistics.mean, Some(3.0));
    assert_eq!(comparison.with_diagnosis.statistics.median, Some(8.0));

    let mwu = comparison.mann_whitney.unwrap();
    assert!(mwu.statistic.abs() < 1e-12);
    assert!((mwu.p_value - 2.0 / 252.0).abs() < 1e-9);

    let ks = comparison.kolmogorov_smirnov.unwrap();
    assert!((ks.statistic - 1.0).abs() < 1e-12);
    assert!((ks.p_value - 2.0 / 252.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_empty_group_skips_tests() -> ehr_cohort::Result<()> {
    let table = observations(&[("P1", HBA1C, "7.5"), ("P2", HBA1C, "5.4")]);
    let labeled = label_observations(&table, HBA1C, &CohortSet::new())?;

    let comparison = compare_groups(&labeled)?;

    assert_eq!(comparison.with_diagnosis.statistics.count, 0);
    assert_eq!(comparison.with_diagnosis.statistics.mean, None);
    assert_eq!(comparison.without_diagnosis.statistics.count, 2);
    assert!(comparison.mann_whitney.is_none());
    assert!(comparison.kolmogorov_smirnov.is_none());

    let distributions = group_distributions(&comparison, 50, 10);
    assert_eq!(distributions.len(), 2);
    assert!(distributions[1].density.is_none());
    assert!(distributions[1].histogram.is_none());
    assert!(distributions[0].histogram.is_some());
    Ok(())
}

#[test]
fn test_non_numeric_value_fails_comparison() -> ehr_cohort::Result<()> {
    let table = observations(&[("P1", HBA1C, "7.5"), ("P2", HBA1C, "high")]);
    let labeled = label_observations(&table, HBA1C, &members(&["P1"]))?;

    let err = compare_groups(&labeled).unwrap_err();
    assert!(matches!(
        err,
        CohortError::ValueConversion { row: 1, ref value } if value == "high"
    ));
    Ok(())
}

#[test]
fn test_observation_period_spans_labeled_rows() -> ehr_cohort::Result<()> {
    let table = observations(&[("P1", HBA1C, "7.5")]);
    let labeled = label_observations(&table, HBA1C, &members(&["P1"]))?;
    let comparison = compare_groups(&labeled)?;
    let (first, last) = comparison.observation_period.unwrap();
    assert_eq!(first, last);
    assert_eq!(first.to_string(), "2020-05-01");
    Ok(())
}

#[test]
fn test_medications_are_ranked_by_prescriptions() -> ehr_cohort::Result<()> {
    let table = medications(&[
        ("P1", "metformin", Some(DIABETES)),
        ("P1", "metformin", Some(DIABETES)),
        ("P2", "insulin", Some(DIABETES)),
        ("P3", "metformin", Some(DIABETES)),
        ("P4", "lisinopril", Some("59621000")),
        ("P5", "aspirin", None),
    ]);

    let summary = summarize_medications(&table, DIABETES, 1)?;

    assert_eq!(summary.prescriptions, 4);
    assert_eq!(summary.patients, 3);
    assert_eq!(summary.top_medications, vec![("metformin".to_string(), 3)]);
    Ok(())
}

#[test]
fn test_unattributed_lab_rows_join_the_unlabeled_group() -> ehr_cohort::Result<()> {
    let table = string_table(&[
        ("PATIENT", vec![Some("P1"), None, Some("P3")]),
        ("CODE", vec![Some(HBA1C), Some(HBA1C), Some(HBA1C)]),
        ("VALUE", vec![Some("7.5"), Some("5.4"), Some("5.8")]),
    ]);
    let labeled = label_observations(&table, HBA1C, &members(&["P1"]))?;
    assert_eq!(labeled.labels()?.values().to_vec(), vec![1, 0, 0]);

    let comparison = compare_groups(&labeled)?;

    assert_eq!(comparison.with_diagnosis.statistics.count, 1);
    assert_eq!(comparison.without_diagnosis.statistics.count, 2);
    assert_eq!(labeled.records()?[1].observation.patient, None);
    Ok(())
}

#[test]
fn test_float_reason_codes_match_the_diagnosis() -> ehr_cohort::Result<()> {
    let schema = Schema::new(vec![
        Field::new("PATIENT", DataType::Utf8, true),
        Field::new("DESCRIPTION", DataType::Utf8, true),
        Field::new("REASONCODE", DataType::Float64, true),
    ]);
    let table = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(StringArray::from(vec!["P1", "P2"])) as ArrayRef,
            Arc::new(StringArray::from(vec!["metformin", "aspirin"])),
            Arc::new(Float64Array::from(vec![Some(44_054_006.0), None])),
        ],
    )?;

    let summary = summarize_medications(&table, DIABETES, 10)?;

    assert_eq!(summary.prescriptions, 1);
    assert_eq!(summary.patients, 1);
    assert_eq!(summary.top_medications, vec![("metformin".to_string(), 1)]);
    Ok(())
}

use ehr_cohort::report::{DENSITY_PLOT_FILE, HISTOGRAM_PLOT_FILE, REPORT_FILE};
use ehr_cohort::{CohortConfig, analyze, run};

use crate::utils::{DIABETES, GLUCOSE, HBA1C, conditions, medications, observations, patients};

fn dataset() -> ehr_cohort::Dataset {
    ehr_cohort::Dataset {
        patients: patients(&[("P1", "F"), ("P2", "M"), ("P3", "F"), ("P4", "M")]),
        conditions: conditions(&[
            ("P1", DIABETES, "2015-02-01"),
            ("P1", DIABETES, "2016-02-01"),
            ("P3", DIABETES, "2012-11-30"),
            ("P2", "38341003", "2014-06-15"),
        ]),
        observations: observations(&[
            ("P1", HBA1C, "7.5"),
            ("P2", HBA1C, "5.4"),
            ("P1", GLUCOSE, "130"),
            ("P3", HBA1C, "8.1"),
            ("P4", HBA1C, "5.1"),
            ("P3", HBA1C, "7.9"),
            ("P2", HBA1C, "5.6"),
        ]),
        medications: medications(&[
            ("P1", "metformin", Some(DIABETES)),
            ("P3", "metformin", Some(DIABETES)),
            ("P2", "lisinopril", Some("38341003")),
        ]),
    }
}

#[test]
fn test_analysis_of_loaded_dataset() -> ehr_cohort::Result<()> {
    let report = analyze(&dataset(), &CohortConfig::default())?;

    assert_eq!(report.cohort.patients, 2);
    assert_eq!(report.cohort.matching_records, 3);
    assert_eq!(report.cohort.profile.total_patients, 4);
    assert_eq!(report.labeled_observations, 6);
    assert_eq!(report.comparison.with_diagnosis.statistics.count, 3);
    assert_eq!(report.comparison.without_diagnosis.statistics.count, 3);
    assert!(report.comparison.mann_whitney.is_some());
    assert!(report.comparison.kolmogorov_smirnov.is_some());
    assert_eq!(report.medications.prescriptions, 2);
    assert_eq!(report.distributions.len(), 2);

    let summary = report.render_summary();
    assert!(summary.contains("with diagnosis"));
    assert!(summary.contains("without diagnosis"));
    assert!(summary.contains("Mann-Whitney U"));
    assert!(summary.contains("Medications for 44054006: 2 prescriptions to 2 patients"));
    assert_eq!(report.to_string(), summary);
    Ok(())
}

#[test]
fn test_outputs_are_written_as_json() -> ehr_cohort::Result<()> {
    let dir = tempfile::tempdir()?;
    let report = analyze(&dataset(), &CohortConfig::default())?;

    let written = report.write_outputs(dir.path())?;

    assert_eq!(
        written,
        vec![
            dir.path().join(REPORT_FILE),
            dir.path().join(DENSITY_PLOT_FILE),
            dir.path().join(HISTOGRAM_PLOT_FILE),
        ]
    );
    let json: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(dir.path().join(REPORT_FILE))?)?;
    assert_eq!(json["cohort"]["patients"], 2);
    assert_eq!(json["comparison"]["lab_code"], HBA1C);

    let plots: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(dir.path().join(HISTOGRAM_PLOT_FILE))?)?;
    assert_eq!(plots.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_run_loads_and_analyses_partitions() -> ehr_cohort::Result<()> {
    let dir = tempfile::tempdir()?;
    let data = dataset();
    crate::utils::write_partition(
        dir.path(),
        "2024",
        &data.patients,
        &data.conditions,
        &data.observations,
        &data.medications,
    )?;

    let report = run(&CohortConfig::local(dir.path())).await?;

    assert_eq!(report.cohort.patients, 2);
    assert_eq!(report.labeled_observations, 6);
    Ok(())
}

//! Integration tests for script replay.

use intake_cli::config::Settings;
use intake_cli::replay::replay;
use intake_cli::script::{ScriptedIngestor, parse_script};
use intake_model::{Module, StepStatus, WizardStep};
use intake_wizard::{ActivityLedger, Blocker, ImportSession, Outcome};

const PATIENT_SCRIPT: &str = r#"{
    "actions": [
        {"action": "upload", "file_name": "patients.txt"},
        {"action": "upload", "file_name": "patients.csv", "field_count": 5, "fields": [
            {"id": "1", "source_field": "patient_id", "mapped_field": "Patient ID",
             "status": "mapped", "confidence": 99, "data_type": "NUMBER"},
            {"id": "2", "source_field": "first_name", "mapped_field": "First Name",
             "status": "mapped", "confidence": 97, "data_type": "TEXT"},
            {"id": "3", "source_field": "surname", "mapped_field": "Last Name",
             "status": "partial", "confidence": 75, "data_type": "TEXT"},
            {"id": "4", "source_field": "birth_dt", "data_type": "DATE",
             "sample_data": "1985-03-12"},
            {"id": "5", "source_field": "notes", "data_type": "TEXT"}
        ]},
        {"action": "validate"},
        {"action": "continue"},
        {"action": "back"},
        {"action": "back"},
        {"action": "assign", "mapping_id": "4", "target": "Date of Birth"},
        {"action": "assign", "mapping_id": "3", "target": "Last Name"},
        {"action": "validate"},
        {"action": "continue"},
        {"action": "finalize"}
    ]
}"#;

fn session() -> ImportSession<ScriptedIngestor, ActivityLedger> {
    let settings = Settings::default();
    ImportSession::new(
        settings.session_context().unwrap(),
        ScriptedIngestor,
        settings.validator(),
        ActivityLedger::new(),
    )
}

#[tokio::test]
async fn test_patient_script_commits_once() {
    let script = parse_script(PATIENT_SCRIPT).unwrap();
    let mut session = session();
    let log = replay(&mut session, &script).await.unwrap();
    assert_eq!(log.len(), 11);

    // Unsupported extension fails the upload step.
    assert!(matches!(
        log[0].outcome.blocker(),
        Some(Blocker::UploadFailure { .. })
    ));
    assert_eq!(log[0].steps[0].status, StepStatus::Error);

    assert_eq!(
        log[1].outcome,
        Outcome::Advanced {
            from: WizardStep::Upload,
            to: WizardStep::Mapping
        }
    );
    insta::assert_json_snapshot!(log[1].steps, @r#"
    [
      {
        "id": "upload",
        "title": "Data Upload",
        "description": "5 fields uploaded successfully",
        "status": "completed"
      },
      {
        "id": "mapping",
        "title": "Auto Mapping",
        "description": "2 matched, 3 unmapped",
        "status": "current"
      },
      {
        "id": "validation",
        "title": "Validation",
        "description": "Awaiting validation",
        "status": "pending"
      },
      {
        "id": "summary",
        "title": "Summary",
        "description": "Final review",
        "status": "pending"
      }
    ]
    "#);

    // Missing Date of Birth is an error, so the summary is out of reach.
    assert_eq!(log[2].steps[2].status, StepStatus::Current);
    assert!(log[3].refused());
    assert!(log[5].refused());

    assert_eq!(log[7].steps[1].description, "4 matched, 1 unmapped");
    assert!(!log[9].refused());

    let report = log[10].committed.as_ref().expect("committed report");
    assert_eq!(report.total_fields, 5);
    assert_eq!(report.mapped_fields, 4);
    assert_eq!(report.unmapped_fields, 1);
    assert_eq!(report.validations_failed, 0);
    assert_eq!(report.source_file_name, "patients.csv");

    assert_eq!(session.active_module(), Module::PatientMaster);
    assert_eq!(session.panel(), WizardStep::Upload);
    assert_eq!(session.committer().len(), 1);
}

#[tokio::test]
async fn test_cancelled_upload_and_module_selection() {
    let script = parse_script(
        r#"{
            "module": "fee-structure",
            "actions": [
                {"action": "upload", "file_name": "fees.xlsx", "delay_ms": 500, "wait": false},
                {"action": "cancel"},
                {"action": "upload", "file_name": "fees.json", "failure": "no header row"}
            ]
        }"#,
    )
    .unwrap();
    let mut session = session();
    let log = replay(&mut session, &script).await.unwrap();

    assert_eq!(log[0].action, "select fee-structure");
    assert_eq!(log[1].steps[0].description, "Uploading fees.xlsx...");
    assert_eq!(log[2].outcome, Outcome::Stayed);
    assert_eq!(
        log[2].steps[0].description,
        "Select and upload your fee schedule file"
    );
    assert_eq!(
        log[3].steps[0].description,
        "Upload failed: no header row"
    );
    assert_eq!(log.len(), 4);
    assert_eq!(session.active_module(), Module::FeeStructure);
}

#[tokio::test]
async fn test_waiting_upload_ignores_other_module_completion() {
    let script = parse_script(
        r#"{
            "module": "fee-structure",
            "actions": [
                {"action": "upload", "file_name": "fees.csv", "delay_ms": 20, "wait": false,
                 "fields": [{"id": "1", "source_field": "proc_code", "mapped_field": "Procedure Code",
                             "status": "mapped", "confidence": 96, "data_type": "TEXT"}]},
                {"action": "select_module", "module": "patient-master"},
                {"action": "upload", "file_name": "p.csv", "delay_ms": 300,
                 "fields": [{"id": "1", "source_field": "patient_id", "mapped_field": "Patient ID",
                             "status": "mapped", "confidence": 99, "data_type": "NUMBER"}]},
                {"action": "validate"}
            ]
        }"#,
    )
    .unwrap();
    let mut session = session();
    let log = replay(&mut session, &script).await.unwrap();

    assert_eq!(log.len(), 6);
    assert_eq!(log[3].action, "upload finished (fee-structure)");
    assert_eq!(log[3].outcome, Outcome::Stayed);
    assert_eq!(log[4].action, "upload p.csv");
    assert_eq!(
        log[4].outcome,
        Outcome::Advanced {
            from: WizardStep::Upload,
            to: WizardStep::Mapping
        }
    );
    assert_eq!(
        log[5].outcome,
        Outcome::Advanced {
            from: WizardStep::Mapping,
            to: WizardStep::Validation
        }
    );
    assert_eq!(
        session.state().progress(Module::FeeStructure).step,
        WizardStep::Mapping
    );
}

//! Tests for intake-model types.

use intake_model::{
    Activity, ActivityStatus, AccountNumber, Confidence, DataType, FieldMapping, Module,
    StepDescriptor, StepStatus, SummaryReport, UploadFailure, WizardStep,
};

#[test]
fn every_module_has_required_fields() {
    for module in Module::ALL {
        assert_eq!(module.canonical_fields().len(), 10);
        assert!(module.required_fields().count() >= 3);
    }
}

#[test]
fn step_descriptor_uses_lowercase_tags() {
    let step = StepDescriptor {
        id: WizardStep::Mapping,
        title: "Auto Mapping".to_string(),
        description: "75 matched, 25 unmapped".to_string(),
        status: StepStatus::Current,
    };
    let value = serde_json::to_value(&step).expect("serialize step");
    assert_eq!(value["id"], "mapping");
    assert_eq!(value["status"], "current");
}

#[test]
fn module_serializes_as_kebab_id() {
    let json = serde_json::to_string(&Module::FeeStructure).unwrap();
    assert_eq!(json, "\"fee-structure\"");
    let back: Module = serde_json::from_str("\"patient-master\"").unwrap();
    assert_eq!(back, Module::PatientMaster);
}

#[test]
fn confidence_out_of_range_fails_to_deserialize() {
    let json = r#"{"id":"1","source_field":"x","data_type":"TEXT","confidence":150}"#;
    assert!(serde_json::from_str::<FieldMapping>(json).is_err());
}

#[test]
fn upload_failure_round_trips() {
    let failure = UploadFailure::Rejected("too many columns".to_string());
    let json = serde_json::to_string(&failure).unwrap();
    let back: UploadFailure = serde_json::from_str(&json).unwrap();
    assert_eq!(back, failure);
    assert_eq!(back.to_string(), "too many columns");
}

#[test]
fn completed_activity_copies_report() {
    let mappings = vec![
        FieldMapping::unmapped("1", "patient_id", DataType::Number, Some("12345".into()))
            .resolved("Patient ID", Confidence::new(98).unwrap(), false),
        FieldMapping::unmapped("2", "email_addr", DataType::Email, None),
    ];
    let now = chrono::Utc::now();
    let report = SummaryReport::compile(Module::PatientMaster, "patients.csv", &mappings, &[], now);
    let mut activity =
        Activity::opened(AccountNumber::new("ACC-2024-003").unwrap(), Module::PatientMaster, now);
    assert_eq!(activity.status, ActivityStatus::Pending);
    assert!(activity.is_open());

    activity.complete(report, now);
    assert_eq!(activity.status, ActivityStatus::Completed);
    assert!(!activity.is_open());
    assert_eq!(activity.completed_at, Some(now));
    assert_eq!(activity.records_processed, 2);
    assert_eq!(activity.module, Module::PatientMaster);
    assert_eq!(
        activity.description,
        "Patient demographic data mapping and validation"
    );
}

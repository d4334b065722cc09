//! Scenario tests for the import session.

use std::time::Duration;

use intake_model::{
    AccountNumber, ActivityStatus, Confidence, DataType, FieldMapping, IngestReport,
    MappingStatus, Module, SessionContext, Severity, StepStatus, SummaryReport, UploadFailure,
    UploadFile, UploadStatus, UserProfile, UserRole, ValidationFinding, WizardStep,
};
use intake_wizard::{
    ActivityLedger, Blocker, CommitError, ImportCommitter, ImportSession, Ingestor, MappingGate,
    Outcome, ValidationEngine,
};

/// Reports the same ingestion result for every file, after an optional delay.
struct FixedIngestor {
    result: Result<IngestReport, UploadFailure>,
    delay: Duration,
}

impl FixedIngestor {
    fn ok(mappings: Vec<FieldMapping>) -> Self {
        Self {
            result: Ok(IngestReport::from_mappings(mappings)),
            delay: Duration::ZERO,
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Ingestor for FixedIngestor {
    async fn ingest(
        &self,
        _module: Module,
        _file: UploadFile,
    ) -> Result<IngestReport, UploadFailure> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Returns the same findings for any mappings.
struct FixedFindings(Vec<ValidationFinding>);

impl ValidationEngine for FixedFindings {
    fn validate(&self, _module: Module, _mappings: &[FieldMapping]) -> Vec<ValidationFinding> {
        self.0.clone()
    }
}

struct Unavailable;

impl ImportCommitter for Unavailable {
    fn commit(&mut self, _: &SessionContext, _: &SummaryReport) -> Result<(), CommitError> {
        Err(CommitError::Unavailable)
    }
}

fn context() -> SessionContext {
    SessionContext::new(
        UserProfile {
            name: "Dr. Sarah Wilson".to_string(),
            email: "admin@example.com".to_string(),
            role: UserRole::Administrator,
        },
        AccountNumber::new("ACC-2024-001").unwrap(),
    )
}

fn mapped(id: &str, source: &str, target: &str) -> FieldMapping {
    FieldMapping::unmapped(id, source, DataType::Text, None).resolved(
        target,
        Confidence::new(95).unwrap(),
        false,
    )
}

fn unmapped(id: &str, source: &str) -> FieldMapping {
    FieldMapping::unmapped(id, source, DataType::Text, None)
}

fn session<C: ImportCommitter>(
    ingestor: FixedIngestor,
    findings: Vec<ValidationFinding>,
    committer: C,
) -> ImportSession<FixedIngestor, C> {
    ImportSession::new(context(), ingestor, FixedFindings(findings), committer)
}

async fn uploaded<C: ImportCommitter>(session: &mut ImportSession<FixedIngestor, C>) {
    session.upload_bytes("data.csv", b"a,b\n1,2".to_vec(), None);
    let outcome = session.next_upload_completion().await.expect("completion");
    assert_eq!(
        outcome,
        Outcome::Advanced {
            from: WizardStep::Upload,
            to: WizardStep::Mapping
        }
    );
}

#[tokio::test]
async fn test_upload_of_eighty_fields_moves_to_mapping() {
    let mappings = (1..=80)
        .map(|n| unmapped(&n.to_string(), &format!("col_{n}")))
        .collect();
    let mut session = session(FixedIngestor::ok(mappings), vec![], ActivityLedger::new());
    uploaded(&mut session).await;

    let steps = session.steps();
    assert_eq!(steps[0].status, StepStatus::Completed);
    assert_eq!(steps[0].description, "80 fields uploaded successfully");
    assert_eq!(steps[1].status, StepStatus::Current);
    assert_eq!(session.panel(), WizardStep::Mapping);
}

#[tokio::test]
async fn test_validate_carries_mappings_through() {
    let mappings = vec![
        mapped("1", "first_name", "First Name"),
        unmapped("2", "middle_name"),
    ];
    let mut session = session(
        FixedIngestor::ok(mappings.clone()),
        vec![],
        ActivityLedger::new(),
    );
    uploaded(&mut session).await;
    assert!(session.controls().primary.enabled);

    let outcome = session.validate_and_continue();
    assert_eq!(
        outcome,
        Outcome::Advanced {
            from: WizardStep::Mapping,
            to: WizardStep::Validation
        }
    );
    assert_eq!(session.state().active_progress().mappings, mappings);
}

#[tokio::test]
async fn test_validate_refused_with_nothing_mapped() {
    let mut session = session(
        FixedIngestor::ok(vec![unmapped("1", "dob")]),
        vec![],
        ActivityLedger::new(),
    );
    uploaded(&mut session).await;
    assert!(!session.controls().primary.enabled);
    let outcome = session.validate_and_continue();
    assert!(matches!(
        outcome.blocker(),
        Some(Blocker::MappingIncomplete { mapped: 0, .. })
    ));
    assert_eq!(session.panel(), WizardStep::Mapping);
}

#[tokio::test]
async fn test_error_finding_blocks_summary_and_back_keeps_mappings() {
    let mappings = vec![
        mapped("1", "proc_code", "Procedure Code"),
        unmapped("2", "billing_code"),
    ];
    let findings = vec![ValidationFinding::new(
        "V001",
        "billing_code",
        Severity::Error,
        "Required field Billing Code is not mapped",
    )];
    let mut session = session(
        FixedIngestor::ok(mappings.clone()),
        findings,
        ActivityLedger::new(),
    )
    .with_default_module(Module::FeeStructure);
    uploaded(&mut session).await;
    session.validate_and_continue();

    let nav = session.controls();
    assert_eq!(nav.panel, WizardStep::Validation);
    assert_eq!(nav.primary.label, "Fix Errors First");
    assert!(!nav.primary.enabled);
    assert_eq!(session.steps()[2].description, "1 errors, 0 warnings");

    let outcome = session.continue_to_summary();
    assert_eq!(
        outcome.blocker(),
        Some(&Blocker::ValidationBlocking { errors: 1 })
    );

    session.back();
    assert_eq!(session.panel(), WizardStep::Mapping);
    assert_eq!(session.state().active_progress().mappings, mappings);
}

#[tokio::test]
async fn test_finalize_commits_and_resets() {
    let mut session = session(
        FixedIngestor::ok(vec![mapped("1", "proc_code", "Procedure Code")]),
        vec![],
        ActivityLedger::new(),
    );
    session.select_module(Module::FeeStructure);
    uploaded(&mut session).await;
    let begun = &session.committer().activities()[0];
    assert_eq!(begun.status, ActivityStatus::InProgress);
    assert_eq!(begun.module, Module::FeeStructure);
    let activity_id = begun.id;
    session.validate_and_continue();
    session.continue_to_summary();

    let report = session.summary().expect("summary on summary step");
    assert_eq!(report.validations_failed, 0);
    assert_eq!(report.module, Module::FeeStructure);
    assert_eq!(session.controls().primary.label, "Finalize Import");

    let outcome = session.finalize();
    assert_eq!(
        outcome,
        Outcome::Advanced {
            from: WizardStep::Summary,
            to: WizardStep::Upload
        }
    );
    assert_eq!(session.active_module(), Module::PatientMaster);
    assert_eq!(session.panel(), WizardStep::Upload);
    assert_eq!(session.state().upload_status(), UploadStatus::Idle);
    assert_eq!(
        session.state().progress(Module::FeeStructure).step,
        WizardStep::Upload
    );

    let ledger = session.committer();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.activities()[0].id, activity_id);
    assert_eq!(ledger.activities()[0].status, ActivityStatus::Completed);
    assert_eq!(ledger.activities()[0].module, Module::FeeStructure);
    assert_eq!(ledger.activities()[0].records_processed, 1);
}

#[tokio::test]
async fn test_commit_failure_flags_summary_step() {
    let mut session = session(
        FixedIngestor::ok(vec![mapped("1", "first_name", "First Name")]),
        vec![],
        Unavailable,
    );
    uploaded(&mut session).await;
    session.validate_and_continue();
    session.continue_to_summary();

    let outcome = session.finalize();
    assert!(matches!(
        outcome.blocker(),
        Some(Blocker::CommitFailure { .. })
    ));
    let steps = session.steps();
    assert_eq!(steps[3].status, StepStatus::Error);
    assert_eq!(
        steps[3].description,
        "Commit failed: commit service unavailable"
    );
    assert_eq!(session.panel(), WizardStep::Summary);

    // Going back clears the flag.
    session.back();
    session.continue_to_summary();
    assert_eq!(session.steps()[3].status, StepStatus::Current);
}

#[tokio::test]
async fn test_switching_modules_preserves_progress() {
    let mut session = session(
        FixedIngestor::ok(vec![mapped("1", "first_name", "First Name")]),
        vec![],
        ActivityLedger::new(),
    );
    uploaded(&mut session).await;
    session.select_module(Module::FeeStructure);
    assert_eq!(session.panel(), WizardStep::Upload);
    assert_eq!(
        session.steps()[0].description,
        "Select and upload your fee schedule file"
    );

    session.select_module(Module::PatientMaster);
    assert_eq!(session.panel(), WizardStep::Mapping);
    assert_eq!(session.state().active_progress().mappings.len(), 1);
}

#[tokio::test]
async fn test_unsupported_format_fails_upload_step() {
    let mut session = session(FixedIngestor::ok(vec![]), vec![], ActivityLedger::new());
    let outcome = session.upload_bytes("notes.txt", b"hello".to_vec(), None);
    assert_eq!(
        outcome.blocker(),
        Some(&Blocker::UploadFailure {
            failure: UploadFailure::UnsupportedFormat("notes.txt".to_string())
        })
    );
    let steps = session.steps();
    assert_eq!(steps[0].status, StepStatus::Error);
    assert!(steps.iter().all(|s| s.status != StepStatus::Current));
    assert!(!session.upload_in_flight());

    // A fresh upload recovers.
    session.upload_bytes("patients.json", b"[]".to_vec(), Some("application/json"));
    assert_eq!(session.steps()[0].status, StepStatus::Current);
    assert!(session.next_upload_completion().await.is_some());
}

#[tokio::test]
async fn test_cancel_returns_upload_to_idle() {
    let ingestor =
        FixedIngestor::ok(vec![unmapped("1", "x")]).slow(Duration::from_millis(200));
    let mut session = session(ingestor, vec![], ActivityLedger::new());
    session.upload_bytes("patients.csv", b"x".to_vec(), None);
    assert_eq!(session.state().upload_status(), UploadStatus::Uploading);
    assert_eq!(session.steps()[0].description, "Uploading patients.csv...");

    assert_eq!(session.cancel_upload(), Outcome::Stayed);
    assert_eq!(session.state().upload_status(), UploadStatus::Idle);
    assert!(session.next_upload_completion().await.is_none());
    assert!(session.cancel_upload().is_blocked());
}

#[tokio::test]
async fn test_assign_resolves_or_flags_mapping_step() {
    let mut session = session(
        FixedIngestor::ok(vec![
            mapped("1", "first_name", "First Name"),
            unmapped("2", "birth"),
        ]),
        vec![],
        ActivityLedger::new(),
    );
    assert!(session.assign("2", "Date of Birth").is_blocked());
    uploaded(&mut session).await;

    let outcome = session.assign("2", "First Name");
    assert!(matches!(
        outcome.blocker(),
        Some(Blocker::MappingRejected { .. })
    ));
    assert_eq!(session.steps()[1].status, StepStatus::Error);

    assert_eq!(session.assign("2", "date of birth"), Outcome::Stayed);
    let mapping = session.state().active_progress().mapping("2").cloned().unwrap();
    assert_eq!(mapping.status, MappingStatus::Mapped);
    assert_eq!(mapping.mapped_field.as_deref(), Some("Date of Birth"));
    assert_eq!(session.steps()[1].status, StepStatus::Current);
    assert_eq!(session.steps()[1].description, "2 matched, 0 unmapped");

    assert_eq!(
        session.assign("9", "Phone").blocker(),
        Some(&Blocker::UnknownMapping {
            mapping_id: "9".to_string()
        })
    );
}

#[tokio::test]
async fn test_strict_gate_requires_required_fields() {
    let mut session = session(
        FixedIngestor::ok(vec![mapped("1", "first_name", "First Name")]),
        vec![],
        ActivityLedger::new(),
    )
    .with_gate(MappingGate::RequiredResolved);
    uploaded(&mut session).await;
    assert!(!session.controls().primary.enabled);
    assert!(session.validate_and_continue().is_blocked());
}

#[tokio::test]
async fn test_ingested_mappings_breaking_invariants_fail_upload() {
    let mut mapped_without_target = unmapped("1", "patient_id");
    mapped_without_target.status = MappingStatus::Mapped;
    let mut unmapped_with_target = unmapped("2", "phone");
    unmapped_with_target.mapped_field = Some("Phone".to_string());

    let mut session = session(
        FixedIngestor::ok(vec![mapped_without_target, unmapped_with_target]),
        vec![],
        ActivityLedger::new(),
    );
    session.upload_bytes("patients.csv", b"x".to_vec(), None);
    let outcome = session.next_upload_completion().await.expect("completion");
    assert_eq!(
        outcome.blocker(),
        Some(&Blocker::UploadFailure {
            failure: UploadFailure::Rejected(
                "mapping 1: mapped status requires a mapped field".to_string()
            )
        })
    );
    assert_eq!(session.panel(), WizardStep::Upload);
    assert_eq!(session.steps()[0].status, StepStatus::Error);
    assert!(session.state().active_progress().mappings.is_empty());
    assert!(session.validate_and_continue().is_blocked());
}

#[tokio::test]
async fn test_await_upload_waits_for_its_own_module() {
    let ingestor = FixedIngestor::ok(vec![mapped("1", "first_name", "First Name")])
        .slow(Duration::from_millis(50));
    let mut session = session(ingestor, vec![], ActivityLedger::new());

    session.select_module(Module::FeeStructure);
    session.upload_bytes("fees.csv", b"x".to_vec(), None);
    tokio::time::sleep(Duration::from_millis(25)).await;
    session.select_module(Module::PatientMaster);
    session.upload_bytes("patients.csv", b"x".to_vec(), None);

    let settled = session.await_upload(Module::PatientMaster).await;
    assert_eq!(
        settled,
        vec![
            (Module::FeeStructure, Outcome::Stayed),
            (
                Module::PatientMaster,
                Outcome::Advanced {
                    from: WizardStep::Upload,
                    to: WizardStep::Mapping
                }
            ),
        ]
    );
    assert_eq!(session.panel(), WizardStep::Mapping);
    assert_eq!(
        session.state().progress(Module::FeeStructure).step,
        WizardStep::Mapping
    );
    assert!(session.await_upload(Module::PatientMaster).await.is_empty());
}

#[tokio::test]
async fn test_finalize_resets_other_module_and_aborts_its_upload() {
    let ingestor = FixedIngestor::ok(vec![mapped("1", "patient_id", "Patient ID")]);
    let mut session = session(ingestor, vec![], ActivityLedger::new());
    uploaded(&mut session).await;
    session.validate_and_continue();
    session.continue_to_summary();

    session.select_module(Module::FeeStructure);
    session.upload_bytes("fees.csv", b"x".to_vec(), None);
    assert!(session.upload_in_flight());
    session.select_module(Module::PatientMaster);

    assert!(!session.finalize().is_blocked());
    assert_eq!(session.committer().len(), 1);
    let fees = session.state().progress(Module::FeeStructure);
    assert_eq!(fees.step, WizardStep::Upload);
    assert_eq!(fees.upload, UploadStatus::Idle);
    assert!(session.next_upload_completion().await.is_none());
}

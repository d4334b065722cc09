//! Wizard state: the active module plus independent progress per module.

use intake_model::{
    FieldMapping, FindingCounts, MappingTally, Module, UploadFailure, UploadStatus,
    ValidationFinding, WizardStep,
};
use serde::Serialize;

use crate::upload::UploadAttempt;

/// Progress of one module through the import flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleProgress {
    pub step: WizardStep,
    /// Only meaningful while `step == Upload`.
    pub upload: UploadStatus,
    pub pending_attempt: Option<UploadAttempt>,
    pub file_name: Option<String>,
    pub field_count: usize,
    pub mappings: Vec<FieldMapping>,
    /// `None` until the validation engine has run for the current mappings.
    pub findings: Option<Vec<ValidationFinding>>,
    pub upload_failure: Option<UploadFailure>,
    pub mapping_fault: Option<String>,
    pub commit_fault: Option<String>,
}

impl ModuleProgress {
    pub fn tally(&self) -> MappingTally {
        MappingTally::of(&self.mappings)
    }

    pub fn finding_counts(&self) -> FindingCounts {
        self.findings
            .as_deref()
            .map(FindingCounts::of)
            .unwrap_or_default()
    }

    pub fn findings(&self) -> &[ValidationFinding] {
        self.findings.as_deref().unwrap_or_default()
    }

    pub fn mapping(&self, id: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.id == id)
    }

    /// True when some step has a failed operation flagged.
    pub fn has_fault(&self) -> bool {
        self.upload == UploadStatus::Error
            || self.mapping_fault.is_some()
            || self.commit_fault.is_some()
    }
}

/// Authoritative wizard state for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    default_module: Module,
    active: Module,
    patient_master: ModuleProgress,
    fee_structure: ModuleProgress,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(Module::default())
    }
}

impl WizardState {
    /// Initial state: every module at the upload step, `default_module` active.
    pub fn new(default_module: Module) -> Self {
        Self {
            default_module,
            active: default_module,
            patient_master: ModuleProgress::default(),
            fee_structure: ModuleProgress::default(),
        }
    }

    /// Fresh state with the same default module.
    pub fn reset(&self) -> Self {
        Self::new(self.default_module)
    }

    pub fn active(&self) -> Module {
        self.active
    }

    pub(crate) fn set_active(&mut self, module: Module) {
        self.active = module;
    }

    pub fn current_step(&self) -> WizardStep {
        self.active_progress().step
    }

    pub fn upload_status(&self) -> UploadStatus {
        self.active_progress().upload
    }

    pub fn progress(&self, module: Module) -> &ModuleProgress {
        match module {
            Module::PatientMaster => &self.patient_master,
            Module::FeeStructure => &self.fee_structure,
        }
    }

    pub(crate) fn progress_mut(&mut self, module: Module) -> &mut ModuleProgress {
        match module {
            Module::PatientMaster => &mut self.patient_master,
            Module::FeeStructure => &mut self.fee_structure,
        }
    }

    pub fn active_progress(&self) -> &ModuleProgress {
        self.progress(self.active)
    }

    pub(crate) fn active_progress_mut(&mut self) -> &mut ModuleProgress {
        self.progress_mut(self.active)
    }
}

//! Progress tracker and navigation controls derived from wizard state.

use intake_model::{Module, StepDescriptor, StepStatus, UploadStatus, WizardStep};
use serde::Serialize;

use crate::machine::{MappingGate, mapping_blocker};
use crate::state::{ModuleProgress, WizardState};

/// Step descriptors for the active module.
pub fn describe_steps(state: &WizardState) -> [StepDescriptor; 4] {
    describe_module_steps(state.active(), state.active_progress())
}

/// Step descriptors for one module, in wizard order.
pub fn describe_module_steps(module: Module, progress: &ModuleProgress) -> [StepDescriptor; 4] {
    WizardStep::ALL.map(|step| StepDescriptor {
        id: step,
        title: title(module, step).to_string(),
        description: description(module, progress, step),
        status: step_status(progress, step),
    })
}

/// Display status of `step` given the module's progress.
///
/// A failed operation forces its step to `Error`, overriding both
/// `Completed` and `Current`.
pub fn step_status(progress: &ModuleProgress, step: WizardStep) -> StepStatus {
    if failed(progress, step) {
        return StepStatus::Error;
    }
    let current = progress.step.index();
    let index = step.index();
    if index < current || (step == WizardStep::Upload && progress.upload == UploadStatus::Success)
    {
        StepStatus::Completed
    } else if index == current {
        StepStatus::Current
    } else {
        StepStatus::Pending
    }
}

fn failed(progress: &ModuleProgress, step: WizardStep) -> bool {
    match step {
        WizardStep::Upload => progress.upload == UploadStatus::Error,
        WizardStep::Mapping => progress.mapping_fault.is_some(),
        WizardStep::Validation => false,
        WizardStep::Summary => progress.commit_fault.is_some(),
    }
}

fn title(module: Module, step: WizardStep) -> &'static str {
    let labels = module.step_labels();
    match step {
        WizardStep::Upload => labels.upload,
        WizardStep::Mapping => labels.mapping,
        WizardStep::Validation => labels.validation,
        WizardStep::Summary => labels.summary,
    }
}

fn description(module: Module, progress: &ModuleProgress, step: WizardStep) -> String {
    match step {
        WizardStep::Upload => match progress.upload {
            UploadStatus::Success => {
                format!("{} fields uploaded successfully", progress.field_count)
            }
            UploadStatus::Uploading => match progress.file_name.as_deref() {
                Some(name) => format!("Uploading {name}..."),
                None => "Uploading file...".to_string(),
            },
            UploadStatus::Error => match &progress.upload_failure {
                Some(failure) => format!("Upload failed: {failure}"),
                None => "Upload failed".to_string(),
            },
            UploadStatus::Idle => module.step_labels().upload_prompt.to_string(),
        },
        WizardStep::Mapping => {
            if let Some(fault) = &progress.mapping_fault {
                return format!("Mapping not saved: {fault}");
            }
            if progress.mappings.is_empty() {
                return "Awaiting field mappings".to_string();
            }
            let tally = progress.tally();
            format!("{} matched, {} unmapped", tally.mapped, tally.remaining())
        }
        WizardStep::Validation => match &progress.findings {
            Some(_) => {
                let counts = progress.finding_counts();
                format!("{} errors, {} warnings", counts.errors, counts.warnings)
            }
            None => "Awaiting validation".to_string(),
        },
        WizardStep::Summary => match &progress.commit_fault {
            Some(reason) => format!("Commit failed: {reason}"),
            None => "Final review".to_string(),
        },
    }
}

/// A button on the active panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub label: &'static str,
    pub enabled: bool,
}

impl Control {
    fn new(label: &'static str, enabled: bool) -> Self {
        Self { label, enabled }
    }
}

/// Which panel to render and the actions it offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationControls {
    pub panel: WizardStep,
    pub primary: Control,
    pub secondary: Option<Control>,
}

/// Controls for the active module's current panel.
pub fn controls(state: &WizardState, gate: MappingGate) -> NavigationControls {
    let progress = state.active_progress();
    let panel = progress.step;
    let (primary, secondary) = match panel {
        WizardStep::Upload => {
            let uploading = progress.upload == UploadStatus::Uploading;
            (
                Control::new("Choose File", true),
                uploading.then(|| Control::new("Cancel Upload", true)),
            )
        }
        WizardStep::Mapping => {
            let ready = mapping_blocker(state.active(), &progress.mappings, gate).is_none();
            (Control::new("Validate & Continue", ready), None)
        }
        WizardStep::Validation => {
            let primary = if progress.finding_counts().blocks_summary() {
                Control::new("Fix Errors First", false)
            } else {
                Control::new("Continue to Summary", true)
            };
            (primary, Some(Control::new("Back to Mapping", true)))
        }
        WizardStep::Summary => (
            Control::new("Finalize Import", true),
            Some(Control::new("Back to Validation", true)),
        ),
    };
    NavigationControls {
        panel,
        primary,
        secondary,
    }
}

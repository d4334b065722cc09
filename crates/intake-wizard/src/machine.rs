//! The wizard transition function.
//!
//! Every user action or collaborator result arrives as an [`Event`] and is
//! folded into the [`WizardState`] by [`transition`]. The function never
//! fails: a refused event leaves the state untouched (or flags the failing
//! step) and reports why through [`Outcome`].

use std::fmt;

use intake_model::{
    FieldMapping, FindingCounts, IngestReport, MappingTally, Module, UploadFailure,
    UploadStatus, ValidationFinding, WizardStep,
};
use serde::{Deserialize, Serialize};

use crate::state::WizardState;
use crate::upload::UploadAttempt;

/// How strict the Mapping → Validation guard is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingGate {
    /// At least one field mapped.
    #[default]
    AnyMapped,
    /// At least one field mapped and every required canonical field mapped.
    RequiredResolved,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SelectModule(Module),
    UploadStarted {
        module: Module,
        attempt: UploadAttempt,
        file_name: String,
    },
    UploadSucceeded {
        module: Module,
        attempt: UploadAttempt,
        report: IngestReport,
    },
    UploadFailed {
        module: Module,
        attempt: UploadAttempt,
        failure: UploadFailure,
    },
    UploadCancelled {
        module: Module,
        attempt: UploadAttempt,
    },
    MappingResolved(FieldMapping),
    MappingSaveFailed {
        mapping_id: String,
        reason: String,
    },
    ValidateAndContinue {
        findings: Vec<ValidationFinding>,
    },
    ContinueToSummary,
    Back,
    CommitFailed {
        reason: String,
    },
    Finalize,
}

/// User-facing action an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SelectModule,
    Upload,
    AssignMapping,
    Validate,
    ContinueToSummary,
    Back,
    Finalize,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectModule => "select module",
            Self::Upload => "upload",
            Self::AssignMapping => "assign mapping",
            Self::Validate => "validate",
            Self::ContinueToSummary => "continue to summary",
            Self::Back => "back",
            Self::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Event {
    pub fn action(&self) -> Action {
        match self {
            Self::SelectModule(_) => Action::SelectModule,
            Self::UploadStarted { .. }
            | Self::UploadSucceeded { .. }
            | Self::UploadFailed { .. }
            | Self::UploadCancelled { .. } => Action::Upload,
            Self::MappingResolved(_) | Self::MappingSaveFailed { .. } => Action::AssignMapping,
            Self::ValidateAndContinue { .. } => Action::Validate,
            Self::ContinueToSummary => Action::ContinueToSummary,
            Self::Back => Action::Back,
            Self::CommitFailed { .. } | Self::Finalize => Action::Finalize,
        }
    }
}

/// Why a transition did not move forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Blocker {
    /// Ingestion rejected the file.
    UploadFailure { failure: UploadFailure },
    /// Not enough fields mapped to validate.
    MappingIncomplete {
        mapped: usize,
        unresolved_required: Vec<String>,
    },
    /// Error-severity findings must be fixed first.
    ValidationBlocking { errors: usize },
    /// The commit collaborator refused the summary.
    CommitFailure { reason: String },
    /// The mapping id does not exist in the active module.
    UnknownMapping { mapping_id: String },
    /// The resolver refused the chosen target.
    MappingRejected { mapping_id: String, reason: String },
    /// The action does not apply to the current step.
    NoSuchTransition { step: WizardStep, action: Action },
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UploadFailure { failure } => write!(f, "upload failed: {failure}"),
            Self::MappingIncomplete {
                mapped,
                unresolved_required,
            } => {
                if *mapped == 0 {
                    f.write_str("map at least one field first")
                } else {
                    write!(
                        f,
                        "required fields unresolved: {}",
                        unresolved_required.join(", ")
                    )
                }
            }
            Self::ValidationBlocking { errors } => {
                write!(f, "fix {errors} validation error(s) first")
            }
            Self::CommitFailure { reason } => write!(f, "commit failed: {reason}"),
            Self::UnknownMapping { mapping_id } => write!(f, "unknown mapping: {mapping_id}"),
            Self::MappingRejected { mapping_id, reason } => {
                write!(f, "mapping {mapping_id} not saved: {reason}")
            }
            Self::NoSuchTransition { step, action } => {
                write!(f, "cannot {action} from the {step} step")
            }
        }
    }
}

/// Why an event was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Completion for an upload attempt that has since been superseded or cancelled.
    StaleUpload,
    /// Module already active.
    AlreadyActive,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Outcome {
    /// The active module moved to another step.
    Advanced { from: WizardStep, to: WizardStep },
    /// State changed without a step change.
    Stayed,
    /// The transition was refused; the user must take a corrective action.
    Blocked { blocker: Blocker },
    Ignored { reason: IgnoreReason },
}

impl Outcome {
    pub fn blocked(blocker: Blocker) -> Self {
        Self::Blocked { blocker }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    pub fn blocker(&self) -> Option<&Blocker> {
        match self {
            Self::Blocked { blocker } => Some(blocker),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advanced { from, to } => write!(f, "{from} -> {to}"),
            Self::Stayed => f.write_str("updated"),
            Self::Blocked { blocker } => write!(f, "blocked: {blocker}"),
            Self::Ignored { reason } => write!(f, "ignored ({reason:?})"),
        }
    }
}

/// Next state plus what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: WizardState,
    pub outcome: Outcome,
}

impl Transition {
    fn new(state: WizardState, outcome: Outcome) -> Self {
        Self { state, outcome }
    }
}

/// Blocker for Mapping → Validation under `gate`, if any.
pub fn mapping_blocker(
    module: Module,
    mappings: &[FieldMapping],
    gate: MappingGate,
) -> Option<Blocker> {
    let mapped = MappingTally::of(mappings).mapped;
    let unresolved_required = match gate {
        MappingGate::AnyMapped => Vec::new(),
        MappingGate::RequiredResolved => unresolved_required(module, mappings),
    };
    if mapped == 0 || !unresolved_required.is_empty() {
        return Some(Blocker::MappingIncomplete {
            mapped,
            unresolved_required,
        });
    }
    None
}

/// Required canonical fields with no fully mapped source column.
pub fn unresolved_required(module: Module, mappings: &[FieldMapping]) -> Vec<String> {
    module
        .required_fields()
        .filter(|field| {
            !mappings.iter().any(|m| {
                m.is_mapped()
                    && m.mapped_field
                        .as_deref()
                        .is_some_and(|target| target.eq_ignore_ascii_case(field.name))
            })
        })
        .map(|field| field.name.to_string())
        .collect()
}

fn no_such_transition(state: WizardState, action: Action) -> Transition {
    let step = state.current_step();
    Transition::new(
        state,
        Outcome::blocked(Blocker::NoSuchTransition { step, action }),
    )
}

fn advance(mut state: WizardState, to: WizardStep) -> Transition {
    let progress = state.active_progress_mut();
    let from = progress.step;
    progress.step = to;
    Transition::new(state, Outcome::Advanced { from, to })
}

fn upload_failed(mut state: WizardState, module: Module, failure: UploadFailure) -> Transition {
    let progress = state.progress_mut(module);
    progress.upload = UploadStatus::Error;
    progress.pending_attempt = None;
    progress.upload_failure = Some(failure.clone());
    Transition::new(state, Outcome::blocked(Blocker::UploadFailure { failure }))
}

/// Apply `event` to `state`.
pub fn transition(mut state: WizardState, event: Event, gate: MappingGate) -> Transition {
    let action = event.action();
    match event {
        Event::SelectModule(module) => {
            if state.active() == module {
                return Transition::new(
                    state,
                    Outcome::Ignored {
                        reason: IgnoreReason::AlreadyActive,
                    },
                );
            }
            state.set_active(module);
            Transition::new(state, Outcome::Stayed)
        }

        Event::UploadStarted {
            module,
            attempt,
            file_name,
        } => {
            let progress = state.progress_mut(module);
            if progress.step != WizardStep::Upload {
                let step = progress.step;
                return Transition::new(
                    state,
                    Outcome::blocked(Blocker::NoSuchTransition { step, action }),
                );
            }
            progress.upload = UploadStatus::Uploading;
            progress.pending_attempt = Some(attempt);
            progress.file_name = Some(file_name);
            progress.upload_failure = None;
            Transition::new(state, Outcome::Stayed)
        }

        Event::UploadSucceeded {
            module,
            attempt,
            report,
        } => {
            let progress = state.progress_mut(module);
            if !awaiting(progress, attempt) {
                return stale(state);
            }
            if let Err(error) = report.check_invariants() {
                return upload_failed(state, module, UploadFailure::Rejected(error.to_string()));
            }
            let progress = state.progress_mut(module);
            progress.upload = UploadStatus::Success;
            progress.pending_attempt = None;
            progress.field_count = report.field_count;
            progress.mappings = report.mappings;
            progress.findings = None;
            progress.mapping_fault = None;
            progress.step = WizardStep::Mapping;
            if module == state.active() {
                Transition::new(
                    state,
                    Outcome::Advanced {
                        from: WizardStep::Upload,
                        to: WizardStep::Mapping,
                    },
                )
            } else {
                Transition::new(state, Outcome::Stayed)
            }
        }

        Event::UploadFailed {
            module,
            attempt,
            failure,
        } => {
            if !awaiting(state.progress(module), attempt) {
                return stale(state);
            }
            upload_failed(state, module, failure)
        }

        Event::UploadCancelled { module, attempt } => {
            let progress = state.progress_mut(module);
            if !awaiting(progress, attempt) {
                return stale(state);
            }
            progress.upload = UploadStatus::Idle;
            progress.pending_attempt = None;
            progress.file_name = None;
            Transition::new(state, Outcome::Stayed)
        }

        Event::MappingResolved(mapping) => {
            if state.current_step() != WizardStep::Mapping {
                return no_such_transition(state, action);
            }
            let progress = state.active_progress_mut();
            let Some(slot) = progress.mappings.iter_mut().find(|m| m.id == mapping.id) else {
                return Transition::new(
                    state,
                    Outcome::blocked(Blocker::UnknownMapping {
                        mapping_id: mapping.id,
                    }),
                );
            };
            *slot = mapping;
            progress.findings = None;
            progress.mapping_fault = None;
            Transition::new(state, Outcome::Stayed)
        }

        Event::MappingSaveFailed { mapping_id, reason } => {
            if state.current_step() != WizardStep::Mapping {
                return no_such_transition(state, action);
            }
            state.active_progress_mut().mapping_fault = Some(format!("{mapping_id}: {reason}"));
            Transition::new(
                state,
                Outcome::blocked(Blocker::MappingRejected { mapping_id, reason }),
            )
        }

        Event::ValidateAndContinue { findings } => {
            if state.current_step() != WizardStep::Mapping {
                return no_such_transition(state, action);
            }
            let module = state.active();
            if let Some(blocker) =
                mapping_blocker(module, &state.active_progress().mappings, gate)
            {
                return Transition::new(state, Outcome::blocked(blocker));
            }
            let progress = state.active_progress_mut();
            progress.findings = Some(findings);
            progress.mapping_fault = None;
            advance(state, WizardStep::Validation)
        }

        Event::ContinueToSummary => {
            if state.current_step() != WizardStep::Validation {
                return no_such_transition(state, action);
            }
            let counts = FindingCounts::of(state.active_progress().findings());
            if counts.blocks_summary() {
                return Transition::new(
                    state,
                    Outcome::blocked(Blocker::ValidationBlocking {
                        errors: counts.errors,
                    }),
                );
            }
            state.active_progress_mut().commit_fault = None;
            advance(state, WizardStep::Summary)
        }

        Event::Back => match state.current_step().previous() {
            Some(previous) => {
                state.active_progress_mut().commit_fault = None;
                advance(state, previous)
            }
            None => no_such_transition(state, action),
        },

        Event::CommitFailed { reason } => {
            if state.current_step() != WizardStep::Summary {
                return no_such_transition(state, action);
            }
            state.active_progress_mut().commit_fault = Some(reason.clone());
            Transition::new(state, Outcome::blocked(Blocker::CommitFailure { reason }))
        }

        Event::Finalize => {
            if state.current_step() != WizardStep::Summary {
                return no_such_transition(state, action);
            }
            let fresh = state.reset();
            Transition::new(
                fresh,
                Outcome::Advanced {
                    from: WizardStep::Summary,
                    to: WizardStep::Upload,
                },
            )
        }
    }
}

fn awaiting(progress: &crate::state::ModuleProgress, attempt: UploadAttempt) -> bool {
    progress.step == WizardStep::Upload && progress.pending_attempt == Some(attempt)
}

fn stale(state: WizardState) -> Transition {
    Transition::new(
        state,
        Outcome::Ignored {
            reason: IgnoreReason::StaleUpload,
        },
    )
}

//! Import session: wires the state machine to its collaborators.

use chrono::Utc;
use intake_model::{
    Module, SessionContext, StepDescriptor, SummaryReport, UploadFailure, UploadFile, WizardStep,
};
use tracing::{debug, info, info_span, warn};

use crate::catalog::CatalogResolver;
use crate::collaborator::{ImportCommitter, Ingestor, MappingResolver, ValidationEngine};
use crate::error::MappingError;
use crate::machine::{Action, Blocker, Event, MappingGate, Outcome, mapping_blocker, transition};
use crate::state::WizardState;
use crate::tracker::{NavigationControls, controls, describe_steps};
use crate::upload::{UploadCompletion, UploadSupervisor};

/// One user's pass through the import wizard.
///
/// Owns the wizard state and applies every action through [`transition`].
/// Uploads run as Tokio tasks; their results are folded in by
/// [`ImportSession::next_upload_completion`].
pub struct ImportSession<I, C> {
    context: SessionContext,
    state: WizardState,
    gate: MappingGate,
    uploads: UploadSupervisor<I>,
    resolver: Box<dyn MappingResolver>,
    validator: Box<dyn ValidationEngine>,
    committer: C,
}

impl<I: Ingestor, C: ImportCommitter> ImportSession<I, C> {
    pub fn new(
        context: SessionContext,
        ingestor: I,
        validator: impl ValidationEngine + 'static,
        committer: C,
    ) -> Self {
        Self {
            context,
            state: WizardState::default(),
            gate: MappingGate::default(),
            uploads: UploadSupervisor::new(ingestor),
            resolver: Box::new(CatalogResolver),
            validator: Box::new(validator),
            committer,
        }
    }

    pub fn with_resolver(mut self, resolver: impl MappingResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_gate(mut self, gate: MappingGate) -> Self {
        self.gate = gate;
        self
    }

    /// Start from a fresh state with `module` as the default.
    pub fn with_default_module(mut self, module: Module) -> Self {
        self.uploads.cancel_all();
        self.state = WizardState::new(module);
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn gate(&self) -> MappingGate {
        self.gate
    }

    pub fn committer(&self) -> &C {
        &self.committer
    }

    pub fn ingestor(&self) -> &I {
        self.uploads.ingestor()
    }

    pub fn active_module(&self) -> Module {
        self.state.active()
    }

    fn apply(&mut self, event: Event) -> Outcome {
        let module = self.state.active();
        let action = event.action();
        let span = info_span!("action", %module, %action);
        let _guard = span.enter();

        let next = transition(self.state.clone(), event, self.gate);
        self.state = next.state;
        match &next.outcome {
            Outcome::Advanced { from, to } => info!(%from, %to, "step changed"),
            Outcome::Stayed => debug!(step = %self.state.current_step(), "state updated"),
            Outcome::Blocked { blocker } => warn!(%blocker, "action refused"),
            Outcome::Ignored { reason } => debug!(?reason, "event ignored"),
        }
        next.outcome
    }

    fn refuse(&self, action: Action) -> Outcome {
        Outcome::blocked(Blocker::NoSuchTransition {
            step: self.state.current_step(),
            action,
        })
    }

    pub fn select_module(&mut self, module: Module) -> Outcome {
        self.apply(Event::SelectModule(module))
    }

    /// Start ingesting `file` for the active module.
    ///
    /// Only allowed on the upload step. A second upload supersedes the first.
    pub fn upload(&mut self, file: UploadFile) -> Outcome {
        if self.state.current_step() != WizardStep::Upload {
            return self.refuse(Action::Upload);
        }
        let module = self.state.active();
        let file_name = file.name.clone();
        let attempt = self.uploads.begin(module, file);
        self.apply(Event::UploadStarted {
            module,
            attempt,
            file_name,
        })
    }

    /// Build an [`UploadFile`] and start ingesting it.
    ///
    /// A file whose format cannot be detected fails the upload step instead.
    pub fn upload_bytes(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        declared_mime: Option<&str>,
    ) -> Outcome {
        match UploadFile::new(name, bytes, declared_mime) {
            Ok(file) => self.upload(file),
            Err(error) => self.fail_upload(name.to_string(), error.into()),
        }
    }

    fn fail_upload(&mut self, file_name: String, failure: UploadFailure) -> Outcome {
        if self.state.current_step() != WizardStep::Upload {
            return self.refuse(Action::Upload);
        }
        let module = self.state.active();
        self.uploads.cancel(module);
        let attempt = self.uploads.reserve_attempt();
        self.apply(Event::UploadStarted {
            module,
            attempt,
            file_name,
        });
        self.apply(Event::UploadFailed {
            module,
            attempt,
            failure,
        })
    }

    /// Abort the active module's in-flight upload.
    pub fn cancel_upload(&mut self) -> Outcome {
        let module = self.state.active();
        match self.uploads.cancel(module) {
            Some(attempt) => self.apply(Event::UploadCancelled { module, attempt }),
            None => self.refuse(Action::Upload),
        }
    }

    pub fn upload_in_flight(&self) -> bool {
        self.uploads.in_flight(self.state.active()).is_some()
    }

    /// Wait for the next upload to finish and fold its result in.
    ///
    /// Returns `None` when no upload is in flight.
    pub async fn next_upload_completion(&mut self) -> Option<Outcome> {
        self.next_settled_upload().await.map(|(_, outcome)| outcome)
    }

    /// Wait until `module`'s in-flight upload finishes.
    ///
    /// Uploads of other modules that finish first are folded in as well.
    /// Returns every settled upload in arrival order, `module`'s last.
    pub async fn await_upload(&mut self, module: Module) -> Vec<(Module, Outcome)> {
        let mut settled = Vec::new();
        while self.uploads.in_flight(module).is_some() {
            let Some(next) = self.next_settled_upload().await else {
                break;
            };
            settled.push(next);
        }
        settled
    }

    async fn next_settled_upload(&mut self) -> Option<(Module, Outcome)> {
        let UploadCompletion {
            module,
            attempt,
            result,
        } = self.uploads.next_completion().await?;
        let ingested = result.is_ok();
        let event = match result {
            Ok(report) => Event::UploadSucceeded {
                module,
                attempt,
                report,
            },
            Err(failure) => Event::UploadFailed {
                module,
                attempt,
                failure,
            },
        };
        let outcome = self.apply(event);
        if ingested && matches!(outcome, Outcome::Advanced { .. } | Outcome::Stayed) {
            self.committer.begin(&self.context, module);
        }
        Some((module, outcome))
    }

    /// Wait for every in-flight upload.
    pub async fn settle_uploads(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_upload_completion().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Point a source column at a canonical field.
    pub fn assign(&mut self, mapping_id: &str, target: &str) -> Outcome {
        if self.state.current_step() != WizardStep::Mapping {
            return self.refuse(Action::AssignMapping);
        }
        let module = self.state.active();
        let resolved = self.resolver.assign_mapping(
            module,
            &self.state.active_progress().mappings,
            mapping_id,
            target,
        );
        match resolved {
            Ok(mapping) => self.apply(Event::MappingResolved(mapping)),
            Err(MappingError::MappingNotFound(id)) => {
                Outcome::blocked(Blocker::UnknownMapping { mapping_id: id })
            }
            Err(error) => self.apply(Event::MappingSaveFailed {
                mapping_id: mapping_id.to_string(),
                reason: error.to_string(),
            }),
        }
    }

    /// Run validation over the current mappings and move to the validation step.
    pub fn validate_and_continue(&mut self) -> Outcome {
        if self.state.current_step() != WizardStep::Mapping {
            return self.refuse(Action::Validate);
        }
        let module = self.state.active();
        let progress = self.state.active_progress();
        let findings = if mapping_blocker(module, &progress.mappings, self.gate).is_none() {
            self.validator.validate(module, &progress.mappings)
        } else {
            Vec::new()
        };
        self.apply(Event::ValidateAndContinue { findings })
    }

    pub fn continue_to_summary(&mut self) -> Outcome {
        self.apply(Event::ContinueToSummary)
    }

    pub fn back(&mut self) -> Outcome {
        self.apply(Event::Back)
    }

    /// Commit the summary and reset the wizard.
    ///
    /// A successful commit resets every module, not only the committed one:
    /// the other module's progress is discarded and its in-flight upload is
    /// aborted. A refused commit keeps the wizard on the summary step with
    /// the step flagged as failed.
    pub fn finalize(&mut self) -> Outcome {
        let Some(report) = self.summary() else {
            return self.apply(Event::Finalize);
        };
        match self.committer.commit(&self.context, &report) {
            Ok(()) => {
                self.uploads.cancel_all();
                self.apply(Event::Finalize)
            }
            Err(error) => self.apply(Event::CommitFailed {
                reason: error.to_string(),
            }),
        }
    }

    pub fn steps(&self) -> [StepDescriptor; 4] {
        describe_steps(&self.state)
    }

    /// Panel the presentation layer should render.
    pub fn panel(&self) -> WizardStep {
        self.state.current_step()
    }

    pub fn controls(&self) -> NavigationControls {
        controls(&self.state, self.gate)
    }

    /// Summary of the active module, available on the summary step.
    pub fn summary(&self) -> Option<SummaryReport> {
        if self.state.current_step() != WizardStep::Summary {
            return None;
        }
        let progress = self.state.active_progress();
        Some(SummaryReport::compile(
            self.state.active(),
            progress.file_name.clone().unwrap_or_default(),
            &progress.mappings,
            progress.findings(),
            Utc::now(),
        ))
    }
}

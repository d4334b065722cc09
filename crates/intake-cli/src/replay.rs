//! Replays a session script against an import session.

use anyhow::Result;
use intake_model::{Module, StepDescriptor, SummaryReport};
use intake_wizard::{ImportCommitter, ImportSession, Outcome};
use tracing::{debug, info_span};

use crate::script::{ScriptAction, ScriptedIngestor, SessionScript};

/// One replayed action and what the tracker showed afterwards.
#[derive(Debug, Clone)]
pub struct ReplayStep {
    pub index: usize,
    pub action: String,
    pub module: Module,
    pub outcome: Outcome,
    pub steps: [StepDescriptor; 4],
    /// The report handed to the committer, for finalize actions.
    pub committed: Option<SummaryReport>,
}

impl ReplayStep {
    pub fn refused(&self) -> bool {
        self.outcome.is_blocked()
    }
}

/// Apply every scripted action in order, waiting for uploads as asked.
///
/// Uploads still in flight when the script ends are awaited before returning.
pub async fn replay<C: ImportCommitter>(
    session: &mut ImportSession<ScriptedIngestor, C>,
    script: &SessionScript,
) -> Result<Vec<ReplayStep>> {
    let mut log = Vec::with_capacity(script.actions.len() + 1);

    if let Some(module) = script.module {
        let outcome = session.select_module(module);
        log.push(record(session, 0, format!("select {module}"), outcome, None));
    }

    for (idx, action) in script.actions.iter().enumerate() {
        let index = idx + 1;
        let span = info_span!("script_action", index, action = %action.label());
        let mut committed = None;
        let outcome = match action {
            ScriptAction::Upload(upload) => {
                let bytes = upload.file_bytes()?;
                let module = session.active_module();
                let started = span.in_scope(|| {
                    session.upload_bytes(&upload.file_name, bytes, upload.mime.as_deref())
                });
                if upload.wait && !started.is_blocked() {
                    let mut own = started;
                    for (settled, outcome) in session.await_upload(module).await {
                        if settled == module {
                            own = outcome;
                        } else {
                            let label = format!("upload finished ({settled})");
                            log.push(record(session, index, label, outcome, None));
                        }
                    }
                    own
                } else {
                    started
                }
            }
            ScriptAction::Cancel => span.in_scope(|| session.cancel_upload()),
            ScriptAction::Assign { mapping_id, target } => {
                span.in_scope(|| session.assign(mapping_id, target))
            }
            ScriptAction::SelectModule { module } => {
                span.in_scope(|| session.select_module(*module))
            }
            ScriptAction::Validate => span.in_scope(|| session.validate_and_continue()),
            ScriptAction::Continue => span.in_scope(|| session.continue_to_summary()),
            ScriptAction::Back => span.in_scope(|| session.back()),
            ScriptAction::Finalize => span.in_scope(|| {
                committed = session.summary();
                let outcome = session.finalize();
                if outcome.is_blocked() {
                    committed = None;
                }
                outcome
            }),
        };
        debug!(index, %outcome, "replayed action");
        log.push(record(session, index, action.label(), outcome, committed));
    }

    for outcome in session.settle_uploads().await {
        let index = log.len();
        log.push(record(session, index, "upload finished".to_string(), outcome, None));
    }
    Ok(log)
}

fn record<C: ImportCommitter>(
    session: &ImportSession<ScriptedIngestor, C>,
    index: usize,
    action: String,
    outcome: Outcome,
    committed: Option<SummaryReport>,
) -> ReplayStep {
    ReplayStep {
        index,
        action,
        module: session.active_module(),
        outcome,
        steps: session.steps(),
        committed,
    }
}

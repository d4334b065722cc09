use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::info_span;

use intake_cli::config::Settings;
use intake_cli::replay::{ReplayStep, replay};
use intake_cli::script::{ScriptedIngestor, load_script};
use intake_model::{FieldMapping, Module, ValidationFinding};
use intake_wizard::{ActivityLedger, ImportSession};

use crate::cli::RunArgs;
use crate::summary::apply_table_style;

/// Everything printed after a replay.
pub struct RunResult {
    pub user: String,
    pub account: String,
    pub active_module: Module,
    pub steps: Vec<ReplayStep>,
    /// Mappings and findings of the active module when the script ended.
    pub mappings: Vec<FieldMapping>,
    pub findings: Vec<ValidationFinding>,
    pub ledger: ActivityLedger,
}

impl RunResult {
    pub fn refused(&self) -> usize {
        self.steps.iter().filter(|s| s.refused()).count()
    }
}

pub fn run_modules() {
    let mut table = Table::new();
    table.set_header(vec!["Module", "Field", "Type", "Required"]);
    apply_table_style(&mut table);
    for module in Module::ALL {
        for field in module.canonical_fields() {
            table.add_row(vec![
                module.id().to_string(),
                field.name.to_string(),
                field.data_type.to_string(),
                if field.required { "yes" } else { "" }.to_string(),
            ]);
        }
    }
    println!("{table}");
}

pub fn run_script(args: &RunArgs, settings: &Settings) -> Result<RunResult> {
    let mut script = load_script(&args.script)?;
    if let Some(module) = args.module {
        script.module = Some(module);
    }
    let span = info_span!("run", script = %args.script.display());
    let _guard = span.enter();

    let context = settings.session_context()?;
    let mut session = ImportSession::new(
        context.clone(),
        ScriptedIngestor,
        settings.validator(),
        ActivityLedger::new(),
    )
    .with_gate(settings.mapping_gate)
    .with_default_module(settings.default_module);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("start async runtime")?;
    let steps = runtime.block_on(replay(&mut session, &script))?;

    let progress = session.state().active_progress();
    Ok(RunResult {
        user: context.user.name,
        account: context.account.as_str().to_string(),
        active_module: session.active_module(),
        steps,
        mappings: progress.mappings.clone(),
        findings: progress.findings().to_vec(),
        ledger: session.committer().clone(),
    })
}

//! CLI argument definitions for the intake driver.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "intake",
    version,
    about = "Intake Studio - replay healthcare data import sessions",
    long_about = "Drive the import wizard (upload, mapping, validation, summary)\n\
                  from a JSON session script and show what each step displays."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow field sample values in trace logs (may contain PHI).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a session script and print the progress tracker after each action.
    Run(RunArgs),

    /// List import modules with their canonical fields.
    Modules,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the JSON session script.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Exit with status 1 if any scripted action was refused.
    #[arg(long = "fail-on-refused")]
    pub fail_on_refused: bool,

    /// Override the module selected at session start.
    #[arg(long = "module", value_name = "MODULE")]
    pub module: Option<intake_model::Module>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

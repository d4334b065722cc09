//! Import wizard core.
//!
//! [`machine::transition`] is the single place wizard state changes. The
//! [`ImportSession`] drives it from user actions and collaborator results,
//! and [`tracker`] derives what the presentation layer shows.

#![deny(unsafe_code)]

pub mod catalog;
pub mod collaborator;
pub mod error;
pub mod ledger;
pub mod machine;
pub mod session;
pub mod state;
pub mod tracker;
pub mod upload;

pub use catalog::CatalogResolver;
pub use collaborator::{ImportCommitter, Ingestor, MappingResolver, ValidationEngine};
pub use error::{CommitError, MappingError};
pub use ledger::ActivityLedger;
pub use machine::{
    Action, Blocker, Event, IgnoreReason, MappingGate, Outcome, Transition, mapping_blocker,
    transition, unresolved_required,
};
pub use session::ImportSession;
pub use state::{ModuleProgress, WizardState};
pub use tracker::{
    Control, NavigationControls, controls, describe_module_steps, describe_steps, step_status,
};
pub use upload::{UploadAttempt, UploadCompletion, UploadSupervisor};

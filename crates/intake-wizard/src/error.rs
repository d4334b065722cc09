//! Error types for collaborator operations.

use intake_model::Module;
use thiserror::Error;

/// Errors from resolving a mapping by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// No mapping with this id in the active module.
    #[error("mapping not found: {0}")]
    MappingNotFound(String),
    /// Target is not one of the module's canonical fields.
    #[error("'{target}' is not a {module} field")]
    UnknownTarget { module: Module, target: String },
    /// Target already carries another source column.
    #[error("field '{target}' is already mapped from '{source_field}'")]
    TargetAlreadyUsed {
        target: String,
        source_field: String,
    },
}

/// Errors from committing a finished import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("commit rejected: {0}")]
    Rejected(String),
    #[error("commit service unavailable")]
    Unavailable,
}

//! Contracts for the collaborators the wizard delegates to.
//!
//! The wizard never parses files, matches fields or persists imports itself.
//! It hands those jobs to implementations of these traits and folds their
//! results back into its state.

use std::future::Future;

use intake_model::{
    FieldMapping, IngestReport, Module, SessionContext, SummaryReport, UploadFailure,
    UploadFile, ValidationFinding,
};

use crate::error::{CommitError, MappingError};

/// Turns an uploaded file into the initial field mappings for a module.
///
/// Runs as a spawned task, so the returned future must be `Send`.
pub trait Ingestor: Send + Sync + 'static {
    fn ingest(
        &self,
        module: Module,
        file: UploadFile,
    ) -> impl Future<Output = Result<IngestReport, UploadFailure>> + Send;
}

/// Resolves an unmapped or partial field when the user picks a target.
pub trait MappingResolver {
    /// Return the updated mapping for `mapping_id` pointed at `target`.
    fn assign_mapping(
        &self,
        module: Module,
        mappings: &[FieldMapping],
        mapping_id: &str,
        target: &str,
    ) -> Result<FieldMapping, MappingError>;
}

/// Produces findings for the current mappings of a module.
pub trait ValidationEngine {
    fn validate(&self, module: Module, mappings: &[FieldMapping]) -> Vec<ValidationFinding>;
}

/// Receives the summary when the user finalizes an import.
pub trait ImportCommitter {
    /// Called once `module`'s upload has been ingested and mapping starts.
    fn begin(&mut self, _context: &SessionContext, _module: Module) {}

    fn commit(&mut self, context: &SessionContext, report: &SummaryReport)
    -> Result<(), CommitError>;
}

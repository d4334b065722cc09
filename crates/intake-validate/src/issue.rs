//! Validation issue types.

use intake_model::{Confidence, DataType, Severity, ValidationFinding};
use serde::Serialize;

/// A problem found in a mapping set, before it is numbered as a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Issue {
    /// A required canonical field has no fully mapped source column.
    RequiredUnmapped { field: String },

    /// The matcher flagged this column as an error.
    MappingError { source_field: String },

    /// More than one column maps onto the same target.
    DuplicateTarget {
        target: String,
        source_fields: Vec<String>,
    },

    /// The column matched a target only partially.
    PartialMatch {
        source_field: String,
        target: String,
    },

    /// The column's data type cannot be stored in the target field.
    DataTypeMismatch {
        source_field: String,
        source_type: DataType,
        target: String,
        expected: DataType,
    },

    /// Match confidence below the configured threshold.
    LowConfidence {
        source_field: String,
        target: String,
        confidence: Confidence,
        threshold: Confidence,
    },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::RequiredUnmapped { .. }
            | Issue::MappingError { .. }
            | Issue::DuplicateTarget { .. } => Severity::Error,
            Issue::PartialMatch { .. } | Issue::DataTypeMismatch { .. } => Severity::Warning,
            Issue::LowConfidence { .. } => Severity::Info,
        }
    }

    /// Field the finding is attached to.
    pub fn field(&self) -> &str {
        match self {
            Issue::RequiredUnmapped { field } => field,
            Issue::DuplicateTarget { target, .. } => target,
            Issue::MappingError { source_field }
            | Issue::PartialMatch { source_field, .. }
            | Issue::DataTypeMismatch { source_field, .. }
            | Issue::LowConfidence { source_field, .. } => source_field,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Issue::RequiredUnmapped { field } => {
                format!("Required field {field} is not mapped")
            }
            Issue::MappingError { source_field } => {
                format!("Column {source_field} could not be mapped")
            }
            Issue::DuplicateTarget {
                target,
                source_fields,
            } => format!(
                "{target} is mapped from {} columns: {}",
                source_fields.len(),
                source_fields.join(", ")
            ),
            Issue::PartialMatch {
                source_field,
                target,
            } => format!("{source_field} only partially matches {target}"),
            Issue::DataTypeMismatch {
                source_field,
                source_type,
                target,
                expected,
            } => format!("{source_field} holds {source_type} values but {target} expects {expected}"),
            Issue::LowConfidence {
                source_field,
                target,
                confidence,
                threshold,
            } => format!(
                "{source_field} maps to {target} with {confidence} confidence (below {threshold})"
            ),
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            Issue::RequiredUnmapped { field } => {
                Some(format!("Map a source column to {field}"))
            }
            Issue::MappingError { .. } => Some("Choose a target field by hand".to_string()),
            Issue::DuplicateTarget { target, .. } => {
                Some(format!("Keep one column mapped to {target}"))
            }
            Issue::PartialMatch { target, .. } => {
                Some(format!("Review the sample data and confirm {target}"))
            }
            Issue::DataTypeMismatch { expected, .. } => {
                Some(format!("Convert values to {expected} before import"))
            }
            Issue::LowConfidence { .. } => None,
        }
    }

    /// Number this issue as finding `index` (1-based): `V001`, `V002`, ...
    pub fn into_finding(self, index: usize) -> ValidationFinding {
        let finding = ValidationFinding::new(
            format!("V{index:03}"),
            self.field(),
            self.severity(),
            self.message(),
        );
        match self.suggestion() {
            Some(suggestion) => finding.with_suggestion(suggestion),
            None => finding,
        }
    }
}

//! Final tally handed to the commit collaborator.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FieldMapping, MappingTally, Module, Severity, ValidationFinding};

/// Summary of one import, built only through [`SummaryReport::compile`].
///
/// `mapped_fields + unmapped_fields == total_fields` holds for every
/// compiled report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total_fields: usize,
    pub mapped_fields: usize,
    pub unmapped_fields: usize,
    pub validations_passed: usize,
    pub validations_failed: usize,
    pub module: Module,
    pub timestamp: DateTime<Utc>,
    pub source_file_name: String,
}

impl SummaryReport {
    /// Tally mappings and findings for `module`.
    ///
    /// A field fails validation when at least one error or warning finding
    /// names it (by source field or mapped target).
    pub fn compile(
        module: Module,
        source_file_name: impl Into<String>,
        mappings: &[FieldMapping],
        findings: &[ValidationFinding],
        timestamp: DateTime<Utc>,
    ) -> Self {
        let tally = MappingTally::of(mappings);
        let failing: BTreeSet<&str> = findings
            .iter()
            .filter(|f| matches!(f.severity, Severity::Error | Severity::Warning))
            .map(|f| f.field.as_str())
            .collect();
        let validations_failed = mappings
            .iter()
            .filter(|m| {
                failing.contains(m.source_field.as_str())
                    || m
                        .mapped_field
                        .as_deref()
                        .is_some_and(|target| failing.contains(target))
            })
            .count();

        Self {
            total_fields: tally.total,
            mapped_fields: tally.mapped,
            unmapped_fields: tally.remaining(),
            validations_passed: tally.total.saturating_sub(validations_failed),
            validations_failed,
            module,
            timestamp,
            source_file_name: source_file_name.into(),
        }
    }

    /// Mapped share of all fields, rounded; 0 when there are no fields.
    pub fn mapping_percentage(&self) -> u8 {
        percentage(self.mapped_fields, self.total_fields).unwrap_or(0)
    }

    /// Passed share of all validations, rounded; 100 when nothing was validated.
    pub fn validation_percentage(&self) -> u8 {
        percentage(
            self.validations_passed,
            self.validations_passed + self.validations_failed,
        )
        .unwrap_or(100)
    }
}

fn percentage(part: usize, whole: usize) -> Option<u8> {
    if whole == 0 {
        return None;
    }
    let rounded = (part as f64 / whole as f64 * 100.0).round();
    Some(rounded.clamp(0.0, 100.0) as u8)
}

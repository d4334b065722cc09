use intake_model::{Confidence, FieldMapping, Module, ValidationFinding};
use intake_wizard::ValidationEngine;
use tracing::debug;

use crate::checks;
use crate::issue::Issue;

/// Confidence below which a match is reported as informational.
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: Confidence = Confidence::clamped(80);

/// Baseline validation engine built from mapping-level checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleValidator {
    low_confidence_threshold: Confidence,
}

impl Default for RuleValidator {
    fn default() -> Self {
        Self {
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_low_confidence_threshold(mut self, threshold: Confidence) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }

    pub fn low_confidence_threshold(&self) -> Confidence {
        self.low_confidence_threshold
    }

    /// Raw issues, in check order.
    pub fn issues(&self, module: Module, mappings: &[FieldMapping]) -> Vec<Issue> {
        checks::run_all(module, mappings, self.low_confidence_threshold)
    }
}

impl ValidationEngine for RuleValidator {
    fn validate(&self, module: Module, mappings: &[FieldMapping]) -> Vec<ValidationFinding> {
        let findings: Vec<ValidationFinding> = self
            .issues(module, mappings)
            .into_iter()
            .enumerate()
            .map(|(idx, issue)| issue.into_finding(idx + 1))
            .collect();
        debug!(%module, mappings = mappings.len(), findings = findings.len(), "validated mappings");
        findings
    }
}

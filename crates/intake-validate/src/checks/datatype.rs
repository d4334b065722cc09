//! Data type compatibility checks.
//!
//! A column's detected type must fit the canonical field's expected type.
//! Targets outside the module catalog are left to the other checks.

use intake_model::{FieldMapping, Module};

use super::target;
use crate::issue::Issue;

pub fn check(module: Module, mappings: &[FieldMapping]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for mapping in mappings {
        let Some(target) = target(mapping) else {
            continue;
        };
        let Some(field) = module.canonical_field(target) else {
            continue;
        };
        if mapping.data_type.fits(field.data_type) {
            continue;
        }
        issues.push(Issue::DataTypeMismatch {
            source_field: mapping.source_field.clone(),
            source_type: mapping.data_type,
            target: field.name.to_string(),
            expected: field.data_type,
        });
    }

    issues
}

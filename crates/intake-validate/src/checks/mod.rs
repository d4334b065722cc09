//! Validation check modules.
//!
//! Each module performs one kind of check over a module's mappings.

mod confidence;
mod datatype;
mod duplicate;
mod partial;
mod required;
mod status;

use intake_model::{Confidence, FieldMapping, Module};

use crate::issue::Issue;

/// Run all checks in order.
pub fn run_all(module: Module, mappings: &[FieldMapping], threshold: Confidence) -> Vec<Issue> {
    let mut issues = Vec::new();

    // 1. Required canonical fields must be mapped
    issues.extend(required::check(module, mappings));

    // 2. Columns the matcher could not place
    issues.extend(status::check(mappings));

    // 3. One column per target
    issues.extend(duplicate::check(mappings));

    // 4. Partial matches need review
    issues.extend(partial::check(mappings));

    // 5. Source type must fit the target type
    issues.extend(datatype::check(module, mappings));

    // 6. Low-confidence matches
    issues.extend(confidence::check(mappings, threshold));

    issues
}

/// Target of a mapping that carries one (mapped or partial).
fn target(mapping: &FieldMapping) -> Option<&str> {
    mapping.mapped_field.as_deref()
}

//! Target uniqueness checks.

use std::collections::BTreeMap;

use intake_model::FieldMapping;

use super::target;
use crate::issue::Issue;

/// Report targets that more than one mapped or partial column points at.
///
/// Targets compare case-insensitively; the report uses the first spelling seen.
pub fn check(mappings: &[FieldMapping]) -> Vec<Issue> {
    let mut by_target: BTreeMap<String, (String, Vec<String>)> = BTreeMap::new();
    for mapping in mappings {
        let Some(target) = target(mapping) else {
            continue;
        };
        by_target
            .entry(target.to_ascii_lowercase())
            .or_insert_with(|| (target.to_string(), Vec::new()))
            .1
            .push(mapping.source_field.clone());
    }

    by_target
        .into_values()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(target, source_fields)| Issue::DuplicateTarget {
            target,
            source_fields,
        })
        .collect()
}

use intake_model::{FieldMapping, MappingStatus};

use super::target;
use crate::issue::Issue;

pub fn check(mappings: &[FieldMapping]) -> Vec<Issue> {
    mappings
        .iter()
        .filter(|m| m.status == MappingStatus::Partial)
        .filter_map(|m| {
            target(m).map(|target| Issue::PartialMatch {
                source_field: m.source_field.clone(),
                target: target.to_string(),
            })
        })
        .collect()
}

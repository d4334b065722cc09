use intake_model::{FieldMapping, MappingStatus};

use crate::issue::Issue;

pub fn check(mappings: &[FieldMapping]) -> Vec<Issue> {
    mappings
        .iter()
        .filter(|m| m.status == MappingStatus::Error)
        .map(|m| Issue::MappingError {
            source_field: m.source_field.clone(),
        })
        .collect()
}

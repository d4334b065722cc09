use intake_model::{Confidence, FieldMapping};

use super::target;
use crate::issue::Issue;

/// Matches with a known confidence strictly below `threshold`.
pub fn check(mappings: &[FieldMapping], threshold: Confidence) -> Vec<Issue> {
    mappings
        .iter()
        .filter_map(|m| {
            let confidence = m.confidence?;
            let target = target(m)?;
            (confidence < threshold).then(|| Issue::LowConfidence {
                source_field: m.source_field.clone(),
                target: target.to_string(),
                confidence,
                threshold,
            })
        })
        .collect()
}

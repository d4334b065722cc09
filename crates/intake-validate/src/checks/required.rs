//! Required canonical field checks.

use intake_model::{FieldMapping, Module};
use intake_wizard::unresolved_required;

use crate::issue::Issue;

/// Every required field of `module` must be the target of a mapped column.
///
/// A partial match does not count.
pub fn check(module: Module, mappings: &[FieldMapping]) -> Vec<Issue> {
    unresolved_required(module, mappings)
        .into_iter()
        .map(|field| Issue::RequiredUnmapped { field })
        .collect()
}

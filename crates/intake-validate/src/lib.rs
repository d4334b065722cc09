//! Rule-based validation of field mappings.
//!
//! [`RuleValidator`] implements the wizard's validation engine contract.
//! Each check lives in its own module under `checks`; issues are numbered
//! into findings (`V001`, `V002`, ...) in check order.

mod checks;
mod issue;
mod validator;

pub use issue::Issue;
pub use validator::{DEFAULT_LOW_CONFIDENCE_THRESHOLD, RuleValidator};

//! Data contracts shared by the import wizard, its collaborators and the CLI.

#![deny(unsafe_code)]

pub mod activity;
pub mod error;
pub mod finding;
pub mod mapping;
pub mod module;
pub mod session;
pub mod step;
pub mod summary;
pub mod upload;

pub use activity::{Activity, ActivityStatus};
pub use error::{ModelError, Result};
pub use finding::{FindingCounts, Severity, ValidationFinding};
pub use mapping::{Confidence, FieldMapping, MappingStatus, MappingTally};
pub use module::{CanonicalField, DataType, Module, StepLabels};
pub use session::{AccountNumber, SessionContext, UserProfile, UserRole};
pub use step::{StepDescriptor, StepStatus, UploadStatus, WizardStep};
pub use summary::SummaryReport;
pub use upload::{FileFormat, IngestReport, UploadFailure, UploadFile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_counts_by_severity() {
        let findings = vec![
            ValidationFinding::new("V001", "billing_code", Severity::Error, "Required"),
            ValidationFinding::new("V002", "service_desc", Severity::Warning, "Partial"),
            ValidationFinding::new("V003", "copay_amount", Severity::Info, "Low confidence"),
            ValidationFinding::new("V004", "provider_rate", Severity::Warning, "Partial"),
        ];
        let counts = FindingCounts::of(&findings);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.warnings, 2);
        assert_eq!(counts.infos, 1);
        assert!(counts.blocks_summary());
    }

    #[test]
    fn session_context_serializes() {
        let ctx = SessionContext::new(
            UserProfile {
                name: "Dr. Sarah Wilson".to_string(),
                email: "admin@example.com".to_string(),
                role: UserRole::Administrator,
            },
            AccountNumber::new("ACC-2024-001").unwrap(),
        );
        let json = serde_json::to_string(&ctx).expect("serialize context");
        let round: SessionContext = serde_json::from_str(&json).expect("deserialize context");
        assert_eq!(round.account.as_str(), "ACC-2024-001");
        assert!(serde_json::from_str::<AccountNumber>("\"  \"").is_err());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountNumber, Module, SummaryReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    Completed,
    InProgress,
    Pending,
}

/// A processing activity for one account and module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub account_number: AccountNumber,
    pub module: Module,
    pub status: ActivityStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: usize,
    pub description: String,
    pub summary: Option<SummaryReport>,
}

impl Activity {
    /// A pending activity with nothing processed yet.
    pub fn opened(
        account_number: AccountNumber,
        module: Module,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_number,
            module,
            status: ActivityStatus::Pending,
            created_at,
            completed_at: None,
            records_processed: 0,
            description: module.description().to_string(),
            summary: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status != ActivityStatus::Completed
    }

    /// Mark the activity completed with the committed `report`.
    pub fn complete(&mut self, report: SummaryReport, completed_at: DateTime<Utc>) {
        self.status = ActivityStatus::Completed;
        self.completed_at = Some(completed_at);
        self.records_processed = report.total_fields;
        self.summary = Some(report);
    }
}

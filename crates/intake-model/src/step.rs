use std::fmt;

use serde::{Deserialize, Serialize};

/// The four stages of the import flow, in order.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Upload,
    Mapping,
    Validation,
    Summary,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        Self::Upload,
        Self::Mapping,
        Self::Validation,
        Self::Summary,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::Upload => 0,
            Self::Mapping => 1,
            Self::Validation => 2,
            Self::Summary => 3,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Mapping => "mapping",
            Self::Validation => "validation",
            Self::Summary => "summary",
        }
    }

    /// Step reached by an explicit "back" action, if any.
    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            Self::Validation => Some(Self::Mapping),
            Self::Summary => Some(Self::Validation),
            Self::Upload | Self::Mapping => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Display status of one step on the progress tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
    Error,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Current => "current",
            Self::Pending => "pending",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the presentation layer renders for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub id: WizardStep,
    pub title: String,
    pub description: String,
    pub status: StepStatus,
}

/// Status of the upload operation while the upload step is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

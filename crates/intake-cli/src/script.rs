//! Session scripts: a JSON list of wizard actions to replay.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use intake_model::{FieldMapping, IngestReport, Module, UploadFailure, UploadFile};
use intake_wizard::Ingestor;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::logging::redact_value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScript {
    /// Module to select before the first action.
    #[serde(default)]
    pub module: Option<Module>,
    pub actions: Vec<ScriptAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Upload(UploadAction),
    /// Cancel the active module's in-flight upload.
    Cancel,
    Assign {
        mapping_id: String,
        target: String,
    },
    SelectModule {
        module: Module,
    },
    Validate,
    Continue,
    Back,
    Finalize,
}

impl ScriptAction {
    pub fn label(&self) -> String {
        match self {
            Self::Upload(upload) => format!("upload {}", upload.file_name),
            Self::Cancel => "cancel upload".to_string(),
            Self::Assign { mapping_id, target } => format!("assign {mapping_id} -> {target}"),
            Self::SelectModule { module } => format!("select {module}"),
            Self::Validate => "validate & continue".to_string(),
            Self::Continue => "continue to summary".to_string(),
            Self::Back => "back".to_string(),
            Self::Finalize => "finalize".to_string(),
        }
    }
}

/// An upload and the ingestion result it should produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAction {
    pub file_name: String,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldMapping>,
    /// Defaults to the number of `fields`.
    #[serde(default)]
    pub field_count: Option<usize>,
    /// Makes ingestion fail with this reason.
    #[serde(default)]
    pub failure: Option<String>,
    /// Simulated ingestion time.
    #[serde(default)]
    pub delay_ms: u64,
    /// Wait for ingestion before the next action.
    #[serde(default = "default_wait")]
    pub wait: bool,
}

fn default_wait() -> bool {
    true
}

impl UploadAction {
    pub fn plan(&self) -> IngestPlan {
        let result = match &self.failure {
            Some(reason) => Err(reason.clone()),
            None => Ok(IngestReport {
                field_count: self.field_count.unwrap_or(self.fields.len()),
                mappings: self.fields.clone(),
            }),
        };
        IngestPlan {
            delay_ms: self.delay_ms,
            result,
        }
    }

    /// File content carrying the ingestion plan for [`ScriptedIngestor`].
    pub fn file_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.plan()).context("encode upload plan")
    }
}

/// What [`ScriptedIngestor`] reports for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestPlan {
    pub delay_ms: u64,
    pub result: Result<IngestReport, String>,
}

/// Ingestor that reads the ingestion result from the uploaded file itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptedIngestor;

impl Ingestor for ScriptedIngestor {
    async fn ingest(&self, module: Module, file: UploadFile) -> Result<IngestReport, UploadFailure> {
        if file.bytes.is_empty() {
            return Err(UploadFailure::Empty);
        }
        let plan: IngestPlan = serde_json::from_slice(&file.bytes)
            .map_err(|error| UploadFailure::Rejected(format!("unreadable upload: {error}")))?;
        if plan.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(plan.delay_ms)).await;
        }
        let report = plan.result.map_err(UploadFailure::Rejected)?;
        for mapping in &report.mappings {
            trace!(
                %module,
                source = %mapping.source_field,
                sample = redact_value(mapping.sample_data.as_deref().unwrap_or_default()),
                "ingested field"
            );
        }
        Ok(report)
    }
}

pub fn load_script(path: &Path) -> Result<SessionScript> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read script {}", path.display()))?;
    parse_script(&content).with_context(|| format!("parse script {}", path.display()))
}

pub fn parse_script(content: &str) -> Result<SessionScript, serde_json::Error> {
    serde_json::from_str(content)
}

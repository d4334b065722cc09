//! Upload inputs and ingestion results.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FieldMapping, ModelError};

/// File formats accepted by the upload step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
    Json,
}

impl FileFormat {
    pub const ALL: [FileFormat; 4] = [Self::Csv, Self::Xlsx, Self::Xls, Self::Json];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Json => "json",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "application/json" => Some(Self::Json),
            "application/vnd.ms-excel" => Some(Self::Xls),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Xlsx)
            }
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A file submitted once per upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: FileFormat,
}

impl UploadFile {
    /// Build an upload from its name, content and optional declared MIME type.
    ///
    /// A recognised MIME type wins; otherwise the extension decides.
    pub fn new(
        name: impl Into<String>,
        bytes: Vec<u8>,
        declared_mime: Option<&str>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyFileName);
        }
        let format = declared_mime
            .and_then(FileFormat::from_mime)
            .or_else(|| {
                Path::new(&name)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(FileFormat::from_extension)
            })
            .ok_or_else(|| ModelError::UnsupportedFormat(name.clone()))?;
        Ok(Self {
            name,
            bytes,
            format,
        })
    }
}

/// What the ingestion collaborator reports for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of fields found in the file.
    pub field_count: usize,
    /// Initial mappings for the module, as resolved by the matching collaborator.
    pub mappings: Vec<FieldMapping>,
}

impl IngestReport {
    pub fn from_mappings(mappings: Vec<FieldMapping>) -> Self {
        Self {
            field_count: mappings.len(),
            mappings,
        }
    }

    /// First mapping that breaks the status/target/confidence invariants.
    pub fn check_invariants(&self) -> Result<(), ModelError> {
        self.mappings
            .iter()
            .try_for_each(FieldMapping::check_invariants)
    }
}

/// Why an upload attempt did not produce an [`IngestReport`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum UploadFailure {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("file is empty")]
    Empty,
    #[error("{0}")]
    Rejected(String),
    #[error("upload was interrupted")]
    Interrupted,
}

impl From<ModelError> for UploadFailure {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::UnsupportedFormat(name) => Self::UnsupportedFormat(name),
            other => Self::Rejected(other.to_string()),
        }
    }
}

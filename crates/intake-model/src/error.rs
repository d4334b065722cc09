use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown module: {0}")]
    UnknownModule(String),
    #[error("confidence must be between 0 and 100, got {0}")]
    InvalidConfidence(u32),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("file name must not be empty")]
    EmptyFileName,
    #[error("account number must not be empty")]
    EmptyAccountNumber,
    #[error("mapping {id}: {reason}")]
    MappingInvariant { id: String, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, ModelError>;

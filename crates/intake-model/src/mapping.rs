//! Source column to canonical field mappings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DataType, ModelError};

/// Resolution state of one source column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    Mapped,
    Partial,
    #[default]
    Unmapped,
    Error,
}

impl MappingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mapped => "mapped",
            Self::Partial => "partial",
            Self::Unmapped => "unmapped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match confidence as a whole percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Confidence(u8);

impl Confidence {
    /// Confidence assigned to a manual resolution.
    pub const CERTAIN: Confidence = Confidence(100);

    pub fn new(value: u32) -> Result<Self, ModelError> {
        if value > 100 {
            return Err(ModelError::InvalidConfidence(value));
        }
        Ok(Self(value as u8))
    }

    /// Values above 100 are capped.
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Confidence {
    type Error = ModelError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for u32 {
    fn from(value: Confidence) -> Self {
        u32::from(value.0)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// One source column and its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub id: String,
    pub source_field: String,
    #[serde(default)]
    pub mapped_field: Option<String>,
    #[serde(default)]
    pub status: MappingStatus,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    pub data_type: DataType,
    #[serde(default)]
    pub sample_data: Option<String>,
}

impl FieldMapping {
    /// A column with no target.
    pub fn unmapped(
        id: impl Into<String>,
        source_field: impl Into<String>,
        data_type: DataType,
        sample_data: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_field: source_field.into(),
            mapped_field: None,
            status: MappingStatus::Unmapped,
            confidence: None,
            data_type,
            sample_data,
        }
    }

    /// A column resolved to `target`; `partial` marks a match that still needs review.
    pub fn resolved(
        mut self,
        target: impl Into<String>,
        confidence: Confidence,
        partial: bool,
    ) -> Self {
        self.mapped_field = Some(target.into());
        self.confidence = Some(confidence);
        self.status = if partial {
            MappingStatus::Partial
        } else {
            MappingStatus::Mapped
        };
        self
    }

    /// Drop any resolution and return the column to unmapped.
    pub fn cleared(mut self) -> Self {
        self.mapped_field = None;
        self.confidence = None;
        self.status = MappingStatus::Unmapped;
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.status == MappingStatus::Mapped
    }

    /// Check the status/target/confidence invariants.
    pub fn check_invariants(&self) -> Result<(), ModelError> {
        let invariant = |reason| {
            Err(ModelError::MappingInvariant {
                id: self.id.clone(),
                reason,
            })
        };
        match self.status {
            MappingStatus::Mapped if self.mapped_field.is_none() => {
                invariant("mapped status requires a mapped field")
            }
            MappingStatus::Unmapped if self.mapped_field.is_some() => {
                invariant("unmapped status must not carry a mapped field")
            }
            MappingStatus::Unmapped | MappingStatus::Error if self.confidence.is_some() => {
                invariant("confidence is only meaningful for mapped or partial fields")
            }
            _ => Ok(()),
        }
    }
}

/// Counts of a mapping set by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingTally {
    pub total: usize,
    pub mapped: usize,
    pub partial: usize,
    pub errored: usize,
}

impl MappingTally {
    pub fn of(mappings: &[FieldMapping]) -> Self {
        let mut tally = Self {
            total: mappings.len(),
            ..Self::default()
        };
        for mapping in mappings {
            match mapping.status {
                MappingStatus::Mapped => tally.mapped += 1,
                MappingStatus::Partial => tally.partial += 1,
                MappingStatus::Error => tally.errored += 1,
                MappingStatus::Unmapped => {}
            }
        }
        tally
    }

    /// Everything not fully mapped, partial and errored included.
    pub fn remaining(&self) -> usize {
        self.total - self.mapped
    }
}

//! Import modules and their canonical target fields.
//!
//! Each module is a closed variant carrying its own field catalog and step
//! labels, so per-module behaviour is selected with an exhaustive `match`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Data type of a source column or canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Number,
    Text,
    Date,
    Email,
    Currency,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Text => "TEXT",
            Self::Date => "DATE",
            Self::Email => "EMAIL",
            Self::Currency => "CURRENCY",
        }
    }

    /// Returns true if values of `self` can be stored in a field typed `target`.
    ///
    /// Text accepts anything; numbers fit currency fields and vice versa.
    pub fn fits(&self, target: DataType) -> bool {
        match (self, target) {
            (_, DataType::Text) => true,
            (DataType::Number | DataType::Currency, DataType::Number | DataType::Currency) => {
                true
            }
            (source, target) => *source == target,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target field that source columns are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanonicalField {
    pub name: &'static str,
    pub data_type: DataType,
    pub required: bool,
}

const fn field(name: &'static str, data_type: DataType, required: bool) -> CanonicalField {
    CanonicalField {
        name,
        data_type,
        required,
    }
}

const PATIENT_MASTER_FIELDS: [CanonicalField; 10] = [
    field("Patient ID", DataType::Number, true),
    field("First Name", DataType::Text, true),
    field("Last Name", DataType::Text, true),
    field("Date of Birth", DataType::Date, true),
    field("Phone", DataType::Text, false),
    field("Email", DataType::Email, false),
    field("Address", DataType::Text, false),
    field("Insurance Number", DataType::Text, false),
    field("Emergency Contact", DataType::Text, false),
    field("Medical Record Number", DataType::Text, false),
];

const FEE_STRUCTURE_FIELDS: [CanonicalField; 10] = [
    field("Procedure Code", DataType::Text, true),
    field("Fee Amount", DataType::Currency, true),
    field("Service Description", DataType::Text, false),
    field("Copay Amount", DataType::Currency, false),
    field("Provider Rate", DataType::Currency, false),
    field("Insurance Rate", DataType::Currency, false),
    field("Deductible Amount", DataType::Currency, false),
    field("Billing Code", DataType::Text, true),
    field("Modifier Code", DataType::Text, false),
    field("Payment Terms", DataType::Text, false),
];

/// Titles shown on the progress tracker plus the idle upload prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLabels {
    pub upload: &'static str,
    pub mapping: &'static str,
    pub validation: &'static str,
    pub summary: &'static str,
    pub upload_prompt: &'static str,
}

/// The dataset being imported.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Module {
    #[default]
    PatientMaster,
    FeeStructure,
}

impl Module {
    /// All modules in sidebar order.
    pub const ALL: [Module; 2] = [Self::PatientMaster, Self::FeeStructure];

    pub fn id(&self) -> &'static str {
        match self {
            Self::PatientMaster => "patient-master",
            Self::FeeStructure => "fee-structure",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PatientMaster => "Patient Master",
            Self::FeeStructure => "Fee Structure",
        }
    }

    /// Label used on the summary screen.
    pub fn data_label(&self) -> &'static str {
        match self {
            Self::PatientMaster => "Patient Master Data",
            Self::FeeStructure => "Fee Structure Data",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::PatientMaster => "Patient demographic data mapping and validation",
            Self::FeeStructure => "Billing and fee structure configuration",
        }
    }

    pub fn canonical_fields(&self) -> &'static [CanonicalField] {
        match self {
            Self::PatientMaster => &PATIENT_MASTER_FIELDS,
            Self::FeeStructure => &FEE_STRUCTURE_FIELDS,
        }
    }

    pub fn step_labels(&self) -> StepLabels {
        match self {
            Self::PatientMaster => StepLabels {
                upload: "Data Upload",
                mapping: "Auto Mapping",
                validation: "Validation",
                summary: "Summary",
                upload_prompt: "Select and upload your patient data file",
            },
            Self::FeeStructure => StepLabels {
                upload: "Data Upload",
                mapping: "Auto Mapping",
                validation: "Validation",
                summary: "Summary",
                upload_prompt: "Select and upload your fee schedule file",
            },
        }
    }

    /// Case-insensitive lookup of a canonical field by name.
    pub fn canonical_field(&self, name: &str) -> Option<&'static CanonicalField> {
        let name = name.trim();
        self.canonical_fields()
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static CanonicalField> {
        self.canonical_fields().iter().filter(|f| f.required)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Module {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "patient-master" => Ok(Self::PatientMaster),
            "fee-structure" => Ok(Self::FeeStructure),
            _ => Err(ModelError::UnknownModule(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_ids_round_trip() {
        for module in Module::ALL {
            assert_eq!(module.id().parse::<Module>().unwrap(), module);
        }
        assert_eq!(
            "FEE_STRUCTURE".parse::<Module>().unwrap(),
            Module::FeeStructure
        );
        assert!("insurance-claims".parse::<Module>().is_err());
    }

    #[test]
    fn canonical_lookup_ignores_case() {
        let field = Module::FeeStructure.canonical_field("billing code").unwrap();
        assert_eq!(field.name, "Billing Code");
        assert!(field.required);
        assert!(Module::PatientMaster.canonical_field("Billing Code").is_none());
    }

    #[test]
    fn numeric_types_fit_currency() {
        assert!(DataType::Number.fits(DataType::Currency));
        assert!(DataType::Date.fits(DataType::Text));
        assert!(!DataType::Text.fits(DataType::Date));
        assert!(!DataType::Email.fits(DataType::Number));
    }
}

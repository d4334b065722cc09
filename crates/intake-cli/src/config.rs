//! CLI settings, loaded from TOML.
//!
//! An explicit `--config` path must exist. Otherwise settings come from the
//! platform config directory:
//! - macOS: ~/Library/Application Support/com.intake-studio.Intake-Studio/
//! - Windows: %APPDATA%/intake-studio/Intake Studio/config/
//! - Linux: ~/.config/intakestudio/
//!
//! and fall back to defaults when that file is missing or unreadable.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use intake_model::{AccountNumber, Confidence, Module, SessionContext, UserProfile, UserRole};
use intake_validate::{DEFAULT_LOW_CONFIDENCE_THRESHOLD, RuleValidator};
use intake_wizard::MappingGate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "intake-studio";
const APP_NAME: &str = "Intake Studio";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Module selected at session start and after every finalize.
    pub default_module: Module,
    pub mapping_gate: MappingGate,
    /// Matches below this confidence are reported as informational findings.
    pub low_confidence_threshold: Confidence,
    pub account: String,
    pub user: UserSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_module: Module::default(),
            mapping_gate: MappingGate::default(),
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            account: "ACC-2024-001".to_string(),
            user: UserSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            name: "Import Operator".to_string(),
            email: "operator@localhost".to_string(),
            role: UserRole::Operator,
        }
    }
}

impl Settings {
    /// Session identity for the wizard.
    pub fn session_context(&self) -> Result<SessionContext> {
        let account = AccountNumber::new(self.account.as_str()).context("invalid account")?;
        Ok(SessionContext::new(
            UserProfile {
                name: self.user.name.clone(),
                email: self.user.email.clone(),
                role: self.user.role,
            },
            account,
        ))
    }

    pub fn validator(&self) -> RuleValidator {
        RuleValidator::new().with_low_confidence_threshold(self.low_confidence_threshold)
    }
}

/// Path of the settings file in the platform config directory.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings from `explicit`, or from the platform path.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        let settings = parse_settings(&content)
            .with_context(|| format!("parse settings {}", path.display()))?;
        info!(path = %path.display(), "loaded settings");
        return Ok(settings);
    }

    let Some(path) = settings_path() else {
        warn!("could not determine settings path, using defaults");
        return Ok(Settings::default());
    };
    match fs::read_to_string(&path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                info!(path = %path.display(), "loaded settings");
                Ok(settings)
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to parse settings, using defaults");
                Ok(Settings::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read settings, using defaults");
            Ok(Settings::default())
        }
    }
}

pub fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = parse_settings(
            r#"
            default_module = "fee-structure"
            low_confidence_threshold = 65

            [user]
            name = "Dr. Sarah Wilson"
            "#,
        )
        .unwrap();
        assert_eq!(settings.default_module, Module::FeeStructure);
        assert_eq!(settings.mapping_gate, MappingGate::AnyMapped);
        assert_eq!(settings.low_confidence_threshold.value(), 65);
        assert_eq!(settings.user.name, "Dr. Sarah Wilson");
        assert_eq!(settings.user.role, UserRole::Operator);
        assert_eq!(settings.account, "ACC-2024-001");
    }

    #[test]
    fn strict_gate_and_bad_threshold() {
        let settings = parse_settings("mapping_gate = \"required-resolved\"").unwrap();
        assert_eq!(settings.mapping_gate, MappingGate::RequiredResolved);
        assert!(parse_settings("low_confidence_threshold = 150").is_err());
    }

    #[test]
    fn blank_account_is_rejected() {
        let settings = Settings {
            account: "  ".to_string(),
            ..Settings::default()
        };
        assert!(settings.session_context().is_err());
    }

    #[test]
    fn default_settings_round_trip() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        assert_eq!(parse_settings(&text).unwrap(), settings);
    }
}

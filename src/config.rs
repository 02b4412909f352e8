//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::session::MIN_DURATION_SECONDS;
use crate::{AppError, Result};

/// Duration offered before the first start.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct TimerSettings {
    /// Duration pre-filled in the time field.
    pub default_seconds: u64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_seconds: 180,
        }
    }
}

/// Periodic workspace inspection.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct InspectionConfig {
    /// Seconds between advisory checks while running.
    pub interval_seconds: u64,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
        }
    }
}

/// One entry of the message script.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ScriptedMessage {
    /// Session second at which the message is posted.
    pub at_seconds: u64,
    /// Free-text reason; classified into a category.
    pub reason: String,
    /// Who the message is from.
    pub sender: String,
    /// Message body.
    pub text: String,
}

impl ScriptedMessage {
    fn new(at_seconds: u64, reason: &str, sender: &str, text: &str) -> Self {
        Self {
            at_seconds,
            reason: reason.into(),
            sender: sender.into(),
            text: text.into(),
        }
    }
}

/// Message escalation timing and script.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct EscalationConfig {
    /// Seconds an unaddressed message stays advisory.
    pub urgent_after_seconds: u64,
    /// Seconds after posting at which an unaddressed message turns critical.
    pub critical_after_seconds: u64,
    /// Messages in posting order.
    pub messages: Vec<ScriptedMessage>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            urgent_after_seconds: 30,
            critical_after_seconds: 60,
            messages: default_script(),
        }
    }
}

fn default_script() -> Vec<ScriptedMessage> {
    vec![
        ScriptedMessage::new(
            10,
            "missing alt",
            "Boss",
            "The logo has no alt text. Screen readers can't describe it, add an alt attribute.",
        ),
        ScriptedMessage::new(
            40,
            "input validation",
            "Agile Coach",
            "The name field accepts anything. Make it required or give it a pattern.",
        ),
        ScriptedMessage::new(
            75,
            "user login",
            "Product Owner",
            "Customers can't log in. The form needs a password field.",
        ),
        ScriptedMessage::new(
            110,
            "insecure form",
            "Security Team",
            "That form submits over GET. Use method=\"post\" before this ships.",
        ),
        ScriptedMessage::new(
            140,
            "status update",
            "Boss",
            "Quick status check. Acknowledge this when you've read it.",
        ),
    ]
}

/// Which record store receives saved work.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceBackend {
    /// Embedded `SQLite` file.
    #[default]
    Sqlite,
    /// Remote records endpoint.
    Http,
}

/// Persistence collaborator settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct PersistenceConfig {
    /// Store implementation.
    pub backend: PersistenceBackend,
    /// Database file for the `sqlite` backend.
    pub db_path: PathBuf,
    /// Records URL for the `http` backend.
    pub endpoint: String,
    /// Learner identifier attached to every record.
    pub user_identifier: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::Sqlite,
            db_path: PathBuf::from("courtroom.db"),
            endpoint: "http://localhost:3000/api/records".into(),
            user_identifier: "Student_000000".into(),
        }
    }
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct GlobalConfig {
    /// Countdown bounds.
    pub timer: TimerSettings,
    /// Periodic inspection.
    pub inspection: InspectionConfig,
    /// Message escalation.
    pub escalation: EscalationConfig,
    /// Record store.
    pub persistence: PersistenceConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timer.default_seconds < MIN_DURATION_SECONDS {
            return Err(AppError::Config(format!(
                "timer.default_seconds must be at least {MIN_DURATION_SECONDS}"
            )));
        }

        if self.inspection.interval_seconds == 0 {
            return Err(AppError::Config(
                "inspection.interval_seconds must be greater than zero".into(),
            ));
        }

        let escalation = &self.escalation;
        if escalation.urgent_after_seconds == 0 {
            return Err(AppError::Config(
                "escalation.urgent_after_seconds must be greater than zero".into(),
            ));
        }
        if escalation.critical_after_seconds <= escalation.urgent_after_seconds {
            return Err(AppError::Config(
                "escalation.critical_after_seconds must be greater than urgent_after_seconds"
                    .into(),
            ));
        }
        if let Some(bad) = escalation
            .messages
            .iter()
            .find(|m| m.text.trim().is_empty() || m.reason.trim().is_empty())
        {
            return Err(AppError::Config(format!(
                "escalation message at {}s needs a reason and text",
                bad.at_seconds
            )));
        }

        if self.persistence.backend == PersistenceBackend::Http
            && self.persistence.endpoint.trim().is_empty()
        {
            return Err(AppError::Config(
                "persistence.endpoint is required for the http backend".into(),
            ));
        }

        Ok(())
    }
}

//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Session duration outside the accepted bounds; the session stays idle.
    InvalidConfiguration(String),
    /// Save round trip completed but the store reported a failure.
    Persistence(String),
    /// Network-level failure while talking to a remote store.
    Transport(String),
    /// Local `SQLite` failure.
    Db(String),
    /// File-system or I/O operation failure.
    Io(String),
    /// The workspace rejected an edit because the session is not running.
    ReadOnly(String),
    /// The session runtime has shut down.
    Closed(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Persistence(msg) => write!(f, "persistence: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Db(msg) => write!(f, "db: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::ReadOnly(msg) => write!(f, "read only: {msg}"),
            Self::Closed(msg) => write!(f, "closed: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

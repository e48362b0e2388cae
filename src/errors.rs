//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Launch configuration parsing or validation failure.
    Config(String),
    /// Backend (inspector protocol) request failure.
    Backend(String),
    /// Session state machine violation, including stale-context commands
    /// issued while no pause is current.
    Session(String),
    /// Target process spawn or supervision failure.
    Launch(String),
    /// View host failure while rendering a panel.
    View(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Backend(msg) => write!(f, "backend: {msg}"),
            Self::Session(msg) => write!(f, "session: {msg}"),
            Self::Launch(msg) => write!(f, "launch: {msg}"),
            Self::View(msg) => write!(f, "view: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("invalid project file: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

//! Launch configuration parsing and validation.
//!
//! A project file is a small JSON document written by the editor front-end
//! describing how to launch the target program, e.g.:
//!
//! ```json
//! {
//!   "program": "server.js",
//!   "args": ["--port", "8080"],
//!   "resolvedRoot": "/home/me/app",
//!   "inspect-brk": true,
//!   "port": 9229
//! }
//! ```
//!
//! [`LaunchConfig::load`] fills in what the file leaves out: the working
//! directory defaults to the project file's directory and the project name
//! to the program's file stem.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{AppError, Result};

fn default_runtime() -> String {
    "node".into()
}

/// Launch configuration for the target runtime process.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Runtime binary used to run the program.
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Program (script) to launch. Required.
    #[serde(default)]
    pub program: String,
    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the spawned process.
    ///
    /// Defaults to the project file's directory when absent.
    #[serde(rename = "resolvedRoot", default)]
    pub resolved_root: Option<PathBuf>,
    /// Pause on the first statement (`--inspect-brk`) instead of attaching
    /// without an initial break (`--inspect`).
    #[serde(rename = "inspect-brk", default)]
    pub break_on_start: bool,
    /// Explicit inspector port; the runtime's default is used when absent.
    #[serde(default)]
    pub port: Option<u16>,
    /// Project display name; defaults to the program's file stem.
    #[serde(default)]
    pub name: Option<String>,
    /// Kill a still-live target process when the user closes the debugging
    /// client. Off by default so that closing the UI does not terminate a
    /// long-running target program.
    #[serde(rename = "stopOnDisconnect", default)]
    pub stop_on_disconnect: bool,
    /// Path of the project file this configuration was loaded from.
    #[serde(skip)]
    pub project_file: PathBuf,
}

impl LaunchConfig {
    /// Load a configuration from a JSON project file and resolve defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when the file cannot be read, is not
    /// valid JSON, or fails [`LaunchConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("cannot read project file: {err}")))?;
        let mut config = Self::from_json_str(&text)?;

        config.project_file = path.to_path_buf();
        if config.resolved_root.is_none() {
            config.resolved_root = path.parent().map(Path::to_path_buf);
        }
        if config.name.is_none() {
            config.name = Path::new(&config.program)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON text without resolving defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when the text is not valid JSON.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config)
    }

    /// Validate the configuration before any process is spawned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when no launch target program is set.
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(AppError::Config(
                "no program to launch (set \"program\" in the project file)".into(),
            ));
        }
        Ok(())
    }

    /// Directory of the project file, used as the connect root on attach.
    #[must_use]
    pub fn project_dir(&self) -> PathBuf {
        self.project_file
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    /// Project display name, falling back to the raw program path.
    #[must_use]
    pub fn project_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.program)
    }
}

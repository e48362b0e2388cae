//! Display-oriented values returned by the backend: fetched properties and
//! evaluation outcomes.

use serde::{Deserialize, Serialize};

/// One property of a remote object, already reduced to display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Rendered value text.
    pub value: String,
}

/// A successfully evaluated value, reduced to display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteValue {
    /// Human-readable description of the value.
    pub description: String,
}

/// Result of evaluating an expression on a paused frame.
///
/// Exactly one arm is meaningful. The `Error` arm carries a human-readable
/// payload (e.g., `ReferenceError: x is not defined`); callers must render
/// it as an error message, never treat it as a usable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalOutcome {
    /// Evaluation produced a value.
    Value(RemoteValue),
    /// Evaluation raised; the payload is the exception's description.
    Error(String),
}

impl EvalOutcome {
    /// Textual rendering used by the default (print-style) consumer.
    ///
    /// Errors are prefixed with `Uncaught: ` to distinguish them from a
    /// value whose description happens to look like an error.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Value(value) => value.description.clone(),
            Self::Error(text) => format!("Uncaught: {text}"),
        }
    }
}

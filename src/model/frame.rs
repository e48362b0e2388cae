//! Call frame and scope chain model.
//!
//! These types mirror the inspector protocol's `Debugger.CallFrame` shape
//! (camelCase on the wire, 0-based line/column numbers). A pause delivers a
//! whole new call stack, oldest-innermost first; the frames are immutable
//! once received and are discarded wholesale on resume.

use serde::{Deserialize, Serialize};

/// Identifier of a parsed script held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptId(pub String);

impl std::fmt::Display for ScriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position inside a script, 0-based as on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Script the location refers to.
    pub script_id: ScriptId,
    /// 0-based line number.
    pub line_number: u32,
    /// 0-based column number.
    #[serde(default)]
    pub column_number: u32,
}

/// Reference to an object held by the backend.
///
/// A weak reference: it is only valid while the frame that produced it is
/// the current pause's frame. Using it after resume yields backend errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteObjectId(pub String);

/// Kind of a scope in a frame's scope chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// The global/window scope. Never introspected by the locals view.
    Global,
    /// Function-local scope.
    Local,
    /// Captured closure scope.
    Closure,
    /// Block scope (`let`/`const` inside braces).
    Block,
    /// `catch` clause binding scope.
    Catch,
    /// `with` statement scope.
    With,
    /// Top-level script scope.
    Script,
    /// Scope introduced by `eval`.
    Eval,
    /// ES module scope.
    Module,
}

impl ScopeKind {
    /// Lowercase protocol name of the scope kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Local => "local",
            Self::Closure => "closure",
            Self::Block => "block",
            Self::Catch => "catch",
            Self::With => "with",
            Self::Script => "script",
            Self::Eval => "eval",
            Self::Module => "module",
        }
    }
}

/// One scope in a frame's scope chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Scope classification.
    #[serde(rename = "type")]
    pub kind: ScopeKind,
    /// Optional scope name (e.g., the enclosing function for a closure).
    #[serde(default)]
    pub name: Option<String>,
    /// Backend object holding the scope's variables.
    pub object: RemoteObjectId,
}

impl Scope {
    /// Display label for the scope's section in the locals view.
    ///
    /// The scope's `name` when present and not the literal string
    /// `"undefined"` (runtimes serialize an absent name that way),
    /// otherwise the scope kind.
    #[must_use]
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() && name != "undefined" => name,
            _ => self.kind.as_str(),
        }
    }
}

/// A single call frame from a pause notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Location of the paused statement within its script.
    pub location: SourceLocation,
    /// Scope chain, innermost first.
    #[serde(default)]
    pub scope_chain: Vec<Scope>,
}

//! Passive data model: call frames, source locations, scope chains, and
//! evaluation results as delivered by the inspector backend.

pub mod frame;
pub mod value;

pub use frame::{Frame, RemoteObjectId, Scope, ScopeKind, ScriptId, SourceLocation};
pub use value::{EvalOutcome, Property, RemoteValue};

//! Backend capability interface.
//!
//! The [`InspectorBackend`] trait decouples the session core from the wire
//! protocol to the runtime (websocket transport, message correlation,
//! protocol framing are all behind it). Every operation is an asynchronous
//! request/response pair; none blocks the caller, and any of them may fail
//! with [`AppError::Backend`](crate::AppError::Backend).
//!
//! Pause/resume notifications are *not* return values of these operations:
//! the backend delivers them later as [`DebugEvent`]s through the session
//! event channel, in true execution order. The backend is the ordering
//! authority; the session never reorders or coalesces its events.

use std::future::Future;
use std::pin::Pin;

use crate::model::{EvalOutcome, Frame, Property, RemoteObjectId, ScriptId, SourceLocation};
use crate::Result;

/// Boxed future type used by [`InspectorBackend`] methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Notifications delivered by the backend into the session event pump.
#[derive(Debug, Clone)]
pub enum DebugEvent {
    /// Execution paused; carries the full new call stack, innermost first.
    Paused(Vec<Frame>),
    /// Execution resumed; the previous pause's frames are now invalid.
    Resumed,
}

/// Abstract inspector-protocol operations consumed by the session core.
///
/// Implementations provide the actual transport. All methods are
/// fire-and-await: stepping and resuming produce no direct result, only a
/// later [`DebugEvent`] once the runtime actually pauses or resumes.
pub trait InspectorBackend: Send + Sync {
    /// Fetch the full source text of a script.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) if the
    /// script is unknown or the request fails.
    fn get_script_source(&self, script_id: &ScriptId) -> BackendFuture<'_, String>;

    /// Step into the next call.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) on request
    /// failure.
    fn step_into(&self) -> BackendFuture<'_, ()>;

    /// Step over the current statement.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) on request
    /// failure.
    fn step_over(&self) -> BackendFuture<'_, ()>;

    /// Step out of the current function.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) on request
    /// failure.
    fn step_out(&self) -> BackendFuture<'_, ()>;

    /// Resume full execution.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) on request
    /// failure.
    fn resume(&self) -> BackendFuture<'_, ()>;

    /// Run until the given location is reached.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) on request
    /// failure.
    fn continue_to_location(&self, location: &SourceLocation) -> BackendFuture<'_, ()>;

    /// Evaluate `expression` in the lexical context of `frame`.
    ///
    /// A thrown exception is *not* an `Err`: it arrives as
    /// [`EvalOutcome::Error`] with a human-readable payload. `Err` is
    /// reserved for protocol-level failure.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) if the
    /// request itself cannot be completed.
    fn evaluate_on_frame(&self, expression: &str, frame: &Frame)
        -> BackendFuture<'_, EvalOutcome>;

    /// Fetch the properties of a remote object (a scope's variables).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) if the
    /// object reference is no longer valid or the request fails.
    fn get_properties(&self, object: &RemoteObjectId) -> BackendFuture<'_, Vec<Property>>;
}

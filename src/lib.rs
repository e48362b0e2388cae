#![forbid(unsafe_code)]

//! `jsdb` — session core for an interactive source-level debugger front-end
//! for JavaScript runtimes speaking an inspector-style protocol.
//!
//! The crate owns the debugger session state machine (pause/resume, frame
//! tracking, stepping, expression evaluation, scope inspection) and the
//! process supervisor that launches a target runtime, watches its output
//! for attach/detach signals, and keeps the session lifecycle in sync with
//! the process lifecycle. Rendering and the wire protocol itself are
//! external capabilities consumed through the [`view`] and [`backend`]
//! traits.

pub mod backend;
pub mod config;
pub mod errors;
pub mod model;
pub mod session;
pub mod supervisor;
pub mod view;

pub use config::LaunchConfig;
pub use errors::{AppError, Result};

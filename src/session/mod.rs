//! Debugger session state machine and per-connection registry.
//!
//! A [`Session`] owns the authoritative pause/running state for one
//! debugging connection: the current call stack, the source panel it
//! renders into, and the backend handle it issues requests through. State
//! transitions are driven exclusively by backend-delivered [`DebugEvent`]s
//! consumed by [`run_session`]; the session never reorders or coalesces
//! them.
//!
//! Sessions are singletons per connection identity and live in a
//! [`SessionRegistry`] keyed by the connection's address, with lifecycle
//! tied to connect/disconnect events.

pub mod controller;
pub mod locals;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::backend::{DebugEvent, InspectorBackend};
use crate::model::Frame;
use crate::view::{Span, ViewHost, ViewKey};
use crate::{AppError, Result};

/// Shared handle to the host's panel registry.
///
/// `Arc<Mutex<ConcreteHost>>` coerces to this type, so an embedder keeps a
/// typed handle to its own host while the session core works against the
/// trait.
pub type SharedViews = Arc<Mutex<dyn ViewHost>>;

/// Shared handle to a session, as stored in the registry.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Pause/running state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Target is executing; no frames are current.
    Running,
    /// Target is paused; the stored frames are the current call stack.
    Paused,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// Debugger session for one connection.
///
/// Invariant: `frames` is non-empty exactly when `state == Paused`. A
/// pause replaces the frames wholesale with the backend's snapshot; a
/// resume clears them.
pub struct Session {
    connection: String,
    backend: Arc<dyn InspectorBackend>,
    views: SharedViews,
    state: SessionState,
    frames: Vec<Frame>,
    pause_epoch: Arc<AtomicU64>,
}

impl Session {
    /// Create a session in the `Running` state (no pause seen yet).
    #[must_use]
    pub fn new(connection: &str, backend: Arc<dyn InspectorBackend>, views: SharedViews) -> Self {
        Self {
            connection: connection.to_owned(),
            backend,
            views,
            state: SessionState::Running,
            frames: Vec::new(),
            pause_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Connection identity the session is keyed by.
    #[must_use]
    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// Current pause/running state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current call stack; empty while running.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Backend handle the session issues requests through.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn InspectorBackend> {
        &self.backend
    }

    /// Shared panel registry handle.
    #[must_use]
    pub fn views(&self) -> &SharedViews {
        &self.views
    }

    /// Monotonic counter bumped on every pause/resume transition.
    ///
    /// Asynchronous consumers capture it before a fetch and compare after,
    /// discarding results that outlived their pause.
    #[must_use]
    pub fn pause_epoch(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.pause_epoch)
    }

    /// The top (innermost) frame of the current pause.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] with "no active pause context" while
    /// the session is running. Stepping and evaluation commands use this
    /// as their fail-fast guard: nothing is sent to the backend.
    pub fn top_frame(&self) -> Result<&Frame> {
        match self.frames.first() {
            Some(frame) if self.state == SessionState::Paused => Ok(frame),
            _ => Err(AppError::Session("no active pause context".into())),
        }
    }

    /// Handle a `Paused` notification: store the new call stack and render
    /// the top frame.
    ///
    /// The source-fetch → render → locals-refresh chain is strictly
    /// sequential. The locals panel is refreshed only if it already
    /// exists; a pause never force-opens one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] when the notification carries no
    /// frames (which would break the frames-nonempty ⟺ paused invariant)
    /// and [`AppError::Backend`] when the source fetch fails. The stored
    /// frames stay authoritative either way once the snapshot is accepted.
    pub async fn on_paused(&mut self, frames: Vec<Frame>) -> Result<()> {
        if frames.is_empty() {
            return Err(AppError::Session(
                "pause notification carried no frames".into(),
            ));
        }

        self.state = SessionState::Paused;
        self.frames = frames;
        self.pause_epoch.fetch_add(1, Ordering::SeqCst);

        let top = self.frames[0].clone();
        debug!(
            connection = %self.connection,
            script_id = %top.location.script_id,
            line = top.location.line_number,
            "paused"
        );

        let source = self
            .backend
            .get_script_source(&top.location.script_id)
            .await?;
        self.render_frame(&top, &source).await;

        let locals_key = ViewKey::locals(&self.connection);
        let locals_open = self.views.lock().await.exists(&locals_key);
        if locals_open {
            let epoch = self.pause_epoch.load(Ordering::SeqCst);
            locals::refresh_locals(
                self.backend.as_ref(),
                &self.views,
                &self.connection,
                &top,
                &self.pause_epoch,
                epoch,
            )
            .await;
        }
        Ok(())
    }

    /// Handle a `Resumed` notification: drop the frames and clear the
    /// source panel's marker and highlights, if the panel exists.
    pub async fn on_resumed(&mut self) {
        self.state = SessionState::Running;
        self.frames.clear();
        self.pause_epoch.fetch_add(1, Ordering::SeqCst);
        debug!(connection = %self.connection, "resumed");

        let key = ViewKey::source(&self.connection);
        let mut views = self.views.lock().await;
        if let Some(view) = views.get(&key) {
            view.clear_marker();
            view.clear_highlights();
        }
    }

    /// Render `source` for the top frame into the source panel.
    ///
    /// The panel is created on first use and reused afterwards; its content
    /// is replaced only when the fetched source differs byte-for-byte from
    /// what is displayed, so a no-op refresh preserves existing overlays.
    /// The marker and highlight are repositioned unconditionally.
    async fn render_frame(&self, top: &Frame, source: &str) {
        let key = ViewKey::source(&self.connection);
        let line = top.location.line_number + 1;
        let column = top.location.column_number;

        // Conservative statement span: cursor to end of line.
        let line_len = source
            .lines()
            .nth(top.location.line_number as usize)
            .map_or(column, |text| {
                u32::try_from(text.len()).unwrap_or(u32::MAX)
            });

        let mut views = self.views.lock().await;
        let view = views.open(&key);
        if view.text() != source {
            view.set_text(source);
        }
        view.set_marker(line, column);
        view.highlight(Span {
            line,
            start_column: column,
            end_column: line_len.max(column),
        });
        views.focus(&key);
    }
}

/// Event pump: applies backend notifications to a session in arrival order.
///
/// Exits when the event channel closes (the connection is gone). Handler
/// failures are logged and do not stop the pump; the backend remains the
/// ordering authority for subsequent events.
pub async fn run_session(handle: SessionHandle, mut events: mpsc::Receiver<DebugEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            DebugEvent::Paused(frames) => {
                let mut session = handle.lock().await;
                if let Err(err) = session.on_paused(frames).await {
                    warn!(connection = %session.connection, %err, "pause handling failed");
                }
            }
            DebugEvent::Resumed => {
                handle.lock().await.on_resumed().await;
            }
        }
    }
    debug!("debug event channel closed; session pump exiting");
}

/// Process-wide registry of sessions keyed by connection identity.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, SessionHandle>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create-or-reuse the session for `connection`.
    ///
    /// Connecting an already-connected key returns the existing session
    /// untouched; there is exactly one session per connection.
    pub fn connect(
        &mut self,
        connection: &str,
        backend: Arc<dyn InspectorBackend>,
        views: SharedViews,
    ) -> SessionHandle {
        if let Some(existing) = self.sessions.get(connection) {
            return Arc::clone(existing);
        }
        info!(connection, "session connected");
        let handle = Arc::new(Mutex::new(Session::new(connection, backend, views)));
        self.sessions.insert(connection.to_owned(), Arc::clone(&handle));
        handle
    }

    /// Look up the session for `connection`.
    #[must_use]
    pub fn get(&self, connection: &str) -> Option<SessionHandle> {
        self.sessions.get(connection).map(Arc::clone)
    }

    /// Remove the session for `connection` and close its panels.
    pub async fn disconnect(&mut self, connection: &str) -> Option<SessionHandle> {
        let handle = self.sessions.remove(connection)?;
        info!(connection, "session disconnected");
        {
            let session = handle.lock().await;
            let mut views = session.views.lock().await;
            views.close(&ViewKey::source(connection));
            views.close(&ViewKey::locals(connection));
            views.close(&ViewKey::inspect(connection));
        }
        Some(handle)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

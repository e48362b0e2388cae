//! Output-watching state machine.
//!
//! Infers inspector lifecycle events from the target process's unstructured
//! output. Pure text processing: ANSI cursor/erase escapes are stripped,
//! then each line is matched against the runtime's attach/detach phrases.
//! A latch prevents duplicate connects when the runtime repeats the
//! listening line.

use std::sync::LazyLock;

use regex::Regex;

/// `Debugger listening on ws://…` — the runtime's inspector is accepting
/// a client.
#[allow(clippy::expect_used)]
static ATTACH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Debugger listening on").expect("attach pattern is valid"));

/// `Waiting for the debugger to disconnect…` — the runtime wants the
/// client to detach (program finished under `--inspect-brk`).
#[allow(clippy::expect_used)]
static DETACH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Waiting for the debugger to disconnect").expect("detach pattern is valid")
});

/// ANSI CSI escape sequences (cursor movement, erase, color).
#[allow(clippy::expect_used)]
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("ansi pattern is valid"));

/// Remove ANSI cursor/erase escape sequences from `text`.
///
/// Side-effect-free transform applied before signal matching; runtimes
/// rewrite their listening line with cursor controls on some terminals.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    ANSI_RE.replace_all(text, "").into_owned()
}

/// Protocol-level event inferred from one chunk of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchSignal {
    /// The runtime is listening; the debugging client should connect.
    Attach,
    /// The runtime is waiting for the client to disconnect.
    Detach,
}

/// Latching matcher over the target's output stream.
///
/// `debugger_connected` flips true at most once per listening phase, so
/// repeated identical listening lines trigger a single [`WatchSignal::Attach`].
/// A detach phrase flips it back, re-arming attach detection for a
/// subsequent listening phase.
#[derive(Debug, Default)]
pub struct OutputWatcher {
    debugger_connected: bool,
}

impl OutputWatcher {
    /// Create a watcher with the latch unarmed (not connected).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the watcher currently believes a client is attached.
    #[must_use]
    pub fn debugger_connected(&self) -> bool {
        self.debugger_connected
    }

    /// Observe one chunk of process output, in stream order.
    ///
    /// The attach and detach checks are mutually exclusive per chunk
    /// (first match wins). Returns the inferred signal, if any.
    pub fn observe(&mut self, chunk: &str) -> Option<WatchSignal> {
        let text = strip_ansi(chunk);

        if !self.debugger_connected && ATTACH_RE.is_match(&text) {
            self.debugger_connected = true;
            return Some(WatchSignal::Attach);
        }
        if DETACH_RE.is_match(&text) {
            self.debugger_connected = false;
            return Some(WatchSignal::Detach);
        }
        None
    }
}

//! View capability consumed by the session core.
//!
//! The presentation layer (editor buffer, TUI pane, GUI panel) implements
//! [`TextView`] and [`ViewHost`]; the core only calls these abstract
//! operations. Panels are singletons per connection identity, addressed by
//! [`ViewKey`].
//!
//! [`BufferViewHost`] is an in-memory implementation used by the bundled
//! binary's logging front-end and by tests; embedders with a real UI
//! provide their own host.

use std::collections::HashMap;

/// A highlighted region of one line, 1-based line, 0-based columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// 1-based line number.
    pub line: u32,
    /// 0-based first highlighted column.
    pub start_column: u32,
    /// 0-based end column (exclusive).
    pub end_column: u32,
}

/// Which panel of a connection's debugger UI a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// The source panel showing the paused script.
    Source,
    /// The locals panel listing scope variables.
    Locals,
    /// The structured inspector panel for evaluation results.
    Inspect,
}

/// Identity of a panel: connection key plus panel kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    /// Connection identity (address/URL) the panel belongs to.
    pub connection: String,
    /// Panel role within that connection's UI.
    pub panel: PanelKind,
}

impl ViewKey {
    /// Key of the source panel for a connection.
    #[must_use]
    pub fn source(connection: &str) -> Self {
        Self {
            connection: connection.to_owned(),
            panel: PanelKind::Source,
        }
    }

    /// Key of the locals panel for a connection.
    #[must_use]
    pub fn locals(connection: &str) -> Self {
        Self {
            connection: connection.to_owned(),
            panel: PanelKind::Locals,
        }
    }

    /// Key of the inspector panel for a connection.
    #[must_use]
    pub fn inspect(connection: &str) -> Self {
        Self {
            connection: connection.to_owned(),
            panel: PanelKind::Inspect,
        }
    }
}

/// One text panel: content plus an active-line marker and highlights.
pub trait TextView: Send {
    /// Replace the panel's entire content.
    fn set_text(&mut self, text: &str);

    /// Current content, byte-for-byte as last written.
    fn text(&self) -> &str;

    /// Append a block of text to the panel.
    fn append(&mut self, text: &str);

    /// Clear the panel's content (marker and highlights are unaffected).
    fn clear(&mut self);

    /// Position the active-line marker (1-based line, 0-based column).
    fn set_marker(&mut self, line: u32, column: u32);

    /// Remove the active-line marker.
    fn clear_marker(&mut self);

    /// Highlight a span, replacing any previous highlight.
    fn highlight(&mut self, span: Span);

    /// Remove all highlights.
    fn clear_highlights(&mut self);
}

/// Registry of panels keyed by [`ViewKey`].
///
/// `open` creates the panel if missing and reuses it otherwise; panels are
/// never duplicated for a key.
pub trait ViewHost: Send {
    /// Create-or-reuse the panel for `key`.
    fn open(&mut self, key: &ViewKey) -> &mut dyn TextView;

    /// Look up an existing panel without creating one.
    fn get(&mut self, key: &ViewKey) -> Option<&mut dyn TextView>;

    /// Whether a panel exists for `key`.
    fn exists(&self, key: &ViewKey) -> bool;

    /// Destroy the panel for `key`, if any.
    fn close(&mut self, key: &ViewKey);

    /// Switch visible focus to the panel for `key`, if it exists.
    fn focus(&mut self, key: &ViewKey);
}

// ── In-memory implementation ─────────────────────────────────────────────────

/// In-memory [`TextView`] recording every operation's effect.
#[derive(Debug, Default)]
pub struct BufferView {
    text: String,
    marker: Option<(u32, u32)>,
    highlights: Vec<Span>,
    set_text_calls: u64,
}

impl BufferView {
    /// Current marker position, if set.
    #[must_use]
    pub fn marker(&self) -> Option<(u32, u32)> {
        self.marker
    }

    /// Currently highlighted spans.
    #[must_use]
    pub fn highlights(&self) -> &[Span] {
        &self.highlights
    }

    /// Number of full-content rewrites the view has seen.
    ///
    /// Lets callers verify that a no-op refresh did not rewrite content.
    #[must_use]
    pub fn set_text_calls(&self) -> u64 {
        self.set_text_calls
    }
}

impl TextView for BufferView {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.set_text_calls += 1;
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn clear(&mut self) {
        self.text.clear();
    }

    fn set_marker(&mut self, line: u32, column: u32) {
        self.marker = Some((line, column));
    }

    fn clear_marker(&mut self) {
        self.marker = None;
    }

    fn highlight(&mut self, span: Span) {
        self.highlights.clear();
        self.highlights.push(span);
    }

    fn clear_highlights(&mut self) {
        self.highlights.clear();
    }
}

/// In-memory [`ViewHost`] backed by a hash map of [`BufferView`]s.
#[derive(Debug, Default)]
pub struct BufferViewHost {
    panels: HashMap<ViewKey, BufferView>,
    focused: Option<ViewKey>,
}

impl BufferViewHost {
    /// Create an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed access to a panel, for assertions on marker/highlight state.
    #[must_use]
    pub fn panel(&self, key: &ViewKey) -> Option<&BufferView> {
        self.panels.get(key)
    }

    /// Key of the currently focused panel, if any.
    #[must_use]
    pub fn focused(&self) -> Option<&ViewKey> {
        self.focused.as_ref()
    }
}

impl ViewHost for BufferViewHost {
    fn open(&mut self, key: &ViewKey) -> &mut dyn TextView {
        self.panels.entry(key.clone()).or_default()
    }

    fn get(&mut self, key: &ViewKey) -> Option<&mut dyn TextView> {
        self.panels
            .get_mut(key)
            .map(|view| view as &mut dyn TextView)
    }

    fn exists(&self, key: &ViewKey) -> bool {
        self.panels.contains_key(key)
    }

    fn close(&mut self, key: &ViewKey) {
        self.panels.remove(key);
        if self.focused.as_ref() == Some(key) {
            self.focused = None;
        }
    }

    fn focus(&mut self, key: &ViewKey) {
        if self.panels.contains_key(key) {
            self.focused = Some(key.clone());
        }
    }
}

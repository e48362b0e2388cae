//! Debugger session state machine tests: pause/resume transitions, frame
//! rendering, and the frames-nonempty ⟺ paused invariant.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use jsdb::backend::DebugEvent;
use jsdb::model::ScopeKind;
use jsdb::session::{run_session, SessionState};
use jsdb::view::{TextView, ViewHost, ViewKey};
use jsdb::AppError;

use super::support::{frame, make_session, scope, MockBackend, CONN};

const SOURCE: &str = "const a = 1;\nconst b = 2;\nconst c = 3;\nfunction f() {\n  return a + b;\n}\n";

/// A pause stores the delivered frames, displays the script's source, and
/// positions the marker at the 1-based line and wire column.
#[tokio::test]
async fn pause_renders_source_marker_and_locals() {
    let backend = Arc::new(
        MockBackend::new()
            .with_source("1", SOURCE)
            .with_properties("o1", &[("x", "42")]),
    );
    let (mut session, host) = make_session(&backend);

    // A locals panel is already open, so the pause refreshes it.
    host.lock().await.open(&ViewKey::locals(CONN));

    let frames = vec![frame(
        "1",
        4,
        2,
        vec![scope(ScopeKind::Local, Some("foo"), "o1")],
    )];
    session.on_paused(frames).await.unwrap();

    assert_eq!(session.state(), SessionState::Paused);
    assert_eq!(session.frames().len(), 1);

    let host = host.lock().await;
    let source_panel = host.panel(&ViewKey::source(CONN)).unwrap();
    assert_eq!(source_panel.text(), SOURCE);
    assert_eq!(source_panel.marker(), Some((5, 2)));
    assert_eq!(host.focused(), Some(&ViewKey::source(CONN)));

    // Exactly one property fetch, for the single non-global scope.
    assert_eq!(backend.call_count("get_properties"), 1);
    assert_eq!(backend.calls().last().unwrap(), "get_properties:o1");
}

/// The highlight covers the current statement conservatively: from the
/// pause column to the end of the line.
#[tokio::test]
async fn pause_highlights_cursor_to_end_of_line() {
    let backend = Arc::new(MockBackend::new().with_source("1", SOURCE));
    let (mut session, host) = make_session(&backend);

    session
        .on_paused(vec![frame("1", 4, 2, vec![])])
        .await
        .unwrap();

    let host = host.lock().await;
    let highlights = host.panel(&ViewKey::source(CONN)).unwrap().highlights();
    assert_eq!(highlights.len(), 1);
    let span = highlights[0];
    assert_eq!(span.line, 5);
    assert_eq!(span.start_column, 2);
    // "  return a + b;" is 15 bytes long.
    assert_eq!(span.end_column, 15);
}

/// `state == Paused` exactly when frames are non-empty, across a whole
/// pause/resume sequence.
#[tokio::test]
async fn paused_iff_frames_nonempty() {
    let backend = Arc::new(MockBackend::new().with_source("1", SOURCE));
    let (mut session, _host) = make_session(&backend);

    assert_eq!(session.state(), SessionState::Running);
    assert!(session.frames().is_empty());

    session
        .on_paused(vec![frame("1", 0, 0, vec![])])
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Paused);
    assert!(!session.frames().is_empty());

    session.on_resumed().await;
    assert_eq!(session.state(), SessionState::Running);
    assert!(session.frames().is_empty());
}

/// A pause notification without frames would break the invariant and is
/// rejected without a state change.
#[tokio::test]
async fn empty_pause_is_rejected() {
    let backend = Arc::new(MockBackend::new());
    let (mut session, _host) = make_session(&backend);

    let err = session.on_paused(Vec::new()).await.unwrap_err();
    assert!(matches!(err, AppError::Session(_)));
    assert_eq!(session.state(), SessionState::Running);
    assert!(backend.calls().is_empty());
}

/// Rendering the same frame and source twice in a row does not rewrite the
/// panel content, but the marker and highlight are still repositioned.
#[tokio::test]
async fn identical_source_is_not_rewritten() {
    let backend = Arc::new(MockBackend::new().with_source("1", SOURCE));
    let (mut session, host) = make_session(&backend);

    let frames = vec![frame("1", 1, 0, vec![])];
    session.on_paused(frames.clone()).await.unwrap();
    session.on_paused(frames).await.unwrap();

    let host = host.lock().await;
    let panel = host.panel(&ViewKey::source(CONN)).unwrap();
    assert_eq!(panel.set_text_calls(), 1, "no-op refresh must not rewrite");
    assert_eq!(panel.marker(), Some((2, 0)));
    assert_eq!(panel.highlights().len(), 1);
}

/// Resume clears the marker and highlights but leaves the source text in
/// place for the next pause's content comparison.
#[tokio::test]
async fn resume_clears_marker_and_highlights() {
    let backend = Arc::new(MockBackend::new().with_source("1", SOURCE));
    let (mut session, host) = make_session(&backend);

    session
        .on_paused(vec![frame("1", 2, 1, vec![])])
        .await
        .unwrap();
    session.on_resumed().await;

    let host = host.lock().await;
    let panel = host.panel(&ViewKey::source(CONN)).unwrap();
    assert_eq!(panel.marker(), None);
    assert!(panel.highlights().is_empty());
    assert_eq!(panel.text(), SOURCE);
}

/// A pause never force-opens the locals panel; without one, no property
/// fetches are issued.
#[tokio::test]
async fn pause_does_not_force_open_locals() {
    let backend = Arc::new(MockBackend::new().with_source("1", SOURCE).with_properties(
        "o1",
        &[("x", "1")],
    ));
    let (mut session, host) = make_session(&backend);

    session
        .on_paused(vec![frame(
            "1",
            0,
            0,
            vec![scope(ScopeKind::Local, None, "o1")],
        )])
        .await
        .unwrap();

    assert_eq!(backend.call_count("get_properties"), 0);
    assert!(!host.lock().await.exists(&ViewKey::locals(CONN)));
}

/// The event pump applies backend notifications in arrival order and exits
/// when the channel closes.
#[tokio::test]
async fn event_pump_drives_transitions_in_order() {
    let backend = Arc::new(MockBackend::new().with_source("1", SOURCE));
    let (session, _host) = make_session(&backend);
    let handle = Arc::new(Mutex::new(session));

    let (tx, rx) = mpsc::channel(8);
    let pump = tokio::spawn(run_session(Arc::clone(&handle), rx));

    tx.send(DebugEvent::Paused(vec![frame("1", 0, 0, vec![])]))
        .await
        .unwrap();
    tx.send(DebugEvent::Resumed).await.unwrap();
    drop(tx);
    pump.await.unwrap();

    let session = handle.lock().await;
    assert_eq!(session.state(), SessionState::Running);
    assert!(session.frames().is_empty());
}

//! Locals inspector tests: global-scope exclusion, scope labeling, failure
//! isolation, and stale-result discarding.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::sync::Mutex;

use jsdb::model::ScopeKind;
use jsdb::session::locals::refresh_locals;
use jsdb::session::SharedViews;
use jsdb::view::{BufferViewHost, TextView, ViewHost, ViewKey};

use super::support::{frame, scope, MockBackend, CONN};

fn views_with_locals_panel() -> (Arc<Mutex<BufferViewHost>>, SharedViews) {
    let host = Arc::new(Mutex::new(BufferViewHost::new()));
    let views: SharedViews = host.clone();
    (host, views)
}

/// The global scope is never introspected: given `[global, local]`, exactly
/// one property fetch is issued.
#[tokio::test]
async fn global_scope_is_excluded() {
    let backend =
        Arc::new(MockBackend::new().with_properties("o1", &[("answer", "42")]));
    let (host, views) = views_with_locals_panel();
    host.lock().await.open(&ViewKey::locals(CONN));

    let frame = frame(
        "1",
        0,
        0,
        vec![
            scope(ScopeKind::Global, None, "g1"),
            scope(ScopeKind::Local, Some("foo"), "o1"),
        ],
    );
    let epoch = AtomicU64::new(1);
    refresh_locals(backend.as_ref(), &views, CONN, &frame, &epoch, 1).await;

    assert_eq!(backend.call_count("get_properties"), 1);
    assert_eq!(backend.calls().last().unwrap(), "get_properties:o1");

    let host = host.lock().await;
    let panel = host.panel(&ViewKey::locals(CONN)).unwrap();
    assert_eq!(panel.text(), "foo:\n  answer = 42\n");
}

/// Scope sections are labeled by name when present, falling back to the
/// scope kind when the name is absent or the literal string "undefined".
#[tokio::test]
async fn scope_blocks_are_labeled_and_ordered() {
    let backend = Arc::new(
        MockBackend::new()
            .with_properties("o1", &[("a", "1")])
            .with_properties("o2", &[("b", "2")]),
    );
    let (host, views) = views_with_locals_panel();
    host.lock().await.open(&ViewKey::locals(CONN));

    let frame = frame(
        "1",
        0,
        0,
        vec![
            scope(ScopeKind::Local, Some("undefined"), "o1"),
            scope(ScopeKind::Closure, Some("makeCounter"), "o2"),
        ],
    );
    let epoch = AtomicU64::new(3);
    refresh_locals(backend.as_ref(), &views, CONN, &frame, &epoch, 3).await;

    let host = host.lock().await;
    let panel = host.panel(&ViewKey::locals(CONN)).unwrap();
    // Blocks appear in scope-chain traversal order, each self-delimited.
    assert_eq!(panel.text(), "local:\n  a = 1\nmakeCounter:\n  b = 2\n");
}

/// A failed fetch for one scope does not prevent the others from
/// rendering.
#[tokio::test]
async fn scope_fetch_failure_is_isolated() {
    let backend = Arc::new(
        MockBackend::new()
            .with_property_error("o1", "object released")
            .with_properties("o2", &[("ok", "true")]),
    );
    let (host, views) = views_with_locals_panel();
    host.lock().await.open(&ViewKey::locals(CONN));

    let frame = frame(
        "1",
        0,
        0,
        vec![
            scope(ScopeKind::Block, None, "o1"),
            scope(ScopeKind::Local, Some("run"), "o2"),
        ],
    );
    let epoch = AtomicU64::new(1);
    refresh_locals(backend.as_ref(), &views, CONN, &frame, &epoch, 1).await;

    assert_eq!(backend.call_count("get_properties"), 2);
    let host = host.lock().await;
    let panel = host.panel(&ViewKey::locals(CONN)).unwrap();
    assert_eq!(panel.text(), "run:\n  ok = true\n");
}

/// Results that complete after the pause epoch has moved on are discarded
/// without touching the panel.
#[tokio::test]
async fn stale_results_are_discarded() {
    let backend = Arc::new(MockBackend::new().with_properties("o1", &[("x", "1")]));
    let (host, views) = views_with_locals_panel();
    host.lock().await.open(&ViewKey::locals(CONN)).set_text("previous contents");

    let frame = frame("1", 0, 0, vec![scope(ScopeKind::Local, None, "o1")]);
    // The session resumed while the fetch was conceptually in flight: the
    // live epoch no longer matches the one captured at refresh start.
    let epoch = AtomicU64::new(5);
    refresh_locals(backend.as_ref(), &views, CONN, &frame, &epoch, 4).await;

    let host = host.lock().await;
    let panel = host.panel(&ViewKey::locals(CONN)).unwrap();
    assert_eq!(panel.text(), "previous contents");
}

/// If the panel was closed while fetches were in flight, the refresh does
/// not recreate it.
#[tokio::test]
async fn refresh_never_creates_the_panel() {
    let backend = Arc::new(MockBackend::new().with_properties("o1", &[("x", "1")]));
    let (host, views) = views_with_locals_panel();

    let frame = frame("1", 0, 0, vec![scope(ScopeKind::Local, None, "o1")]);
    let epoch = AtomicU64::new(1);
    refresh_locals(backend.as_ref(), &views, CONN, &frame, &epoch, 1).await;

    assert!(!host.lock().await.exists(&ViewKey::locals(CONN)));
}

/// The panel is cleared once per refresh, so a second refresh replaces the
/// previous pause's content instead of accumulating it.
#[tokio::test]
async fn refresh_replaces_previous_content() {
    let backend = Arc::new(MockBackend::new().with_properties("o1", &[("x", "1")]));
    let (host, views) = views_with_locals_panel();
    host.lock().await.open(&ViewKey::locals(CONN));

    let frame = frame("1", 0, 0, vec![scope(ScopeKind::Local, Some("f"), "o1")]);
    let epoch = AtomicU64::new(1);
    refresh_locals(backend.as_ref(), &views, CONN, &frame, &epoch, 1).await;
    refresh_locals(backend.as_ref(), &views, CONN, &frame, &epoch, 1).await;

    let host = host.lock().await;
    let panel = host.panel(&ViewKey::locals(CONN)).unwrap();
    assert_eq!(panel.text(), "f:\n  x = 1\n");
}

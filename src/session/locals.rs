//! Locals/scope inspector.
//!
//! For each pause, fetches the properties of every non-global scope object
//! and writes them into the locals panel. The global scope is deliberately
//! never introspected: it is too large to be useful during stepping.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::backend::InspectorBackend;
use crate::model::{Frame, Property, Scope, ScopeKind};
use crate::session::SharedViews;
use crate::view::ViewKey;

/// Populate the locals panel from `frame`'s scope chain.
///
/// Property fetches for the scopes run concurrently; the panel is cleared
/// exactly once per invocation and each scope's block is then appended
/// atomically in scope-chain traversal order, so out-of-order completion
/// never interleaves partial scope outputs. A failed fetch for one scope
/// is logged and skipped without affecting the others.
///
/// `started_at` is the session's pause epoch captured by the caller. If
/// the epoch has moved on by the time the fetches complete (the user
/// resumed or a new pause landed), the whole result set is stale and is
/// discarded without touching the panel.
pub async fn refresh_locals(
    backend: &dyn InspectorBackend,
    views: &SharedViews,
    connection: &str,
    frame: &Frame,
    epoch: &AtomicU64,
    started_at: u64,
) {
    let scopes: Vec<&Scope> = frame
        .scope_chain
        .iter()
        .filter(|scope| scope.kind != ScopeKind::Global)
        .collect();

    let fetches = scopes
        .iter()
        .map(|scope| backend.get_properties(&scope.object));
    let results = join_all(fetches).await;

    if epoch.load(Ordering::SeqCst) != started_at {
        debug!(connection, "discarding stale locals results");
        return;
    }

    let key = ViewKey::locals(connection);
    let mut views = views.lock().await;
    let Some(view) = views.get(&key) else {
        // Panel was closed while the fetches were in flight.
        return;
    };

    view.clear();
    for (scope, result) in scopes.iter().zip(results) {
        match result {
            Ok(properties) => {
                view.append(&render_scope(scope, &properties));
            }
            Err(err) => {
                warn!(
                    connection,
                    scope = scope.label(),
                    %err,
                    "scope property fetch failed; skipping"
                );
            }
        }
    }
}

/// Render one scope's section as a self-delimited block.
fn render_scope(scope: &Scope, properties: &[Property]) -> String {
    let mut block = format!("{}:\n", scope.label());
    for property in properties {
        block.push_str(&format!("  {} = {}\n", property.name, property.value));
    }
    block
}

//! Stepping and evaluation commands.
//!
//! Each operation delegates to the backend and expects the resulting
//! `Paused`/`Resumed` notification to arrive later through the session
//! event pump; none of them returns the new state directly. All of them
//! fail fast with a "no active pause context" error while the session is
//! running, issuing zero backend calls, rather than forwarding a malformed
//! request over the wire.

use tracing::{debug, info};

use crate::model::{EvalOutcome, SourceLocation};
use crate::session::{locals, Session};
use crate::view::ViewKey;
use crate::Result;

/// Step into the next call.
///
/// # Errors
///
/// Returns [`AppError::Session`](crate::AppError::Session) while running,
/// [`AppError::Backend`](crate::AppError::Backend) on request failure.
pub async fn step_into(session: &Session) -> Result<()> {
    session.top_frame()?;
    session.backend().step_into().await
}

/// Step over the current statement.
///
/// # Errors
///
/// Returns [`AppError::Session`](crate::AppError::Session) while running,
/// [`AppError::Backend`](crate::AppError::Backend) on request failure.
pub async fn step_over(session: &Session) -> Result<()> {
    session.top_frame()?;
    session.backend().step_over().await
}

/// Step out of the current function.
///
/// # Errors
///
/// Returns [`AppError::Session`](crate::AppError::Session) while running,
/// [`AppError::Backend`](crate::AppError::Backend) on request failure.
pub async fn step_out(session: &Session) -> Result<()> {
    session.top_frame()?;
    session.backend().step_out().await
}

/// Resume full execution and close this session's panels.
///
/// Panel cleanup happens only after the backend acknowledges the request
/// and is best-effort: a missing panel is not an error, and cleanup never
/// blocks or fails the resumption itself.
///
/// # Errors
///
/// Returns [`AppError::Session`](crate::AppError::Session) while running,
/// [`AppError::Backend`](crate::AppError::Backend) on request failure.
pub async fn resume(session: &Session) -> Result<()> {
    session.top_frame()?;
    session.backend().resume().await?;
    info!(connection = %session.connection(), "resume acknowledged; closing panels");

    let mut views = session.views().lock().await;
    views.close(&ViewKey::locals(session.connection()));
    views.close(&ViewKey::source(session.connection()));
    Ok(())
}

/// Run until `line` (0-based) in the top frame's script is reached.
///
/// The line is derived from the cursor position in the source panel: the
/// number of lines before the cursor.
///
/// # Errors
///
/// Returns [`AppError::Session`](crate::AppError::Session) while running,
/// [`AppError::Backend`](crate::AppError::Backend) on request failure.
pub async fn continue_to_location(session: &Session, line: u32) -> Result<()> {
    let top = session.top_frame()?;
    let location = SourceLocation {
        script_id: top.location.script_id.clone(),
        line_number: line,
        column_number: 0,
    };
    debug!(
        connection = %session.connection(),
        script_id = %location.script_id,
        line,
        "continue to location"
    );
    session.backend().continue_to_location(&location).await
}

/// Evaluate `expression` in the lexical context of the top frame.
///
/// The returned [`EvalOutcome`] carries either a value or a human-readable
/// error payload; a thrown exception is not an `Err`. Concurrent
/// evaluations are permitted: each outcome correlates to its own call, not
/// to session-global state.
///
/// # Errors
///
/// Returns [`AppError::Session`](crate::AppError::Session) while running,
/// [`AppError::Backend`](crate::AppError::Backend) on protocol failure.
pub async fn evaluate(session: &Session, expression: &str) -> Result<EvalOutcome> {
    let top = session.top_frame()?;
    session.backend().evaluate_on_frame(expression, top).await
}

/// Evaluate `expression` and render the outcome into the inspector panel.
///
/// The structured consumer of [`evaluate`]: appends the rendered outcome
/// (errors prefixed with `Uncaught: `) as one self-delimited block and
/// focuses the panel.
///
/// # Errors
///
/// Same conditions as [`evaluate`].
pub async fn evaluate_to_view(session: &Session, expression: &str) -> Result<()> {
    let outcome = evaluate(session, expression).await?;
    let key = ViewKey::inspect(session.connection());

    let mut views = session.views().lock().await;
    let view = views.open(&key);
    view.append(&format!("{expression}: {}\n", outcome.render()));
    views.focus(&key);
    Ok(())
}

/// Open the locals panel (creating it if needed) and populate it from the
/// current pause's top frame.
///
/// Subsequent pauses keep it refreshed automatically; this command is the
/// only path that force-opens the panel.
///
/// # Errors
///
/// Returns [`AppError::Session`](crate::AppError::Session) while running.
pub async fn show_locals(session: &Session) -> Result<()> {
    let top = session.top_frame()?.clone();
    let key = ViewKey::locals(session.connection());
    {
        let mut views = session.views().lock().await;
        views.open(&key);
        views.focus(&key);
    }

    let epoch_handle = session.pause_epoch();
    let epoch = epoch_handle.load(std::sync::atomic::Ordering::SeqCst);
    locals::refresh_locals(
        session.backend().as_ref(),
        session.views(),
        session.connection(),
        &top,
        &epoch_handle,
        epoch,
    )
    .await;
    Ok(())
}

//! Target runtime process spawner.
//!
//! Builds the inspector-enabled command line from a [`LaunchConfig`] and
//! spawns the process with piped stdout/stderr in the configured working
//! directory. The runtime prints its lifecycle signals on stderr, so both
//! streams are piped and watched.

use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::info;

use crate::config::LaunchConfig;
use crate::{AppError, Result};

/// Build the full command line for the target process.
///
/// `[runtime, inspector-flag, program, args…]`; the inspector flag is
/// `--inspect-brk` when break-on-start is requested, `--inspect`
/// otherwise, with an explicit `=port` suffix when one is configured.
#[must_use]
pub fn build_command_line(config: &LaunchConfig) -> Vec<String> {
    let flag = if config.break_on_start {
        "--inspect-brk"
    } else {
        "--inspect"
    };
    let flag = match config.port {
        Some(port) => format!("{flag}={port}"),
        None => flag.to_owned(),
    };

    let mut argv = vec![config.runtime.clone(), flag, config.program.clone()];
    argv.extend(config.args.iter().cloned());
    argv
}

/// Spawn the target process described by `config`.
///
/// The caller must have validated the configuration; this only performs
/// the spawn. The child is not killed on drop: whether a still-live target
/// outlives the debugger is the supervisor's `stop_on_disconnect` policy,
/// not an ownership side effect.
///
/// # Errors
///
/// Returns [`AppError::Launch`] when the OS spawn fails.
pub fn spawn_target(config: &LaunchConfig) -> Result<Child> {
    let argv = build_command_line(config);
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(root) = &config.resolved_root {
        cmd.current_dir(root);
    }

    let child = cmd
        .spawn()
        .map_err(|err| AppError::Launch(format!("failed to spawn {}: {err}", argv[0])))?;
    info!(
        command = %argv.join(" "),
        pid = child.id(),
        "target process spawned"
    );
    Ok(child)
}

#![forbid(unsafe_code)]

//! `jsdb` — launch a JavaScript runtime under the inspector and supervise
//! its debugging lifecycle.
//!
//! Loads a JSON project file, spawns the target with the computed
//! inspector flags, and logs attach/detach/exit transitions inferred from
//! the process output. Editor front-ends embed the library crate and wire
//! a real [`SessionControl`] and view host instead.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jsdb::config::LaunchConfig;
use jsdb::supervisor::{SessionControl, Supervisor};
use jsdb::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "jsdb", about = "Inspector-protocol debugger launcher", version, long_about = None)]
struct Cli {
    /// Path to the JSON project file describing the launch target.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the working directory for the spawned process.
    #[arg(long)]
    workspace: Option<PathBuf>,
}

/// Connection layer that only logs transitions; used when running the
/// supervisor stand-alone to verify a launch configuration.
struct LogControl {
    quit: CancellationToken,
}

impl SessionControl for LogControl {
    fn connect(
        &self,
        project_dir: &Path,
        project_name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + '_>> {
        let dir = project_dir.display().to_string();
        let name = project_name.to_owned();
        Box::pin(async move {
            info!(project = %name, dir = %dir, "debugger attached");
            Ok(())
        })
    }

    fn disconnect(&self) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async {
            info!("debugger detached");
            Ok(())
        })
    }

    fn quit(&self) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + '_>> {
        let quit = self.quit.clone();
        Box::pin(async move {
            quit.cancel();
            Ok(())
        })
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format);
    info!("jsdb launcher bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = LaunchConfig::load(&args.config)?;

    if let Some(ws) = args.workspace {
        let canonical = ws
            .canonicalize()
            .map_err(|err| AppError::Config(format!("invalid workspace override: {err}")))?;
        config.resolved_root = Some(canonical);
    }

    let quit = CancellationToken::new();
    let control = Arc::new(LogControl { quit: quit.clone() });
    let mut supervisor = Supervisor::launch(&config, control)?;
    info!(program = %config.program, "supervising target process");

    tokio::select! {
        () = quit.cancelled() => {
            info!("target process exited");
            supervisor.shutdown(false).await;
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                return Err(AppError::Io(err.to_string()));
            }
            info!("interrupted; shutting down");
            supervisor.shutdown(true).await;
        }
    }
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
    }
}

//! Process supervisor.
//!
//! Launches the target runtime process, watches its output streams to
//! infer attach/detach events, and keeps the debugging client's lifecycle
//! in sync with the process's lifecycle through the [`SessionControl`]
//! trait. Process death is the fallback safety net: whatever the output
//! watcher saw or missed, a dead process always triggers full teardown.

pub mod codec;
pub mod spawner;
pub mod watcher;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio::process::Child;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LaunchConfig;
use crate::supervisor::codec::OutputCodec;
use crate::supervisor::watcher::{OutputWatcher, WatchSignal};
use crate::Result;

/// Interval between polls for target process exit.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Grace period before a force-kill in [`Supervisor::shutdown`].
const KILL_GRACE: Duration = Duration::from_secs(5);

/// Lifecycle state of the supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No launch issued yet.
    NotStarted,
    /// Launch in progress.
    Starting,
    /// Process alive, no client attached.
    Running,
    /// Process alive with a client attached.
    Attached,
    /// Process alive, client detached (re-armed for another attach).
    Detached,
    /// Process gone or supervisor shut down.
    Stopped,
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Attached => write!(f, "attached"),
            Self::Detached => write!(f, "detached"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Outer connection layer driven by the supervisor.
///
/// Implementations open and close the actual debugging session (and tear
/// the whole client down on process death). All operations are async and
/// best-effort from the supervisor's point of view: failures are logged,
/// never retried.
pub trait SessionControl: Send + Sync {
    /// Connect the debugging client for the project rooted at
    /// `project_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`](crate::AppError::Backend) or
    /// [`AppError::Session`](crate::AppError::Session) when the connection
    /// cannot be established.
    fn connect(
        &self,
        project_dir: &Path,
        project_name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Disconnect the debugging client, leaving the process alive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`](crate::AppError::Session) when no
    /// client is connected.
    fn disconnect(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Tear down the whole client after process death.
    ///
    /// # Errors
    ///
    /// Implementations should be infallible in practice; errors are logged
    /// and ignored.
    fn quit(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Project identifiers recorded at launch and used on attach.
#[derive(Debug, Clone)]
struct ProjectInfo {
    dir: PathBuf,
    name: String,
}

/// State shared between the supervisor handle and its watch tasks.
#[derive(Debug)]
struct Shared {
    watcher: Mutex<OutputWatcher>,
    project: Mutex<Option<ProjectInfo>>,
    state: Mutex<SupervisorState>,
}

/// Supervisor handle for one launched target process.
#[derive(Debug)]
pub struct Supervisor {
    child: Arc<Mutex<Option<Child>>>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    stop_on_disconnect: bool,
    tasks: Vec<JoinHandle<()>>,
}

impl Supervisor {
    /// Validate `config`, spawn the target process, and start watching it.
    ///
    /// Registers one output-watch task per stdio stream (the runtime
    /// prints lifecycle signals on stderr) plus a process-exit observer
    /// that calls `control.quit()` when the process is no longer alive,
    /// regardless of the attach latch state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`](crate::AppError::Config) when no
    /// launch target program is configured and
    /// [`AppError::Launch`](crate::AppError::Launch) when the spawn fails.
    pub fn launch(config: &LaunchConfig, control: Arc<dyn SessionControl>) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            watcher: Mutex::new(OutputWatcher::new()),
            project: Mutex::new(Some(ProjectInfo {
                dir: config.project_dir(),
                name: config.project_name().to_owned(),
            })),
            state: Mutex::new(SupervisorState::Starting),
        });

        let mut child = spawner::spawn_target(config)?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // No watch task exists yet, so the lock is uncontended.
        if let Ok(mut state) = shared.state.try_lock() {
            *state = SupervisorState::Running;
        }

        let cancel = CancellationToken::new();
        let mut tasks = Vec::new();

        if let Some(stdout) = stdout {
            tasks.push(tokio::spawn(watch_stream(
                "stdout",
                stdout,
                Arc::clone(&shared),
                Arc::clone(&control),
                cancel.clone(),
            )));
        }
        if let Some(stderr) = stderr {
            tasks.push(tokio::spawn(watch_stream(
                "stderr",
                stderr,
                Arc::clone(&shared),
                Arc::clone(&control),
                cancel.clone(),
            )));
        }

        let child = Arc::new(Mutex::new(Some(child)));
        tasks.push(tokio::spawn(observe_exit(
            Arc::clone(&child),
            Arc::clone(&shared),
            control,
            cancel.clone(),
        )));

        let supervisor = Self {
            child,
            shared,
            cancel,
            stop_on_disconnect: config.stop_on_disconnect,
            tasks,
        };
        Ok(supervisor)
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SupervisorState {
        *self.shared.state.lock().await
    }

    /// Whether the watcher currently believes a client is attached.
    pub async fn debugger_connected(&self) -> bool {
        self.shared.watcher.lock().await.debugger_connected()
    }

    /// Shut the supervisor down.
    ///
    /// When the close was user-initiated and `stopOnDisconnect` is
    /// enabled, a still-live target process is killed (bounded grace wait,
    /// then force-kill). Process-death teardown passes `false`: the
    /// process is already gone. Project identifiers are cleared on every
    /// path.
    pub async fn shutdown(&mut self, user_initiated: bool) {
        self.cancel.cancel();

        if user_initiated && self.stop_on_disconnect {
            if let Some(mut child) = self.child.lock().await.take() {
                info!("stop-on-disconnect: terminating target process");
                match tokio::time::timeout(KILL_GRACE, child.wait()).await {
                    Ok(Ok(exit)) => {
                        info!(?exit, "target process exited within grace period");
                    }
                    Ok(Err(err)) => {
                        warn!(%err, "error waiting for target process");
                    }
                    Err(_) => {
                        warn!("target process did not exit within grace period, forcing kill");
                        if let Err(err) = child.kill().await {
                            warn!(%err, "failed to kill target process");
                        }
                    }
                }
            }
        }

        self.shared.project.lock().await.take();
        *self.shared.state.lock().await = SupervisorState::Stopped;

        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Drive the output-watching state machine over one stdio stream.
///
/// Lines are decoded by [`OutputCodec`] in order; each is fed to the
/// shared [`OutputWatcher`] latch (shared across stdout and stderr so the
/// same listening phase never connects twice). An `Attach` signal connects
/// the client with the recorded project directory and name; a `Detach`
/// signal disconnects it. Decode errors are logged and skipped.
async fn watch_stream<R>(
    stream_name: &'static str,
    reader: R,
    shared: Arc<Shared>,
    control: Arc<dyn SessionControl>,
    cancel: CancellationToken,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = FramedRead::new(reader, OutputCodec::new());
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            next = lines.next() => match next {
                Some(Ok(line)) => {
                    handle_line(stream_name, &line, &shared, control.as_ref()).await;
                }
                Some(Err(err)) => {
                    warn!(stream = stream_name, %err, "output decode error");
                }
                None => break,
            },
        }
    }
    debug!(stream = stream_name, "output watch finished");
}

/// Apply one output line to the watcher latch and act on the signal.
async fn handle_line(
    stream_name: &'static str,
    line: &str,
    shared: &Shared,
    control: &dyn SessionControl,
) {
    let signal = shared.watcher.lock().await.observe(line);
    match signal {
        Some(WatchSignal::Attach) => {
            let project = shared.project.lock().await.clone();
            if let Some(project) = project {
                info!(
                    stream = stream_name,
                    project = %project.name,
                    "debugger listening; connecting client"
                );
                if let Err(err) = control.connect(&project.dir, &project.name).await {
                    warn!(%err, "client connect failed");
                }
                *shared.state.lock().await = SupervisorState::Attached;
            } else {
                warn!(stream = stream_name, "attach signal after teardown; ignoring");
            }
        }
        Some(WatchSignal::Detach) => {
            info!(stream = stream_name, "runtime waiting for disconnect; detaching client");
            if let Err(err) = control.disconnect().await {
                warn!(%err, "client disconnect failed");
            }
            *shared.state.lock().await = SupervisorState::Detached;
        }
        None => {}
    }
}

/// Poll for process exit and tear the client down when it dies.
///
/// Runs until cancellation or exit. Exit triggers `control.quit()`
/// regardless of the attach latch: this is the safety net when the output
/// watcher missed (or race-lost) the detach signal.
async fn observe_exit(
    child: Arc<Mutex<Option<Child>>>,
    shared: Arc<Shared>,
    control: Arc<dyn SessionControl>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(EXIT_POLL_INTERVAL) => {}
        }

        let exit = {
            let mut guard = child.lock().await;
            match guard.as_mut() {
                Some(process) => match process.try_wait() {
                    Ok(Some(status)) => {
                        guard.take();
                        Some(status.code())
                    }
                    Ok(None) => None,
                    Err(err) => {
                        warn!(%err, "failed to poll target process status");
                        guard.take();
                        Some(None)
                    }
                },
                // Already reaped (e.g., by shutdown).
                None => return,
            }
        };

        if let Some(code) = exit {
            info!(exit_code = ?code, "target process exited; tearing down client");
            if let Err(err) = control.quit().await {
                warn!(%err, "client teardown failed");
            }
            shared.project.lock().await.take();
            *shared.state.lock().await = SupervisorState::Stopped;
            return;
        }
    }
}

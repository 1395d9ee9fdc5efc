//! Bounded process runner - execute the interpreter against one script

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Exit code recorded for a killed test case. Real exit statuses are never
/// negative, so this cannot collide with one.
pub const TIMED_OUT_EXIT_CODE: i32 = -1;

/// Reported for a child that exited without a status code (killed by a signal)
const SIGNALED_EXIT_CODE: i32 = 1;

/// How long to keep draining pipes once the child is gone. A grandchild that
/// inherited the pipes can keep them open past the exit or kill.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Errors that prevent a test case from producing an execution result
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("could not launch {interpreter}: {source}")]
    Spawn {
        interpreter: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting on interpreter: {0}")]
    Wait(#[source] std::io::Error),
}

/// Captured output and status of a single interpreter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Real exit status, or [`TIMED_OUT_EXIT_CODE`] when `timed_out`
    pub exit_code: i32,
    /// Authoritative timeout flag; check it before `exit_code`
    pub timed_out: bool,
}

/// Runs the interpreter binary with a per-test deadline
pub struct ProcessRunner {
    interpreter: PathBuf,
    timeout: Duration,
    runtime: Runtime,
}

impl ProcessRunner {
    /// Create a runner for `interpreter` that kills cases after `timeout`
    pub fn new(interpreter: impl Into<PathBuf>, timeout: Duration) -> Result<Self, RunError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RunError::Runtime)?;

        Ok(Self {
            interpreter: interpreter.into(),
            timeout,
            runtime,
        })
    }

    /// Run `interpreter <script>` to completion or until the deadline.
    pub fn run(&self, script: &Path) -> Result<ExecutionResult, RunError> {
        self.runtime.block_on(self.run_bounded(script))
    }

    async fn run_bounded(&self, script: &Path) -> Result<ExecutionResult, RunError> {
        let mut child = Command::new(&self.interpreter)
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                interpreter: self.interpreter.clone(),
                source,
            })?;

        debug!(pid = ?child.id(), script = %script.display(), "interpreter spawned");

        let stdout_drain = spawn_drain_task(child.stdout.take());
        let stderr_drain = spawn_drain_task(child.stderr.take());

        // The deadline timer lives inside this future and is dropped with it,
        // so a natural exit never leaves a pending kill behind.
        let waited = tokio::time::timeout(self.timeout, child.wait()).await;

        match waited {
            Ok(status) => {
                let status = status.map_err(RunError::Wait)?;
                let exit_code = status.code().unwrap_or(SIGNALED_EXIT_CODE);
                debug!(exit_code, "interpreter exited");

                Ok(ExecutionResult {
                    stdout: collect(stdout_drain).await,
                    stderr: collect(stderr_drain).await,
                    exit_code,
                    timed_out: false,
                })
            }
            Err(_elapsed) => {
                warn!(
                    script = %script.display(),
                    timeout = ?self.timeout,
                    "interpreter exceeded deadline, killing"
                );
                child.kill().await.map_err(RunError::Wait)?;

                // Whatever status the OS reports after the kill is ignored.
                Ok(ExecutionResult {
                    stdout: collect(stdout_drain).await,
                    stderr: collect(stderr_drain).await,
                    exit_code: TIMED_OUT_EXIT_CODE,
                    timed_out: true,
                })
            }
        }
    }
}

/// Bytes read from a child pipe so far
type Captured = Arc<Mutex<Vec<u8>>>;

/// A background pipe reader and the buffer it fills
struct Drain {
    task: JoinHandle<()>,
    captured: Captured,
}

/// Read a child pipe to EOF in the background, appending each chunk to a
/// buffer shared with the caller
fn spawn_drain_task<R>(reader: Option<R>) -> Drain
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let captured = Captured::default();
    let sink = Arc::clone(&captured);

    let task = tokio::spawn(async move {
        let Some(mut reader) = reader else {
            return;
        };
        let mut chunk = [0u8; 8192];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => lock(&sink).extend_from_slice(&chunk[..n]),
                Err(e) => {
                    debug!("pipe read ended early: {}", e);
                    break;
                }
            }
        }
    });

    Drain { task, captured }
}

/// Wait briefly for a drain to reach EOF once the child is gone, then take
/// whatever it has read
async fn collect(drain: Drain) -> Vec<u8> {
    let Drain { mut task, captured } = drain;

    match tokio::time::timeout(DRAIN_GRACE, &mut task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!("drain task failed: {}", e),
        Err(_) => {
            debug!("pipe still held open after exit, keeping partial output");
            task.abort();
        }
    }

    let out = std::mem::take(&mut *lock(&captured));
    out
}

fn lock(captured: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    captured.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

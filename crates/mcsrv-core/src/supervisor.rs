//! Process supervisor: run the artifact as a child and bridge its stdio.
//!
//! The caller hands in the streams to bridge (normally the process's own
//! stdin/stdout). Two copy tasks run next to the child wait:
//!
//! - input → child stdin, then the pipe is closed so the child sees EOF;
//! - child stdout → output, then flushed.
//!
//! A failing bridge is logged and recorded, never fatal. The child's exit
//! decides when the run is over.

use crate::error::{LaunchError, Result};
use crate::fetcher::VerifiedArtifact;
use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Flags placed after the passthrough arguments, around the artifact path.
const SERVER_VM_FLAGS: [&str; 2] = ["-server", "-jar"];
/// Last argument: run without the interactive GUI console.
const NO_GUI: &str = "nogui";

/// Program and full argument list for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    program: String,
    args: Vec<OsString>,
}

impl LaunchSpec {
    /// Launch a verified artifact: `program [passthrough..] -server -jar <artifact> nogui`.
    pub fn verified(program: &str, artifact: &VerifiedArtifact, passthrough: &[String]) -> Self {
        Self::server(program, artifact.path(), passthrough)
    }

    /// Same command line for a file that was not verified (version check disabled).
    pub fn unchecked(program: &str, jar: &Path, passthrough: &[String]) -> Self {
        Self::server(program, jar, passthrough)
    }

    fn server(program: &str, jar: &Path, passthrough: &[String]) -> Self {
        let mut args: Vec<OsString> = passthrough.iter().map(OsString::from).collect();
        args.extend(SERVER_VM_FLAGS.iter().map(OsString::from));
        args.push(jar.as_os_str().to_owned());
        args.push(OsString::from(NO_GUI));
        Self {
            program: program.to_string(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

/// What happened to one bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeStatus {
    /// Source reached end of stream; `bytes` were copied.
    Completed { bytes: u64 },
    /// Copy stopped on an IO error (already logged).
    Failed(String),
    /// Still blocked on its source when the run ended; left running.
    Detached,
}

/// Outcome of a supervised run.
#[derive(Debug)]
pub struct RunReport {
    pub status: ExitStatus,
    pub stdin: BridgeStatus,
    pub stdout: BridgeStatus,
}

impl RunReport {
    /// Exit code the launcher should exit with.
    pub fn exit_code(&self) -> i32 {
        exit_code(&self.status)
    }
}

/// The child's exit code; on Unix a signal death maps to `128 + signal`.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}

async fn bridge<R, W>(direction: &'static str, mut from: R, mut to: W) -> BridgeStatus
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let copied = match tokio::io::copy(&mut from, &mut to).await {
        Ok(bytes) => to.shutdown().await.map(|()| bytes),
        Err(e) => Err(e),
    };
    match copied {
        Ok(bytes) => {
            tracing::debug!(direction, bytes, "bridge reached end of stream");
            BridgeStatus::Completed { bytes }
        }
        Err(e) => {
            tracing::warn!(direction, error = %e, "bridge failed");
            BridgeStatus::Failed(e.to_string())
        }
    }
}

fn joined(direction: &'static str, res: std::result::Result<BridgeStatus, tokio::task::JoinError>) -> BridgeStatus {
    res.unwrap_or_else(|e| {
        tracing::warn!(direction, error = %e, "bridge task ended abnormally");
        BridgeStatus::Failed(e.to_string())
    })
}

/// Launches and supervises one child.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    /// How long to wait for the stdin bridge after the child exits.
    stdin_grace: Duration,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl Supervisor {
    pub fn new(stdin_grace: Duration) -> Self {
        Self { stdin_grace }
    }

    /// Spawn `spec`, bridge `input`/`output` to its stdin/stdout and wait for it to exit.
    ///
    /// Spawn failure is reported before any bridge starts. After the exit the
    /// stdout bridge is drained; the stdin bridge gets `stdin_grace` to finish
    /// and is otherwise left detached, since its source may never end.
    pub async fn run<R, W>(&self, spec: &LaunchSpec, input: R, output: W) -> Result<RunReport>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tracing::info!(program = %spec.program, args = ?spec.args, "starting child");
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                program: spec.program.clone(),
                source: e,
            })?;
        let child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| LaunchError::IoBridge("child stdin not captured".to_string()))?;
        let child_stdout = child
            .stdout
            .take()
            .ok_or_else(|| LaunchError::IoBridge("child stdout not captured".to_string()))?;
        tracing::debug!(pid = ?child.id(), "child started");

        let stdin_task: JoinHandle<BridgeStatus> = tokio::spawn(bridge("stdin", input, child_stdin));
        let stdout_task: JoinHandle<BridgeStatus> =
            tokio::spawn(bridge("stdout", child_stdout, output));

        let status = child
            .wait()
            .await
            .map_err(|e| LaunchError::IoBridge(format!("wait: {}", e)))?;
        tracing::info!(%status, "child exited");

        let stdout = joined("stdout", stdout_task.await);
        let stdin = match tokio::time::timeout(self.stdin_grace, stdin_task).await {
            Ok(res) => joined("stdin", res),
            Err(_) => {
                tracing::debug!("stdin bridge still waiting on its source; detaching");
                BridgeStatus::Detached
            }
        };

        Ok(RunReport {
            status,
            stdin,
            stdout,
        })
    }
}

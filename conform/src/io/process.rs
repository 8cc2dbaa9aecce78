//! Running entry scripts as child processes.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::types::Violation;

/// Captured result of one entry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Full command line: interpreter prefix followed by the entry path.
    pub argv: Vec<String>,
    /// Exit code, `None` when killed by a signal or on timeout.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl Execution {
    /// Stdout of a successful run, or `ExecutionFailed` carrying stderr.
    pub fn into_stdout(self) -> Result<String, Violation> {
        if self.timed_out {
            let mut stderr = self.stderr;
            stderr.push_str("\n[process timed out and was killed]");
            return Err(Violation::ExecutionFailed { code: None, stderr });
        }
        if self.code != Some(0) {
            return Err(Violation::ExecutionFailed {
                code: self.code,
                stderr: self.stderr,
            });
        }
        Ok(self.stdout)
    }
}

/// Build the command for `prefix` followed by the entry file path.
fn entry_command(prefix: &[String], entry_path: &Path) -> Result<(Command, Vec<String>)> {
    let Some((program, args)) = prefix.split_first() else {
        bail!("interpreter command must be non-empty");
    };
    let mut cmd = Command::new(program);
    cmd.args(args).arg(entry_path);

    let mut argv = prefix.to_vec();
    argv.push(entry_path.display().to_string());
    Ok((cmd, argv))
}

/// Run an entry and capture stdout and stderr in full.
///
/// Both pipes are drained on reader threads while the child runs, so a
/// chatty script cannot deadlock on a full pipe. The child is killed once
/// `timeout` elapses. A non-zero exit is not an error here; see
/// [`Execution::into_stdout`].
#[instrument(skip_all, fields(entry = %entry_path.display(), timeout_secs = timeout.as_secs()))]
pub fn run_captured(prefix: &[String], entry_path: &Path, timeout: Duration) -> Result<Execution> {
    let (mut cmd, argv) = entry_command(prefix, entry_path)?;
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(?argv, "spawning entry process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, ?argv, "failed to spawn entry process");
            return Err(e).with_context(|| format!("spawn {}", argv.join(" ")));
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream(stdout));
    let stderr_handle = thread::spawn(move || read_stream(stderr));

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).context("wait for entry")? {
        Some(status) => status,
        None => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "entry timed out, killing"
            );
            timed_out = true;
            child.kill().context("kill entry")?;
            child.wait().context("wait entry after kill")?
        }
    };

    let stdout = join_output(stdout_handle).context("join stdout")?;
    let stderr = join_output(stderr_handle).context("join stderr")?;

    debug!(
        exit_code = ?status.code(),
        timed_out,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "entry finished"
    );
    Ok(Execution {
        argv,
        code: if timed_out { None } else { status.code() },
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        timed_out,
    })
}

/// Run an entry attached to the current terminal and return its exit code.
///
/// Output is not captured. `None` means the child was terminated by a signal.
#[instrument(skip_all, fields(entry = %entry_path.display()))]
pub fn run_streaming(prefix: &[String], entry_path: &Path) -> Result<Option<i32>> {
    let (mut cmd, argv) = entry_command(prefix, entry_path)?;
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    debug!(?argv, "spawning entry process");
    let status = cmd
        .status()
        .with_context(|| format!("spawn {}", argv.join(" ")))?;
    debug!(exit_code = ?status.code(), "entry finished");
    Ok(status.code())
}

fn join_output(handle: thread::JoinHandle<Result<Vec<u8>>>) -> Result<Vec<u8>> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).context("read output")?;
    Ok(buf)
}

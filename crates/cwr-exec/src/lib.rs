//! Execution sandbox: runs model-supplied snippets as subprocesses and
//! captures combined output.
//!
//! Python snippets are written to a temp file and handed to `python3`; sh
//! snippets run through `bash -c`. Either way the snippet's stdout and stderr
//! are captured into one buffer and success is exit status zero. Every
//! failure cause looks the same to callers: a false success flag.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use cwr_core::{CwrError, Language};

/// Exit code reported when the wall-clock limit fires (shell convention).
const TIMEOUT_EXIT_CODE: i32 = 124;

/// Result of executing one snippet.
///
/// Transient: only the environment message derived from `output` is
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    /// Captured stdout followed by captured stderr.
    pub output: String,
    /// Exit status zero, regardless of what was printed.
    pub success: bool,
    /// Exit code (1 if signal-killed, 124 on timeout).
    pub exit_code: i32,
}

/// Check that the interpreter for `language` is installed.
pub fn check_interpreter(language: Language) -> Result<(), CwrError> {
    let executable = match language {
        Language::Python => "python3",
        Language::Sh => "bash",
    };
    which::which(executable)
        .map(|_| ())
        .map_err(|_| CwrError::InterpreterMissing(executable.to_string()))
}

/// Execute a snippet in `workdir` and capture its combined output.
///
/// `timeout` bounds wall-clock time; `None` lets the snippet run
/// indefinitely. On expiry the child's process group is killed, accumulated
/// output is kept, and the outcome is a failure with exit code 124.
pub async fn run_snippet(
    code: &str,
    language: Language,
    workdir: &Path,
    timeout: Option<Duration>,
) -> Result<ExecutionOutcome> {
    check_interpreter(language)?;

    debug!(language = %language, bytes = code.len(), "executing snippet");

    match language {
        Language::Python => {
            // The temp file must outlive the child process.
            let mut script = tempfile::Builder::new()
                .prefix("cwr-snippet-")
                .suffix(".py")
                .tempfile_in(workdir)
                .context("Failed to create snippet temp file")?;
            script
                .write_all(code.as_bytes())
                .context("Failed to write snippet temp file")?;
            script.flush().context("Failed to flush snippet temp file")?;

            let mut cmd = Command::new("python3");
            cmd.arg(script.path());
            cmd.current_dir(workdir);
            run_and_capture(cmd, timeout).await
        }
        Language::Sh => {
            let mut cmd = Command::new("bash");
            cmd.args(["-c", code]);
            cmd.current_dir(workdir);
            run_and_capture(cmd, timeout).await
        }
    }
}

/// Spawn a snippet process with piped stdio.
///
/// The child is isolated in its own process group (via setsid) so a timeout
/// can terminate the entire subprocess tree, and kill_on_drop is a safety
/// net for early returns.
fn spawn_snippet(mut cmd: Command) -> Result<tokio::process::Child> {
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.kill_on_drop(true);

    // SAFETY: setsid() is async-signal-safe and we call it before exec,
    // so no Rust runtime state exists in the child yet.
    #[cfg(unix)]
    unsafe {
        cmd.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    cmd.spawn().context("Failed to spawn snippet process")
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    // Negative PID addresses the whole process group created by setsid.
    // SAFETY: plain syscall; an already-gone group is a harmless ESRCH.
    unsafe {
        libc::kill(-(pid as i32), libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

/// Run a spawned command to completion, accumulating stdout and stderr,
/// enforcing the optional deadline.
async fn run_and_capture(cmd: Command, timeout: Option<Duration>) -> Result<ExecutionOutcome> {
    let mut child = spawn_snippet(cmd)?;
    let pid = child.id();

    let stdout = child.stdout.take().context("Failed to capture stdout")?;
    let stderr = child.stderr.take().context("Failed to capture stderr")?;

    let mut stdout_reader = BufReader::new(stdout);
    let mut stderr_reader = BufReader::new(stderr);
    let mut stdout_buf = String::new();
    let mut stderr_buf = String::new();
    let mut stdout_line = String::new();
    let mut stderr_line = String::new();

    let deadline = timeout.map(|limit| tokio::time::Instant::now() + limit);

    let mut stdout_done = false;
    let mut stderr_done = false;
    let mut timed_out = false;

    while !(stdout_done && stderr_done) {
        tokio::select! {
            result = stdout_reader.read_line(&mut stdout_line), if !stdout_done => {
                match result {
                    Ok(0) => stdout_done = true,
                    Ok(_) => {
                        stdout_buf.push_str(&stdout_line);
                        stdout_line.clear();
                    }
                    Err(_) => stdout_done = true,
                }
            }
            result = stderr_reader.read_line(&mut stderr_line), if !stderr_done => {
                match result {
                    Ok(0) => stderr_done = true,
                    Ok(_) => {
                        stderr_buf.push_str(&stderr_line);
                        stderr_line.clear();
                    }
                    Err(_) => stderr_done = true,
                }
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(tokio::time::Instant::now)),
                if deadline.is_some() =>
            {
                timed_out = true;
                break;
            }
        }
    }

    let mut output = stdout_buf;
    output.push_str(&stderr_buf);

    if timed_out {
        if let Some(pid) = pid {
            kill_process_group(pid);
        }
        // Reap the child so it does not linger as a zombie.
        let _ = child.wait().await;

        let limit = timeout.expect("timed_out implies a timeout was set");
        warn!(seconds = limit.as_secs(), "snippet killed after timeout");
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&format!(
            "[execution timed out after {}s]\n",
            limit.as_secs()
        ));

        return Ok(ExecutionOutcome {
            output,
            success: false,
            exit_code: TIMEOUT_EXIT_CODE,
        });
    }

    let status = child.wait().await.context("Failed to wait for snippet")?;
    let exit_code = status.code().unwrap_or_else(|| {
        warn!("snippet terminated by signal, using exit code 1");
        1
    });

    Ok(ExecutionOutcome {
        output,
        success: status.success(),
        exit_code,
    })
}

//! Runs external programs with an optional wall-clock limit.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use camino::Utf8Path;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{program}: {source}")]
    NotFound {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
}

impl CommandError {
    /// The most useful single-line description: the child's stderr when it
    /// failed, the error itself otherwise.
    pub fn message(&self) -> String {
        match self {
            CommandError::Failed { stderr, .. } if !stderr.trim().is_empty() => {
                normalise_stderr(stderr)
            }
            other => other.to_string(),
        }
    }
}

/// Trims the output and drops the wrapped-line indentation some PHP console
/// tools put into their error boxes.
pub fn normalise_stderr(stderr: &str) -> String {
    stderr.trim().replace("  \n  ", "")
}

/// Runs `program` with `args` in `dir` (the current directory when `None`)
/// and returns its stdout.
///
/// A non-zero exit becomes [`CommandError::Failed`] carrying stderr. When
/// `timeout` elapses first the child is killed.
pub fn run_command(
    program: &str,
    args: &[String],
    dir: Option<&Utf8Path>,
    timeout: Option<Duration>,
) -> Result<Vec<u8>, CommandError> {
    debug!(program, ?args, ?timeout, "running command");
    let mut command = Command::new(program);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    let mut child = command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| {
            let program = program.to_string();
            if source.kind() == io::ErrorKind::NotFound {
                CommandError::NotFound { program, source }
            } else {
                CommandError::Spawn { program, source }
            }
        })?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = wait(&mut child, timeout).map_err(|e| match e {
        Waited::Io(source) => CommandError::Spawn {
            program: program.to_string(),
            source,
        },
        Waited::TimedOut(timeout) => CommandError::TimedOut {
            program: program.to_string(),
            timeout,
        },
    })?;

    let stdout = collect(stdout);
    let stderr = collect(stderr);
    if !status.success() {
        return Err(CommandError::Failed {
            program: program.to_string(),
            status,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        });
    }
    Ok(stdout)
}

enum Waited {
    Io(io::Error),
    TimedOut(Duration),
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus, Waited> {
    let Some(timeout) = timeout else {
        return child.wait().map_err(Waited::Io);
    };
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().map_err(Waited::Io)? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            // The child may already be gone; either way it is reaped below.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Waited::TimedOut(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

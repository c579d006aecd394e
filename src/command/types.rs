//! Process output types and the command runner abstraction.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Command as ProcessCommand, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use crate::error::RsyncError;

/// Result of running an external command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code reported by the process, if available.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the exit code equals zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Abstraction over command execution to support fakes in tests.
pub trait CommandRunner {
    /// Runs `program` with the given arguments, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Spawn`] if the command cannot be started.
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RsyncError>;
}

/// Real command runner that captures output silently.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RsyncError> {
        let output = ProcessCommand::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| spawn_error(program, &err))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Command runner that forwards output to the parent's stdout and stderr as
/// each line arrives, while still capturing both streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamingCommandRunner;

impl CommandRunner for StreamingCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RsyncError> {
        let mut child = ProcessCommand::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| spawn_error(program, &err))?;

        let stdout_thread = child
            .stdout
            .take()
            .map(|pipe| thread::spawn(move || forward_lines(pipe, io::stdout())));
        let stderr_thread = child
            .stderr
            .take()
            .map(|pipe| thread::spawn(move || forward_lines(pipe, io::stderr())));

        // Reader threads drain both pipes, so waiting here cannot block on a
        // full pipe buffer.
        let status = child.wait();
        if status.is_err() {
            // The pipes only close once the child is gone.
            child.kill().ok();
        }
        collect_output(program, status, stdout_thread, stderr_thread)
    }
}

type ReaderHandle = JoinHandle<io::Result<Vec<u8>>>;

/// Joins both reader threads before classifying the wait result, so no
/// reader outlives the call.
fn collect_output(
    program: &str,
    status: io::Result<ExitStatus>,
    stdout_thread: Option<ReaderHandle>,
    stderr_thread: Option<ReaderHandle>,
) -> Result<CommandOutput, RsyncError> {
    let stdout = join_reader(stdout_thread, program, "stdout");
    let stderr = join_reader(stderr_thread, program, "stderr");

    let exit_status = status.map_err(|err| RsyncError::Spawn {
        program: program.to_owned(),
        message: format!("failed to wait for process: {err}"),
    })?;

    Ok(CommandOutput {
        code: exit_status.code(),
        stdout: stdout?,
        stderr: stderr?,
    })
}

/// Copies `source` into `sink` one line at a time and returns everything read.
///
/// Forwarding stops quietly if `sink` rejects a write; capture continues so
/// the caller still receives the full output.
fn forward_lines<S: Read, W: Write>(source: S, mut sink: W) -> io::Result<Vec<u8>> {
    let mut reader = BufReader::new(source);
    let mut captured = Vec::new();
    let mut line = Vec::new();
    let mut forwarding = true;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if forwarding {
            forwarding = sink.write_all(&line).and_then(|()| sink.flush()).is_ok();
        }
        captured.extend_from_slice(&line);
    }

    Ok(captured)
}

fn join_reader(
    handle: Option<ReaderHandle>,
    program: &str,
    stream: &str,
) -> Result<String, RsyncError> {
    let Some(reader) = handle else {
        return Ok(String::new());
    };

    let bytes = reader
        .join()
        .map_err(|_| RsyncError::Spawn {
            program: program.to_owned(),
            message: format!("{stream} reader thread panicked"),
        })?
        .map_err(|err| RsyncError::Spawn {
            program: program.to_owned(),
            message: format!("failed to read {stream}: {err}"),
        })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn spawn_error(program: &str, err: &io::Error) -> RsyncError {
    RsyncError::Spawn {
        program: program.to_owned(),
        message: err.to_string(),
    }
}

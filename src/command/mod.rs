//! Ordered model of a single process invocation.
//!
//! A [`Command`] collects single-letter options, long-form arguments, and
//! positional parameters. Rendering always emits them in that order: the
//! option cluster first, then arguments in insertion order, then parameters.
//! Callers compare rendered strings, so the order is part of the contract.

use std::ffi::OsString;
use std::fmt;

use tracing::{debug, warn};

use crate::error::RsyncError;

mod quote;
mod types;

pub use types::{CommandOutput, CommandRunner, ProcessCommandRunner, StreamingCommandRunner};

pub(crate) use quote::single_quote;

/// How an argument behaves when its name is used again.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgumentKind {
    /// Appended on every call; exclusion patterns use this.
    Repeatable,
    /// Replaced in place when set again under the same name.
    Upsert,
}

/// A long-form `--name` argument with an optional value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Argument {
    name: String,
    value: Option<String>,
    kind: ArgumentKind,
}

impl Argument {
    /// Argument name without the leading dashes.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value carried by the argument, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether the argument was appended or upserted.
    #[must_use]
    pub const fn kind(&self) -> ArgumentKind {
        self.kind
    }

    fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("--{} {}", self.name, single_quote(value)),
            None => format!("--{}", self.name),
        }
    }
}

/// Process invocation assembled token by token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    executable: String,
    options: Vec<char>,
    arguments: Vec<Argument>,
    parameters: Vec<String>,
}

impl Command {
    /// Creates an empty command for `executable`.
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            options: Vec::new(),
            arguments: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Appends a single-letter flag to the option cluster. Duplicates are kept.
    pub fn add_option(&mut self, flag: char) -> &mut Self {
        self.options.push(flag);
        self
    }

    /// Appends a repeatable `--name [value]` argument.
    pub fn add_argument(&mut self, name: impl Into<String>, value: Option<&str>) -> &mut Self {
        self.arguments.push(Argument {
            name: name.into(),
            value: value.map(str::to_owned),
            kind: ArgumentKind::Repeatable,
        });
        self
    }

    /// Sets `--name [value]`, replacing the value of an earlier
    /// [`Command::set_argument`] call for the same name without moving it.
    pub fn set_argument(&mut self, name: impl Into<String>, value: Option<&str>) -> &mut Self {
        let argument_name = name.into();
        let new_value = value.map(str::to_owned);
        if let Some(existing) = self
            .arguments
            .iter_mut()
            .find(|arg| arg.kind == ArgumentKind::Upsert && arg.name == argument_name)
        {
            existing.value = new_value;
        } else {
            self.arguments.push(Argument {
                name: argument_name,
                value: new_value,
                kind: ArgumentKind::Upsert,
            });
        }
        self
    }

    /// Appends a positional operand.
    pub fn add_parameter(&mut self, value: impl Into<String>) -> &mut Self {
        self.parameters.push(value.into());
        self
    }

    /// Program that will be spawned.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Flags in first-insertion order.
    #[must_use]
    pub fn options(&self) -> &[char] {
        &self.options
    }

    /// Long-form arguments in insertion order.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Positional operands in insertion order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Builds the argv passed to the child, excluding the program itself.
    ///
    /// Values are passed through unquoted; [`Command::render`] is the
    /// shell-equivalent text of this vector.
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(1 + self.arguments.len() * 2 + self.parameters.len());
        if !self.options.is_empty() {
            args.push(OsString::from(self.option_cluster()));
        }
        for argument in &self.arguments {
            args.push(OsString::from(format!("--{}", argument.name)));
            if let Some(ref value) = argument.value {
                args.push(OsString::from(value));
            }
        }
        args.extend(self.parameters.iter().map(OsString::from));
        args
    }

    /// Renders the full command line with shell quoting applied.
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(2 + self.arguments.len() + self.parameters.len());
        parts.push(quote::quote_operand(&self.executable).into_owned());
        if !self.options.is_empty() {
            parts.push(quote::quote_operand(&self.option_cluster()).into_owned());
        }
        parts.extend(self.arguments.iter().map(Argument::render));
        parts.extend(
            self.parameters
                .iter()
                .map(|param| quote::quote_operand(param).into_owned()),
        );
        parts.join(" ")
    }

    /// Runs the command, forwarding output live when `stream_output` is set.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Spawn`] when the process cannot be started and
    /// [`RsyncError::CommandFailure`] when it exits with a non-zero status.
    pub fn execute(&self, stream_output: bool) -> Result<CommandOutput, RsyncError> {
        if stream_output {
            self.execute_with(&StreamingCommandRunner)
        } else {
            self.execute_with(&ProcessCommandRunner)
        }
    }

    /// Runs the command through `runner` and classifies the exit status.
    ///
    /// # Errors
    ///
    /// Propagates runner failures and returns [`RsyncError::CommandFailure`]
    /// carrying the exit code and captured output on a non-zero status.
    pub fn execute_with<R: CommandRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<CommandOutput, RsyncError> {
        debug!(command = %self, "spawning command");
        let output = runner.run(&self.executable, &self.args())?;
        if output.is_success() {
            debug!(program = %self.executable, "command completed");
            return Ok(output);
        }

        let status_text = output
            .code
            .map_or_else(|| String::from("unknown"), |code| code.to_string());
        warn!(program = %self.executable, status = %status_text, "command failed");
        Err(RsyncError::CommandFailure {
            program: self.executable.clone(),
            status: output.code,
            status_text,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn option_cluster(&self) -> String {
        let mut cluster = String::with_capacity(self.options.len() + 1);
        cluster.push('-');
        cluster.extend(self.options.iter());
        cluster
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

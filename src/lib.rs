//! Core library for the `rsyncer` synchronisation wrapper.
//!
//! The crate turns a declarative [`RsyncConfig`] into a correctly quoted
//! `rsync` invocation, optionally tunnelled over SSH, runs it, and reports
//! success or failure from the child's exit status.

pub mod command;
pub mod error;
pub mod rsync;
pub mod settings;
pub mod ssh;
#[cfg(test)]
mod test_helpers;
pub mod test_support;

pub use command::{
    Argument, ArgumentKind, Command, CommandOutput, CommandRunner, ProcessCommandRunner,
    StreamingCommandRunner,
};
pub use error::{ConfigLoadError, RsyncError};
pub use rsync::{
    DEFAULT_RSYNC_EXECUTABLE, OptionalParameters, Rsync, RsyncConfig, apply_recognized_options,
};
pub use settings::{RunnerSettings, read_options_file};
pub use ssh::{DEFAULT_SSH_EXECUTABLE, DEFAULT_SSH_PORT, PortValue, SshConnection, SshOptions};

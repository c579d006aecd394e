//! Error types shared by the connection builder, command model, and
//! synchronisation translator.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced while validating settings or running `rsync`.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RsyncError {
    /// Raised synchronously when a setting is malformed or incomplete.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Setting that failed validation.
        field: String,
        /// Human readable reason.
        message: String,
    },
    /// Raised when a command cannot be spawned.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Command that failed to start.
        program: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the child process completes with a non-zero exit code.
    #[error("{program} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Command name used for the attempted operation.
        program: String,
        /// Exit status as reported by the OS. `None` when terminated by a
        /// signal.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stdout captured from the process.
        stdout: String,
        /// Stderr captured from the process.
        stderr: String,
    },
}

impl RsyncError {
    /// Builds a [`RsyncError::Validation`] for `field`.
    #[must_use]
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    /// Returns the child exit code carried by a command failure.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailure { status, .. } => *status,
            Self::Validation { .. } | Self::Spawn { .. } => None,
        }
    }
}

/// Errors raised when loading layered settings or option files.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigLoadError {
    /// Indicates that parsing or merging configuration layers failed.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
    /// Indicates that an options file could not be read.
    #[error("failed to read options file {path}: {message}")]
    Read {
        /// File that could not be read.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// Wraps a validation failure raised while applying options.
    #[error(transparent)]
    Invalid(#[from] RsyncError),
}

impl From<ortho_config::OrthoError> for ConfigLoadError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

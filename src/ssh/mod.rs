//! SSH connection settings and the strings derived from them.
//!
//! [`SshConnection`] validates the port and key path once, at construction,
//! and renders three strings: the `user@host` login, the client invocation
//! used as rsync's `--rsh` value, and a full runnable command for diagnostics.
//! Username and host are only checked when a login string is requested, so
//! settings can be assembled incrementally.

use std::fs::{File, FileType};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::command::single_quote;
use crate::error::RsyncError;

/// Port assumed by the SSH client when none is given.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Client executable used when none is configured.
pub const DEFAULT_SSH_EXECUTABLE: &str = "ssh";

/// Port as it appears in an options mapping, before validation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PortValue {
    /// Numeric form, e.g. `2222`.
    Number(i64),
    /// Textual form, e.g. `"2222"`.
    Text(String),
}

impl PortValue {
    fn parse(&self) -> Result<u16, RsyncError> {
        let parsed = match self {
            Self::Number(number) => u16::try_from(*number).ok(),
            Self::Text(text) => text.trim().parse::<u16>().ok(),
        };
        match parsed {
            Some(port) if port > 0 => Ok(port),
            _ => Err(RsyncError::validation(
                "port",
                format!("expected a positive integer, got {self}"),
            )),
        }
    }
}

impl std::fmt::Display for PortValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => write!(f, "'{text}'"),
        }
    }
}

/// Remote-access settings as supplied by the caller.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SshOptions {
    /// Remote user to log in as.
    pub username: Option<String>,
    /// Hostname or address of the remote machine.
    pub host: Option<String>,
    /// Port the remote SSH daemon listens on.
    pub port: Option<PortValue>,
    /// Key file handed to the client with `-i`. Supports `~/` expansion.
    pub public_key: Option<String>,
    /// Path or name of the SSH client executable.
    pub executable: Option<String>,
}

/// Validated SSH settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SshConnection {
    username: Option<String>,
    host: Option<String>,
    port: u16,
    public_key: Option<Utf8PathBuf>,
    executable: String,
}

impl SshConnection {
    /// Validates `options` and builds a connection.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] when the port is not a positive
    /// integer, the key path does not name a readable file, or the executable
    /// is blank.
    pub fn new(options: SshOptions) -> Result<Self, RsyncError> {
        let port = options
            .port
            .as_ref()
            .map_or(Ok(DEFAULT_SSH_PORT), PortValue::parse)?;
        let public_key = options
            .public_key
            .as_deref()
            .map(validate_public_key)
            .transpose()?;
        let executable = match options.executable {
            None => DEFAULT_SSH_EXECUTABLE.to_owned(),
            Some(value) if !value.trim().is_empty() => value,
            Some(_) => {
                return Err(RsyncError::validation(
                    "ssh executable",
                    "must not be empty",
                ));
            }
        };

        Ok(Self {
            username: non_blank(options.username),
            host: non_blank(options.host),
            port,
            public_key,
            executable,
        })
    }

    /// Replaces the key path after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] when `path` does not name a readable
    /// file; the previous key is kept.
    pub fn set_public_key(&mut self, path: &str) -> Result<(), RsyncError> {
        self.public_key = Some(validate_public_key(path)?);
        Ok(())
    }

    /// Client executable.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Effective port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Validated key path, if any.
    #[must_use]
    pub fn public_key(&self) -> Option<&Utf8Path> {
        self.public_key.as_deref()
    }

    /// Returns `<username>@<host>`.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] when the username or host is unset.
    pub fn login_string(&self) -> Result<String, RsyncError> {
        let Some(ref username) = self.username else {
            return Err(RsyncError::validation("ssh settings", "missing username"));
        };
        let Some(ref host) = self.host else {
            return Err(RsyncError::validation("ssh settings", "missing host"));
        };
        Ok(format!("{username}@{host}"))
    }

    /// Renders the client and its options without a login, ready to embed as
    /// rsync's `--rsh` value.
    #[must_use]
    pub fn client_invocation(&self) -> String {
        let mut invocation = self.executable.clone();
        if self.port != DEFAULT_SSH_PORT {
            invocation.push_str(" -p ");
            invocation.push_str(&self.port.to_string());
        }
        if let Some(ref key) = self.public_key {
            invocation.push_str(" -i ");
            invocation.push_str(&single_quote(key.as_str()));
        }
        invocation
    }

    /// Renders a directly runnable `ssh` command including the login.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] when the username or host is unset.
    pub fn full_command(&self) -> Result<String, RsyncError> {
        Ok(format!("{} {}", self.client_invocation(), self.login_string()?))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Resolves a leading `~/` against `HOME`. Other paths, and every path when
/// `HOME` is unset, pass through untouched.
fn resolve_home(path: &str) -> Utf8PathBuf {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => Utf8PathBuf::from(home).join(rest),
        _ => Utf8PathBuf::from(path),
    }
}

fn validate_public_key(path: &str) -> Result<Utf8PathBuf, RsyncError> {
    let expanded = resolve_home(path);
    let metadata = expanded.metadata().map_err(|err| {
        RsyncError::validation("public key", format!("cannot read {expanded}: {err}"))
    })?;
    if !is_key_file(metadata.file_type()) {
        return Err(RsyncError::validation(
            "public key",
            format!("{expanded} is not a regular file"),
        ));
    }
    File::open(&expanded).map_err(|err| {
        RsyncError::validation("public key", format!("cannot read {expanded}: {err}"))
    })?;
    Ok(expanded)
}

/// Regular files and character devices such as `/dev/null` open without
/// blocking; pipes and sockets would wait for a peer.
#[cfg(unix)]
fn is_key_file(file_type: FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;

    file_type.is_file() || file_type.is_char_device()
}

#[cfg(not(unix))]
fn is_key_file(file_type: FileType) -> bool {
    file_type.is_file()
}

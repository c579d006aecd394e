//! Translation of an [`RsyncConfig`] into an `rsync` [`Command`].
//!
//! The mapping is fixed and ordered: toggled single-letter flags, extra
//! letters, long-form arguments with archive or recursive interleaved, the
//! remote shell, and finally the two operands. When SSH settings are present
//! exactly one operand is prefixed with `user@host:`, chosen by
//! [`RsyncConfig::remote_origin`].

use serde_json::Value;
use tracing::debug;

use crate::command::{Command, CommandOutput, CommandRunner};
use crate::error::RsyncError;
use crate::ssh::SshConnection;

mod config;

pub use config::{
    DEFAULT_RSYNC_EXECUTABLE, OptionalParameters, RsyncConfig, apply_recognized_options,
};

/// Builds and runs `rsync` commands for one configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Rsync {
    config: RsyncConfig,
    ssh: Option<SshConnection>,
}

impl Rsync {
    /// Creates a translator, validating any SSH settings up front.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] when the SSH port or key path is
    /// invalid.
    pub fn new(config: RsyncConfig) -> Result<Self, RsyncError> {
        let ssh = config.ssh.clone().map(SshConnection::new).transpose()?;
        Ok(Self { config, ssh })
    }

    /// Creates a translator from an option mapping over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] when the mapping or any SSH setting
    /// is invalid.
    pub fn from_options(mapping: &Value) -> Result<Self, RsyncError> {
        Self::new(RsyncConfig::from_options(mapping)?)
    }

    /// Configuration this translator was built from.
    #[must_use]
    pub const fn config(&self) -> &RsyncConfig {
        &self.config
    }

    /// Validated SSH settings, when remote transport is configured.
    #[must_use]
    pub const fn ssh(&self) -> Option<&SshConnection> {
        self.ssh.as_ref()
    }

    /// Builds the command that syncs `origin` into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] when SSH is configured without a
    /// username or host, or when the extra option letters are malformed.
    pub fn command(&self, origin: &str, target: &str) -> Result<Command, RsyncError> {
        let cfg = &self.config;
        let mut command = Command::new(cfg.executable.as_str());

        for (enabled, flag) in [
            (cfg.skip_newer_files, 'u'),
            (cfg.follow_symlinks, 'L'),
            (cfg.dry_run, 'n'),
            (cfg.verbose, 'v'),
            (cfg.compression, 'z'),
        ] {
            if enabled {
                command.add_option(flag);
            }
        }
        for flag in cfg.optional_parameters.flags()? {
            command.add_option(flag);
        }

        if cfg.times {
            command.add_argument("times", None);
        }
        if cfg.stats {
            command.add_argument("stats", None);
        }
        if cfg.delete_from_target {
            command.set_argument("delete", None);
        }
        if cfg.remove_source {
            command.add_argument("remove-source-files", None);
        }
        if cfg.delete_excluded {
            command.set_argument("delete-excluded", None);
        }
        add_valued(&mut command, "info", cfg.info.as_deref());
        add_valued(&mut command, "compare-dest", cfg.compare_dest.as_deref());
        for pattern in &cfg.exclude {
            command.add_argument("exclude", Some(pattern.as_str()));
        }
        add_valued(&mut command, "exclude-from", cfg.exclude_from.as_deref());

        if cfg.archive {
            command.add_option('a');
        } else if cfg.recursive {
            command.add_option('r');
        }

        for (enabled, name) in [
            (cfg.prune_empty_dirs, "prune-empty-dirs"),
            (cfg.omit_dir_times, "omit-dir-times"),
            (cfg.devices, "devices"),
            (cfg.specials, "specials"),
            (cfg.links, "links"),
        ] {
            if enabled {
                command.add_argument(name, None);
            }
        }
        add_valued(&mut command, "chown", cfg.chown.as_deref());
        add_valued(&mut command, "chmod", cfg.chmod.as_deref());
        if cfg.itemize_changes {
            command.add_argument("itemize-changes", None);
        }

        match self.ssh {
            None => {
                command.add_parameter(origin).add_parameter(target);
            }
            Some(ref ssh) => {
                command.set_argument("rsh", Some(ssh.client_invocation().as_str()));
                let login = ssh.login_string()?;
                if cfg.remote_origin {
                    command
                        .add_parameter(format!("{login}:{origin}"))
                        .add_parameter(target);
                } else {
                    command
                        .add_parameter(origin)
                        .add_parameter(format!("{login}:{target}"));
                }
            }
        }

        Ok(command)
    }

    /// Syncs `origin` into `target`, streaming output when
    /// [`RsyncConfig::show_output`] is set.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Rsync::command`] or [`Command::execute`]
    /// unchanged.
    pub fn sync(&self, origin: &str, target: &str) -> Result<CommandOutput, RsyncError> {
        let command = self.command(origin, target)?;
        debug!(origin, target, "starting sync");
        command.execute(self.config.show_output)
    }

    /// Syncs `origin` into `target` through a caller-supplied runner.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Rsync::command`] or
    /// [`Command::execute_with`] unchanged.
    pub fn sync_with<R: CommandRunner + ?Sized>(
        &self,
        origin: &str,
        target: &str,
        runner: &R,
    ) -> Result<CommandOutput, RsyncError> {
        self.command(origin, target)?.execute_with(runner)
    }
}

fn add_valued(command: &mut Command, name: &str, value: Option<&str>) {
    if let Some(text) = value.filter(|text| !text.is_empty()) {
        command.add_argument(name, Some(text));
    }
}

#[cfg(test)]
mod tests;

//! Command-line interface definitions for the `rsyncer` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `rsyncer` binary.
#[derive(Debug, Parser)]
#[command(
    name = "rsyncer",
    about = "Run rsync from a declarative option mapping",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// JSON file holding the rsync option mapping.
    ///
    /// Overrides `options_file` from `rsyncer.toml` or the
    /// `RSYNCER_OPTIONS_FILE` environment variable.
    #[arg(long, value_name = "FILE")]
    pub(crate) options_file: Option<String>,
    /// Print the rendered rsync command instead of running it.
    #[arg(long)]
    pub(crate) print: bool,
    /// Capture rsync output instead of streaming it to the terminal.
    #[arg(long, short)]
    pub(crate) quiet: bool,
    /// Log the rendered command and exit status to stderr.
    #[arg(long, short)]
    pub(crate) verbose: bool,
    /// Source path. Prefixed with the SSH login when `remote_origin` is set.
    pub(crate) origin: String,
    /// Destination path. Prefixed with the SSH login unless `remote_origin`
    /// is set.
    pub(crate) target: String,
}

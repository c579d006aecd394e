//! Binary entry point for the `rsyncer` CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use rsyncer::{ConfigLoadError, Rsync, RsyncError, RunnerSettings};

mod cli;
#[cfg(test)]
mod test_helpers;

use cli::Cli;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("sync error: {0}")]
    Sync(#[from] RsyncError),
    #[error("failed to write output: {0}")]
    Output(String),
}

impl CliError {
    /// Exit code for the process: the child's own status when rsync ran and
    /// failed, `1` for everything else.
    fn exit_code(&self) -> i32 {
        match self {
            Self::Sync(err) => err.exit_code().unwrap_or(1),
            Self::Config(_) | Self::Output(_) => 1,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match dispatch(&cli, &mut io::stdout()) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            err.exit_code()
        }
    };

    process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rsyncer=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rsyncer=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn dispatch(cli: &Cli, out: &mut impl Write) -> Result<(), CliError> {
    let mut settings = RunnerSettings::load_without_cli_args()?;
    if let Some(ref path) = cli.options_file {
        settings.options_file = Some(path.clone());
    }

    let mut config = settings.rsync_config()?;
    if cli.quiet {
        config.show_output = false;
    }
    let rsync = Rsync::new(config)?;

    if cli.print {
        let command = rsync.command(&cli.origin, &cli.target)?;
        writeln!(out, "{command}").map_err(|err| CliError::Output(err.to_string()))?;
        return Ok(());
    }

    rsync.sync(&cli.origin, &cli.target)?;
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

//! Build script that renders the `rsyncer(1)` manual page from the clap
//! definitions, so the page always matches the shipped flags.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    writeln!(stdout, "cargo:rerun-if-changed=build.rs")?;
    writeln!(stdout, "cargo:rerun-if-changed=src/cli/mod.rs")?;

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR was not set"))?;

    let mut page = Vec::new();
    Man::new(cli::Cli::command()).render(&mut page)?;
    std::fs::write(out_dir.join("rsyncer.1"), page)?;

    Ok(())
}

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::io::{self, Write};
use tracing::instrument;

use cmisdrive_driver::DriverHost;

use super::normalize_path;

#[derive(ClapArgs)]
pub struct Args {
    /// File path on the drive
    pub file: String,
}

#[instrument(level = "info", name = "cmd::cat", skip_all, fields(file = %args.file))]
pub fn execute(host: &DriverHost, args: &Args) -> Result<()> {
    let path = normalize_path(&args.file);
    let content = host.read_all(&path).with_context(|| format!("Cannot read {path}"))?;
    io::stdout().write_all(&content)?;
    Ok(())
}

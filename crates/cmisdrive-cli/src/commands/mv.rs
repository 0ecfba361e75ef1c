use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use cmisdrive_driver::DriverHost;

use super::normalize_path;

#[derive(ClapArgs)]
pub struct Args {
    /// Source path
    pub source: String,

    /// Destination path
    pub dest: String,

    /// Replace an existing destination
    #[arg(long)]
    pub replace: bool,
}

#[instrument(level = "info", name = "cmd::mv", skip_all, fields(source = %args.source, dest = %args.dest))]
pub fn execute(host: &DriverHost, args: &Args) -> Result<()> {
    let source = normalize_path(&args.source);
    let dest = normalize_path(&args.dest);
    host.rename(&source, &dest, args.replace)
        .with_context(|| format!("Cannot move {source} to {dest}"))
}

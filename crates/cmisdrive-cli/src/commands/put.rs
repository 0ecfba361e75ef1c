//! Put command - write stdin or a local file to the drive.
//!
//! The content is staged on a handle and committed in one upload when the
//! handle closes.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{info, instrument};

use cmisdrive_driver::DriverHost;

use super::normalize_path;
use crate::output::format_size;

#[derive(ClapArgs)]
pub struct Args {
    /// Destination path on the drive
    pub file: String,

    /// Read content from this local file instead of stdin
    #[arg(long, value_name = "LOCAL")]
    pub from: Option<PathBuf>,
}

#[instrument(level = "info", name = "cmd::put", skip_all, fields(file = %args.file))]
pub fn execute(host: &DriverHost, args: &Args) -> Result<()> {
    let path = normalize_path(&args.file);
    let content = match &args.from {
        Some(local) => fs::read(local).with_context(|| format!("Failed to read {}", local.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    host.write_all(&path, &content).with_context(|| format!("Cannot write {path}"))?;
    info!(bytes = content.len(), "Committed {} to {path}", format_size(content.len() as u64));
    Ok(())
}

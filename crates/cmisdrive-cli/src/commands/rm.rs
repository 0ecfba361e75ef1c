//! Remove command.
//!
//! Deletion goes through the delete-on-close sequence: the handle is opened,
//! checked, marked and closed. Non-empty directories need `-r`, which mounts
//! the drive with the folder-only delete policy so the tree goes in one call.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use cmisdrive_driver::{DriverHost, HostError, NtStatus};

use super::normalize_path;

#[derive(ClapArgs)]
pub struct Args {
    /// Path to remove
    pub path: String,

    /// Remove directories and their contents
    #[arg(short, long)]
    pub recursive: bool,

    /// Ignore missing paths
    #[arg(short, long)]
    pub force: bool,
}

#[instrument(level = "info", name = "cmd::rm", skip_all, fields(path = %args.path, recursive = args.recursive))]
pub fn execute(host: &DriverHost, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    if path == "\\" {
        anyhow::bail!("Refusing to remove the drive root");
    }

    let info = match host.stat(&path) {
        Ok(info) => info,
        Err(HostError::Status(NtStatus::FileNotFound | NtStatus::PathNotFound)) if args.force => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("Cannot remove {path}")),
    };

    let result = if info.attributes.is_directory() {
        host.delete_directory(&path)
    } else {
        host.delete_file(&path)
    };
    result.with_context(|| format!("Cannot remove {path}"))
}

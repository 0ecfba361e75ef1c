use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use cmisdrive_driver::{DriverHost, HostError, NtStatus};

use super::{normalize_path, parent_path};

#[derive(ClapArgs)]
pub struct Args {
    /// Directory path to create
    pub path: String,

    /// Create parent directories as needed, no error if existing
    #[arg(short, long)]
    pub parents: bool,
}

#[instrument(level = "info", name = "cmd::mkdir", skip_all, fields(path = %args.path))]
pub fn execute(host: &DriverHost, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    if args.parents {
        create_all(host, &path)
    } else {
        host.create_directory(&path).with_context(|| format!("Cannot create {path}"))
    }
}

fn create_all(host: &DriverHost, path: &str) -> Result<()> {
    match host.stat(path) {
        Ok(info) if info.attributes.is_directory() => return Ok(()),
        Ok(_) => anyhow::bail!("Cannot create {path}: a file with that name exists"),
        Err(HostError::Status(NtStatus::FileNotFound | NtStatus::PathNotFound)) => {}
        Err(e) => return Err(e).with_context(|| format!("Cannot create {path}")),
    }
    if let Some(parent) = parent_path(path) {
        create_all(host, parent)?;
    }
    host.create_directory(path).with_context(|| format!("Cannot create {path}"))
}

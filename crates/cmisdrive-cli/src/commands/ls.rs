//! List command - list directory contents on the drive.
//!
//! # Examples
//!
//! ```bash
//! # List root directory
//! cmisdrive ls
//!
//! # List with details
//! cmisdrive ls -l \Reports
//!
//! # Only PDFs, as JSON
//! cmisdrive ls --pattern '*.pdf' --json \Reports | jq '.entries[].name'
//! ```

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use cmisdrive_driver::{DriverHost, FileInformation};

use super::normalize_path;
use crate::output::{create_table, format_entry_type, format_size, format_time, rfc3339};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Directory on the drive (default: root)
    #[arg(default_value = "\\")]
    pub path: String,

    /// Show detailed information
    #[arg(short, long)]
    pub long: bool,

    /// Only entries matching this wildcard pattern (`*` and `?`)
    #[arg(long)]
    pub pattern: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct LsOutput {
    path: String,
    entries: Vec<EntryInfo>,
}

#[derive(Serialize)]
pub(crate) struct EntryInfo {
    name: String,
    #[serde(rename = "type")]
    entry_type: &'static str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
}

impl From<&FileInformation> for EntryInfo {
    fn from(info: &FileInformation) -> Self {
        Self {
            name: info.file_name.clone(),
            entry_type: format_entry_type(info),
            size: info.length,
            created: rfc3339(info.creation_time),
            modified: rfc3339(info.last_write_time),
        }
    }
}

#[instrument(level = "info", name = "cmd::ls", skip_all, fields(path = %args.path))]
pub fn execute(host: &DriverHost, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    let mut entries = host
        .list(&path, args.pattern.as_deref())
        .with_context(|| format!("Cannot list {path}"))?;

    // Directories first, then by name
    entries.sort_by(|a, b| {
        b.attributes
            .is_directory()
            .cmp(&a.attributes.is_directory())
            .then_with(|| a.file_name.cmp(&b.file_name))
    });

    if args.json {
        let output = LsOutput {
            path,
            entries: entries.iter().map(EntryInfo::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !args.long {
        for entry in &entries {
            if entry.attributes.is_directory() {
                println!("{}\\", entry.file_name);
            } else {
                println!("{}", entry.file_name);
            }
        }
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Type", "Size", "Modified", "Name"]);
    for entry in &entries {
        let size = if entry.attributes.is_directory() {
            "-".to_string()
        } else {
            format_size(entry.length)
        };
        table.add_row(vec![
            format_entry_type(entry).to_string(),
            size,
            format_time(entry.last_write_time),
            entry.file_name.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}

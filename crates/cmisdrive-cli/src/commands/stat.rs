use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use cmisdrive_driver::DriverHost;

use super::ls::EntryInfo;
use super::normalize_path;
use crate::output::{create_table, format_entry_type, format_size, format_time};

#[derive(ClapArgs)]
pub struct Args {
    /// Path on the drive
    pub path: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[instrument(level = "info", name = "cmd::stat", skip_all, fields(path = %args.path))]
pub fn execute(host: &DriverHost, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    let info = host.stat(&path).with_context(|| format!("Cannot stat {path}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&EntryInfo::from(&info))?);
        return Ok(());
    }

    let mut table = create_table();
    table.add_row(vec!["Path".to_string(), path]);
    table.add_row(vec!["Type".to_string(), format_entry_type(&info).to_string()]);
    table.add_row(vec!["Size".to_string(), format!("{} ({} bytes)", format_size(info.length), info.length)]);
    table.add_row(vec!["Attributes".to_string(), format!("{:#06x}", info.attributes.bits())]);
    table.add_row(vec!["Created".to_string(), format_time(info.creation_time)]);
    table.add_row(vec!["Modified".to_string(), format_time(info.last_write_time)]);
    println!("{table}");
    Ok(())
}

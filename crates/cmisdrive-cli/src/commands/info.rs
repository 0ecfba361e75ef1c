//! Info command - volume identity, capacity and the bound repository.

use anyhow::Result;
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use cmisdrive_driver::DriverHost;

use crate::output::{create_table, format_size};

#[derive(ClapArgs)]
pub struct Args {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct InfoOutput<'a> {
    mount_point: &'a str,
    volume_label: String,
    file_system: String,
    maximum_component_length: u32,
    repository_id: &'a str,
    repository_name: &'a str,
    product_name: &'a str,
    vendor_name: &'a str,
    delete_directory_policy: String,
    total_bytes: u64,
    used_bytes: u64,
    free_bytes: u64,
}

#[instrument(level = "info", name = "cmd::info", skip_all)]
pub fn execute(host: &DriverHost, mount_point: &str, args: &Args) -> Result<()> {
    let volume = host.volume();
    let space = host.disk_space();
    let drive = host.drive();
    let repo = drive.repository().info();

    let output = InfoOutput {
        mount_point,
        volume_label: volume.volume_label,
        file_system: volume.file_system_name,
        maximum_component_length: volume.maximum_component_length,
        repository_id: &repo.id,
        repository_name: &repo.name,
        product_name: &repo.product_name,
        vendor_name: &repo.vendor_name,
        delete_directory_policy: drive.options().delete_directory_policy.to_string(),
        total_bytes: space.total_bytes,
        used_bytes: space.used_bytes,
        free_bytes: space.free_bytes,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Property", "Value"]);
    table.add_row(vec!["Mount point", output.mount_point]);
    table.add_row(vec!["Volume label", output.volume_label.as_str()]);
    table.add_row(vec!["File system", output.file_system.as_str()]);
    table.add_row(vec!["Repository", output.repository_id]);
    table.add_row(vec!["Repository name", output.repository_name]);
    table.add_row(vec!["Product", output.product_name]);
    table.add_row(vec!["Vendor", output.vendor_name]);
    table.add_row(vec!["Directory delete", output.delete_directory_policy.as_str()]);
    table.add_row(vec!["Total".to_string(), format_size(output.total_bytes)]);
    table.add_row(vec!["Used".to_string(), format_size(output.used_bytes)]);
    table.add_row(vec!["Free".to_string(), format_size(output.free_bytes)]);
    println!("{table}");
    Ok(())
}

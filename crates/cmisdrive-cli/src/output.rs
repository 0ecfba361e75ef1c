//! Terminal output helpers shared by the commands.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use cmisdrive_driver::FileInformation;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Human-readable byte size (1024-based).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Local time, or `-` when the repository reported none.
pub fn format_time(time: Option<SystemTime>) -> String {
    time.map_or_else(
        || "-".to_string(),
        |t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

pub fn format_entry_type(info: &FileInformation) -> &'static str {
    if info.attributes.is_directory() { "dir" } else { "file" }
}

/// RFC 3339 timestamp for JSON output.
pub fn rfc3339(time: Option<SystemTime>) -> Option<String> {
    time.map(|t| DateTime::<chrono::Utc>::from(t).to_rfc3339())
}

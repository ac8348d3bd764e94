//! Result file writers

use crate::fleet::ResultSet;
use crate::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One match per line
    #[default]
    Text,
    /// The whole result set as pretty JSON
    Json,
}

/// `<timestamp> <satellite> (<lon>, <lat>, <alt_km>)` per match, then one
/// `# skipped` line per satellite that was left out.
pub fn write_text<W: Write>(mut writer: W, results: &ResultSet) -> Result<()> {
    for (name, record) in results.records() {
        writeln!(
            writer,
            "{} {} ({:.6}, {:.6}, {:.3})",
            record.timestamp.format(TIMESTAMP_FORMAT),
            name,
            record.position.longitude,
            record.position.latitude,
            record.position.altitude_km
        )?;
    }
    for skipped in &results.skipped {
        writeln!(writer, "# skipped {}: {}", skipped.name, skipped.reason)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(mut writer: W, results: &ResultSet) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, results)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `results` to `path`, replacing any existing file
pub fn save(path: impl AsRef<Path>, format: OutputFormat, results: &ResultSet) -> Result<()> {
    let path = path.as_ref();
    info!("Writing {} matches to {:?}", results.len(), path);

    let writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Text => write_text(writer, results),
        OutputFormat::Json => write_json(writer, results),
    }
}

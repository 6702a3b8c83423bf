//! JSON export of a full run report.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::runner::RunReport;

/// Writes `report` as pretty-printed JSON to the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization or writing fails.
pub fn export_json(report: &RunReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_json(report, io::BufWriter::new(file))
}

/// Writes `report` as pretty-printed JSON to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_json(report: &RunReport, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()
}

//! CSV export for the hourly simulation trace.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::HourlyResult;

/// Column header for CSV telemetry export.
const HEADER: &str = "timestamp,hour,wind_speed_mps,wind_direction_deg,supply_mw,demand_mw,\
                       net_balance_mw,to_battery_mw,from_battery_mw,to_grid_mw,from_grid_mw,\
                       battery_mwh,battery_percent,status";

/// Exports the hourly trace to a CSV file at the given path.
///
/// Writes a header row followed by one data row per hour. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[HourlyResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes the hourly trace as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[HourlyResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in results {
        wtr.write_record(&[
            r.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            r.hour.to_string(),
            format!("{:.2}", r.wind_speed_mps),
            format!("{:.1}", r.wind_direction_deg),
            format!("{:.4}", r.supply_mw),
            format!("{:.4}", r.demand_mw),
            format!("{:.4}", r.net_balance_mw),
            format!("{:.4}", r.flows.to_battery_mw),
            format!("{:.4}", r.flows.from_battery_mw),
            format!("{:.4}", r.flows.to_grid_mw),
            format!("{:.4}", r.flows.from_grid_mw),
            format!("{:.4}", r.battery_mwh),
            format!("{:.2}", r.battery_percent),
            r.status.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

//! CSV export for projection tables and allocation breakdowns.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::combined::CombinedBreakdown;
use crate::engine::projection::MultiYearProjection;
use crate::model::RatePeriod;

/// Column header for the projection CSV.
const PROJECTION_HEADER: &str = "year,annual_savings,cumulative_savings";

/// Column header for the allocation breakdown CSV.
const BREAKDOWN_HEADER: &str = "period,original_kwh,solar_kwh,battery_kwh,grid_kwh";

/// Exports a multi-year projection to a CSV file at the given path.
///
/// Writes a header row followed by one row per projected year. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_projection_csv(projection: &MultiYearProjection, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_projection_csv(projection, buf)
}

/// Writes a multi-year projection as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_projection_csv(
    projection: &MultiYearProjection,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(PROJECTION_HEADER.split(','))?;
    for row in &projection.years {
        wtr.write_record(&[
            row.year.to_string(),
            format!("{:.2}", row.annual_savings),
            format!("{:.2}", row.cumulative_savings),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the per-period allocation breakdown as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_breakdown_csv(breakdown: &CombinedBreakdown, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(BREAKDOWN_HEADER.split(','))?;
    for &period in RatePeriod::ALL.iter() {
        wtr.write_record(&[
            period.label().to_string(),
            format!("{:.2}", breakdown.original_usage.get(period)),
            format!("{:.2}", breakdown.solar_allocation.get(period)),
            format!("{:.2}", breakdown.battery_offsets.get(period)),
            format!("{:.2}", breakdown.usage_after_battery.get(period)),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

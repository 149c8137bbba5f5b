//! Writers for the step log (CSV) and the compiled results (JSON).

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::results::SimulationResults;
use crate::sim::types::StepRecord;

/// Column order of the step-log CSV. Kept stable so downstream tooling can
/// rely on it.
pub const STEP_CSV_HEADER: &[&str] = &[
    "timestamp",
    "step",
    "hour",
    "solar_available_kw",
    "solar_generated_kw",
    "load_demand_kw",
    "cloud_cover",
    "battery_soc",
    "solar_to_load",
    "solar_to_battery",
    "solar_to_grid",
    "battery_to_load",
    "grid_to_load",
    "unmet_load",
    "curtailed",
    "inverter_operational",
];

/// Writes the step log as CSV to any writer.
///
/// Flow and measurement columns use six decimal places, matching the
/// precision the dispatcher rounds to.
///
/// # Errors
///
/// Returns the underlying CSV error on any write failure.
pub fn write_steps_csv<W: Write>(steps: &[StepRecord], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(STEP_CSV_HEADER)?;

    for record in steps {
        writer.write_record(&[
            record.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            record.step.to_string(),
            format!("{:.2}", record.hour),
            format!("{:.6}", record.solar_available_kw),
            format!("{:.6}", record.solar_generated_kw),
            format!("{:.6}", record.load_demand_kw),
            format!("{:.6}", record.cloud_cover),
            format!("{:.2}", record.battery_soc),
            format!("{:.6}", record.flow.solar_to_load),
            format!("{:.6}", record.flow.solar_to_battery),
            format!("{:.6}", record.flow.solar_to_grid),
            format!("{:.6}", record.flow.battery_to_load),
            format!("{:.6}", record.flow.grid_to_load),
            format!("{:.6}", record.flow.unmet_load),
            format!("{:.6}", record.flow.curtailed),
            record.inverter_operational.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the step log as CSV to a file path.
///
/// # Errors
///
/// Returns the underlying CSV error if the file cannot be created or
/// written.
pub fn write_steps_csv_file(steps: &[StepRecord], path: impl AsRef<Path>) -> csv::Result<()> {
    let file = File::create(path.as_ref())?;
    write_steps_csv(steps, file)
}

/// Writes the full compiled results as pretty-printed JSON.
///
/// # Errors
///
/// Returns an [`io::Error`] if the file cannot be created or serialization
/// fails.
pub fn write_results_json(results: &SimulationResults, path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}

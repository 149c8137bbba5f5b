//! Result export: step log to CSV, full results to JSON.

pub mod export;

pub use export::{write_results_json, write_steps_csv, write_steps_csv_file, STEP_CSV_HEADER};

//! Core simulation types: configuration, step data, and daily records.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Centralized simulation timing configuration.
///
/// The engine, clock, and devices all reference this struct for timing
/// parameters, eliminating duplicated `step_hours` computations.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(60, 7, 42);
/// assert_eq!(cfg.step_hours(), 1.0);
/// assert_eq!(cfg.total_steps(), 7 * 24);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Length of one timestep in minutes.
    pub time_step_minutes: u32,
    /// Number of days to simulate.
    pub duration_days: u32,
    /// Master random seed for reproducibility.
    pub seed: u64,
    /// Calendar date of the first simulated step.
    pub start_date: NaiveDate,
}

impl SimConfig {
    /// Creates a new simulation configuration starting on 2024-01-01.
    ///
    /// # Panics
    ///
    /// Panics if `time_step_minutes` or `duration_days` is zero.
    pub fn new(time_step_minutes: u32, duration_days: u32, seed: u64) -> Self {
        Self::with_start_date(
            time_step_minutes,
            duration_days,
            seed,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        )
    }

    /// Creates a new simulation configuration with an explicit start date.
    ///
    /// # Panics
    ///
    /// Panics if `time_step_minutes` or `duration_days` is zero.
    pub fn with_start_date(
        time_step_minutes: u32,
        duration_days: u32,
        seed: u64,
        start_date: NaiveDate,
    ) -> Self {
        assert!(time_step_minutes > 0, "time_step_minutes must be > 0");
        assert!(duration_days > 0, "duration_days must be > 0");
        Self {
            time_step_minutes,
            duration_days,
            seed,
            start_date,
        }
    }

    /// Duration of one timestep in hours.
    pub fn step_hours(&self) -> f64 {
        f64::from(self.time_step_minutes) / 60.0
    }

    /// Total number of simulation steps across all days.
    ///
    /// Integer division: when `time_step_minutes` does not evenly divide the
    /// run length, the remainder minutes are dropped from the run.
    pub fn total_steps(&self) -> usize {
        (self.duration_days as usize * 24 * 60) / self.time_step_minutes as usize
    }
}

/// Power routing computed by the dispatcher for one timestep.
///
/// All seven magnitudes are non-negative and expressed in kW, rounded to six
/// decimal places. Two conservation identities hold within ±1e-6:
///
/// * `solar_to_load + solar_to_battery + solar_to_grid + curtailed == solar`
/// * `solar_to_load + battery_to_load + grid_to_load + unmet_load == load`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyFlow {
    /// Solar power consumed directly by the house (kW).
    pub solar_to_load: f64,
    /// Solar power accepted by the battery (kW).
    pub solar_to_battery: f64,
    /// Solar power exported to the grid (kW).
    pub solar_to_grid: f64,
    /// Battery discharge covering the load deficit (kW).
    pub battery_to_load: f64,
    /// Grid import covering the remaining deficit (kW).
    pub grid_to_load: f64,
    /// Load demand left unserved (kW). Always 0 while grid import is
    /// modeled as unconstrained.
    pub unmet_load: f64,
    /// Solar power no sink would accept (kW).
    pub curtailed: f64,
}

impl EnergyFlow {
    /// A flow record with every field zero.
    pub fn zero() -> Self {
        Self {
            solar_to_load: 0.0,
            solar_to_battery: 0.0,
            solar_to_grid: 0.0,
            battery_to_load: 0.0,
            grid_to_load: 0.0,
            unmet_load: 0.0,
            curtailed: 0.0,
        }
    }

    /// Sum of the four solar sink fields (kW), i.e. the solar power the
    /// dispatcher routed this step.
    pub fn solar_total(&self) -> f64 {
        self.solar_to_load + self.solar_to_battery + self.solar_to_grid + self.curtailed
    }
}

/// Complete record of one simulation timestep.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Simulated wall-clock timestamp of the step.
    pub timestamp: NaiveDateTime,
    /// Timestep index.
    pub step: usize,
    /// Hour of day, fractional (0.0 to <24.0).
    pub hour: f64,
    /// Solar power available before the inverter (kW).
    pub solar_available_kw: f64,
    /// Solar power after inverter clamping, 0 during outages (kW).
    pub solar_generated_kw: f64,
    /// House load demand (kW).
    pub load_demand_kw: f64,
    /// Cloud coverage fraction in effect this day (0.0 to 1.0).
    pub cloud_cover: f64,
    /// Battery state of charge after the step (percent).
    pub battery_soc: f64,
    /// Dispatcher power routing for this step.
    #[serde(flatten)]
    pub flow: EnergyFlow,
    /// Whether the inverter was operational this step.
    pub inverter_operational: bool,
}

/// Energy totals for one simulated calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    /// Day number, 1-based.
    pub day: u32,
    /// Solar energy generated (kWh), including curtailed energy.
    pub solar_generated_kwh: f64,
    /// Load energy consumed (kWh).
    pub load_consumed_kwh: f64,
    /// Energy imported from the grid (kWh).
    pub grid_imported_kwh: f64,
    /// Energy exported to the grid (kWh).
    pub grid_exported_kwh: f64,
    /// Solar energy curtailed (kWh).
    pub curtailed_kwh: f64,
    /// Battery state of charge at end of day (percent).
    pub battery_soc_end: f64,
    /// Fraction of load met without grid import, in percent.
    pub self_sufficiency_percent: f64,
}

impl fmt::Display for DailySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "day {:>3} | solar={:>7.2} kWh  load={:>7.2} kWh  \
             import={:>6.2} kWh  export={:>6.2} kWh  curtailed={:>6.2} kWh | \
             SoC={:>5.1}%  self-sufficiency={:>5.1}%",
            self.day,
            self.solar_generated_kwh,
            self.load_consumed_kwh,
            self.grid_imported_kwh,
            self.grid_exported_kwh,
            self.curtailed_kwh,
            self.battery_soc_end,
            self.self_sufficiency_percent,
        )
    }
}

/// A timestamped simulation event. Appended only for inverter failure
/// transitions.
#[derive(Debug, Clone, Serialize)]
pub struct EventLogEntry {
    /// Simulated timestamp at which the event was observed.
    pub timestamp: NaiveDateTime,
    /// Human-readable event description.
    pub message: String,
}

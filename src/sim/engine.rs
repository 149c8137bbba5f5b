//! Simulation engine: owns every component and drives the stepping loop.

use std::error::Error;
use std::fmt;

use crate::config::ScenarioConfig;
use crate::devices::cloud::UnknownSeasonError;
use crate::devices::{Battery, CloudCover, HouseLoad, Inverter, SolarArray};

use super::clock::SimClock;
use super::dispatch::{Dispatcher, Strategy, UnknownStrategyError};
use super::grid::{GridLedger, LedgerError};
use super::results::{RunContext, SimulationResults};
use super::types::{DailySummary, EnergyFlow, EventLogEntry, SimConfig, StepRecord};

/// Seed offset for the inverter RNG to avoid correlation with cloud cover.
const INVERTER_SEED_OFFSET: u64 = 31;

/// Error building an engine from a scenario whose enumerated names do not
/// parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioBuildError {
    Strategy(UnknownStrategyError),
    Season(UnknownSeasonError),
}

impl fmt::Display for ScenarioBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioBuildError::Strategy(e) => e.fmt(f),
            ScenarioBuildError::Season(e) => e.fmt(f),
        }
    }
}

impl Error for ScenarioBuildError {}

impl From<UnknownStrategyError> for ScenarioBuildError {
    fn from(e: UnknownStrategyError) -> Self {
        ScenarioBuildError::Strategy(e)
    }
}

impl From<UnknownSeasonError> for ScenarioBuildError {
    fn from(e: UnknownSeasonError) -> Self {
        ScenarioBuildError::Season(e)
    }
}

/// Per-day running energy totals, reset at each day rollover.
#[derive(Debug, Default)]
struct DailyAccumulator {
    solar_kwh: f64,
    load_kwh: f64,
    grid_import_kwh: f64,
    grid_export_kwh: f64,
    curtailed_kwh: f64,
}

impl DailyAccumulator {
    fn add(&mut self, flow: &EnergyFlow, load_demand_kw: f64, step_hours: f64) {
        self.solar_kwh += flow.solar_total() * step_hours;
        self.load_kwh += load_demand_kw * step_hours;
        self.grid_import_kwh += flow.grid_to_load * step_hours;
        self.grid_export_kwh += flow.solar_to_grid * step_hours;
        self.curtailed_kwh += flow.curtailed * step_hours;
    }

    fn has_activity(&self) -> bool {
        self.solar_kwh > 0.0 || self.load_kwh > 0.0
    }

    /// Emits the summary for the finished day and resets all totals.
    fn flush(&mut self, day: u32, battery_soc_end: f64) -> DailySummary {
        let self_sufficiency_percent = if self.load_kwh > 0.0 {
            (self.solar_kwh - self.grid_import_kwh) / self.load_kwh * 100.0
        } else {
            0.0
        };
        let summary = DailySummary {
            day,
            solar_generated_kwh: self.solar_kwh,
            load_consumed_kwh: self.load_kwh,
            grid_imported_kwh: self.grid_import_kwh,
            grid_exported_kwh: self.grid_export_kwh,
            curtailed_kwh: self.curtailed_kwh,
            battery_soc_end,
            self_sufficiency_percent,
        };
        *self = Self::default();
        summary
    }
}

/// How often a progress line is printed in verbose mode, in days.
const PROGRESS_EVERY_DAYS: u32 = 5;

/// Simulation engine owning the clock, devices, ledger, and dispatcher.
///
/// Runs strictly sequentially: step N+1 never begins before step N's
/// mutations (battery state, ledger totals, accumulators) are committed.
/// The battery and ledger are lent to the dispatcher for one call at a
/// time; nothing retains a reference across steps.
#[derive(Debug)]
pub struct Engine {
    config: SimConfig,
    solar: SolarArray,
    cloud: CloudCover,
    inverter: Inverter,
    load: HouseLoad,
    battery: Battery,
    grid: GridLedger,
    dispatcher: Dispatcher,
    context: RunContext,
    verbose: bool,
}

impl Engine {
    /// Creates a new engine from explicit components.
    ///
    /// # Arguments
    ///
    /// * `config` - Timing configuration
    /// * `solar` - Solar array model
    /// * `cloud` - Daily cloud coverage sampler
    /// * `inverter` - Grid-tie inverter model
    /// * `load` - House load profile
    /// * `battery` - Battery store
    /// * `grid` - Grid connection ledger
    /// * `dispatcher` - Energy dispatch engine
    /// * `context` - Static run metadata carried into the results
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        config: SimConfig,
        solar: SolarArray,
        cloud: CloudCover,
        inverter: Inverter,
        load: HouseLoad,
        battery: Battery,
        grid: GridLedger,
        dispatcher: Dispatcher,
        context: RunContext,
    ) -> Self {
        Self {
            config,
            solar,
            cloud,
            inverter,
            load,
            battery,
            grid,
            dispatcher,
            context,
            verbose: false,
        }
    }

    /// Builds an engine from a validated scenario configuration.
    ///
    /// Unit counts multiply unit capacities into system totals. The cloud
    /// and inverter RNGs are seeded from `seed` with fixed offsets.
    ///
    /// # Errors
    ///
    /// Returns a [`ScenarioBuildError`] if the configured strategy or
    /// season name is not recognized.
    pub fn from_scenario(scenario: &ScenarioConfig, seed: u64) -> Result<Self, ScenarioBuildError> {
        let strategy: Strategy = scenario.energy_management.strategy.parse()?;
        let season: crate::devices::Season = scenario.simulation.season.parse()?;

        let sim = &scenario.simulation;
        let config = SimConfig::with_start_date(
            sim.time_step_minutes,
            sim.duration_days,
            seed,
            sim.start_date,
        );

        let bat = &scenario.battery;
        let battery_total_kwh = f64::from(bat.count) * bat.unit_capacity_kwh;
        let battery = Battery::new(
            battery_total_kwh,
            bat.efficiency,
            bat.min_soc,
            bat.initial_soc,
        );

        let sol = &scenario.solar;
        let solar = SolarArray::new(f64::from(sol.count) * sol.unit_peak_power_kw);

        let inv = &scenario.inverter;
        let inverter = Inverter::new(
            f64::from(inv.count) * inv.unit_max_output_kw,
            inv.failure_rate,
            inv.min_failure_duration_hours,
            inv.max_failure_duration_hours,
            seed.wrapping_add(INVERTER_SEED_OFFSET),
        );

        let ld = &scenario.load;
        let load = HouseLoad::new(
            ld.base_load_kw,
            ld.peak_hours_max_kw,
            ld.peak_hours_start,
            ld.peak_hours_end,
        );

        let g = &scenario.grid;
        let grid = GridLedger::new(
            g.import_cost_per_kwh,
            g.export_revenue_per_kwh,
            g.export_limit_kw,
        );

        let cloud = CloudCover::new(season, seed);

        let context = RunContext {
            duration_days: sim.duration_days,
            seed,
            season,
            strategy,
            battery_count: bat.count,
            solar_count: sol.count,
            inverter_count: inv.count,
        };

        Ok(Self::new(
            config,
            solar,
            cloud,
            inverter,
            load,
            battery,
            grid,
            Dispatcher::new(strategy),
            context,
        ))
    }

    /// Enables or disables progress/event console output during the run.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Returns a reference to the timing configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns a reference to the battery (for capacity/SOC queries).
    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    /// Returns a reference to the grid ledger.
    pub fn grid(&self) -> &GridLedger {
        &self.grid
    }

    /// Runs the full simulation and compiles the results.
    ///
    /// Processes every step in increasing index order. Day-rollover side
    /// effects (summary flush, cloud redraw, inverter failure check) fire
    /// exactly once per calendar day boundary crossed; a trailing partial
    /// day with any activity is flushed at the end.
    ///
    /// # Errors
    ///
    /// Propagates the first [`LedgerError`] raised during dispatch; the run
    /// aborts at that step with no partial results.
    pub fn run(&mut self) -> Result<SimulationResults, LedgerError> {
        let mut clock = SimClock::new(&self.config);
        let step_hours = self.config.step_hours();

        let mut step_log = Vec::with_capacity(clock.total_steps());
        let mut daily_summaries = Vec::with_capacity(self.config.duration_days as usize);
        let mut event_log = Vec::new();
        let mut accumulator = DailyAccumulator::default();
        let mut completed_days: u32 = 0;
        let mut cloud_cover = self.cloud.daily_coverage();

        while let Some(step) = clock.tick() {
            let hour = clock.hour_of_day(step);

            let solar_available = self.solar.generate(hour, cloud_cover);
            let solar_generated = if self.inverter.is_operational() {
                self.inverter.apply_limit(solar_available)
            } else {
                0.0
            };
            let load_demand = self.load.generate(hour);

            let flow = self.dispatcher.distribute(
                solar_generated,
                load_demand,
                &mut self.battery,
                &mut self.grid,
                step_hours,
            )?;

            step_log.push(StepRecord {
                timestamp: clock.timestamp(step),
                step,
                hour,
                solar_available_kw: solar_available,
                solar_generated_kw: solar_generated,
                load_demand_kw: load_demand,
                cloud_cover,
                battery_soc: self.battery.soc_percent(),
                flow,
                inverter_operational: self.inverter.is_operational(),
            });

            accumulator.add(&flow, load_demand, step_hours);

            if clock.crosses_day_boundary(step) {
                completed_days += 1;
                daily_summaries.push(accumulator.flush(completed_days, self.battery.soc_percent()));

                if self.verbose && completed_days % PROGRESS_EVERY_DAYS == 0 {
                    println!(
                        "  day {completed_days}/{} completed",
                        self.config.duration_days
                    );
                }

                self.inverter.check_failure();
                self.inverter.update(24.0);
                if self.inverter.is_failing() {
                    let message = format!(
                        "inverter failure (remaining: {:.0}h)",
                        self.inverter.failure_hours_remaining()
                    );
                    if self.verbose {
                        println!("  EVENT: {message}");
                    }
                    event_log.push(EventLogEntry {
                        timestamp: clock.timestamp(step),
                        message,
                    });
                }

                cloud_cover = self.cloud.daily_coverage();
            }
        }

        // Truncated final day: flush whatever accumulated past the last
        // full day boundary.
        if accumulator.has_activity() {
            daily_summaries.push(accumulator.flush(completed_days + 1, self.battery.soc_percent()));
        }

        Ok(SimulationResults::compile(
            &self.context,
            &self.battery,
            &self.grid,
            step_log,
            daily_summaries,
            event_log,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;

    fn engine_from_baseline(days: u32, seed: u64) -> Engine {
        let mut scenario = ScenarioConfig::baseline();
        scenario.simulation.duration_days = days;
        Engine::from_scenario(&scenario, seed).expect("baseline strategy should parse")
    }

    #[test]
    fn run_produces_one_record_per_step() {
        let mut engine = engine_from_baseline(2, 42);
        let total = engine.config().total_steps();
        let results = engine.run().expect("run should succeed");
        assert_eq!(results.data.step_log.len(), total);
    }

    #[test]
    fn one_summary_per_simulated_day() {
        let mut engine = engine_from_baseline(3, 42);
        let results = engine.run().expect("run should succeed");
        assert_eq!(results.data.daily_summaries.len(), 3);
        let days: Vec<u32> = results.data.daily_summaries.iter().map(|d| d.day).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn daily_totals_match_step_records() {
        let mut engine = engine_from_baseline(1, 7);
        let step_hours = engine.config().step_hours();
        let results = engine.run().expect("run should succeed");

        let day = &results.data.daily_summaries[0];
        let steps = &results.data.step_log;

        let solar: f64 = steps.iter().map(|s| s.flow.solar_total() * step_hours).sum();
        let load: f64 = steps.iter().map(|s| s.load_demand_kw * step_hours).sum();
        let import: f64 = steps.iter().map(|s| s.flow.grid_to_load * step_hours).sum();
        let export: f64 = steps.iter().map(|s| s.flow.solar_to_grid * step_hours).sum();

        assert!((day.solar_generated_kwh - solar).abs() < 1e-9);
        assert!((day.load_consumed_kwh - load).abs() < 1e-9);
        assert!((day.grid_imported_kwh - import).abs() < 1e-9);
        assert!((day.grid_exported_kwh - export).abs() < 1e-9);
    }

    #[test]
    fn unknown_strategy_fails_at_construction() {
        let mut scenario = ScenarioConfig::baseline();
        scenario.energy_management.strategy = "PEAK_SHAVING".to_string();
        let err = Engine::from_scenario(&scenario, 0).unwrap_err();
        assert!(matches!(err, ScenarioBuildError::Strategy(_)));
        assert!(format!("{err}").contains("PEAK_SHAVING"));
    }

    #[test]
    fn unknown_season_fails_at_construction() {
        let mut scenario = ScenarioConfig::baseline();
        scenario.simulation.season = "monsoon".to_string();
        let err = Engine::from_scenario(&scenario, 0).unwrap_err();
        assert!(matches!(err, ScenarioBuildError::Season(_)));
        assert!(format!("{err}").contains("monsoon"));
    }

    #[test]
    fn cloud_cover_constant_within_a_day() {
        let mut engine = engine_from_baseline(2, 11);
        let results = engine.run().expect("run should succeed");
        let steps = &results.data.step_log;

        let day_one = steps[0].cloud_cover;
        for s in steps.iter().take(24) {
            assert_eq!(s.cloud_cover, day_one);
        }
        // Day two starts with a freshly drawn value (overwhelmingly likely
        // to differ for a continuous distribution).
        let day_two = steps[24].cloud_cover;
        for s in steps.iter().skip(24) {
            assert_eq!(s.cloud_cover, day_two);
        }
    }

    #[test]
    fn step_records_honor_conservation() {
        let mut engine = engine_from_baseline(5, 99);
        let results = engine.run().expect("run should succeed");
        for s in &results.data.step_log {
            let routed = s.flow.solar_total();
            assert!(
                (routed - s.solar_generated_kw).abs() < 1e-5,
                "step {}: routed {} of generated {}",
                s.step,
                routed,
                s.solar_generated_kw
            );
            let served =
                s.flow.solar_to_load + s.flow.battery_to_load + s.flow.grid_to_load + s.flow.unmet_load;
            assert!(
                (served - s.load_demand_kw).abs() < 1e-5,
                "step {}: served {} of demand {}",
                s.step,
                served,
                s.load_demand_kw
            );
        }
    }

    #[test]
    fn failed_inverter_forces_zero_generation() {
        let mut scenario = ScenarioConfig::baseline();
        scenario.simulation.duration_days = 10;
        scenario.inverter.failure_rate = 1.0;
        scenario.inverter.min_failure_duration_hours = 48.0;
        scenario.inverter.max_failure_duration_hours = 96.0;
        let mut engine = Engine::from_scenario(&scenario, 5).expect("strategy should parse");
        let results = engine.run().expect("run should succeed");

        let mut saw_outage_step = false;
        for s in &results.data.step_log {
            if !s.inverter_operational {
                saw_outage_step = true;
                assert_eq!(
                    s.solar_generated_kw, 0.0,
                    "step {}: no solar may pass a failed inverter",
                    s.step
                );
            }
        }
        assert!(saw_outage_step, "certain failure rate must cause outages");
        assert!(!results.data.event_log.is_empty());
    }
}

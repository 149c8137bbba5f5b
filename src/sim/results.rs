//! Results compiler: pure reduction of the run logs into a report.

use std::fmt;

use serde::Serialize;

use crate::devices::{Battery, Season};

use super::dispatch::Strategy;
use super::grid::GridLedger;
use super::types::{DailySummary, EventLogEntry, StepRecord};

/// Static run metadata captured at engine construction and carried into the
/// compiled results unchanged.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub duration_days: u32,
    pub seed: u64,
    pub season: Season,
    pub strategy: Strategy,
    pub battery_count: u32,
    pub solar_count: u32,
    pub inverter_count: u32,
}

/// Whole-run energy totals, summed over the daily summaries.
#[derive(Debug, Clone, Serialize)]
pub struct SummarySection {
    pub total_solar_generated_kwh: f64,
    pub total_load_consumed_kwh: f64,
    pub total_grid_imported_kwh: f64,
    pub total_grid_exported_kwh: f64,
    pub total_curtailed_kwh: f64,
    /// Fraction of load met without grid import, in percent.
    pub self_sufficiency_percent: f64,
}

/// Money totals derived from the energy totals and the configured tariffs.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialSection {
    pub import_cost_per_kwh: f64,
    pub export_revenue_per_kwh: f64,
    pub total_import_cost: f64,
    pub total_export_revenue: f64,
    /// Revenue minus cost; positive means the run turned a profit.
    pub net_balance: f64,
}

/// Battery state over and at the end of the run.
#[derive(Debug, Clone, Serialize)]
pub struct BatterySection {
    pub capacity_kwh: f64,
    /// Arithmetic mean of the per-step state of charge, 0 for an empty run.
    pub average_soc_percent: f64,
    pub final_soc_percent: f64,
    pub min_soc_percent: f64,
}

/// Outage and unserved-load counters.
#[derive(Debug, Clone, Serialize)]
pub struct ReliabilitySection {
    /// Number of distinct inverter failure events logged.
    pub inverter_failures: usize,
    /// Steps during which the inverter was out of service.
    pub outage_steps: usize,
    /// Steps with any unserved load.
    pub unmet_load_steps: usize,
    /// Share of steps with unserved load, in percent.
    pub unmet_load_percentage: f64,
}

/// Scenario identity: what was simulated and with which seed.
#[derive(Debug, Clone, Serialize)]
pub struct SystemSection {
    pub duration_days: u32,
    pub total_steps: usize,
    pub seed: u64,
    pub season: String,
    pub strategy: String,
    pub battery_count: u32,
    pub solar_count: u32,
    pub inverter_count: u32,
}

/// Raw per-step and per-day records backing the aggregate sections.
#[derive(Debug, Clone, Serialize)]
pub struct DataSection {
    pub step_log: Vec<StepRecord>,
    pub daily_summaries: Vec<DailySummary>,
    pub event_log: Vec<EventLogEntry>,
}

/// Complete simulation results.
///
/// Compiled once at the end of a run; every aggregate is a function of the
/// logs and static configuration, never of mutable component state, so
/// recompiling from the same logs yields identical numbers.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResults {
    pub summary: SummarySection,
    pub financial: FinancialSection,
    pub battery: BatterySection,
    pub reliability: ReliabilitySection,
    pub system: SystemSection,
    pub data: DataSection,
}

impl SimulationResults {
    /// Reduces the run logs into the final report.
    pub fn compile(
        context: &RunContext,
        battery: &Battery,
        grid: &GridLedger,
        step_log: Vec<StepRecord>,
        daily_summaries: Vec<DailySummary>,
        event_log: Vec<EventLogEntry>,
    ) -> Self {
        let total_solar: f64 = daily_summaries.iter().map(|d| d.solar_generated_kwh).sum();
        let total_load: f64 = daily_summaries.iter().map(|d| d.load_consumed_kwh).sum();
        let total_import: f64 = daily_summaries.iter().map(|d| d.grid_imported_kwh).sum();
        let total_export: f64 = daily_summaries.iter().map(|d| d.grid_exported_kwh).sum();
        let total_curtailed: f64 = daily_summaries.iter().map(|d| d.curtailed_kwh).sum();

        let self_sufficiency_percent = if total_load > 0.0 {
            (total_solar - total_import) / total_load * 100.0
        } else {
            0.0
        };

        let total_import_cost = total_import * grid.import_cost_per_kwh();
        let total_export_revenue = total_export * grid.export_revenue_per_kwh();

        let inverter_failures = event_log
            .iter()
            .filter(|e| e.message.starts_with("inverter failure"))
            .count();
        let outage_steps = step_log.iter().filter(|s| !s.inverter_operational).count();
        let unmet_load_steps = step_log.iter().filter(|s| s.flow.unmet_load > 0.0).count();
        let unmet_load_percentage = if step_log.is_empty() {
            0.0
        } else {
            unmet_load_steps as f64 / step_log.len() as f64 * 100.0
        };

        let average_soc_percent = if step_log.is_empty() {
            0.0
        } else {
            step_log.iter().map(|s| s.battery_soc).sum::<f64>() / step_log.len() as f64
        };

        Self {
            summary: SummarySection {
                total_solar_generated_kwh: total_solar,
                total_load_consumed_kwh: total_load,
                total_grid_imported_kwh: total_import,
                total_grid_exported_kwh: total_export,
                total_curtailed_kwh: total_curtailed,
                self_sufficiency_percent,
            },
            financial: FinancialSection {
                import_cost_per_kwh: grid.import_cost_per_kwh(),
                export_revenue_per_kwh: grid.export_revenue_per_kwh(),
                total_import_cost,
                total_export_revenue,
                net_balance: total_export_revenue - total_import_cost,
            },
            battery: BatterySection {
                capacity_kwh: battery.capacity_kwh(),
                average_soc_percent,
                final_soc_percent: battery.soc_percent(),
                min_soc_percent: battery.min_soc() * 100.0,
            },
            reliability: ReliabilitySection {
                inverter_failures,
                outage_steps,
                unmet_load_steps,
                unmet_load_percentage,
            },
            system: SystemSection {
                duration_days: context.duration_days,
                total_steps: step_log.len(),
                seed: context.seed,
                season: context.season.name().to_string(),
                strategy: context.strategy.name().to_string(),
                battery_count: context.battery_count,
                solar_count: context.solar_count,
                inverter_count: context.inverter_count,
            },
            data: DataSection {
                step_log,
                daily_summaries,
                event_log,
            },
        }
    }
}

impl fmt::Display for SimulationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Results ===")?;
        writeln!(
            f,
            "scenario: {} days, {} steps, season {}, strategy {}, seed {}",
            self.system.duration_days,
            self.system.total_steps,
            self.system.season,
            self.system.strategy,
            self.system.seed,
        )?;
        writeln!(f)?;
        writeln!(f, "-- Energy --")?;
        writeln!(
            f,
            "  solar generated : {:>10.2} kWh",
            self.summary.total_solar_generated_kwh
        )?;
        writeln!(
            f,
            "  load consumed   : {:>10.2} kWh",
            self.summary.total_load_consumed_kwh
        )?;
        writeln!(
            f,
            "  grid imported   : {:>10.2} kWh",
            self.summary.total_grid_imported_kwh
        )?;
        writeln!(
            f,
            "  grid exported   : {:>10.2} kWh",
            self.summary.total_grid_exported_kwh
        )?;
        writeln!(
            f,
            "  curtailed       : {:>10.2} kWh",
            self.summary.total_curtailed_kwh
        )?;
        writeln!(
            f,
            "  self-sufficiency: {:>10.1} %",
            self.summary.self_sufficiency_percent
        )?;
        writeln!(f)?;
        writeln!(f, "-- Financial --")?;
        writeln!(
            f,
            "  import cost     : {:>10.2}",
            self.financial.total_import_cost
        )?;
        writeln!(
            f,
            "  export revenue  : {:>10.2}",
            self.financial.total_export_revenue
        )?;
        writeln!(f, "  net balance     : {:>10.2}", self.financial.net_balance)?;
        writeln!(f)?;
        writeln!(f, "-- Battery --")?;
        writeln!(f, "  capacity        : {:>10.2} kWh", self.battery.capacity_kwh)?;
        writeln!(
            f,
            "  average SoC     : {:>10.1} %",
            self.battery.average_soc_percent
        )?;
        writeln!(
            f,
            "  final SoC       : {:>10.1} %",
            self.battery.final_soc_percent
        )?;
        writeln!(f)?;
        writeln!(f, "-- Reliability --")?;
        writeln!(
            f,
            "  inverter failures: {:>6}",
            self.reliability.inverter_failures
        )?;
        writeln!(f, "  outage steps     : {:>6}", self.reliability.outage_steps)?;
        write!(
            f,
            "  unmet load steps : {:>6}",
            self.reliability.unmet_load_steps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::EnergyFlow;
    use chrono::NaiveDate;

    fn context() -> RunContext {
        RunContext {
            duration_days: 1,
            seed: 42,
            season: Season::Summer,
            strategy: Strategy::LoadPriority,
            battery_count: 1,
            solar_count: 1,
            inverter_count: 1,
        }
    }

    fn step(step: usize, battery_soc: f64, unmet_load: f64) -> StepRecord {
        StepRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + chrono::Duration::hours(step as i64),
            step,
            hour: step as f64 % 24.0,
            solar_available_kw: 0.0,
            solar_generated_kw: 0.0,
            load_demand_kw: 0.8,
            cloud_cover: 0.2,
            battery_soc,
            flow: EnergyFlow {
                unmet_load,
                ..EnergyFlow::zero()
            },
            inverter_operational: true,
        }
    }

    fn summary(day: u32, solar: f64, load: f64, import: f64, export: f64) -> DailySummary {
        DailySummary {
            day,
            solar_generated_kwh: solar,
            load_consumed_kwh: load,
            grid_imported_kwh: import,
            grid_exported_kwh: export,
            curtailed_kwh: 0.0,
            battery_soc_end: 50.0,
            self_sufficiency_percent: 0.0,
        }
    }

    #[test]
    fn totals_sum_over_daily_summaries() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.30, 0.10, 5.0);
        let summaries = vec![
            summary(1, 20.0, 18.0, 4.0, 1.0),
            summary(2, 30.0, 18.0, 2.0, 6.0),
        ];
        let results =
            SimulationResults::compile(&context(), &battery, &grid, vec![], summaries, vec![]);

        assert!((results.summary.total_solar_generated_kwh - 50.0).abs() < 1e-9);
        assert!((results.summary.total_load_consumed_kwh - 36.0).abs() < 1e-9);
        assert!((results.summary.total_grid_imported_kwh - 6.0).abs() < 1e-9);
        assert!((results.summary.total_grid_exported_kwh - 7.0).abs() < 1e-9);
    }

    #[test]
    fn financials_derive_from_energy_totals_and_tariffs() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.25, 0.05, 5.0);
        let summaries = vec![summary(1, 10.0, 10.0, 8.0, 2.0)];
        let results =
            SimulationResults::compile(&context(), &battery, &grid, vec![], summaries, vec![]);

        assert!((results.financial.total_import_cost - 2.0).abs() < 1e-9);
        assert!((results.financial.total_export_revenue - 0.1).abs() < 1e-9);
        assert!((results.financial.net_balance - (0.1 - 2.0)).abs() < 1e-9);
    }

    #[test]
    fn self_sufficiency_formula() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.30, 0.10, 5.0);
        // (solar - import) / load * 100 = (20 - 5) / 25 * 100 = 60%
        let summaries = vec![summary(1, 20.0, 25.0, 5.0, 0.0)];
        let results =
            SimulationResults::compile(&context(), &battery, &grid, vec![], summaries, vec![]);
        assert!((results.summary.self_sufficiency_percent - 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_load_yields_zero_self_sufficiency() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.30, 0.10, 5.0);
        let summaries = vec![summary(1, 20.0, 0.0, 0.0, 0.0)];
        let results =
            SimulationResults::compile(&context(), &battery, &grid, vec![], summaries, vec![]);
        assert_eq!(results.summary.self_sufficiency_percent, 0.0);
    }

    #[test]
    fn average_soc_is_the_mean_of_step_values() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.30, 0.10, 5.0);
        let steps = vec![step(0, 40.0, 0.0), step(1, 60.0, 0.0), step(2, 80.0, 0.0)];
        let results =
            SimulationResults::compile(&context(), &battery, &grid, steps, vec![], vec![]);
        assert!((results.battery.average_soc_percent - 60.0).abs() < 1e-9);
    }

    #[test]
    fn empty_run_reports_zero_average_soc() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.30, 0.10, 5.0);
        let results =
            SimulationResults::compile(&context(), &battery, &grid, vec![], vec![], vec![]);
        assert_eq!(results.battery.average_soc_percent, 0.0);
        assert_eq!(results.reliability.unmet_load_percentage, 0.0);
    }

    #[test]
    fn unmet_load_percentage_over_total_steps() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.30, 0.10, 5.0);
        let steps = vec![
            step(0, 50.0, 0.0),
            step(1, 50.0, 0.5),
            step(2, 50.0, 0.0),
            step(3, 50.0, 1.2),
        ];
        let results =
            SimulationResults::compile(&context(), &battery, &grid, steps, vec![], vec![]);
        assert_eq!(results.reliability.unmet_load_steps, 2);
        assert!((results.reliability.unmet_load_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn failures_counted_from_event_log() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.30, 0.10, 5.0);
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let events = vec![
            EventLogEntry {
                timestamp: ts,
                message: "inverter failure (remaining: 12h)".to_string(),
            },
            EventLogEntry {
                timestamp: ts,
                message: "inverter failure (remaining: 4h)".to_string(),
            },
        ];
        let results =
            SimulationResults::compile(&context(), &battery, &grid, vec![], vec![], events);
        assert_eq!(results.reliability.inverter_failures, 2);
    }

    #[test]
    fn report_serializes_to_json() {
        let battery = Battery::new(10.0, 1.0, 0.1, 0.5);
        let grid = GridLedger::new(0.30, 0.10, 5.0);
        let summaries = vec![summary(1, 10.0, 10.0, 1.0, 1.0)];
        let results =
            SimulationResults::compile(&context(), &battery, &grid, vec![], summaries, vec![]);
        let json = serde_json::to_string(&results).expect("results must serialize");
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"financial\""));
        assert!(json.contains("\"average_soc_percent\""));
        assert!(json.contains("\"daily_summaries\""));
    }
}

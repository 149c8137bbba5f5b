//! Energy dispatch: strategy-ordered routing of solar power across sinks.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::devices::Battery;

use super::grid::{GridLedger, LedgerError};
use super::types::EnergyFlow;

/// Decimal places kept in every flow magnitude, so downstream conservation
/// checks are stable against floating-point residue.
const FLOW_PRECISION: f64 = 1e6;

fn round_flow(power_kw: f64) -> f64 {
    (power_kw.max(0.0) * FLOW_PRECISION).round() / FLOW_PRECISION
}

/// Error for a strategy name outside the three recognized values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategyError(pub String);

impl fmt::Display for UnknownStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown strategy \"{}\", expected one of: {}",
            self.0,
            Strategy::NAMES.join(", ")
        )
    }
}

impl Error for UnknownStrategyError {}

/// One of the three solar sinks a strategy can route power to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarSink {
    /// Direct consumption by the house load.
    Load,
    /// Battery charging.
    Battery,
    /// Grid export, capped by the ledger.
    Grid,
}

/// Dispatch priority strategy: the order in which solar power is offered to
/// the three sinks. The deficit tail (battery discharge, then grid import)
/// is identical for all strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// House load first, battery second, grid export last.
    LoadPriority,
    /// Battery first, house load second, grid export last.
    ChargePriority,
    /// Grid export first, battery second, house load last.
    ProducePriority,
}

impl Strategy {
    /// All recognized strategy names as they appear in configuration.
    pub const NAMES: &[&str] = &["LOAD_PRIORITY", "CHARGE_PRIORITY", "PRODUCE_PRIORITY"];

    /// The ordered pipeline of sinks solar power is offered to.
    pub const fn sink_order(self) -> [SolarSink; 3] {
        match self {
            Strategy::LoadPriority => [SolarSink::Load, SolarSink::Battery, SolarSink::Grid],
            Strategy::ChargePriority => [SolarSink::Battery, SolarSink::Load, SolarSink::Grid],
            Strategy::ProducePriority => [SolarSink::Grid, SolarSink::Battery, SolarSink::Load],
        }
    }

    /// Configuration-file name of the strategy.
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::LoadPriority => "LOAD_PRIORITY",
            Strategy::ChargePriority => "CHARGE_PRIORITY",
            Strategy::ProducePriority => "PRODUCE_PRIORITY",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOAD_PRIORITY" => Ok(Strategy::LoadPriority),
            "CHARGE_PRIORITY" => Ok(Strategy::ChargePriority),
            "PRODUCE_PRIORITY" => Ok(Strategy::ProducePriority),
            _ => Err(UnknownStrategyError(s.to_string())),
        }
    }
}

/// Routes one timestep's solar power and load demand across the battery and
/// grid according to the configured [`Strategy`].
///
/// The dispatcher holds no state across calls: it is a function of its
/// inputs plus the mutations it performs on the battery and ledger it is
/// lent for the duration of one [`distribute`](Dispatcher::distribute) call.
///
/// Dispatch reasons in power (kW); the battery and ledger interfaces are
/// energy-based (kWh), so power crosses those boundaries multiplied by the
/// step duration and comes back divided by it.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    strategy: Strategy,
}

impl Dispatcher {
    /// Creates a dispatcher for the given strategy.
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// The configured strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Distributes one step of solar power and load demand.
    ///
    /// Offers the remaining solar to each sink in strategy order; each sink
    /// reports what it accepted and the remainder moves on. Solar left after
    /// all three sinks is curtailed (lost, reflected in no ledger). The
    /// deficit left after solar's direct contribution is covered by battery
    /// discharge first and grid import second; grid import is modeled as
    /// unconstrained, so `unmet_load` stays 0 by design.
    ///
    /// # Errors
    ///
    /// Propagates a [`LedgerError`] from the grid ledger; the dispatcher
    /// itself never offers negative energy, so this only fires on a broken
    /// ledger contract.
    pub fn distribute(
        &self,
        solar_kw: f64,
        load_kw: f64,
        battery: &mut Battery,
        grid: &mut GridLedger,
        step_hours: f64,
    ) -> Result<EnergyFlow, LedgerError> {
        let mut solar_to_load = 0.0;
        let mut solar_to_battery = 0.0;
        let mut solar_to_grid = 0.0;
        let mut battery_to_load = 0.0;
        let mut grid_to_load = 0.0;

        let mut solar_remaining = solar_kw.max(0.0);

        for sink in self.strategy.sink_order() {
            if solar_remaining <= 0.0 {
                break;
            }
            match sink {
                SolarSink::Load => {
                    solar_to_load = solar_remaining.min(load_kw);
                    solar_remaining -= solar_to_load;
                }
                SolarSink::Battery => {
                    // Skip the charge offer entirely when full, so
                    // efficiency rounding can't leak into the flow record.
                    if !battery.is_full() {
                        let offered_kwh = solar_remaining * step_hours;
                        let accepted_kwh = battery.charge(offered_kwh);
                        solar_to_battery = accepted_kwh / step_hours;
                        solar_remaining -= solar_to_battery;
                    }
                }
                SolarSink::Grid => {
                    let offered_kwh = solar_remaining * step_hours;
                    let exported_kwh = grid.export_energy(offered_kwh)?;
                    solar_to_grid = exported_kwh / step_hours;
                    solar_remaining -= solar_to_grid;
                }
            }
        }

        // Whatever no sink accepted is curtailed.
        let curtailed = solar_remaining;

        // Deficit tail, identical for every strategy: battery, then grid.
        let mut deficit = load_kw - solar_to_load;
        if deficit > 0.0 {
            let delivered_kwh = battery.discharge(deficit * step_hours);
            battery_to_load = delivered_kwh / step_hours;
            deficit -= battery_to_load;

            if deficit > 0.0 {
                grid.import_energy(deficit * step_hours)?;
                grid_to_load = deficit;
            }
        }

        // Grid import is unconstrained, so nothing stays unserved.
        let unmet_load = 0.0;

        Ok(EnergyFlow {
            solar_to_load: round_flow(solar_to_load),
            solar_to_battery: round_flow(solar_to_battery),
            solar_to_grid: round_flow(solar_to_grid),
            battery_to_load: round_flow(battery_to_load),
            grid_to_load: round_flow(grid_to_load),
            unmet_load: round_flow(unmet_load),
            curtailed: round_flow(curtailed),
        })
    }
}

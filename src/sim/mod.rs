//! Simulation core: clock, dispatch, grid ledger, engine, and results.

pub mod clock;
pub mod dispatch;
pub mod engine;
pub mod grid;
pub mod results;
pub mod types;

pub use clock::SimClock;
pub use dispatch::{Dispatcher, Strategy};
pub use engine::{Engine, ScenarioBuildError};
pub use grid::{GridLedger, LedgerError};
pub use results::SimulationResults;
pub use types::{DailySummary, EnergyFlow, EventLogEntry, SimConfig, StepRecord};

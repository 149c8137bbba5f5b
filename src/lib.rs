//! Digital-twin simulator for a residential microgrid.
//!
//! Models a solar array behind a failure-prone inverter, a battery bank, a
//! house load, and a tariffed grid connection, stepped at a configurable
//! resolution. An energy dispatch engine routes each step's solar power
//! through an ordered pipeline of sinks chosen by the configured strategy,
//! and a results compiler reduces the run logs into an aggregate report.
//!
//! # Example
//!
//! ```
//! use microgrid_sim::config::ScenarioConfig;
//! use microgrid_sim::sim::Engine;
//!
//! let scenario = ScenarioConfig::baseline();
//! let mut engine = Engine::from_scenario(&scenario, 42).unwrap();
//! let results = engine.run().unwrap();
//! assert!(results.summary.total_load_consumed_kwh > 0.0);
//! ```

pub mod config;
pub mod devices;
pub mod io;
pub mod sim;

//! Shared helpers for integration tests.

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::sim::Engine;

/// Builds an engine from a named preset with the duration overridden.
pub fn engine_from_preset(preset: &str, days: u32, seed: u64) -> Engine {
    let mut scenario = ScenarioConfig::preset(preset).expect("preset must exist");
    scenario.simulation.duration_days = days;
    assert!(
        scenario.validate().is_empty(),
        "test scenario must validate clean"
    );
    Engine::from_scenario(&scenario, seed).expect("preset strategy must parse")
}

/// Builds a baseline engine with a specific dispatch strategy.
pub fn engine_with_strategy(strategy: &str, days: u32, seed: u64) -> Engine {
    let mut scenario = ScenarioConfig::baseline();
    scenario.simulation.duration_days = days;
    scenario.energy_management.strategy = strategy.to_string();
    Engine::from_scenario(&scenario, seed).expect("strategy must parse")
}

//! Scenario configuration: TOML loading, named presets, and validation.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::devices::Season;
use crate::sim::Strategy;

/// A configuration problem found while loading or validating a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// The offending field, dotted path form (e.g. `"battery.efficiency"`).
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error in `{}`: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// Run length, resolution, and randomness.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    pub duration_days: u32,
    pub time_step_minutes: u32,
    pub start_date: NaiveDate,
    pub season: String,
    /// Master seed. When absent a random seed is drawn and reported.
    pub random_seed: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            duration_days: 7,
            time_step_minutes: 60,
            start_date: default_start_date(),
            season: "summer".to_string(),
            random_seed: None,
        }
    }
}

/// Battery bank sizing and behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatterySection {
    pub count: u32,
    pub unit_capacity_kwh: f64,
    pub efficiency: f64,
    pub min_soc: f64,
    pub initial_soc: f64,
}

impl Default for BatterySection {
    fn default() -> Self {
        Self {
            count: 1,
            unit_capacity_kwh: 10.0,
            efficiency: 0.95,
            min_soc: 0.1,
            initial_soc: 0.5,
        }
    }
}

/// Solar array sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarSection {
    pub count: u32,
    pub unit_peak_power_kw: f64,
}

impl Default for SolarSection {
    fn default() -> Self {
        Self {
            count: 1,
            unit_peak_power_kw: 5.0,
        }
    }
}

/// Inverter sizing and failure model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InverterSection {
    pub count: u32,
    pub unit_max_output_kw: f64,
    /// Daily probability of a failure starting.
    pub failure_rate: f64,
    pub min_failure_duration_hours: f64,
    pub max_failure_duration_hours: f64,
}

impl Default for InverterSection {
    fn default() -> Self {
        Self {
            count: 1,
            unit_max_output_kw: 5.0,
            failure_rate: 0.05,
            min_failure_duration_hours: 4.0,
            max_failure_duration_hours: 48.0,
        }
    }
}

/// House load profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadSection {
    pub base_load_kw: f64,
    pub peak_hours_max_kw: f64,
    pub peak_hours_start: f64,
    pub peak_hours_end: f64,
}

impl Default for LoadSection {
    fn default() -> Self {
        Self {
            base_load_kw: 0.8,
            peak_hours_max_kw: 2.5,
            peak_hours_start: 17.0,
            peak_hours_end: 21.0,
        }
    }
}

/// Grid tariffs and export limit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    pub import_cost_per_kwh: f64,
    pub export_revenue_per_kwh: f64,
    pub export_limit_kw: f64,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            import_cost_per_kwh: 0.30,
            export_revenue_per_kwh: 0.10,
            export_limit_kw: 5.0,
        }
    }
}

/// Dispatch strategy selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnergyManagementSection {
    pub strategy: String,
}

impl Default for EnergyManagementSection {
    fn default() -> Self {
        Self {
            strategy: "LOAD_PRIORITY".to_string(),
        }
    }
}

/// Complete scenario configuration.
///
/// Every section and field is optional in the TOML source; anything omitted
/// falls back to the baseline defaults. Unknown keys are rejected so typos
/// fail loudly instead of silently reverting to a default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub simulation: SimulationSection,
    pub battery: BatterySection,
    pub solar: SolarSection,
    pub inverter: InverterSection,
    pub load: LoadSection,
    pub grid: GridSection,
    pub energy_management: EnergyManagementSection,
}

impl ScenarioConfig {
    /// Default residential scenario: one 10 kWh battery, 5 kW of solar,
    /// load-priority dispatch over a summer week.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Winter scenario with a larger battery bank and heavy evening load,
    /// dispatching charge-first. Exercises deep discharge and grid import.
    pub fn off_grid_heavy() -> Self {
        let mut config = Self::default();
        config.simulation.season = "winter".to_string();
        config.simulation.duration_days = 14;
        config.battery.count = 2;
        config.battery.initial_soc = 0.8;
        config.load.peak_hours_max_kw = 4.0;
        config.energy_management.strategy = "CHARGE_PRIORITY".to_string();
        config
    }

    /// Export-oriented scenario: oversized array against a tight export
    /// limit, produce-priority dispatch. Exercises curtailment.
    pub fn feed_in_farm() -> Self {
        let mut config = Self::default();
        config.solar.count = 4;
        config.inverter.count = 3;
        config.grid.export_limit_kw = 8.0;
        config.energy_management.strategy = "PRODUCE_PRIORITY".to_string();
        config
    }

    /// Looks up a named preset.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "baseline" => Some(Self::baseline()),
            "off_grid_heavy" => Some(Self::off_grid_heavy()),
            "feed_in_farm" => Some(Self::feed_in_farm()),
            _ => None,
        }
    }

    /// Names of the available presets.
    pub const PRESET_NAMES: &'static [&'static str] =
        &["baseline", "off_grid_heavy", "feed_in_farm"];

    /// Parses a scenario from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the parse failure.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::new("<toml>", e.to_string()))
    }

    /// Loads a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("<file>", format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every field against its domain. Returns all problems found,
    /// empty when the configuration is usable.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.simulation.duration_days == 0 {
            errors.push(ConfigError::new("simulation.duration_days", "must be > 0"));
        }
        if self.simulation.time_step_minutes == 0 {
            errors.push(ConfigError::new(
                "simulation.time_step_minutes",
                "must be > 0",
            ));
        }
        if self.simulation.season.parse::<Season>().is_err() {
            errors.push(ConfigError::new(
                "simulation.season",
                format!(
                    "unknown season `{}` (expected one of: {})",
                    self.simulation.season,
                    Season::NAMES.join(", ")
                ),
            ));
        }

        if self.battery.count == 0 {
            errors.push(ConfigError::new("battery.count", "must be > 0"));
        }
        if self.battery.unit_capacity_kwh <= 0.0 {
            errors.push(ConfigError::new("battery.unit_capacity_kwh", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.battery.efficiency) || self.battery.efficiency == 0.0 {
            errors.push(ConfigError::new(
                "battery.efficiency",
                "must be in (0.0, 1.0]",
            ));
        }
        if !(0.0..=1.0).contains(&self.battery.min_soc) {
            errors.push(ConfigError::new("battery.min_soc", "must be in [0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&self.battery.initial_soc) {
            errors.push(ConfigError::new(
                "battery.initial_soc",
                "must be in [0.0, 1.0]",
            ));
        } else if self.battery.initial_soc < self.battery.min_soc {
            errors.push(ConfigError::new(
                "battery.initial_soc",
                "must be >= battery.min_soc",
            ));
        }

        if self.solar.count == 0 {
            errors.push(ConfigError::new("solar.count", "must be > 0"));
        }
        if self.solar.unit_peak_power_kw < 0.0 {
            errors.push(ConfigError::new("solar.unit_peak_power_kw", "must be >= 0"));
        }

        if self.inverter.count == 0 {
            errors.push(ConfigError::new("inverter.count", "must be > 0"));
        }
        if self.inverter.unit_max_output_kw < 0.0 {
            errors.push(ConfigError::new(
                "inverter.unit_max_output_kw",
                "must be >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.inverter.failure_rate) {
            errors.push(ConfigError::new(
                "inverter.failure_rate",
                "must be in [0.0, 1.0]",
            ));
        }
        if self.inverter.min_failure_duration_hours < 0.0 {
            errors.push(ConfigError::new(
                "inverter.min_failure_duration_hours",
                "must be >= 0",
            ));
        }
        if self.inverter.max_failure_duration_hours < self.inverter.min_failure_duration_hours {
            errors.push(ConfigError::new(
                "inverter.max_failure_duration_hours",
                "must be >= min_failure_duration_hours",
            ));
        }

        if self.load.base_load_kw < 0.0 {
            errors.push(ConfigError::new("load.base_load_kw", "must be >= 0"));
        }
        if self.load.peak_hours_max_kw < self.load.base_load_kw {
            errors.push(ConfigError::new(
                "load.peak_hours_max_kw",
                "must be >= base_load_kw",
            ));
        }
        if !(0.0..=24.0).contains(&self.load.peak_hours_start)
            || !(0.0..=24.0).contains(&self.load.peak_hours_end)
            || self.load.peak_hours_end < self.load.peak_hours_start
        {
            errors.push(ConfigError::new(
                "load.peak_hours_start/end",
                "must satisfy 0 <= start <= end <= 24",
            ));
        }

        if self.grid.import_cost_per_kwh < 0.0 {
            errors.push(ConfigError::new("grid.import_cost_per_kwh", "must be >= 0"));
        }
        if self.grid.export_revenue_per_kwh < 0.0 {
            errors.push(ConfigError::new(
                "grid.export_revenue_per_kwh",
                "must be >= 0",
            ));
        }
        if self.grid.export_limit_kw < 0.0 {
            errors.push(ConfigError::new("grid.export_limit_kw", "must be >= 0"));
        }

        if self
            .energy_management
            .strategy
            .parse::<Strategy>()
            .is_err()
        {
            errors.push(ConfigError::new(
                "energy_management.strategy",
                format!(
                    "unknown strategy `{}` (expected one of: {})",
                    self.energy_management.strategy,
                    Strategy::NAMES.join(", ")
                ),
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_validates_clean() {
        assert!(ScenarioConfig::baseline().validate().is_empty());
    }

    #[test]
    fn all_presets_validate_clean() {
        for &name in ScenarioConfig::PRESET_NAMES {
            let config = ScenarioConfig::preset(name).expect("preset must exist");
            assert!(
                config.validate().is_empty(),
                "preset `{name}` failed validation"
            );
        }
    }

    #[test]
    fn unknown_preset_is_none() {
        assert!(ScenarioConfig::preset("turbo").is_none());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ScenarioConfig::from_toml_str("").expect("empty TOML must parse");
        assert_eq!(config.simulation.duration_days, 7);
        assert_eq!(config.battery.unit_capacity_kwh, 10.0);
        assert_eq!(config.energy_management.strategy, "LOAD_PRIORITY");
        assert!(config.simulation.random_seed.is_none());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [simulation]
            duration_days = 30
            season = "winter"
            random_seed = 7

            [battery]
            unit_capacity_kwh = 13.5
            "#,
        )
        .expect("TOML must parse");
        assert_eq!(config.simulation.duration_days, 30);
        assert_eq!(config.simulation.season, "winter");
        assert_eq!(config.simulation.random_seed, Some(7));
        assert_eq!(config.battery.unit_capacity_kwh, 13.5);
        // Untouched sections keep their defaults
        assert_eq!(config.battery.efficiency, 0.95);
        assert_eq!(config.grid.export_limit_kw, 5.0);
    }

    #[test]
    fn start_date_parses_from_toml() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [simulation]
            start_date = "2024-06-15"
            "#,
        )
        .expect("TOML must parse");
        assert_eq!(
            config.simulation.start_date,
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = ScenarioConfig::from_toml_str(
            r#"
            [battery]
            capacity = 10.0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn invalid_efficiency_is_flagged() {
        let mut config = ScenarioConfig::baseline();
        config.battery.efficiency = 1.5;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "battery.efficiency"));
    }

    #[test]
    fn initial_soc_below_min_soc_is_flagged() {
        let mut config = ScenarioConfig::baseline();
        config.battery.min_soc = 0.4;
        config.battery.initial_soc = 0.2;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "battery.initial_soc"));
    }

    #[test]
    fn unknown_strategy_is_flagged() {
        let mut config = ScenarioConfig::baseline();
        config.energy_management.strategy = "PEAK_SHAVING".to_string();
        let errors = config.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "energy_management.strategy"));
    }

    #[test]
    fn unknown_season_is_flagged() {
        let mut config = ScenarioConfig::baseline();
        config.simulation.season = "monsoon".to_string();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.season"));
    }

    #[test]
    fn inverted_failure_durations_are_flagged() {
        let mut config = ScenarioConfig::baseline();
        config.inverter.min_failure_duration_hours = 10.0;
        config.inverter.max_failure_duration_hours = 2.0;
        let errors = config.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "inverter.max_failure_duration_hours"));
    }

    #[test]
    fn config_error_display_names_field() {
        let err = ConfigError::new("battery.min_soc", "must be in [0.0, 1.0]");
        let s = format!("{err}");
        assert!(s.contains("battery.min_soc"));
    }
}

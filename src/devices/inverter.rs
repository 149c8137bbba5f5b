//! Grid-tie inverter with an output limit and stochastic outages.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// A grid-tie inverter that clamps solar output and occasionally fails.
///
/// Failures are drawn once per simulated day by [`check_failure`]
/// (Bernoulli with the configured daily rate); an outage lasts a uniform
/// number of hours within the configured range and is ticked down by
/// [`update`]. While failing, no solar power passes through.
///
/// [`check_failure`]: Inverter::check_failure
/// [`update`]: Inverter::update
#[derive(Debug, Clone)]
pub struct Inverter {
    /// Maximum combined output power in kW.
    max_output_kw: f64,
    /// Probability of a failure starting on any given day.
    failure_rate: f64,
    /// Shortest possible outage in hours.
    min_failure_duration_hours: f64,
    /// Longest possible outage in hours.
    max_failure_duration_hours: f64,

    failing: bool,
    failure_hours_remaining: f64,
    rng: StdRng,
}

impl Inverter {
    /// Creates a new inverter with its own seeded RNG.
    ///
    /// # Panics
    ///
    /// Panics if `max_output_kw` is negative, `failure_rate` is outside
    /// `[0, 1]`, or the duration range is invalid.
    pub fn new(
        max_output_kw: f64,
        failure_rate: f64,
        min_failure_duration_hours: f64,
        max_failure_duration_hours: f64,
        seed: u64,
    ) -> Self {
        assert!(max_output_kw >= 0.0);
        assert!((0.0..=1.0).contains(&failure_rate));
        assert!(min_failure_duration_hours >= 0.0);
        assert!(max_failure_duration_hours >= min_failure_duration_hours);

        Self {
            max_output_kw,
            failure_rate,
            min_failure_duration_hours,
            max_failure_duration_hours,
            failing: false,
            failure_hours_remaining: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns `true` while the inverter is able to convert power.
    pub fn is_operational(&self) -> bool {
        !self.failing
    }

    /// Returns `true` while an outage is in progress.
    pub fn is_failing(&self) -> bool {
        self.failing
    }

    /// Hours left before the current outage ends (0 when operational).
    pub fn failure_hours_remaining(&self) -> f64 {
        self.failure_hours_remaining
    }

    /// Clamps the available power through the inverter's output limit.
    pub fn apply_limit(&self, power_kw: f64) -> f64 {
        power_kw.clamp(0.0, self.max_output_kw)
    }

    /// Once-daily failure draw. Does nothing while an outage is already in
    /// progress.
    pub fn check_failure(&mut self) {
        if self.failing {
            return;
        }
        if self.rng.random::<f64>() < self.failure_rate {
            self.failing = true;
            self.failure_hours_remaining = self
                .rng
                .random_range(self.min_failure_duration_hours..=self.max_failure_duration_hours);
        }
    }

    /// Advances inverter state by the given number of simulated hours,
    /// ending the outage when its duration is exhausted.
    pub fn update(&mut self, hours_passed: f64) {
        if !self.failing {
            return;
        }
        self.failure_hours_remaining -= hours_passed;
        if self.failure_hours_remaining <= 0.0 {
            self.failing = false;
            self.failure_hours_remaining = 0.0;
        }
    }
}

//! Simulation clock: step sequencing and derived calendar time.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::types::SimConfig;

/// A simulation clock that tracks steps over a fixed duration and derives
/// calendar time from the step index.
///
/// Day boundaries are detected by comparing the derived [`NaiveDate`] of
/// consecutive steps rather than by modulo arithmetic on accumulated
/// minutes, so they stay correct when the step size does not evenly divide
/// a day.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::clock::SimClock;
/// use microgrid_sim::sim::types::SimConfig;
///
/// let mut clock = SimClock::new(&SimConfig::new(60, 1, 0));
/// let mut steps = Vec::new();
/// while let Some(step) = clock.tick() {
///     steps.push(step);
/// }
/// assert_eq!(steps.len(), 24);
/// ```
pub struct SimClock {
    /// Current step of the simulation.
    current: usize,
    /// Total steps to run in the simulation.
    total: usize,
    /// Length of one step in minutes.
    time_step_minutes: u32,
    /// Calendar date of step 0.
    start_date: NaiveDate,
}

impl SimClock {
    /// Creates a clock spanning the configured run.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            current: 0,
            total: config.total_steps(),
            time_step_minutes: config.time_step_minutes,
            start_date: config.start_date,
        }
    }

    /// Advances the clock by one step.
    ///
    /// Returns the step index that should now be processed, or `None` once
    /// all steps have been consumed.
    pub fn tick(&mut self) -> Option<usize> {
        if self.current < self.total {
            let step = self.current;
            self.current += 1;
            Some(step)
        } else {
            None
        }
    }

    /// Total number of steps this clock will produce.
    pub fn total_steps(&self) -> usize {
        self.total
    }

    /// Minutes elapsed since simulation start at the given step.
    fn minutes_at(&self, step: usize) -> i64 {
        step as i64 * i64::from(self.time_step_minutes)
    }

    /// Fractional hour of day (0.0 to <24.0) at the given step.
    pub fn hour_of_day(&self, step: usize) -> f64 {
        let minutes_since_midnight = self.minutes_at(step).rem_euclid(24 * 60);
        minutes_since_midnight as f64 / 60.0
    }

    /// Simulated timestamp at the given step.
    pub fn timestamp(&self, step: usize) -> NaiveDateTime {
        self.start_date.and_time(NaiveTime::MIN) + Duration::minutes(self.minutes_at(step))
    }

    /// Simulated calendar date at the given step.
    pub fn date(&self, step: usize) -> NaiveDate {
        self.timestamp(step).date()
    }

    /// Returns `true` when `step + 1` falls on a later calendar date,
    /// i.e. the step just processed was the last one of its day.
    pub fn crosses_day_boundary(&self, step: usize) -> bool {
        self.date(step + 1) > self.date(step)
    }
}

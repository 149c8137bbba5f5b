//! Residential load profile.

/// House load demand with a constant base and an evening peak window.
///
/// Demand equals `base_load_kw` outside the peak window; inside it, a
/// half-sine bump raises demand up to `peak_hours_max_kw` at the window's
/// midpoint. The profile is deterministic.
#[derive(Debug, Clone)]
pub struct HouseLoad {
    base_load_kw: f64,
    peak_hours_max_kw: f64,
    peak_hours_start: f64,
    peak_hours_end: f64,
}

impl HouseLoad {
    /// Creates a new load profile.
    ///
    /// # Panics
    ///
    /// Panics if the base load is negative, the peak maximum is below the
    /// base, or the peak window is empty or outside a day.
    pub fn new(
        base_load_kw: f64,
        peak_hours_max_kw: f64,
        peak_hours_start: f64,
        peak_hours_end: f64,
    ) -> Self {
        assert!(base_load_kw >= 0.0);
        assert!(peak_hours_max_kw >= base_load_kw);
        assert!(peak_hours_start < peak_hours_end);
        assert!(peak_hours_start >= 0.0 && peak_hours_end <= 24.0);

        Self {
            base_load_kw,
            peak_hours_max_kw,
            peak_hours_start,
            peak_hours_end,
        }
    }

    /// Demand in kW at the given hour of day (0.0 to <24.0).
    pub fn generate(&self, hour_of_day: f64) -> f64 {
        if hour_of_day < self.peak_hours_start || hour_of_day >= self.peak_hours_end {
            return self.base_load_kw;
        }

        let progress =
            (hour_of_day - self.peak_hours_start) / (self.peak_hours_end - self.peak_hours_start);
        let bump = (std::f64::consts::PI * progress).sin();
        self.base_load_kw + (self.peak_hours_max_kw - self.base_load_kw) * bump
    }
}

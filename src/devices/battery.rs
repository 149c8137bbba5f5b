//! Battery energy storage with an energy-based charge/discharge interface.

/// SOC fraction above which the battery reports itself full. Guards against
/// near-zero charge offers that would only churn efficiency rounding.
const FULL_SOC_EPS: f64 = 1e-6;

/// A battery energy storage system exchanging energy (kWh) per call.
///
/// `Battery` tracks its state of charge as a fraction of capacity and
/// applies a symmetric efficiency factor on both the charge and discharge
/// paths. A configurable minimum SOC floor protects the cells from deep
/// discharge. All mutation goes through [`charge`](Battery::charge) and
/// [`discharge`](Battery::discharge).
#[derive(Debug, Clone)]
pub struct Battery {
    /// Usable capacity in kilowatt-hours.
    capacity_kwh: f64,
    /// One-way conversion efficiency (0..=1), applied per transfer.
    efficiency: f64,
    /// Minimum state of charge fraction the battery will discharge down to.
    min_soc: f64,
    /// Current state of charge as a fraction (0.0 to 1.0).
    soc: f64,
}

impl Battery {
    /// Creates a new battery.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Usable capacity in kWh (must be > 0)
    /// * `efficiency` - One-way conversion efficiency (0 < eff <= 1)
    /// * `min_soc` - Discharge floor as a fraction (0 <= min_soc < 1)
    /// * `initial_soc` - Starting state of charge fraction (0.0 to 1.0)
    ///
    /// # Panics
    ///
    /// Panics if any argument is outside its valid range.
    pub fn new(capacity_kwh: f64, efficiency: f64, min_soc: f64, initial_soc: f64) -> Self {
        assert!(capacity_kwh > 0.0);
        assert!(efficiency > 0.0 && efficiency <= 1.0);
        assert!((0.0..1.0).contains(&min_soc));
        assert!((0.0..=1.0).contains(&initial_soc));

        Self {
            capacity_kwh,
            efficiency,
            min_soc,
            soc: initial_soc,
        }
    }

    /// Offers energy to the battery and returns the amount accepted.
    ///
    /// The accepted amount is what the caller must subtract from its source;
    /// the energy actually stored is smaller by the efficiency factor.
    /// Negative offers are treated as zero.
    pub fn charge(&mut self, offered_kwh: f64) -> f64 {
        if offered_kwh <= 0.0 || self.is_full() {
            return 0.0;
        }

        let headroom_kwh = (1.0 - self.soc) * self.capacity_kwh;
        let storable_kwh = (offered_kwh * self.efficiency).min(headroom_kwh);
        self.soc += storable_kwh / self.capacity_kwh;
        self.soc = self.soc.clamp(0.0, 1.0);

        storable_kwh / self.efficiency
    }

    /// Requests energy from the battery and returns the amount delivered.
    ///
    /// Delivery stops at the minimum-SOC floor and loses the efficiency
    /// factor on the way out. Negative requests are treated as zero.
    pub fn discharge(&mut self, requested_kwh: f64) -> f64 {
        if requested_kwh <= 0.0 {
            return 0.0;
        }

        let available_kwh = ((self.soc - self.min_soc) * self.capacity_kwh).max(0.0);
        let deliverable_kwh = available_kwh * self.efficiency;
        let delivered_kwh = requested_kwh.min(deliverable_kwh);
        self.soc -= (delivered_kwh / self.efficiency) / self.capacity_kwh;
        self.soc = self.soc.clamp(0.0, 1.0);

        delivered_kwh
    }

    /// Returns `true` when no further charge can be accepted.
    pub fn is_full(&self) -> bool {
        self.soc >= 1.0 - FULL_SOC_EPS
    }

    /// Current state of charge in percent (0 to 100).
    pub fn soc_percent(&self) -> f64 {
        self.soc * 100.0
    }

    /// Usable capacity in kWh.
    pub fn capacity_kwh(&self) -> f64 {
        self.capacity_kwh
    }

    /// Discharge floor as a SOC fraction.
    pub fn min_soc(&self) -> f64 {
        self.min_soc
    }
}

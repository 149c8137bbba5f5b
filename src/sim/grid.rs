//! Grid connection ledger: import/export energy and money accounting.

use std::error::Error;
use std::fmt;

/// Error raised when a ledger operation is requested with negative energy.
///
/// Negative amounts are a caller contract violation and are rejected rather
/// than silently clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerError {
    /// The rejected operation (`"import"` or `"export"`).
    pub operation: &'static str,
    /// The offending energy amount in kWh.
    pub energy_kwh: f64,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid ledger operation: {} of {} kWh (energy must be >= 0)",
            self.operation, self.energy_kwh
        )
    }
}

impl Error for LedgerError {}

/// Tracks energy import/export transactions with the utility grid.
///
/// Tariffs and the export limit are fixed at construction; the four
/// accumulators are monotonically non-decreasing and mutated only through
/// [`import_energy`](GridLedger::import_energy) and
/// [`export_energy`](GridLedger::export_energy).
#[derive(Debug, Clone)]
pub struct GridLedger {
    import_cost_per_kwh: f64,
    export_revenue_per_kwh: f64,
    export_limit_kw: f64,

    total_imported_kwh: f64,
    total_exported_kwh: f64,
    total_import_cost: f64,
    total_export_revenue: f64,
}

impl GridLedger {
    /// Creates a new grid connection.
    ///
    /// # Panics
    ///
    /// Panics if either tariff or the export limit is negative.
    pub fn new(
        import_cost_per_kwh: f64,
        export_revenue_per_kwh: f64,
        export_limit_kw: f64,
    ) -> Self {
        assert!(import_cost_per_kwh >= 0.0);
        assert!(export_revenue_per_kwh >= 0.0);
        assert!(export_limit_kw >= 0.0);

        Self {
            import_cost_per_kwh,
            export_revenue_per_kwh,
            export_limit_kw,
            total_imported_kwh: 0.0,
            total_exported_kwh: 0.0,
            total_import_cost: 0.0,
            total_export_revenue: 0.0,
        }
    }

    /// Imports (buys) energy from the grid. Import capacity is modeled as
    /// unconstrained, so the full request is always satisfied.
    ///
    /// Returns the cost of this import.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if `energy_kwh` is negative.
    pub fn import_energy(&mut self, energy_kwh: f64) -> Result<f64, LedgerError> {
        if energy_kwh < 0.0 {
            return Err(LedgerError {
                operation: "import",
                energy_kwh,
            });
        }
        self.total_imported_kwh += energy_kwh;
        let cost = energy_kwh * self.import_cost_per_kwh;
        self.total_import_cost += cost;
        Ok(cost)
    }

    /// Exports (sells) energy to the grid, subject to the export limit.
    ///
    /// Returns the energy actually exported, `min(offered, limit)`. The
    /// ledger is the sole authority on export curtailment; callers must use
    /// the returned value for all downstream accounting.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if `energy_kwh` is negative.
    pub fn export_energy(&mut self, energy_kwh: f64) -> Result<f64, LedgerError> {
        if energy_kwh < 0.0 {
            return Err(LedgerError {
                operation: "export",
                energy_kwh,
            });
        }
        let exported = energy_kwh.min(self.export_limit_kw);
        self.total_exported_kwh += exported;
        self.total_export_revenue += exported * self.export_revenue_per_kwh;
        Ok(exported)
    }

    /// Import tariff in currency per kWh.
    pub fn import_cost_per_kwh(&self) -> f64 {
        self.import_cost_per_kwh
    }

    /// Export tariff in currency per kWh.
    pub fn export_revenue_per_kwh(&self) -> f64 {
        self.export_revenue_per_kwh
    }

    /// Maximum export power accepted per step.
    pub fn export_limit_kw(&self) -> f64 {
        self.export_limit_kw
    }

    /// Total energy imported in kWh.
    pub fn total_imported(&self) -> f64 {
        self.total_imported_kwh
    }

    /// Total energy exported in kWh.
    pub fn total_exported(&self) -> f64 {
        self.total_exported_kwh
    }

    /// Total cost of imported energy.
    pub fn total_cost(&self) -> f64 {
        self.total_import_cost
    }

    /// Total revenue from exported energy.
    pub fn total_revenue(&self) -> f64 {
        self.total_export_revenue
    }

    /// Net financial balance (revenue minus cost); positive means profit.
    pub fn net_balance(&self) -> f64 {
        self.total_export_revenue - self.total_import_cost
    }
}

//! Solar array generation model.

/// Hour of day at which generation starts (inclusive).
const SUNRISE_HOUR: f64 = 6.0;
/// Hour of day at which generation ends (exclusive).
const SUNSET_HOUR: f64 = 18.0;
/// Fraction of output lost under full cloud coverage. Even fully overcast
/// skies pass some diffuse irradiance.
const CLOUD_ATTENUATION: f64 = 0.8;

/// A solar array producing a half-sine daylight curve attenuated by the
/// day's cloud coverage.
///
/// Output peaks at `peak_power_kw` at solar noon under a clear sky and is
/// zero outside the sunrise/sunset window.
#[derive(Debug, Clone)]
pub struct SolarArray {
    /// Combined peak power of the array in kW.
    peak_power_kw: f64,
}

impl SolarArray {
    /// Creates a new solar array; negative peak power is clamped to zero.
    pub fn new(peak_power_kw: f64) -> Self {
        Self {
            peak_power_kw: peak_power_kw.max(0.0),
        }
    }

    /// Combined peak power in kW.
    pub fn peak_power_kw(&self) -> f64 {
        self.peak_power_kw
    }

    /// Available solar power at the given hour of day under the given cloud
    /// coverage fraction (0 = clear, 1 = fully overcast).
    pub fn generate(&self, hour_of_day: f64, cloud_cover: f64) -> f64 {
        if hour_of_day < SUNRISE_HOUR || hour_of_day >= SUNSET_HOUR {
            return 0.0;
        }

        let progress = (hour_of_day - SUNRISE_HOUR) / (SUNSET_HOUR - SUNRISE_HOUR);
        let daylight_frac = (std::f64::consts::PI * progress).sin();

        let attenuation = 1.0 - CLOUD_ATTENUATION * cloud_cover.clamp(0.0, 1.0);
        (self.peak_power_kw * daylight_frac * attenuation).max(0.0)
    }
}

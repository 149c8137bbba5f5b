//! Physical and stochastic component models for the microgrid.

/// Stationary battery storage model.
pub mod battery;
/// Seasonal daily cloud-coverage sampling.
pub mod cloud;
/// Grid-tie inverter with stochastic failures.
pub mod inverter;
/// Residential load profile generator.
pub mod load;
/// Solar array generation model.
pub mod solar;

// Re-export the main types for convenience
pub use battery::Battery;
pub use cloud::{CloudCover, Season};
pub use inverter::Inverter;
pub use load::HouseLoad;
pub use solar::SolarArray;

use rand::{Rng, rngs::StdRng};

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and the specified
/// standard deviation.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

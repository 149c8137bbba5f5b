//! Seasonal cloud coverage sampling, redrawn once per simulated day.

use std::fmt;
use std::str::FromStr;

use rand::{SeedableRng, rngs::StdRng};

use super::gaussian_noise;

/// Season of the simulated run, governing the cloud coverage distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// All recognized season names, lowercase.
    pub const NAMES: &[&str] = &["winter", "spring", "summer", "autumn"];

    /// Mean and standard deviation of the daily coverage fraction.
    fn coverage_distribution(self) -> (f64, f64) {
        match self {
            Season::Winter => (0.65, 0.20),
            Season::Spring => (0.45, 0.20),
            Season::Summer => (0.20, 0.15),
            Season::Autumn => (0.50, 0.20),
        }
    }

    /// Lowercase season name as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized season name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeasonError(pub String);

impl fmt::Display for UnknownSeasonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown season \"{}\", expected one of: {}",
            self.0,
            Season::NAMES.join(", ")
        )
    }
}

impl std::error::Error for UnknownSeasonError {}

impl FromStr for Season {
    type Err = UnknownSeasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            _ => Err(UnknownSeasonError(s.to_string())),
        }
    }
}

/// Samples one cloud coverage fraction per simulated day from a seasonal
/// Gaussian, clamped to `[0, 1]`.
///
/// Owns its RNG; seeded once at construction so runs reproduce exactly.
#[derive(Debug, Clone)]
pub struct CloudCover {
    season: Season,
    rng: StdRng,
}

impl CloudCover {
    /// Creates a sampler for the given season with its own seeded RNG.
    pub fn new(season: Season, seed: u64) -> Self {
        Self {
            season,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Season this sampler draws from.
    pub fn season(&self) -> Season {
        self.season
    }

    /// Draws the coverage fraction for the next simulated day.
    pub fn daily_coverage(&mut self) -> f64 {
        let (mean, std_dev) = self.season.coverage_distribution();
        (mean + gaussian_noise(&mut self.rng, std_dev)).clamp(0.0, 1.0)
    }
}

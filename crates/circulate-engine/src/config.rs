//! Environment configuration, validation, and error types.
//!
//! [`EnvironmentConfig`] collects every tunable of a run. The bounds that
//! a scene loader would otherwise hard-code (the tick safety cap and the
//! profile attribute cap) are plain fields here.
//! [`validate()`](EnvironmentConfig::validate) checks them once, before
//! any floor is rasterized.

use std::error::Error;
use std::fmt;
use std::ops::RangeInclusive;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EnvironmentConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Resolution is NaN, infinite, zero, or negative.
    InvalidResolution {
        /// The invalid value.
        value: f64,
    },
    /// `max_ticks` is zero.
    ZeroTickCap,
    /// `max_profile_attributes` is zero.
    ZeroProfileLimit,
    /// `density_threshold` is NaN, infinite, or negative.
    InvalidDensityThreshold {
        /// The invalid value.
        value: f64,
    },
    /// `initial_wait` is empty or starts at zero.
    InvalidInitialWait {
        /// Range start.
        start: u32,
        /// Range end.
        end: u32,
    },
    /// `barrier_search_depth` is zero.
    ZeroBarrierDepth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResolution { value } => {
                write!(f, "resolution must be finite and positive, got {value}")
            }
            Self::ZeroTickCap => write!(f, "max_ticks must be at least 1"),
            Self::ZeroProfileLimit => write!(f, "max_profile_attributes must be at least 1"),
            Self::InvalidDensityThreshold { value } => {
                write!(f, "density_threshold must be finite and >= 0, got {value}")
            }
            Self::InvalidInitialWait { start, end } => {
                write!(f, "initial_wait {start}..={end} must be non-empty and start at 1 or more")
            }
            Self::ZeroBarrierDepth => write!(f, "barrier_search_depth must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

// ── EnvironmentConfig ──────────────────────────────────────────────

/// Complete configuration for building an environment.
#[derive(Clone, Debug)]
pub struct EnvironmentConfig {
    /// Grid cell size in world units. Default: 30.
    pub resolution: f64,
    /// Master RNG seed. Agent `n` draws from a ChaCha8 stream seeded with
    /// `seed ^ n`. Default: 0.
    pub seed: u64,
    /// Safety cap on ticks per run. Default: 1000.
    pub max_ticks: u64,
    /// Cap on transition-probability entries per agent profile. Default: 100.
    pub max_profile_attributes: usize,
    /// Congestion threshold as a multiple of `resolution`. Default: 1.
    pub density_threshold: f64,
    /// Range of the random factor applied to an agent's first wait.
    /// Default: `1..=60`.
    pub initial_wait: RangeInclusive<u32>,
    /// Depth cap of the barrier-field frontier search. Default: unbounded.
    pub barrier_search_depth: usize,
    /// Run setup transforms and per-tick route planning on the rayon pool.
    /// Results do not depend on it. Default: `true`.
    pub parallel: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            resolution: 30.0,
            seed: 0,
            max_ticks: 1000,
            max_profile_attributes: 100,
            density_threshold: 1.0,
            initial_wait: 1..=60,
            barrier_search_depth: usize::MAX,
            parallel: true,
        }
    }
}

impl EnvironmentConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Resolution must be a usable cell size.
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(ConfigError::InvalidResolution {
                value: self.resolution,
            });
        }
        // 2. At least one tick.
        if self.max_ticks == 0 {
            return Err(ConfigError::ZeroTickCap);
        }
        // 3. At least one transition entry per profile.
        if self.max_profile_attributes == 0 {
            return Err(ConfigError::ZeroProfileLimit);
        }
        // 4. Threshold finite and non-negative.
        if !self.density_threshold.is_finite() || self.density_threshold < 0.0 {
            return Err(ConfigError::InvalidDensityThreshold {
                value: self.density_threshold,
            });
        }
        // 5. Every wait lasts at least one generation.
        let (start, end) = (*self.initial_wait.start(), *self.initial_wait.end());
        if start == 0 || start > end {
            return Err(ConfigError::InvalidInitialWait { start, end });
        }
        // 6. The barrier search must look at least one ring out.
        if self.barrier_search_depth == 0 {
            return Err(ConfigError::ZeroBarrierDepth);
        }
        Ok(())
    }

    /// Occupancy above which a corridor cell counts as congested.
    pub fn congestion_limit(&self) -> f64 {
        self.density_threshold * self.resolution
    }

    /// Builder-style seed override.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder-style resolution override.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EnvironmentConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.resolution, 30.0);
        assert_eq!(cfg.max_ticks, 1000);
        assert_eq!(cfg.max_profile_attributes, 100);
        assert_eq!(cfg.congestion_limit(), 30.0);
    }

    #[test]
    fn invalid_resolution_rejected() {
        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let cfg = EnvironmentConfig::default().with_resolution(bad);
            match cfg.validate() {
                Err(ConfigError::InvalidResolution { .. }) => {}
                other => panic!("expected InvalidResolution, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_caps_rejected() {
        let cfg = EnvironmentConfig {
            max_ticks: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTickCap));
        let cfg = EnvironmentConfig {
            max_profile_attributes: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroProfileLimit));
        let cfg = EnvironmentConfig {
            barrier_search_depth: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBarrierDepth));
    }

    #[test]
    fn density_threshold_must_be_finite() {
        let cfg = EnvironmentConfig {
            density_threshold: -0.5,
            ..Default::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidDensityThreshold { value }) => assert_eq!(value, -0.5),
            other => panic!("expected InvalidDensityThreshold, got {other:?}"),
        }
    }

    #[test]
    fn initial_wait_must_be_positive_and_non_empty() {
        #[allow(clippy::reversed_empty_ranges)]
        for range in [0..=5, 4..=2] {
            let cfg = EnvironmentConfig {
                initial_wait: range,
                ..Default::default()
            };
            match cfg.validate() {
                Err(ConfigError::InvalidInitialWait { .. }) => {}
                other => panic!("expected InvalidInitialWait, got {other:?}"),
            }
        }
        let fixed = EnvironmentConfig {
            initial_wait: 1..=1,
            ..Default::default()
        };
        assert!(fixed.validate().is_ok());
    }
}

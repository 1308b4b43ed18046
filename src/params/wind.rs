//! Wind and grid parameters driving the wave spectrum.

/// Wind and grid configuration for one simulation epoch.
///
/// Immutable while the simulation runs; changing wind means re-running the
/// spectrum initializer through [`crate::ocean::OceanSystem::reconfigure`].
#[derive(Debug, Clone)]
pub struct WindParameters {
    /// Wind speed at 10m above the surface (m/s)
    pub wind_speed_m_per_s: f32,

    /// Wind direction (radians, 0 = +X axis, counter-clockwise)
    pub wind_direction_rad: f32,

    /// Overall wave amplitude scale (dimensionless, 1.0 = physical)
    pub amplitude: f32,

    /// Horizontal displacement strength (dimensionless, 0 = no chop)
    pub choppiness: f32,

    /// Simulation grid resolution per side (must be a power of two, >= 8)
    pub grid_size: u32,

    /// World-space side length of the simulated patch (meters)
    pub domain_length_m: f32,

    /// Seed for the spectrum's Gaussian draws; same seed + same parameters
    /// reproduce the spectrum bit for bit
    pub spectrum_seed: u64,
}

impl Default for WindParameters {
    fn default() -> Self {
        Self {
            wind_speed_m_per_s: 10.0,
            wind_direction_rad: 0.0,
            amplitude: 1.0,
            choppiness: 1.0,
            grid_size: 256,
            domain_length_m: 1000.0,
            spectrum_seed: 1234,
        }
    }
}

impl WindParameters {
    /// Light breeze, long smooth swell
    pub fn calm() -> Self {
        Self {
            wind_speed_m_per_s: 4.0,
            choppiness: 0.4,
            ..Self::default()
        }
    }

    /// Default open-sea conditions
    pub fn moderate() -> Self {
        Self::default()
    }

    /// Gale-driven sea with heavy chop and breaking crests
    pub fn storm() -> Self {
        Self {
            wind_speed_m_per_s: 24.0,
            amplitude: 1.4,
            choppiness: 1.8,
            ..Self::default()
        }
    }

    /// Unit vector pointing downwind
    pub fn wind_direction(&self) -> (f32, f32) {
        (self.wind_direction_rad.cos(), self.wind_direction_rad.sin())
    }

    /// Reject configurations the pipeline cannot run correctly.
    ///
    /// Nothing is clamped: a non-power-of-two grid would make the butterfly
    /// passes silently wrong, so it must fail here, before any GPU resource
    /// is sized from these values.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_size < 8 || !self.grid_size.is_power_of_two() {
            return Err(format!(
                "grid_size must be a power of two >= 8, got {}",
                self.grid_size
            ));
        }
        if self.domain_length_m <= 0.0 || !self.domain_length_m.is_finite() {
            return Err(format!(
                "domain_length_m must be positive, got {}",
                self.domain_length_m
            ));
        }
        if self.wind_speed_m_per_s < 0.0 || !self.wind_speed_m_per_s.is_finite() {
            return Err(format!(
                "wind_speed_m_per_s must be non-negative, got {}",
                self.wind_speed_m_per_s
            ));
        }
        if self.amplitude < 0.0 || !self.amplitude.is_finite() {
            return Err(format!("amplitude must be non-negative, got {}", self.amplitude));
        }
        if self.choppiness < 0.0 || !self.choppiness.is_finite() {
            return Err(format!(
                "choppiness must be non-negative, got {}",
                self.choppiness
            ));
        }
        Ok(())
    }

    /// Number of butterfly passes per FFT axis (log2 of the grid size)
    pub fn fft_passes(&self) -> u32 {
        self.grid_size.trailing_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_validate() {
        assert!(WindParameters::default().validate().is_ok());
        assert!(WindParameters::calm().validate().is_ok());
        assert!(WindParameters::storm().validate().is_ok());
    }

    #[test]
    fn test_power_of_two_grid_accepted() {
        let params = WindParameters {
            grid_size: 128,
            ..WindParameters::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_non_power_of_two_grid_rejected() {
        let params = WindParameters {
            grid_size: 100,
            ..WindParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_negative_amplitude_rejected() {
        let params = WindParameters {
            amplitude: -1.0,
            ..WindParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_tiny_grid_rejected() {
        let params = WindParameters {
            grid_size: 4,
            ..WindParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_fft_passes() {
        let params = WindParameters {
            grid_size: 256,
            ..WindParameters::default()
        };
        assert_eq!(params.fft_passes(), 8);
    }
}

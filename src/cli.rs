//! Command-line argument parsing.

use clap::Parser;

use crate::params::{CameraPreset, FixedCamera, OrbitCamera, RecordingConfig, WindParameters};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Swellfield")]
#[command(about = "FFT-synthesized ocean wave simulator", long_about = None)]
pub struct Args {
    /// Sea state preset: calm, moderate (default), storm
    #[arg(long, value_name = "PRESET", default_value = "moderate")]
    pub sea: String,

    /// Wind speed override (m/s)
    #[arg(long, value_name = "M_PER_S")]
    pub wind_speed: Option<f32>,

    /// Wind direction override (degrees, 0 = +X)
    #[arg(long, value_name = "DEGREES")]
    pub wind_direction: Option<f32>,

    /// Wave amplitude scale override
    #[arg(long, value_name = "SCALE")]
    pub amplitude: Option<f32>,

    /// Horizontal choppiness override
    #[arg(long, value_name = "SCALE")]
    pub choppiness: Option<f32>,

    /// Simulation grid resolution (power of two)
    #[arg(long, value_name = "N")]
    pub grid_size: Option<u32>,

    /// Simulated patch size (meters)
    #[arg(long, value_name = "METERS")]
    pub domain_length: Option<f32>,

    /// Camera preset: fixed (default), orbit
    #[arg(long, value_name = "PRESET", default_value = "fixed")]
    pub camera_preset: String,

    /// Camera elevation for the fixed preset (meters above sea level)
    #[arg(long, value_name = "METERS", default_value = "40")]
    pub elevation: f32,

    /// Record frames to PNG (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,
}

impl Args {
    /// Resolve the sea preset plus any per-field overrides.
    ///
    /// The result is not validated here; the simulation rejects invalid
    /// combinations before touching the GPU.
    pub fn wind_parameters(&self) -> WindParameters {
        let mut wind = match self.sea.to_lowercase().as_str() {
            "calm" => WindParameters::calm(),
            "moderate" => WindParameters::moderate(),
            "storm" => WindParameters::storm(),
            other => {
                eprintln!("Warning: Unknown sea preset '{}', using moderate", other);
                WindParameters::moderate()
            }
        };
        if let Some(speed) = self.wind_speed {
            wind.wind_speed_m_per_s = speed;
        }
        if let Some(direction) = self.wind_direction {
            wind.wind_direction_rad = direction.to_radians();
        }
        if let Some(amplitude) = self.amplitude {
            wind.amplitude = amplitude;
        }
        if let Some(choppiness) = self.choppiness {
            wind.choppiness = choppiness;
        }
        if let Some(grid_size) = self.grid_size {
            wind.grid_size = grid_size;
        }
        if let Some(domain_length) = self.domain_length {
            wind.domain_length_m = domain_length;
        }
        wind
    }

    /// Parse camera preset from command-line arguments
    pub fn parse_camera_preset(&self) -> CameraPreset {
        match self.camera_preset.to_lowercase().as_str() {
            "orbit" => {
                println!("Camera: Orbit");
                CameraPreset::Orbit(OrbitCamera::default())
            }
            "fixed" => {
                println!("Camera: Fixed (elevation: {}m)", self.elevation);
                let mut fixed = FixedCamera::default();
                fixed.position[1] = self.elevation;
                CameraPreset::Fixed(fixed)
            }
            other => {
                eprintln!("Warning: Unknown camera preset '{}', using fixed", other);
                CameraPreset::Fixed(FixedCamera::default())
            }
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn create_recording_config(&self) -> Option<RecordingConfig> {
        self.record.map(|duration| {
            let config = RecordingConfig::new(duration);
            std::fs::create_dir_all(config.frames_dir())
                .expect("Failed to create frames directory");
            config
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_over_preset() {
        let args = Args::parse_from([
            "swellfield",
            "--sea",
            "storm",
            "--wind-speed",
            "15",
            "--grid-size",
            "128",
        ]);
        let wind = args.wind_parameters();

        assert_eq!(wind.wind_speed_m_per_s, 15.0);
        assert_eq!(wind.grid_size, 128);
        // Untouched fields keep the preset's values
        assert_eq!(wind.choppiness, WindParameters::storm().choppiness);
    }
}

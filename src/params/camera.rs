//! Camera preset parameters for the viewer.

/// Camera behavior presets
#[derive(Debug, Clone)]
pub enum CameraPreset {
    /// Stationary camera looking at a fixed target
    Fixed(FixedCamera),
    /// Slow orbit around the patch center
    Orbit(OrbitCamera),
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self::Fixed(FixedCamera::default())
    }
}

/// Fixed camera parameters
#[derive(Debug, Clone)]
pub struct FixedCamera {
    /// Eye position (meters)
    pub position: [f32; 3],

    /// Look-at target (meters)
    pub target: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: [0.0, 40.0, -160.0],
            target: [0.0, 0.0, 80.0],
        }
    }
}

/// Orbiting camera parameters
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Orbit radius around the patch center (meters)
    pub radius_m: f32,

    /// Eye height above sea level (meters)
    pub height_m: f32,

    /// Seconds per full revolution
    pub period_s: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius_m: 220.0,
            height_m: 55.0,
            period_s: 90.0,
        }
    }
}

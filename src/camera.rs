//! Camera system over the viewer's camera presets.

use glam::{Mat4, Vec3};

use crate::params::{CameraPreset, FixedCamera, OrbitCamera, RenderConfig};

/// Camera system producing the frame's view-projection matrix
pub struct CameraSystem {
    preset: CameraPreset,
}

impl CameraSystem {
    pub fn new(preset: CameraPreset) -> Self {
        Self { preset }
    }

    /// Compute eye position and look-at target for given time
    pub fn compute_position_and_target(&self, time_s: f32) -> (Vec3, Vec3) {
        match &self.preset {
            CameraPreset::Fixed(params) => Self::compute_fixed(params),
            CameraPreset::Orbit(params) => Self::compute_orbit(params, time_s),
        }
    }

    fn compute_fixed(p: &FixedCamera) -> (Vec3, Vec3) {
        (Vec3::from_array(p.position), Vec3::from_array(p.target))
    }

    fn compute_orbit(p: &OrbitCamera, time_s: f32) -> (Vec3, Vec3) {
        let angle = time_s / p.period_s * std::f32::consts::TAU;
        let eye = Vec3::new(
            angle.cos() * p.radius_m,
            p.height_m,
            angle.sin() * p.radius_m,
        );
        (eye, Vec3::ZERO)
    }

    /// Build the view-projection matrix and return it with the eye position
    pub fn create_view_proj_matrix(
        &self,
        time_s: f32,
        config: &RenderConfig,
    ) -> (Mat4, Vec3) {
        let (eye, target) = self.compute_position_and_target(time_s);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            config.fov_degrees.to_radians(),
            config.aspect_ratio(),
            config.near_plane_m,
            config.far_plane_m,
        );
        (proj * view, eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_keeps_radius_and_height() {
        let orbit = OrbitCamera {
            radius_m: 100.0,
            height_m: 30.0,
            period_s: 60.0,
        };
        let camera = CameraSystem::new(CameraPreset::Orbit(orbit));

        for step in 0..8 {
            let (eye, target) = camera.compute_position_and_target(step as f32 * 10.0);
            let horizontal = (eye.x * eye.x + eye.z * eye.z).sqrt();
            assert!((horizontal - 100.0).abs() < 1e-3);
            assert!((eye.y - 30.0).abs() < 1e-6);
            assert_eq!(target, Vec3::ZERO);
        }
    }
}

//! Camera pose for the mode-7 renderer
//!
//! Yaw `phi` rotates around the world Y axis (at `phi = 0` the camera faces
//! +Z, `phi` increasing turns toward +X). Pitch `theta` is positive looking
//! down toward the floor plane.

use super::math::Vec3;

/// Pitch is kept just short of straight up/down so the projection math
/// never degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera position and orientation
#[derive(Clone, Debug, Default)]
pub struct Camera {
    position: Vec3,
    phi: f32,
    theta: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Set yaw and pitch. Pitch is clamped; out-of-range values are not an
    /// error.
    pub fn set_angles(&mut self, phi: f32, theta: f32) {
        self.phi = phi;
        self.theta = theta.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Current (yaw, pitch)
    pub fn angles(&self) -> (f32, f32) {
        (self.phi, self.theta)
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Orient the camera so `target` sits on the center line of sight.
    /// Does not move the camera.
    pub fn look_at(&mut self, target: Vec3) {
        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let dz = target.z - self.position.z;

        let phi = dx.atan2(dz);
        // Positive pitch looks down, so a target below the camera pitches down
        let horizontal = (dx * dx + dz * dz).sqrt();
        let theta = (-dy).atan2(horizontal);

        self.set_angles(phi, theta);
    }
}

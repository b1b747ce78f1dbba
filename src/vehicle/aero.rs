//! Speed-squared drag and downforce.

use glam::Vec3;

use crate::config::AerodynamicsConfig;
use crate::provider::{BodyHandle, PhysicsProvider};

/// Speed (m/s) below which aerodynamic forces are ignored.
const MIN_AERO_SPEED: f32 = 1.0;

pub struct Aerodynamics;

impl Aerodynamics {
    /// Combined drag and downforce in world space (N).
    pub fn force(config: &AerodynamicsConfig, velocity: Vec3, up: Vec3) -> Vec3 {
        let speed_sq = velocity.length_squared();
        if speed_sq < MIN_AERO_SPEED * MIN_AERO_SPEED {
            return Vec3::ZERO;
        }
        let dynamic_pressure = 0.5 * config.frontal_area * config.air_density * speed_sq;
        let drag = -velocity.normalize_or_zero() * (config.drag_coefficient * dynamic_pressure);
        let downforce = -up * (config.downforce_coefficient * dynamic_pressure);
        drag + downforce
    }

    /// Applies [`Aerodynamics::force`] as one impulse through the chassis centre.
    pub fn apply<P: PhysicsProvider + ?Sized>(
        provider: &mut P,
        body: BodyHandle,
        config: &AerodynamicsConfig,
        velocity: Vec3,
        up: Vec3,
        dt: f32,
    ) {
        let force = Self::force(config, velocity, up);
        if force != Vec3::ZERO {
            provider.apply_impulse(body, force * dt);
        }
    }
}

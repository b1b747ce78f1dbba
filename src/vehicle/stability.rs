//! Arcade stability assists layered on top of the force model.

use glam::Vec3;

use crate::config::StabilityConfig;

/// Chassis motion handed to a stability assist each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityContext {
    pub up: Vec3,
    pub forward: Vec3,
    pub angular_velocity: Vec3,
    pub dt: f32,
}

/// A corrective torque source that can be swapped out or removed without
/// touching suspension or tire code.
pub trait StabilityAssist: Send + Sync {
    fn name(&self) -> &str;

    /// Torque impulse (N·m·s) to apply to the chassis this tick.
    fn torque_impulse(&self, ctx: &StabilityContext) -> Vec3;
}

/// Anti-flip plus barrel-roll damping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcadeStabilizer {
    tilt_threshold: f32,
    anti_flip_strength: f32,
    roll_rate_threshold: f32,
    roll_damping: f32,
}

impl ArcadeStabilizer {
    pub fn new(config: &StabilityConfig) -> Self {
        Self {
            tilt_threshold: config.tilt_threshold,
            anti_flip_strength: config.anti_flip_strength,
            roll_rate_threshold: config.roll_rate_threshold,
            roll_damping: config.roll_damping,
        }
    }

    /// Rotates the chassis up axis back toward world up, harder the further
    /// it has tipped.
    pub fn anti_flip(&self, ctx: &StabilityContext) -> Vec3 {
        let tilt = ctx.up.dot(Vec3::Y).clamp(-1.0, 1.0);
        if tilt >= self.tilt_threshold {
            return Vec3::ZERO;
        }
        // Fully inverted has no unique axis; roll about forward.
        let axis = ctx
            .up
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or(ctx.forward);
        axis * (self.anti_flip_strength * tilt.acos() * ctx.dt)
    }

    pub fn roll_damping(&self, ctx: &StabilityContext) -> Vec3 {
        let roll_rate = ctx.angular_velocity.dot(ctx.forward);
        if roll_rate.abs() <= self.roll_rate_threshold {
            return Vec3::ZERO;
        }
        -ctx.forward * (roll_rate * self.roll_damping * ctx.dt)
    }
}

impl StabilityAssist for ArcadeStabilizer {
    fn name(&self) -> &str {
        "arcade"
    }

    fn torque_impulse(&self, ctx: &StabilityContext) -> Vec3 {
        self.anti_flip(ctx) + self.roll_damping(ctx)
    }
}

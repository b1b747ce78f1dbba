//! Spring-damper struts and the optional axle anti-roll bars.

use super::{scratch::TickScratch, state::WheelState};
use crate::config::{AntiRollConfig, WheelConfig};
use crate::provider::{BodyHandle, PhysicsProvider};

/// Compression below which the anti-roll bar stays inactive.
const ANTI_ROLL_EPSILON: f32 = 1e-3;

pub struct Suspension;

impl Suspension {
    /// Strut force in N for a grounded wheel. Never negative: the strut
    /// can push the chassis away from the ground but never pull it down.
    pub fn strut_force(config: &WheelConfig, length: f32, previous_length: f32, dt: f32) -> f32 {
        let compression = config.rest_length - length;
        let compression_velocity = if dt > 0.0 {
            (length - previous_length) / dt
        } else {
            0.0
        };
        let spring = config.stiffness * compression;
        let damper = config.damping * config.stiffness * compression_velocity;
        (spring - damper).max(0.0)
    }

    /// Computes and applies strut impulses for all grounded wheels.
    pub fn apply<P: PhysicsProvider + ?Sized>(
        provider: &mut P,
        body: BodyHandle,
        configs: &[WheelConfig; 4],
        wheels: &mut [WheelState; 4],
        scratch: &mut TickScratch,
        dt: f32,
    ) {
        for (index, (config, wheel)) in configs.iter().zip(wheels.iter_mut()).enumerate() {
            if !wheel.is_grounded {
                wheel.suspension_force = 0.0;
                wheel.suspension_compression = 0.0;
                scratch.compression_ratio[index] = 0.0;
                wheel.previous_suspension_length = wheel.suspension_length;
                continue;
            }

            // A wheel that just landed has no meaningful previous length.
            let previous = if scratch.was_grounded[index] {
                wheel.previous_suspension_length
            } else {
                wheel.suspension_length
            };

            let force = Self::strut_force(config, wheel.suspension_length, previous, dt);
            wheel.suspension_force = force;
            wheel.suspension_compression = config.rest_length - wheel.suspension_length;
            scratch.compression_ratio[index] = if config.max_travel > 0.0 {
                (wheel.suspension_compression / config.max_travel).clamp(0.0, 1.0)
            } else {
                0.0
            };
            wheel.previous_suspension_length = wheel.suspension_length;

            if force > 0.0 {
                provider.apply_impulse_at_point(
                    body,
                    wheel.contact_normal * (force * dt),
                    wheel.contact_point,
                );
            }
        }
    }
}

/// Couples the left and right struts of each axle to resist body roll.
#[derive(Debug, Clone, Copy)]
pub struct AntiRollBar {
    config: AntiRollConfig,
}

impl AntiRollBar {
    pub fn new(config: AntiRollConfig) -> Self {
        Self { config }
    }

    /// Corrective force (N) pushing up on the left wheel; the right wheel
    /// receives the opposite.
    pub fn axle_force(stiffness: f32, left_ratio: f32, right_ratio: f32) -> f32 {
        let difference = left_ratio - right_ratio;
        if difference.abs() <= ANTI_ROLL_EPSILON {
            return 0.0;
        }
        difference * stiffness
    }

    /// Applies equal and opposite impulses at the strut mounts of each axle.
    /// Strut bookkeeping (`suspension_force`) is left untouched.
    pub fn apply<P: PhysicsProvider + ?Sized>(
        &self,
        provider: &mut P,
        body: BodyHandle,
        up: glam::Vec3,
        scratch: &TickScratch,
        dt: f32,
    ) {
        let axles = [
            (0usize, 1usize, self.config.front_stiffness),
            (2, 3, self.config.rear_stiffness),
        ];
        for (left, right, stiffness) in axles {
            let force = Self::axle_force(
                stiffness,
                scratch.compression_ratio[left],
                scratch.compression_ratio[right],
            );
            if force == 0.0 {
                continue;
            }
            let impulse = up * (force * dt);
            provider.apply_impulse_at_point(body, impulse, scratch.mount_points[left]);
            provider.apply_impulse_at_point(body, -impulse, scratch.mount_points[right]);
        }
    }
}

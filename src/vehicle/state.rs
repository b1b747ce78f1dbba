//! Runtime state shared between the vehicle pipeline stages.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::WheelConfig;
use crate::provider::SurfaceType;
use crate::utils::math::sanitize;

/// Per-wheel runtime state, rewritten every tick.
///
/// Forces are exactly zero whenever `is_grounded` is false.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    pub is_grounded: bool,
    pub suspension_length: f32,
    pub previous_suspension_length: f32,
    /// `rest_length - suspension_length`, zero when airborne.
    pub suspension_compression: f32,
    pub contact_point: Vec3,
    pub contact_normal: Vec3,
    pub surface: SurfaceType,
    /// Road-wheel angle in radians.
    pub steering_angle: f32,
    /// Visual spin angle in `[0, 2π)`.
    pub rotation_angle: f32,
    /// Spin rate in rad/s.
    pub angular_velocity: f32,
    pub slip_ratio: f32,
    pub slip_angle: f32,
    pub suspension_force: f32,
    pub longitudinal_force: f32,
    pub lateral_force: f32,
    pub tire_force: Vec3,
}

impl WheelState {
    pub fn at_rest(config: &WheelConfig) -> Self {
        Self {
            is_grounded: false,
            suspension_length: config.rest_length,
            previous_suspension_length: config.rest_length,
            suspension_compression: 0.0,
            contact_point: Vec3::ZERO,
            contact_normal: Vec3::Y,
            surface: SurfaceType::Tarmac,
            steering_angle: 0.0,
            rotation_angle: 0.0,
            angular_velocity: 0.0,
            slip_ratio: 0.0,
            slip_angle: 0.0,
            suspension_force: 0.0,
            longitudinal_force: 0.0,
            lateral_force: 0.0,
            tire_force: Vec3::ZERO,
        }
    }

    /// Zeroes every force and slip quantity; used whenever the wheel leaves the ground.
    pub fn clear_forces(&mut self) {
        self.suspension_compression = 0.0;
        self.slip_ratio = 0.0;
        self.slip_angle = 0.0;
        self.suspension_force = 0.0;
        self.longitudinal_force = 0.0;
        self.lateral_force = 0.0;
        self.tire_force = Vec3::ZERO;
    }
}

/// Driver controls, always within range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleInput {
    throttle: f32,
    brake: f32,
    steering: f32,
    handbrake: f32,
}

impl VehicleInput {
    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn brake(&self) -> f32 {
        self.brake
    }

    pub fn steering(&self) -> f32 {
        self.steering
    }

    pub fn handbrake(&self) -> f32 {
        self.handbrake
    }

    pub fn set_throttle(&mut self, value: f32) {
        self.throttle = sanitize(value, 0.0, 1.0, 0.0);
    }

    pub fn set_brake(&mut self, value: f32) {
        self.brake = sanitize(value, 0.0, 1.0, 0.0);
    }

    pub fn set_steering(&mut self, value: f32) {
        self.steering = sanitize(value, -1.0, 1.0, 0.0);
    }

    pub fn set_handbrake(&mut self, value: f32) {
        self.handbrake = sanitize(value, 0.0, 1.0, 0.0);
    }

    /// Applies the provided fields, leaving the others untouched.
    pub fn apply(&mut self, update: InputUpdate) {
        if let Some(throttle) = update.throttle {
            self.set_throttle(throttle);
        }
        if let Some(brake) = update.brake {
            self.set_brake(brake);
        }
        if let Some(steering) = update.steering {
            self.set_steering(steering);
        }
        if let Some(handbrake) = update.handbrake {
            self.set_handbrake(handbrake);
        }
    }
}

/// Partial input update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputUpdate {
    pub throttle: Option<f32>,
    pub brake: Option<f32>,
    pub steering: Option<f32>,
    pub handbrake: Option<f32>,
}

impl InputUpdate {
    pub fn throttle(value: f32) -> Self {
        Self {
            throttle: Some(value),
            ..Self::default()
        }
    }

    pub fn steering(value: f32) -> Self {
        Self {
            steering: Some(value),
            ..Self::default()
        }
    }

    pub fn brake(value: f32) -> Self {
        Self {
            brake: Some(value),
            ..Self::default()
        }
    }
}

/// Chassis pose and motion sampled from the provider.
///
/// Pose and basis vectors are read at the start of a tick; velocities are the
/// clamped values the chassis leaves the tick with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Default for VehicleTransform {
    fn default() -> Self {
        Self::from_pose(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl VehicleTransform {
    pub fn from_pose(position: Vec3, rotation: Quat) -> Self {
        let mut transform = Self {
            position,
            rotation,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        transform.set_pose(position, rotation);
        transform
    }

    pub fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
        self.forward = rotation * Vec3::Z;
        self.right = rotation * Vec3::X;
        self.up = rotation * Vec3::Y;
    }

    /// Chassis-space point to world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    pub fn speed(&self) -> f32 {
        self.linear_velocity.length()
    }

    /// Signed speed along the chassis forward axis.
    pub fn forward_speed(&self) -> f32 {
        self.linear_velocity.dot(self.forward)
    }
}

/// HUD-facing snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// m/s
    pub speed: f32,
    pub speed_kmh: f32,
    pub speed_mph: f32,
    pub rpm: f32,
    pub gear: u8,
    pub is_shifting: bool,
    pub is_airborne: bool,
    pub wheels_on_ground: u8,
    pub g_force: f32,
    /// 0–100
    pub damage_percent: f32,
}

/// Kinematic playback frame recorded by an external replay system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub position: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub wheel_spin: [f32; 4],
}

//! Vehicle configuration and global tuning constants for Redline.
//!
//! A [`VehicleConfig`] is supplied once when a vehicle is built and is never
//! mutated afterwards. Every constructor path goes through
//! [`VehicleConfig::validate`], so a [`crate::Vehicle`] can only exist with a
//! consistent configuration.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VehicleError};
use crate::provider::SurfaceType;

/// Default gravity vector (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Standard gravity magnitude used for g-force telemetry.
pub const STANDARD_GRAVITY: f32 = 9.81;

/// Canonical fixed physics step (60 Hz).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Hard cap on chassis linear speed (m/s), enforced after every tick.
pub const MAX_LINEAR_VELOCITY: f32 = 70.0;

/// Hard cap on chassis angular speed (rad/s), enforced after every tick.
pub const MAX_ANGULAR_VELOCITY: f32 = 10.0;

/// Per-`update` wall-clock budget in milliseconds.
pub const FRAME_BUDGET_MS: f32 = 2.0;

/// Converts the dimensionless tire stiffness into N per m/s of lateral slip.
pub const LATERAL_STIFFNESS_SCALE: f32 = 500.0;

/// Speed (m/s) used to normalise speed-sensitive steering.
pub const STEERING_REFERENCE_SPEED: f32 = 50.0;

/// Smallest fraction of steering authority left at high speed.
pub const MIN_STEERING_AUTHORITY: f32 = 0.3;

/// Linear damping handed to the provider for the chassis body.
pub const CHASSIS_LINEAR_DAMPING: f32 = 0.0;

/// Angular damping handed to the provider for the chassis body.
pub const CHASSIS_ANGULAR_DAMPING: f32 = 0.1;

/// Static description of one wheel and its suspension strut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Strut mount point in chassis space.
    pub position: Vec3,
    pub radius: f32,
    pub steerable: bool,
    pub powered: bool,
    pub rest_length: f32,
    pub max_travel: f32,
    /// Spring rate in N/m.
    pub stiffness: f32,
    /// Damper rate expressed as a fraction of `stiffness` (N·s/m per N/m).
    pub damping: f32,
    /// Maximum steering lock in radians. Ignored when `steerable` is false.
    pub max_steering_angle: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: 0.35,
            steerable: false,
            powered: false,
            rest_length: 0.45,
            max_travel: 0.35,
            stiffness: 35_000.0,
            damping: 0.1,
            max_steering_angle: 0.6,
        }
    }
}

impl WheelConfig {
    /// Length of the downward probe used to find the ground.
    pub fn probe_length(&self) -> f32 {
        self.rest_length + self.max_travel
    }

    fn front(x: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, -0.35, z),
            steerable: true,
            ..Self::default()
        }
    }

    fn rear(x: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, -0.35, z),
            powered: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub idle_rpm: f32,
    pub peak_torque_rpm: f32,
    pub max_rpm: f32,
    /// Peak crank torque in N·m.
    pub max_torque: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            idle_rpm: 800.0,
            peak_torque_rpm: 4_500.0,
            max_rpm: 7_000.0,
            max_torque: 400.0,
        }
    }
}

/// Number of forward gears in the automatic gearbox.
pub const GEAR_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionConfig {
    pub gear_ratios: [f32; GEAR_COUNT],
    pub final_drive: f32,
    pub shift_up_rpm: f32,
    pub shift_down_rpm: f32,
    /// Seconds during which drive is interrupted by a gear change.
    pub shift_time: f32,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            gear_ratios: [3.5, 2.2, 1.5, 1.1, 0.85],
            final_drive: 3.7,
            shift_up_rpm: 6_000.0,
            shift_down_rpm: 2_500.0,
            shift_time: 0.25,
        }
    }
}

/// Grip multipliers applied per ground material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceGrip {
    pub tarmac: f32,
    pub gravel: f32,
    pub grass: f32,
    pub dirt: f32,
    pub ice: f32,
}

impl Default for SurfaceGrip {
    fn default() -> Self {
        Self {
            tarmac: 1.0,
            gravel: 0.7,
            grass: 0.55,
            dirt: 0.65,
            ice: 0.25,
        }
    }
}

impl SurfaceGrip {
    pub fn multiplier(&self, surface: SurfaceType) -> f32 {
        match surface {
            SurfaceType::Tarmac => self.tarmac,
            SurfaceType::Gravel => self.gravel,
            SurfaceType::Grass => self.grass,
            SurfaceType::Dirt => self.dirt,
            SurfaceType::Ice => self.ice,
        }
    }

    fn all_positive(&self) -> bool {
        [self.tarmac, self.gravel, self.grass, self.dirt, self.ice]
            .iter()
            .all(|g| *g >= 0.0 && g.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TireConfig {
    /// Per-wheel longitudinal force limit in N.
    pub max_grip_longitudinal: f32,
    /// Per-wheel lateral force limit in N.
    pub max_grip_lateral: f32,
    /// Cornering stiffness, scaled by [`LATERAL_STIFFNESS_SCALE`].
    pub stiffness: f32,
    pub surface_grip: SurfaceGrip,
}

impl Default for TireConfig {
    fn default() -> Self {
        Self {
            max_grip_longitudinal: 6_000.0,
            max_grip_lateral: 6_500.0,
            stiffness: 12.0,
            surface_grip: SurfaceGrip::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Exponential smoothing rate (1/s) of the road-wheel angle.
    pub response_rate: f32,
    /// How quickly steering authority fades with speed.
    pub speed_sensitivity: f32,
    /// 0 disables Ackermann; 1 gives ±10% inner/outer split.
    pub ackermann_factor: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            response_rate: 8.0,
            speed_sensitivity: 0.7,
            ackermann_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AerodynamicsConfig {
    pub drag_coefficient: f32,
    pub downforce_coefficient: f32,
    /// Frontal area in m².
    pub frontal_area: f32,
    /// Air density in kg/m³.
    pub air_density: f32,
}

impl Default for AerodynamicsConfig {
    fn default() -> Self {
        Self {
            // Lumped body and rolling drag; tops out in fifth below the
            // linear velocity cap.
            drag_coefficient: 0.9,
            downforce_coefficient: 0.3,
            frontal_area: 2.2,
            air_density: 1.225,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Impact force thresholds in N: minor, moderate, severe, catastrophic.
    pub thresholds: [f32; 4],
    /// Fraction of performance lost at 100% damage.
    pub degradation_factor: f32,
    /// Seconds a collision stays in the recent-collision window.
    pub history_window: f32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            thresholds: [5_000.0, 15_000.0, 30_000.0, 50_000.0],
            degradation_factor: 0.5,
            history_window: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrakeConfig {
    /// Total service-brake force in N at full pedal.
    pub max_brake_force: f32,
    /// Share of brake force sent to the front axle.
    pub front_bias: f32,
    /// Rear-axle handbrake force in N at full lever.
    pub handbrake_force: f32,
}

impl Default for BrakeConfig {
    fn default() -> Self {
        Self {
            max_brake_force: 16_000.0,
            front_bias: 0.6,
            handbrake_force: 6_000.0,
        }
    }
}

/// Axle anti-roll bar stiffness (N per unit of compression-ratio difference).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiRollConfig {
    pub front_stiffness: f32,
    pub rear_stiffness: f32,
}

impl Default for AntiRollConfig {
    fn default() -> Self {
        Self {
            front_stiffness: 8_000.0,
            rear_stiffness: 5_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub enabled: bool,
    /// Anti-flip engages when `dot(up, world_up)` drops below this.
    pub tilt_threshold: f32,
    /// Corrective torque (N·m) per radian of tilt.
    pub anti_flip_strength: f32,
    /// Roll rate (rad/s) above which roll damping engages.
    pub roll_rate_threshold: f32,
    /// Opposing torque (N·m) per rad/s of roll rate.
    pub roll_damping: f32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tilt_threshold: 0.95,
            anti_flip_strength: 8_000.0,
            roll_rate_threshold: 0.5,
            roll_damping: 3_000.0,
        }
    }
}

/// Where contact normals and surface types come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactReporting {
    /// Always world-up on [`SurfaceType::Tarmac`].
    #[default]
    Fixed,
    /// Use what the provider reports, falling back to the fixed constants.
    Provider,
}

/// Complete, immutable description of a vehicle.
///
/// Wheel order is front-left, front-right, rear-left, rear-right. The chassis
/// faces local +Z with +Y up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Chassis mass in kg.
    pub mass: f32,
    /// Half extents of the chassis box, used for the inertia tensor.
    pub chassis_half_extents: Vec3,
    pub wheels: [WheelConfig; 4],
    pub engine: EngineConfig,
    pub transmission: TransmissionConfig,
    pub tires: TireConfig,
    pub steering: SteeringConfig,
    pub aerodynamics: AerodynamicsConfig,
    pub damage: DamageConfig,
    pub brakes: BrakeConfig,
    pub anti_roll: Option<AntiRollConfig>,
    pub stability: StabilityConfig,
    pub contact_reporting: ContactReporting,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self::arcade_rwd()
    }
}

impl VehicleConfig {
    /// Balanced rear-wheel-drive arcade car.
    pub fn arcade_rwd() -> Self {
        Self {
            mass: 1_200.0,
            chassis_half_extents: Vec3::new(0.9, 0.5, 2.2),
            wheels: [
                WheelConfig::front(-0.8, 1.3),
                WheelConfig::front(0.8, 1.3),
                WheelConfig::rear(-0.8, -1.3),
                WheelConfig::rear(0.8, -1.3),
            ],
            engine: EngineConfig::default(),
            transmission: TransmissionConfig::default(),
            tires: TireConfig::default(),
            steering: SteeringConfig::default(),
            aerodynamics: AerodynamicsConfig::default(),
            damage: DamageConfig::default(),
            brakes: BrakeConfig::default(),
            anti_roll: Some(AntiRollConfig::default()),
            stability: StabilityConfig::default(),
            contact_reporting: ContactReporting::Fixed,
        }
    }

    /// Light front-wheel-drive hatchback with a softer engine.
    pub fn hatchback_fwd() -> Self {
        let mut config = Self::arcade_rwd();
        config.mass = 1_000.0;
        config.chassis_half_extents = Vec3::new(0.85, 0.55, 1.9);
        for (index, wheel) in config.wheels.iter_mut().enumerate() {
            let front = index < 2;
            wheel.powered = front;
            wheel.position.z = if front { 1.15 } else { -1.15 };
            wheel.stiffness = 30_000.0;
            wheel.radius = 0.32;
        }
        config.engine.max_torque = 260.0;
        config.engine.peak_torque_rpm = 4_000.0;
        config.engine.max_rpm = 6_500.0;
        config.transmission.shift_up_rpm = 5_800.0;
        config.tires.max_grip_longitudinal = 5_000.0;
        config.tires.max_grip_lateral = 5_400.0;
        config.aerodynamics.drag_coefficient = 0.8;
        config.aerodynamics.downforce_coefficient = 0.1;
        config.aerodynamics.frontal_area = 2.0;
        config
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_anti_roll(mut self, anti_roll: Option<AntiRollConfig>) -> Self {
        self.anti_roll = anti_roll;
        self
    }

    pub fn with_contact_reporting(mut self, reporting: ContactReporting) -> Self {
        self.contact_reporting = reporting;
        self
    }

    pub fn with_stability_enabled(mut self, enabled: bool) -> Self {
        self.stability.enabled = enabled;
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn powered_wheel_count(&self) -> usize {
        self.wheels.iter().filter(|w| w.powered).count()
    }

    /// Mean radius of the powered wheels.
    pub fn drive_wheel_radius(&self) -> f32 {
        let (sum, count) = self
            .wheels
            .iter()
            .filter(|w| w.powered)
            .fold((0.0, 0usize), |(sum, count), w| (sum + w.radius, count + 1));
        if count == 0 {
            return 0.0;
        }
        sum / count as f32
    }

    /// Chassis height above flat ground at which the springs carry the
    /// static weight, for spawning a car that does not bounce.
    pub fn ride_height(&self) -> f32 {
        let load = self.mass * STANDARD_GRAVITY / 4.0;
        let total: f32 = self
            .wheels
            .iter()
            .map(|w| w.rest_length - load / w.stiffness - w.position.y)
            .sum();
        total / 4.0
    }

    /// Checks every construction-time invariant.
    pub fn validate(&self) -> Result<()> {
        fn positive(value: f32) -> bool {
            value > 0.0 && value.is_finite()
        }
        fn non_negative(value: f32) -> bool {
            value >= 0.0 && value.is_finite()
        }
        let invalid = |msg: String| -> Result<()> { Err(VehicleError::InvalidConfig(msg)) };

        if !positive(self.mass) {
            return invalid(format!("mass must be positive, got {}", self.mass));
        }
        if !self.chassis_half_extents.is_finite() || self.chassis_half_extents.min_element() <= 0.0
        {
            return invalid("chassis half extents must be positive".into());
        }

        for (index, wheel) in self.wheels.iter().enumerate() {
            if !wheel.position.is_finite() {
                return invalid(format!("wheel {index} position is not finite"));
            }
            if !positive(wheel.radius) {
                return invalid(format!("wheel {index} radius must be positive"));
            }
            if !positive(wheel.rest_length) {
                return invalid(format!("wheel {index} rest length must be positive"));
            }
            if !non_negative(wheel.max_travel) {
                return invalid(format!("wheel {index} max travel must not be negative"));
            }
            if !positive(wheel.stiffness) {
                return invalid(format!("wheel {index} stiffness must be positive"));
            }
            if !non_negative(wheel.damping) {
                return invalid(format!("wheel {index} damping must not be negative"));
            }
            if !non_negative(wheel.max_steering_angle) {
                return invalid(format!("wheel {index} steering angle must not be negative"));
            }
        }
        if self.powered_wheel_count() == 0 {
            return invalid("at least one wheel must be powered".into());
        }

        let engine = &self.engine;
        if !positive(engine.idle_rpm)
            || !(engine.idle_rpm < engine.peak_torque_rpm && engine.peak_torque_rpm <= engine.max_rpm)
        {
            return invalid(format!(
                "engine rpm must satisfy 0 < idle < peak <= max, got {}/{}/{}",
                engine.idle_rpm, engine.peak_torque_rpm, engine.max_rpm
            ));
        }
        if !positive(engine.max_torque) {
            return invalid("engine max torque must be positive".into());
        }

        let gearbox = &self.transmission;
        if let Some(gear) = gearbox.gear_ratios.iter().position(|r| !positive(*r)) {
            return invalid(format!("gear {} ratio must be positive", gear + 1));
        }
        if !positive(gearbox.final_drive) {
            return invalid("final drive must be positive".into());
        }
        if !(gearbox.shift_down_rpm < gearbox.shift_up_rpm && gearbox.shift_up_rpm <= engine.max_rpm)
        {
            return invalid("shift points must satisfy down < up <= max rpm".into());
        }
        if !non_negative(gearbox.shift_time) {
            return invalid("shift time must not be negative".into());
        }

        let tires = &self.tires;
        if !positive(tires.max_grip_longitudinal) || !positive(tires.max_grip_lateral) {
            return invalid("tire grip limits must be positive".into());
        }
        if !non_negative(tires.stiffness) || !tires.surface_grip.all_positive() {
            return invalid("tire stiffness and surface grip must not be negative".into());
        }

        let aero = &self.aerodynamics;
        if ![
            aero.drag_coefficient,
            aero.downforce_coefficient,
            aero.frontal_area,
            aero.air_density,
        ]
        .iter()
        .all(|v| non_negative(*v))
        {
            return invalid("aerodynamic coefficients must not be negative".into());
        }

        let damage = &self.damage;
        if !damage.thresholds.iter().all(|t| positive(*t))
            || damage.thresholds.windows(2).any(|pair| pair[0] >= pair[1])
        {
            return invalid("damage thresholds must be positive and strictly ascending".into());
        }
        if !(0.0..=1.0).contains(&damage.degradation_factor) {
            return invalid("damage degradation factor must be within [0, 1]".into());
        }
        if !non_negative(damage.history_window) {
            return invalid("collision history window must not be negative".into());
        }

        let brakes = &self.brakes;
        if !non_negative(brakes.max_brake_force) || !non_negative(brakes.handbrake_force) {
            return invalid("brake forces must not be negative".into());
        }
        if !(0.0..=1.0).contains(&brakes.front_bias) {
            return invalid("brake front bias must be within [0, 1]".into());
        }

        if !positive(self.steering.response_rate) || !non_negative(self.steering.speed_sensitivity)
        {
            return invalid("steering response must be positive".into());
        }

        Ok(())
    }
}

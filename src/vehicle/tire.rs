//! Steering dynamics and the combined-grip tire model.

use glam::{Quat, Vec3};

use super::state::{VehicleInput, VehicleTransform, WheelState};
use crate::config::{
    BrakeConfig, SteeringConfig, TireConfig, WheelConfig, LATERAL_STIFFNESS_SCALE,
    MIN_STEERING_AUTHORITY, STEERING_REFERENCE_SPEED,
};
use crate::provider::{BodyHandle, PhysicsProvider};
use crate::utils::math::exp_smooth;

/// Inputs below this are treated as released.
const PEDAL_DEADZONE: f32 = 0.01;

/// Forward speed (m/s) below which brake force fades out linearly.
const BRAKE_TAPER_SPEED: f32 = 1.0;

/// Longitudinal grip usage beyond which lateral grip stops shrinking.
const MAX_GRIP_USAGE_SQ: f32 = 0.9;

pub struct Steering;

impl Steering {
    /// Steering target before Ackermann; authority fades with speed but
    /// never below [`MIN_STEERING_AUTHORITY`].
    pub fn target_angle(input: f32, max_angle: f32, speed: f32, sensitivity: f32) -> f32 {
        let authority =
            (1.0 - (speed / STEERING_REFERENCE_SPEED) * sensitivity).max(MIN_STEERING_AUTHORITY);
        input * max_angle * authority
    }

    /// The wheel on the inside of the turn steers harder than the outside one.
    /// `lateral_offset` is the wheel's chassis-space X position.
    pub fn ackermann_target(target: f32, lateral_offset: f32, factor: f32) -> f32 {
        if target == 0.0 || lateral_offset == 0.0 {
            return target;
        }
        let inner = lateral_offset.signum() == target.signum();
        let split = factor * 0.1;
        if inner {
            target * (1.0 + split)
        } else {
            target * (1.0 - split)
        }
    }

    /// Moves each steerable wheel's angle toward its Ackermann-adjusted target.
    pub fn update(
        configs: &[WheelConfig; 4],
        wheels: &mut [WheelState; 4],
        steering: &SteeringConfig,
        input: f32,
        speed: f32,
        dt: f32,
    ) {
        for (config, wheel) in configs.iter().zip(wheels.iter_mut()) {
            if !config.steerable {
                wheel.steering_angle = 0.0;
                continue;
            }
            let target = Self::target_angle(
                input,
                config.max_steering_angle,
                speed,
                steering.speed_sensitivity,
            );
            let target = Self::ackermann_target(target, config.position.x, steering.ackermann_factor);
            wheel.steering_angle =
                exp_smooth(wheel.steering_angle, target, steering.response_rate, dt);
        }
    }
}

/// Per-wheel forces before they are turned into an impulse.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TireForce {
    pub longitudinal: f32,
    pub lateral: f32,
    pub slip_ratio: f32,
    pub slip_angle: f32,
}

/// What one wheel contributes to the longitudinal balance this tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongitudinalDemand {
    /// Drive force routed to this wheel (N), zero for unpowered wheels.
    pub drive: f32,
    /// Magnitude of brake force requested for this wheel (N).
    pub brake: f32,
}

pub struct TireModel;

impl TireModel {
    pub fn slip_ratio(wheel_surface_speed: f32, forward_velocity: f32) -> f32 {
        if wheel_surface_speed.abs() > 0.1 {
            (wheel_surface_speed - forward_velocity) / wheel_surface_speed.abs()
        } else {
            0.0
        }
    }

    pub fn slip_angle(lateral_velocity: f32, forward_velocity: f32) -> f32 {
        lateral_velocity.atan2(forward_velocity.abs() + 0.1)
    }

    /// Brake force per wheel before sign and taper: service brakes split by
    /// bias, handbrake on the rear axle only.
    pub fn brake_demand(brakes: &BrakeConfig, input: &VehicleInput, front: bool) -> f32 {
        let bias = if front {
            brakes.front_bias
        } else {
            1.0 - brakes.front_bias
        };
        let mut force = brakes.max_brake_force * input.brake() * bias;
        if !front {
            force += brakes.handbrake_force * input.handbrake();
        }
        force
    }

    /// Radius of the grip circle for one wheel.
    pub fn grip_limit(tires: &TireConfig, surface_grip: f32, damage_multiplier: f32) -> f32 {
        tires.max_grip_longitudinal.max(tires.max_grip_lateral) * surface_grip * damage_multiplier
    }

    /// Longitudinal and lateral force for a grounded wheel.
    pub fn compute(
        tires: &TireConfig,
        demand: LongitudinalDemand,
        forward_velocity: f32,
        lateral_velocity: f32,
        wheel_surface_speed: f32,
        surface_grip: f32,
        damage_multiplier: f32,
    ) -> TireForce {
        let grip_scale = surface_grip * damage_multiplier;
        let max_longitudinal = tires.max_grip_longitudinal * grip_scale;
        let max_lateral = tires.max_grip_lateral * grip_scale;

        let mut longitudinal = demand.drive * grip_scale;
        if demand.brake > 0.0 {
            let taper = (forward_velocity.abs() / BRAKE_TAPER_SPEED).min(1.0);
            longitudinal -= demand.brake * taper * forward_velocity.signum();
        }
        let mut longitudinal = longitudinal.clamp(-max_longitudinal, max_longitudinal);

        let usage = if max_longitudinal > f32::EPSILON {
            longitudinal.abs() / max_longitudinal
        } else {
            0.0
        };
        let available_lateral = max_lateral * (1.0 - (usage * usage).min(MAX_GRIP_USAGE_SQ)).sqrt();
        let raw_lateral = -lateral_velocity * tires.stiffness * LATERAL_STIFFNESS_SCALE;
        let mut lateral = raw_lateral.clamp(-available_lateral, available_lateral);

        // The usage cap above leaves a little lateral grip even at full
        // longitudinal load; project back onto the circle when that overflows.
        let limit = Self::grip_limit(tires, surface_grip, damage_multiplier);
        let magnitude = (longitudinal * longitudinal + lateral * lateral).sqrt();
        if magnitude > limit && magnitude > 0.0 {
            let scale = limit / magnitude;
            longitudinal *= scale;
            lateral *= scale;
        }

        TireForce {
            longitudinal,
            lateral,
            slip_ratio: Self::slip_ratio(wheel_surface_speed, forward_velocity),
            slip_angle: Self::slip_angle(lateral_velocity, forward_velocity),
        }
    }

    /// Computes tire forces for every grounded wheel and applies them at the
    /// contact points. `drive_force` is the total engine force at the wheels.
    #[allow(clippy::too_many_arguments)]
    pub fn apply<P: PhysicsProvider + ?Sized>(
        provider: &mut P,
        body: BodyHandle,
        transform: &VehicleTransform,
        configs: &[WheelConfig; 4],
        tires: &TireConfig,
        brakes: &BrakeConfig,
        wheels: &mut [WheelState; 4],
        input: &VehicleInput,
        drive_force: f32,
        damage_multiplier: f32,
        dt: f32,
    ) {
        let powered_count = configs.iter().filter(|c| c.powered).count().max(1);
        let drive_share = if input.throttle() > PEDAL_DEADZONE {
            drive_force / powered_count as f32
        } else {
            0.0
        };
        let braking = input.brake() > PEDAL_DEADZONE || input.handbrake() > PEDAL_DEADZONE;

        for (index, (config, wheel)) in configs.iter().zip(wheels.iter_mut()).enumerate() {
            if !wheel.is_grounded {
                wheel.clear_forces();
                continue;
            }

            let lever = wheel.contact_point - transform.position;
            let point_velocity = transform.linear_velocity + transform.angular_velocity.cross(lever);
            let steer = Quat::from_axis_angle(transform.up, wheel.steering_angle);
            let wheel_forward = steer * transform.forward;
            let wheel_right = wheel.contact_normal.cross(wheel_forward).normalize_or_zero();

            let forward_velocity = point_velocity.dot(wheel_forward);
            let lateral_velocity = point_velocity.dot(wheel_right);

            let demand = LongitudinalDemand {
                drive: if config.powered { drive_share } else { 0.0 },
                brake: if braking {
                    Self::brake_demand(brakes, input, index < 2)
                } else {
                    0.0
                },
            };
            let surface_grip = tires.surface_grip.multiplier(wheel.surface);
            let force = Self::compute(
                tires,
                demand,
                forward_velocity,
                lateral_velocity,
                wheel.angular_velocity * config.radius,
                surface_grip,
                damage_multiplier,
            );

            wheel.slip_ratio = force.slip_ratio;
            wheel.slip_angle = force.slip_angle;
            wheel.longitudinal_force = force.longitudinal;
            wheel.lateral_force = force.lateral;
            wheel.tire_force = wheel_forward * force.longitudinal + wheel_right * force.lateral;

            if wheel.tire_force != Vec3::ZERO {
                provider.apply_impulse_at_point(body, wheel.tire_force * dt, wheel.contact_point);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn steering_authority_fades_with_speed_but_keeps_floor() {
        let standing = Steering::target_angle(1.0, 0.6, 0.0, 0.7);
        let fast = Steering::target_angle(1.0, 0.6, 40.0, 0.7);
        let flat_out = Steering::target_angle(1.0, 0.6, 500.0, 0.7);
        assert_relative_eq!(standing, 0.6);
        assert!(fast < standing);
        assert_relative_eq!(flat_out, 0.6 * MIN_STEERING_AUTHORITY, epsilon = 1e-6);
    }

    #[test]
    fn ackermann_turns_inner_wheel_harder() {
        let inner_right = Steering::ackermann_target(0.5, 0.8, 1.0);
        let outer_left = Steering::ackermann_target(0.5, -0.8, 1.0);
        assert_relative_eq!(inner_right, 0.55, epsilon = 1e-6);
        assert_relative_eq!(outer_left, 0.45, epsilon = 1e-6);

        let inner_left = Steering::ackermann_target(-0.5, -0.8, 1.0);
        assert_relative_eq!(inner_left, -0.55, epsilon = 1e-6);
        assert_eq!(Steering::ackermann_target(0.0, 0.8, 1.0), 0.0);
    }

    #[test]
    fn slip_defaults_to_zero_near_standstill() {
        assert_eq!(TireModel::slip_ratio(0.05, 3.0), 0.0);
        assert_relative_eq!(TireModel::slip_ratio(10.0, 8.0), 0.2, epsilon = 1e-6);
        assert_eq!(TireModel::slip_angle(0.0, 0.0), 0.0);
    }

    #[test]
    fn lateral_force_resists_slide() {
        let tires = TireConfig::default();
        let force = TireModel::compute(&tires, LongitudinalDemand::default(), 10.0, 0.5, 28.0, 1.0, 1.0);
        assert!(force.lateral < 0.0);
        assert_eq!(force.longitudinal, 0.0);
    }

    #[test]
    fn braking_opposes_motion_and_tapers_at_rest() {
        let tires = TireConfig::default();
        let demand = LongitudinalDemand {
            drive: 0.0,
            brake: 3_000.0,
        };
        let rolling = TireModel::compute(&tires, demand, 12.0, 0.0, 34.0, 1.0, 1.0);
        let reversing = TireModel::compute(&tires, demand, -12.0, 0.0, 34.0, 1.0, 1.0);
        let stopped = TireModel::compute(&tires, demand, 0.0, 0.0, 0.0, 1.0, 1.0);
        assert_relative_eq!(rolling.longitudinal, -3_000.0);
        assert_relative_eq!(reversing.longitudinal, 3_000.0);
        assert_eq!(stopped.longitudinal, 0.0);
    }

    #[test]
    fn grip_circle_holds_under_combined_load() {
        let tires = TireConfig::default();
        for &drive in &[0.0, 2_000.0, 5_900.0, 9_000.0, 20_000.0] {
            for &lateral_velocity in &[-8.0, -1.0, 0.0, 0.3, 4.0, 25.0] {
                for &(surface, damage) in &[(1.0, 1.0), (0.55, 1.0), (1.0, 0.6), (0.25, 0.5)] {
                    let demand = LongitudinalDemand { drive, brake: 0.0 };
                    let force = TireModel::compute(
                        &tires,
                        demand,
                        20.0,
                        lateral_velocity,
                        57.0,
                        surface,
                        damage,
                    );
                    let magnitude = force.longitudinal.hypot(force.lateral);
                    let limit = TireModel::grip_limit(&tires, surface, damage);
                    assert!(
                        magnitude <= limit * (1.0 + 1e-5),
                        "{magnitude} > {limit} (drive {drive}, lat {lateral_velocity})"
                    );
                }
            }
        }
    }

    #[test]
    fn saturated_drive_leaves_less_lateral_grip() {
        let tires = TireConfig::default();
        let coasting = TireModel::compute(&tires, LongitudinalDemand::default(), 20.0, 5.0, 57.0, 1.0, 1.0);
        let flooring = TireModel::compute(
            &tires,
            LongitudinalDemand {
                drive: 5_000.0,
                brake: 0.0,
            },
            20.0,
            5.0,
            57.0,
            1.0,
            1.0,
        );
        assert!(flooring.lateral.abs() < coasting.lateral.abs());
    }

    #[test]
    fn brake_split_follows_bias_and_handbrake_hits_rear_only() {
        let brakes = BrakeConfig::default();
        let mut input = VehicleInput::default();
        input.set_brake(1.0);
        let front = TireModel::brake_demand(&brakes, &input, true);
        let rear = TireModel::brake_demand(&brakes, &input, false);
        assert_relative_eq!(front, brakes.max_brake_force * brakes.front_bias, epsilon = 1e-3);
        assert_relative_eq!(
            rear,
            brakes.max_brake_force * (1.0 - brakes.front_bias),
            epsilon = 1e-3
        );

        let mut input = VehicleInput::default();
        input.set_handbrake(1.0);
        assert_eq!(TireModel::brake_demand(&brakes, &input, true), 0.0);
        assert_relative_eq!(
            TireModel::brake_demand(&brakes, &input, false),
            brakes.handbrake_force
        );
    }
}

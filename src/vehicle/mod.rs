//! The raycast vehicle and its fixed per-tick pipeline.

pub mod aero;
pub mod contact;
pub mod damage;
pub mod powertrain;
pub mod scratch;
pub mod state;
pub mod stability;
pub mod suspension;
pub mod tire;

use glam::{Quat, Vec3};
use log::{info, warn};

use crate::config::{
    VehicleConfig, CHASSIS_ANGULAR_DAMPING, CHASSIS_LINEAR_DAMPING, FRAME_BUDGET_MS,
    MAX_ANGULAR_VELOCITY, MAX_LINEAR_VELOCITY, STANDARD_GRAVITY,
};
use crate::error::Result;
use crate::provider::{BodyDesc, BodyHandle, PhysicsProvider};
use crate::utils::logging::ScopedTimer;
use crate::utils::math::{clamp_length, wrap_angle};

use aero::Aerodynamics;
use contact::GroundContactResolver;
use damage::{CollisionEvent, DamageModel, DamageSeverity, DamageState, RESET_RECOVERY};
use powertrain::{GearState, Powertrain};
use scratch::TickScratch;
use stability::{ArcadeStabilizer, StabilityAssist, StabilityContext};
use state::{InputUpdate, ReplayFrame, Telemetry, VehicleInput, VehicleTransform, WheelState};
use suspension::{AntiRollBar, Suspension};
use tire::{Steering, TireModel};

const MS_TO_KMH: f32 = 3.6;
const MS_TO_MPH: f32 = 2.236_936;

/// A single raycast vehicle.
///
/// The vehicle owns its runtime state but not the rigid body backing it: the
/// body lives in a [`PhysicsProvider`] passed to every call that touches it.
/// A vehicle does nothing until [`Vehicle::spawn`] has created that body.
pub struct Vehicle {
    config: VehicleConfig,
    body: Option<BodyHandle>,
    input: VehicleInput,
    transform: VehicleTransform,
    wheels: [WheelState; 4],
    powertrain: Powertrain,
    damage: DamageModel,
    stability: Option<Box<dyn StabilityAssist>>,
    anti_roll: Option<AntiRollBar>,
    scratch: TickScratch,
    previous_velocity: Vec3,
    g_force: f32,
    sim_time: f32,
}

impl Vehicle {
    /// Validates `config` and builds an unspawned vehicle.
    pub fn new(config: VehicleConfig) -> Result<Self> {
        config.validate()?;

        let wheels = config.wheels.map(|wheel| WheelState::at_rest(&wheel));
        let stability: Option<Box<dyn StabilityAssist>> = if config.stability.enabled {
            Some(Box::new(ArcadeStabilizer::new(&config.stability)))
        } else {
            None
        };

        Ok(Self {
            input: VehicleInput::default(),
            transform: VehicleTransform::default(),
            wheels,
            powertrain: Powertrain::new(&config.engine),
            damage: DamageModel::new(config.damage),
            stability,
            anti_roll: config.anti_roll.map(AntiRollBar::new),
            scratch: TickScratch::default(),
            previous_velocity: Vec3::ZERO,
            g_force: 0.0,
            sim_time: 0.0,
            body: None,
            config,
        })
    }

    /// Creates the chassis body in `provider` at the given pose.
    ///
    /// Spawning an already spawned vehicle teleports it to the new pose
    /// instead. Damage is left as it is.
    pub fn spawn<P: PhysicsProvider + ?Sized>(
        &mut self,
        provider: &mut P,
        position: Vec3,
        rotation: Quat,
    ) -> BodyHandle {
        if let Some(body) = self.body {
            warn!("vehicle already spawned; teleporting instead");
            if position.is_finite() && rotation.is_finite() {
                self.teleport(provider, body, position, rotation.normalize());
            }
            return body;
        }

        let rotation = rotation.normalize();
        let body = provider.create_body(&BodyDesc {
            position,
            rotation,
            mass: self.config.mass,
            half_extents: self.config.chassis_half_extents,
            linear_damping: CHASSIS_LINEAR_DAMPING,
            angular_damping: CHASSIS_ANGULAR_DAMPING,
        });
        self.body = Some(body);
        self.transform = VehicleTransform::from_pose(position, rotation);
        info!("vehicle spawned at {position}");
        body
    }

    /// Stores the provided input fields, clamped; missing fields are kept.
    pub fn set_input(&mut self, update: InputUpdate) {
        self.input.apply(update);
    }

    /// Runs one fixed step of the vehicle pipeline.
    ///
    /// Drive force for this tick comes from the previous tick's RPM, so the
    /// engine is updated after the tire forces have been applied.
    pub fn update<P: PhysicsProvider + ?Sized>(&mut self, provider: &mut P, dt: f32) {
        let Some(body) = self.body else {
            warn!("vehicle update called before spawn; ignoring");
            return;
        };
        if !(dt > 0.0 && dt.is_finite()) {
            warn!("vehicle update called with invalid dt {dt}; ignoring");
            return;
        }
        let _timer = ScopedTimer::with_budget("vehicle::update", FRAME_BUDGET_MS);

        self.refresh_transform(provider, body);
        self.powertrain.advance_shift(dt);

        let damage_multiplier = self.damage.multiplier();
        let damage_penalty = self.damage.state().performance_penalty;

        {
            let _timer = ScopedTimer::new("vehicle::contact");
            GroundContactResolver::resolve(
                provider,
                body,
                &self.transform,
                &self.config.wheels,
                &mut self.wheels,
                &mut self.scratch,
                self.config.contact_reporting,
            );
        }
        {
            let _timer = ScopedTimer::new("vehicle::suspension");
            Suspension::apply(
                provider,
                body,
                &self.config.wheels,
                &mut self.wheels,
                &mut self.scratch,
                dt,
            );
            if let Some(anti_roll) = &self.anti_roll {
                anti_roll.apply(provider, body, self.transform.up, &self.scratch, dt);
            }
        }

        self.integrate_wheel_spin(dt);

        {
            let _timer = ScopedTimer::new("vehicle::tires");
            Steering::update(
                &self.config.wheels,
                &mut self.wheels,
                &self.config.steering,
                self.input.steering(),
                self.transform.speed(),
                dt,
            );
            let drive_force = self.powertrain.drive_force(
                &self.config.engine,
                &self.config.transmission,
                self.input.throttle(),
                damage_penalty,
                self.config.drive_wheel_radius(),
            );
            TireModel::apply(
                provider,
                body,
                &self.transform,
                &self.config.wheels,
                &self.config.tires,
                &self.config.brakes,
                &mut self.wheels,
                &self.input,
                drive_force,
                damage_multiplier,
                dt,
            );
        }

        Aerodynamics::apply(
            provider,
            body,
            &self.config.aerodynamics,
            self.transform.linear_velocity,
            self.transform.up,
            dt,
        );

        let wheel_speed = self.powered_wheel_speed();
        self.powertrain.update(
            &self.config.engine,
            &self.config.transmission,
            wheel_speed,
            self.input.throttle(),
            dt,
        );

        if let Some(assist) = &self.stability {
            let torque = assist.torque_impulse(&StabilityContext {
                up: self.transform.up,
                forward: self.transform.forward,
                angular_velocity: self.transform.angular_velocity,
                dt,
            });
            if torque != Vec3::ZERO {
                provider.apply_torque_impulse(body, torque);
            }
        }

        self.clamp_velocities(provider, body);

        self.g_force =
            (self.transform.linear_velocity - self.previous_velocity).length() / dt / STANDARD_GRAVITY;
        self.previous_velocity = self.transform.linear_velocity;

        self.sim_time += dt;
        self.damage.prune(self.sim_time);
    }

    /// Teleports the vehicle, zeroes its motion and runtime state and
    /// repairs part of the accumulated damage.
    pub fn reset<P: PhysicsProvider + ?Sized>(
        &mut self,
        provider: &mut P,
        position: Vec3,
        rotation: Quat,
    ) {
        let Some(body) = self.body else {
            warn!("vehicle reset called before spawn; ignoring");
            return;
        };
        if !position.is_finite() || !rotation.is_finite() {
            warn!("vehicle reset called with a non-finite pose; ignoring");
            return;
        }
        self.teleport(provider, body, position, rotation.normalize());
        self.damage.recover(RESET_RECOVERY);
        info!(
            "vehicle reset to {position}, damage {:.0}%",
            self.damage.state().damage_percent()
        );
    }

    /// Moves the body to a new pose at rest and clears every runtime field
    /// except damage.
    fn teleport<P: PhysicsProvider + ?Sized>(
        &mut self,
        provider: &mut P,
        body: BodyHandle,
        position: Vec3,
        rotation: Quat,
    ) {
        provider.set_translation(body, position);
        provider.set_rotation(body, rotation);
        provider.set_linear_velocity(body, Vec3::ZERO);
        provider.set_angular_velocity(body, Vec3::ZERO);

        self.transform = VehicleTransform::from_pose(position, rotation);
        for (wheel, config) in self.wheels.iter_mut().zip(&self.config.wheels) {
            *wheel = WheelState::at_rest(config);
        }
        self.input = VehicleInput::default();
        self.powertrain.reset(&self.config.engine);
        self.scratch.clear();
        self.previous_velocity = Vec3::ZERO;
        self.g_force = 0.0;
    }

    /// Records an external impact and returns the severity stamped onto it.
    pub fn register_collision(&mut self, event: CollisionEvent) -> DamageSeverity {
        self.damage.register(event)
    }

    /// Drives the chassis kinematically from a recorded frame. Bypasses the
    /// force pipeline entirely.
    pub fn apply_replay_frame<P: PhysicsProvider + ?Sized>(
        &mut self,
        provider: &mut P,
        frame: &ReplayFrame,
    ) {
        let Some(body) = self.body else {
            warn!("replay frame applied before spawn; ignoring");
            return;
        };
        let position = Vec3::from_array(frame.position);
        let rotation = Quat::from_array(frame.rotation);
        let Some(rotation) = rotation.is_finite().then(|| rotation.normalize()) else {
            warn!("replay frame carries a non-finite rotation; ignoring");
            return;
        };
        if !position.is_finite() || !rotation.is_normalized() {
            warn!("replay frame carries an invalid pose; ignoring");
            return;
        }

        provider.set_translation(body, position);
        provider.set_rotation(body, rotation);
        provider.set_linear_velocity(body, Vec3::ZERO);
        provider.set_angular_velocity(body, Vec3::ZERO);

        self.transform = VehicleTransform::from_pose(position, rotation);
        for (wheel, spin) in self.wheels.iter_mut().zip(frame.wheel_spin) {
            if spin.is_finite() {
                wheel.rotation_angle = wrap_angle(spin);
            }
        }
        self.previous_velocity = Vec3::ZERO;
    }

    /// Releases the chassis body. The vehicle may be spawned again later.
    pub fn dispose<P: PhysicsProvider + ?Sized>(&mut self, provider: &mut P) {
        if let Some(body) = self.body.take() {
            provider.destroy_body(body);
            info!("vehicle disposed");
        }
    }

    /// Replaces the stability assist; `None` runs the bare force model.
    pub fn set_stability_assist(&mut self, assist: Option<Box<dyn StabilityAssist>>) {
        self.stability = assist;
    }

    pub fn stability_assist(&self) -> Option<&dyn StabilityAssist> {
        self.stability.as_deref()
    }

    pub fn transform(&self) -> &VehicleTransform {
        &self.transform
    }

    pub fn telemetry(&self) -> Telemetry {
        let speed = self.transform.speed();
        let wheels_on_ground = self.wheels.iter().filter(|w| w.is_grounded).count() as u8;
        Telemetry {
            speed,
            speed_kmh: speed * MS_TO_KMH,
            speed_mph: speed * MS_TO_MPH,
            rpm: self.powertrain.rpm(),
            gear: self.powertrain.gear(),
            is_shifting: self.powertrain.is_shifting(),
            is_airborne: wheels_on_ground == 0,
            wheels_on_ground,
            g_force: self.g_force,
            damage_percent: self.damage.state().damage_percent(),
        }
    }

    pub fn wheel_states(&self) -> &[WheelState; 4] {
        &self.wheels
    }

    pub fn damage_state(&self) -> &DamageState {
        self.damage.state()
    }

    pub fn input(&self) -> &VehicleInput {
        &self.input
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn gear_state(&self) -> GearState {
        self.powertrain.gear_state()
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn is_spawned(&self) -> bool {
        self.body.is_some()
    }

    /// Seconds simulated since construction. Collision timestamps use this clock.
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    fn refresh_transform<P: PhysicsProvider + ?Sized>(&mut self, provider: &mut P, body: BodyHandle) {
        let position = provider.translation(body);
        let rotation = provider.rotation(body);
        if position.is_finite() && rotation.is_finite() {
            self.transform.set_pose(position, rotation);
        } else {
            warn!("non-finite chassis pose; restoring last valid pose");
            provider.set_translation(body, self.transform.position);
            provider.set_rotation(body, self.transform.rotation);
        }
        self.transform.linear_velocity = provider.linear_velocity(body);
        self.transform.angular_velocity = provider.angular_velocity(body);
        self.sanitize_velocities(provider, body);
    }

    fn integrate_wheel_spin(&mut self, dt: f32) {
        let forward_speed = self.transform.forward_speed();
        for (wheel, config) in self.wheels.iter_mut().zip(&self.config.wheels) {
            wheel.angular_velocity = forward_speed / config.radius;
            wheel.rotation_angle = wrap_angle(wheel.rotation_angle + wheel.angular_velocity * dt);
        }
    }

    fn powered_wheel_speed(&self) -> f32 {
        let (sum, count) = self
            .wheels
            .iter()
            .zip(&self.config.wheels)
            .filter(|(_, config)| config.powered)
            .fold((0.0, 0u32), |(sum, count), (wheel, _)| {
                (sum + wheel.angular_velocity.abs(), count + 1)
            });
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    /// Caps linear and angular speed after every force of the tick has been
    /// applied. Runs unconditionally.
    fn clamp_velocities<P: PhysicsProvider + ?Sized>(&mut self, provider: &mut P, body: BodyHandle) {
        self.transform.linear_velocity = provider.linear_velocity(body);
        self.transform.angular_velocity = provider.angular_velocity(body);
        self.sanitize_velocities(provider, body);

        if let Some(clamped) = clamp_length(self.transform.linear_velocity, MAX_LINEAR_VELOCITY) {
            self.transform.linear_velocity = clamped;
            provider.set_linear_velocity(body, clamped);
        }
        if let Some(clamped) = clamp_length(self.transform.angular_velocity, MAX_ANGULAR_VELOCITY) {
            self.transform.angular_velocity = clamped;
            provider.set_angular_velocity(body, clamped);
        }
    }

    fn sanitize_velocities<P: PhysicsProvider + ?Sized>(&mut self, provider: &mut P, body: BodyHandle) {
        if !self.transform.linear_velocity.is_finite() {
            warn!("non-finite linear velocity; zeroing");
            self.transform.linear_velocity = Vec3::ZERO;
            provider.set_linear_velocity(body, Vec3::ZERO);
        }
        if !self.transform.angular_velocity.is_finite() {
            warn!("non-finite angular velocity; zeroing");
            self.transform.angular_velocity = Vec3::ZERO;
            provider.set_angular_velocity(body, Vec3::ZERO);
        }
    }
}

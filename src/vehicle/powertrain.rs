//! Torque-curve engine and automatic five-speed gearbox.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, TransmissionConfig, GEAR_COUNT};

const RAD_PER_SEC_TO_RPM: f32 = 60.0 / std::f32::consts::TAU;

/// Throttle below which the gearbox may downshift.
const DOWNSHIFT_THROTTLE: f32 = 0.5;

/// Gearbox state. Drive is only transmitted while `Engaged`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GearState {
    Engaged(u8),
    Shifting { from: u8, to: u8, remaining: f32 },
}

impl GearState {
    /// Gear reported to the driver; the target gear while shifting.
    pub fn gear(&self) -> u8 {
        match *self {
            GearState::Engaged(gear) => gear,
            GearState::Shifting { to, .. } => to,
        }
    }

    pub fn is_shifting(&self) -> bool {
        matches!(self, GearState::Shifting { .. })
    }

    /// The gear currently transmitting drive, if any.
    pub fn engaged_gear(&self) -> Option<u8> {
        match *self {
            GearState::Engaged(gear) => Some(gear),
            GearState::Shifting { .. } => None,
        }
    }
}

/// Engine speed plus gearbox state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Powertrain {
    rpm: f32,
    gear: GearState,
}

impl Powertrain {
    pub fn new(engine: &EngineConfig) -> Self {
        Self {
            rpm: engine.idle_rpm,
            gear: GearState::Engaged(1),
        }
    }

    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    pub fn gear_state(&self) -> GearState {
        self.gear
    }

    pub fn gear(&self) -> u8 {
        self.gear.gear()
    }

    pub fn is_shifting(&self) -> bool {
        self.gear.is_shifting()
    }

    /// Back to idle in first gear.
    pub fn reset(&mut self, engine: &EngineConfig) {
        *self = Self::new(engine);
    }

    /// Relative torque at `rpm`: rising below half the peak-torque speed,
    /// flat around the peak, falling off past 1.5× peak.
    pub fn torque_factor(engine: &EngineConfig, rpm: f32) -> f32 {
        let normalized = rpm / engine.peak_torque_rpm;
        if normalized < 0.5 {
            0.6 + 0.8 * normalized
        } else if normalized > 1.5 {
            (1.4 - 0.3 * normalized).max(0.4)
        } else {
            1.0
        }
    }

    fn ratio(transmission: &TransmissionConfig, gear: u8) -> f32 {
        let index = (gear as usize).clamp(1, GEAR_COUNT) - 1;
        transmission.gear_ratios[index]
    }

    /// Total tractive force at the driven wheels (N). Zero while shifting.
    pub fn drive_force(
        &self,
        engine: &EngineConfig,
        transmission: &TransmissionConfig,
        throttle: f32,
        damage_penalty: f32,
        wheel_radius: f32,
    ) -> f32 {
        let Some(gear) = self.gear.engaged_gear() else {
            return 0.0;
        };
        if wheel_radius <= 0.0 {
            return 0.0;
        }
        let torque = engine.max_torque * Self::torque_factor(engine, self.rpm) * throttle;
        let wheel_torque = torque * Self::ratio(transmission, gear) * transmission.final_drive;
        wheel_torque / wheel_radius * (1.0 - damage_penalty)
    }

    /// Counts down an in-progress shift; engages the target gear when done.
    pub fn advance_shift(&mut self, dt: f32) {
        if let GearState::Shifting { from, to, remaining } = self.gear {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                debug!("gear {from} -> {to} engaged");
                self.gear = GearState::Engaged(to);
            } else {
                self.gear = GearState::Shifting { from, to, remaining };
            }
        }
    }

    /// Blends RPM toward the speed implied by the driven wheels and runs the
    /// automatic shift logic. `wheel_speed` is the mean |ω| of the powered
    /// wheels in rad/s.
    pub fn update(
        &mut self,
        engine: &EngineConfig,
        transmission: &TransmissionConfig,
        wheel_speed: f32,
        throttle: f32,
        dt: f32,
    ) {
        let rate = 5.0 + 10.0 * throttle;
        let blend = (rate * dt).clamp(0.0, 1.0);

        match self.gear {
            GearState::Shifting { .. } => {
                let target = engine.idle_rpm * 1.5;
                self.rpm += (target - self.rpm) * blend;
            }
            GearState::Engaged(gear) => {
                let target = wheel_speed.abs()
                    * Self::ratio(transmission, gear)
                    * transmission.final_drive
                    * RAD_PER_SEC_TO_RPM;
                let target = target.max(engine.idle_rpm);
                self.rpm += (target - self.rpm) * blend;
            }
        }
        self.rpm = self.rpm.clamp(engine.idle_rpm, engine.max_rpm);

        if let GearState::Engaged(gear) = self.gear {
            if self.rpm > transmission.shift_up_rpm && (gear as usize) < GEAR_COUNT {
                self.begin_shift(gear, gear + 1, transmission);
            } else if self.rpm < transmission.shift_down_rpm
                && gear > 1
                && throttle < DOWNSHIFT_THROTTLE
            {
                self.begin_shift(gear, gear - 1, transmission);
            }
        }
    }

    fn begin_shift(&mut self, from: u8, to: u8, transmission: &TransmissionConfig) {
        debug!("shifting {from} -> {to} at {:.0} rpm", self.rpm);
        self.gear = if transmission.shift_time > 0.0 {
            GearState::Shifting {
                from,
                to,
                remaining: transmission.shift_time,
            }
        } else {
            GearState::Engaged(to)
        };
    }
}

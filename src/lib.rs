//! Redline – arcade raycast vehicle dynamics for Rust.
//!
//! A [`Vehicle`] rides on four ray-cast wheels with spring-damper suspension,
//! a combined-grip tire model, a torque-curve engine with an automatic
//! five-speed gearbox, aerodynamic drag and downforce, an optional arcade
//! stability assist and collision-driven damage. The chassis rigid body lives
//! in any [`PhysicsProvider`]; [`SandboxWorld`] is a small deterministic one
//! for tests, tools and demos.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod fleet;
pub mod provider;
pub mod utils;
pub mod vehicle;
pub mod world;

pub use glam::{Quat, Vec3};

pub use config::{ContactReporting, VehicleConfig};
pub use error::{Result, VehicleError};
pub use fleet::{Fleet, FleetMember};
pub use provider::{BodyDesc, BodyHandle, PhysicsProvider, RayHit, SurfaceType};
pub use vehicle::{
    damage::{CollisionEvent, DamageSeverity, DamageState},
    powertrain::GearState,
    stability::{ArcadeStabilizer, StabilityAssist, StabilityContext},
    state::{InputUpdate, ReplayFrame, Telemetry, VehicleInput, VehicleTransform, WheelState},
    Vehicle,
};
pub use world::SandboxWorld;

//! Rigid-body primitives backing the sandbox provider.

pub mod rigidbody;
pub mod types;

pub use rigidbody::RigidBody;
pub use types::{InertiaTensorExt, Transform, Velocity};

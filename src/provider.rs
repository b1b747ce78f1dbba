//! Boundary to the rigid-body physics backend.
//!
//! The vehicle never integrates its own chassis: it reads pose and velocity
//! from a [`PhysicsProvider`], casts rays through it and writes impulses back.
//! Implementations are expected to be synchronous and O(1) per call.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

pub use crate::utils::allocator::BodyHandle;

/// Ground material under a wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurfaceType {
    #[default]
    Tarmac,
    Gravel,
    Grass,
    Dirt,
    Ice,
}

/// Closest hit reported by [`PhysicsProvider::cast_ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin along the (normalised) direction.
    pub distance: f32,
    /// Surface normal, when the provider can report one.
    pub normal: Option<Vec3>,
    /// Ground material, when the provider can report one.
    pub surface: Option<SurfaceType>,
}

/// Everything a provider needs to create the chassis body and its collider.
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub position: Vec3,
    pub rotation: Quat,
    pub mass: f32,
    /// Half extents of the box collider, also used for the inertia tensor.
    pub half_extents: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

/// Rigid-body capability consumed by [`crate::Vehicle`].
///
/// Calls made with a handle the provider does not know must be ignored
/// (reads return zero / identity).
pub trait PhysicsProvider {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;
    fn destroy_body(&mut self, body: BodyHandle);

    /// Casts a ray and returns the closest hit within `max_distance`,
    /// ignoring every collider that belongs to `exclude`.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<BodyHandle>,
    ) -> Option<RayHit>;

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3);
    fn apply_impulse_at_point(&mut self, body: BodyHandle, impulse: Vec3, point: Vec3);
    fn apply_torque_impulse(&mut self, body: BodyHandle, torque_impulse: Vec3);

    fn translation(&self, body: BodyHandle) -> Vec3;
    fn rotation(&self, body: BodyHandle) -> Quat;
    fn linear_velocity(&self, body: BodyHandle) -> Vec3;
    fn angular_velocity(&self, body: BodyHandle) -> Vec3;

    fn set_translation(&mut self, body: BodyHandle, position: Vec3);
    fn set_rotation(&mut self, body: BodyHandle, rotation: Quat);
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3);
    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3);
}

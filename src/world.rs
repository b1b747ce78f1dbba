use glam::{Quat, Vec3};

use crate::{
    collision::queries::{GroundShape, Raycast, RaycastQuery, StaticCollider},
    config::DEFAULT_GRAVITY,
    core::rigidbody::RigidBody,
    dynamics::integrator::Integrator,
    provider::{BodyDesc, BodyHandle, PhysicsProvider, RayHit, SurfaceType},
    utils::allocator::Arena,
};

/// Minimal deterministic physics provider.
///
/// Bodies are integrated under gravity and respond to impulses, rays hit
/// static ground and other bodies' boxes. There is no contact solver: a
/// vehicle stays up on its own suspension forces.
pub struct SandboxWorld {
    bodies: Arena<RigidBody>,
    statics: Vec<StaticCollider>,
    pub gravity: Vec3,
    integrator: Integrator,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxWorld {
    /// Empty world with default gravity and no ground.
    pub fn new() -> Self {
        Self {
            bodies: Arena::new(),
            statics: Vec::new(),
            gravity: Vec3::from_slice(&DEFAULT_GRAVITY),
            integrator: Integrator::new(2),
        }
    }

    /// World with a single flat tarmac plane at `y = height`.
    pub fn with_flat_ground(height: f32) -> Self {
        let mut world = Self::new();
        world.add_ground_plane(Vec3::Y, height, SurfaceType::Tarmac);
        world
    }

    pub fn add_ground_plane(&mut self, normal: Vec3, offset: f32, surface: SurfaceType) {
        self.statics.push(StaticCollider {
            shape: GroundShape::Plane {
                normal: normal.normalize_or(Vec3::Y),
                offset,
            },
            surface,
        });
    }

    pub fn add_static_box(&mut self, center: Vec3, half_extents: Vec3, surface: SurfaceType) {
        self.statics.push(StaticCollider {
            shape: GroundShape::Box {
                center,
                half_extents,
            },
            surface,
        });
    }

    pub fn clear_ground(&mut self) {
        self.statics.clear();
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Integrates every body forward by `dt`.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integrator
            .step(self.bodies.values_mut(), self.gravity, dt);
    }
}

impl PhysicsProvider for SandboxWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let mut body = RigidBody::solid_box(desc.mass, desc.half_extents);
        body.transform.position = desc.position;
        body.transform.rotation = desc.rotation.normalize();
        body.linear_damping = desc.linear_damping;
        body.angular_damping = desc.angular_damping;
        self.bodies.insert(body)
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        self.bodies.remove(body);
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<BodyHandle>,
    ) -> Option<RayHit> {
        let query = RaycastQuery::new(origin, direction, max_distance);
        let mut closest: Option<RayHit> = None;
        let mut consider = |distance: f32, normal: Vec3, surface: SurfaceType| {
            if closest.map_or(true, |hit| distance < hit.distance) {
                closest = Some(RayHit {
                    distance,
                    normal: Some(normal),
                    surface: Some(surface),
                });
            }
        };

        for collider in &self.statics {
            if let Some(hit) = Raycast::against_static(&query, collider) {
                consider(hit.distance, hit.normal, collider.surface);
            }
        }

        for (handle, body) in self.bodies.iter() {
            if Some(handle) == exclude {
                continue;
            }
            let Some(half_extents) = body.half_extents else {
                continue;
            };
            if let Some(hit) = Raycast::against_oriented_box(&query, &body.transform, half_extents) {
                consider(hit.distance, hit.normal, SurfaceType::Tarmac);
            }
        }

        closest
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.apply_impulse(impulse);
        }
    }

    fn apply_impulse_at_point(&mut self, body: BodyHandle, impulse: Vec3, point: Vec3) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.apply_impulse_at_point(impulse, point);
        }
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, torque_impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.apply_torque_impulse(torque_impulse);
        }
    }

    fn translation(&self, body: BodyHandle) -> Vec3 {
        self.bodies
            .get(body)
            .map_or(Vec3::ZERO, |b| b.transform.position)
    }

    fn rotation(&self, body: BodyHandle) -> Quat {
        self.bodies
            .get(body)
            .map_or(Quat::IDENTITY, |b| b.transform.rotation)
    }

    fn linear_velocity(&self, body: BodyHandle) -> Vec3 {
        self.bodies
            .get(body)
            .map_or(Vec3::ZERO, |b| b.velocity.linear)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Vec3 {
        self.bodies
            .get(body)
            .map_or(Vec3::ZERO, |b| b.velocity.angular)
    }

    fn set_translation(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.transform.position = position;
        }
    }

    fn set_rotation(&mut self, body: BodyHandle, rotation: Quat) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.transform.rotation = rotation.normalize();
        }
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.velocity.linear = velocity;
        }
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.velocity.angular = velocity;
        }
    }
}

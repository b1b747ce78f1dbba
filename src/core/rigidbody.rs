use super::types::{InertiaTensorExt, Transform, Velocity};
use glam::{Mat3, Vec3};

/// Rigid body stored by the sandbox world.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub transform: Transform,
    pub velocity: Velocity,
    pub mass: f32,
    /// Box collider half extents; `None` means the body is invisible to rays.
    pub half_extents: Option<Vec3>,
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub inverse_mass: f32,
    /// Body-space inverse inertia tensor.
    pub inverse_inertia: Mat3,
}

impl Default for RigidBody {
    fn default() -> Self {
        let mut body = Self {
            transform: Transform::default(),
            velocity: Velocity::default(),
            mass: 1.0,
            half_extents: None,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            inverse_mass: 1.0,
            inverse_inertia: Mat3::IDENTITY,
        };
        body.recompute_inverses(Mat3::IDENTITY);
        body
    }
}

impl RigidBody {
    /// Solid box body with a matching collider.
    pub fn solid_box(mass: f32, half_extents: Vec3) -> Self {
        let mut body = Self {
            mass,
            half_extents: Some(half_extents),
            ..Self::default()
        };
        body.recompute_inverses(Mat3::for_solid_box(half_extents, mass));
        body
    }

    /// Inverse inertia rotated into world space.
    pub fn world_inverse_inertia(&self) -> Mat3 {
        let rotation = Mat3::from_quat(self.transform.rotation);
        rotation * self.inverse_inertia * rotation.transpose()
    }

    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity.linear += impulse * self.inverse_mass;
    }

    pub fn apply_impulse_at_point(&mut self, impulse: Vec3, point: Vec3) {
        self.velocity.linear += impulse * self.inverse_mass;
        let torque = (point - self.transform.position).cross(impulse);
        self.apply_torque_impulse(torque);
    }

    pub fn apply_torque_impulse(&mut self, torque_impulse: Vec3) {
        self.velocity.angular += self.world_inverse_inertia() * torque_impulse;
    }

    fn recompute_inverses(&mut self, inertia: Mat3) {
        self.inverse_mass = if self.mass.abs() < f32::EPSILON {
            0.0
        } else {
            1.0 / self.mass
        };
        if inertia.determinant().abs() < f32::EPSILON {
            self.inverse_inertia = Mat3::IDENTITY;
        } else {
            self.inverse_inertia = inertia.inverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn off_center_impulse_spins_body() {
        let mut body = RigidBody::solid_box(100.0, Vec3::new(1.0, 0.5, 2.0));
        body.apply_impulse_at_point(Vec3::Y * 10.0, Vec3::new(1.0, 0.0, 0.0));
        assert!((body.velocity.linear.y - 0.1).abs() < 1e-6);
        assert!(body.velocity.angular.z > 0.0);
    }

    #[test]
    fn world_inertia_follows_orientation() {
        let mut body = RigidBody::solid_box(100.0, Vec3::new(1.0, 0.5, 2.0));
        let torque = Vec3::X;
        let upright = body.world_inverse_inertia() * torque;
        body.transform.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let turned = body.world_inverse_inertia() * torque;
        assert!((upright.length() - turned.length()).abs() > 1e-4);
    }
}

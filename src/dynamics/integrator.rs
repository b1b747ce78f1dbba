use glam::{Quat, Vec3};

use crate::core::rigidbody::RigidBody;

/// Semi-implicit Euler integrator used by the sandbox world.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub substeps: u32,
}

impl Integrator {
    pub fn new(substeps: u32) -> Self {
        Self {
            substeps: substeps.max(1),
        }
    }

    pub fn integrate_velocity(&self, body: &mut RigidBody, gravity: Vec3, dt: f32) {
        if body.inverse_mass == 0.0 {
            return;
        }

        body.velocity.linear += gravity * body.gravity_scale * dt;

        body.velocity.linear *= (1.0 - body.linear_damping * dt).max(0.0);
        body.velocity.angular *= (1.0 - body.angular_damping * dt).max(0.0);
    }

    pub fn integrate_position(&self, body: &mut RigidBody, dt: f32) {
        if body.inverse_mass == 0.0 {
            return;
        }

        body.transform.position += body.velocity.linear * dt;

        let omega_mag = body.velocity.angular.length();
        if omega_mag > 1e-6 {
            let axis = body.velocity.angular / omega_mag;
            let delta = Quat::from_axis_angle(axis, omega_mag * dt);
            body.transform.rotation = (delta * body.transform.rotation).normalize();
        }
    }

    /// Advances every body by `dt`, split into the configured substeps.
    pub fn step<'a>(&self, bodies: impl Iterator<Item = &'a mut RigidBody>, gravity: Vec3, dt: f32) {
        let sub_dt = dt / self.substeps as f32;
        for body in bodies {
            for _ in 0..self.substeps {
                self.integrate_velocity(body, gravity, sub_dt);
                self.integrate_position(body, sub_dt);
            }
        }
    }
}

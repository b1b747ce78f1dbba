//! Ground contact: one downward probe per wheel.

use glam::Vec3;

use super::{scratch::TickScratch, state::VehicleTransform, state::WheelState};
use crate::config::{ContactReporting, WheelConfig};
use crate::provider::{BodyHandle, PhysicsProvider, SurfaceType};

pub struct GroundContactResolver;

impl GroundContactResolver {
    /// Casts one ray per wheel along the chassis down axis and records the
    /// grounded/airborne state. A miss is a normal outcome.
    pub fn resolve<P: PhysicsProvider + ?Sized>(
        provider: &P,
        body: BodyHandle,
        transform: &VehicleTransform,
        configs: &[WheelConfig; 4],
        wheels: &mut [WheelState; 4],
        scratch: &mut TickScratch,
        reporting: ContactReporting,
    ) {
        let down = -transform.up;

        for (index, (config, wheel)) in configs.iter().zip(wheels.iter_mut()).enumerate() {
            let origin = transform.to_world(config.position);
            let max_distance = config.probe_length();
            scratch.mount_points[index] = origin;
            scratch.was_grounded[index] = wheel.is_grounded;

            match provider.cast_ray(origin, down, max_distance, Some(body)) {
                Some(hit) => {
                    wheel.is_grounded = true;
                    wheel.suspension_length = hit.distance.clamp(0.0, max_distance);
                    wheel.contact_point = origin + down * wheel.suspension_length;
                    let (normal, surface) = match reporting {
                        ContactReporting::Fixed => (Vec3::Y, SurfaceType::Tarmac),
                        ContactReporting::Provider => (
                            hit.normal
                                .filter(|n| n.is_finite())
                                .and_then(|n| n.try_normalize())
                                .unwrap_or(Vec3::Y),
                            hit.surface.unwrap_or_default(),
                        ),
                    };
                    wheel.contact_normal = normal;
                    wheel.surface = surface;
                }
                None => {
                    wheel.is_grounded = false;
                    wheel.suspension_length = max_distance;
                    wheel.contact_point = origin + down * max_distance;
                    wheel.contact_normal = Vec3::Y;
                    wheel.clear_forces();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleConfig;
    use crate::provider::BodyDesc;
    use crate::world::SandboxWorld;
    use glam::Quat;

    fn setup(height: f32) -> (SandboxWorld, BodyHandle, VehicleConfig, VehicleTransform) {
        let config = VehicleConfig::default();
        let mut world = SandboxWorld::new();
        world.add_ground_plane(Vec3::new(0.2, 1.0, 0.0), 0.0, SurfaceType::Grass);
        let position = Vec3::new(0.0, height, 0.0);
        let body = world.create_body(&BodyDesc {
            position,
            rotation: Quat::IDENTITY,
            mass: config.mass,
            half_extents: config.chassis_half_extents,
            linear_damping: 0.0,
            angular_damping: 0.0,
        });
        (world, body, config, VehicleTransform::from_pose(position, Quat::IDENTITY))
    }

    #[test]
    fn fixed_reporting_ignores_provider_normal() {
        let (world, body, config, transform) = setup(0.7);
        let mut wheels = config.wheels.map(|w| WheelState::at_rest(&w));
        let mut scratch = TickScratch::default();
        GroundContactResolver::resolve(
            &world,
            body,
            &transform,
            &config.wheels,
            &mut wheels,
            &mut scratch,
            ContactReporting::Fixed,
        );
        for wheel in &wheels {
            assert!(wheel.is_grounded);
            assert_eq!(wheel.contact_normal, Vec3::Y);
            assert_eq!(wheel.surface, SurfaceType::Tarmac);
        }
    }

    #[test]
    fn provider_reporting_uses_hit_normal_and_surface() {
        let (world, body, config, transform) = setup(0.7);
        let mut wheels = config.wheels.map(|w| WheelState::at_rest(&w));
        let mut scratch = TickScratch::default();
        GroundContactResolver::resolve(
            &world,
            body,
            &transform,
            &config.wheels,
            &mut wheels,
            &mut scratch,
            ContactReporting::Provider,
        );
        let wheel = wheels[0];
        assert!(wheel.is_grounded);
        assert_eq!(wheel.surface, SurfaceType::Grass);
        assert!((wheel.contact_normal - Vec3::new(0.2, 1.0, 0.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn miss_reports_full_extension_and_zero_forces() {
        let (world, body, config, transform) = setup(20.0);
        let mut wheels = config.wheels.map(|w| {
            let mut state = WheelState::at_rest(&w);
            state.is_grounded = true;
            state.suspension_force = 1234.0;
            state.tire_force = Vec3::X;
            state
        });
        let mut scratch = TickScratch::default();
        GroundContactResolver::resolve(
            &world,
            body,
            &transform,
            &config.wheels,
            &mut wheels,
            &mut scratch,
            ContactReporting::Fixed,
        );
        for (wheel, wheel_config) in wheels.iter().zip(&config.wheels) {
            assert!(!wheel.is_grounded);
            assert_eq!(wheel.suspension_length, wheel_config.probe_length());
            assert_eq!(wheel.suspension_force, 0.0);
            assert_eq!(wheel.tire_force, Vec3::ZERO);
        }
        assert!(scratch.was_grounded.iter().all(|g| *g));
    }
}

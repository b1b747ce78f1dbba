use glam::Vec3;

use crate::{core::types::Transform, provider::SurfaceType};

/// Static geometry the sandbox world can be ray cast against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundShape {
    /// Infinite plane `dot(normal, p) = offset`; `normal` is unit length.
    Plane { normal: Vec3, offset: f32 },
    /// Axis-aligned box.
    Box { center: Vec3, half_extents: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    pub shape: GroundShape,
    pub surface: SurfaceType,
}

/// Result of a ray cast against a single shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct RaycastQuery {
    pub origin: Vec3,
    /// Normalised on construction.
    pub direction: Vec3,
    pub max_distance: f32,
}

impl RaycastQuery {
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance,
        }
    }
}

pub struct Raycast;

impl Raycast {
    pub fn against_static(query: &RaycastQuery, collider: &StaticCollider) -> Option<ShapeHit> {
        match collider.shape {
            GroundShape::Plane { normal, offset } => Self::ray_plane(query, normal, offset),
            GroundShape::Box {
                center,
                half_extents,
            } => Self::ray_aabb(query, center, half_extents),
        }
    }

    /// Tests a box that moves with `transform` (a rigid body's collider).
    pub fn against_oriented_box(
        query: &RaycastQuery,
        transform: &Transform,
        half_extents: Vec3,
    ) -> Option<ShapeHit> {
        let local = RaycastQuery {
            origin: transform.inverse_transform_point(query.origin),
            direction: transform.rotation.inverse() * query.direction,
            max_distance: query.max_distance,
        };
        Self::ray_aabb(&local, Vec3::ZERO, half_extents).map(|hit| ShapeHit {
            point: transform.transform_point(hit.point),
            normal: transform.rotation * hit.normal,
            distance: hit.distance,
        })
    }

    fn ray_plane(query: &RaycastQuery, normal: Vec3, offset: f32) -> Option<ShapeHit> {
        let denom = normal.dot(query.direction);
        // Rays parallel to or leaving the front face never hit.
        if denom >= -1e-6 {
            return None;
        }
        let t = (offset - normal.dot(query.origin)) / denom;
        if t < 0.0 || t > query.max_distance {
            return None;
        }
        Some(ShapeHit {
            point: query.origin + query.direction * t,
            normal,
            distance: t,
        })
    }

    fn ray_aabb(query: &RaycastQuery, center: Vec3, half_extents: Vec3) -> Option<ShapeHit> {
        let dir = query.direction;
        let mut t_min = 0.0;
        let mut t_max = query.max_distance;
        let mut normal = Vec3::ZERO;

        for i in 0..3 {
            let origin_component = query.origin[i];
            let dir_component = dir[i];
            let min = center[i] - half_extents[i];
            let max = center[i] + half_extents[i];

            if dir_component.abs() < 1e-6 {
                if origin_component < min || origin_component > max {
                    return None;
                }
            } else {
                let inv_dir = 1.0 / dir_component;
                let mut t1 = (min - origin_component) * inv_dir;
                let mut t2 = (max - origin_component) * inv_dir;
                let mut axis_normal = Vec3::ZERO;
                axis_normal[i] = -dir_component.signum();

                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }

                if t1 > t_min {
                    t_min = t1;
                    normal = axis_normal;
                }

                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        // Origin inside the box: report the entry point as the origin itself.
        if normal == Vec3::ZERO {
            normal = -dir;
        }

        Some(ShapeHit {
            point: query.origin + dir * t_min,
            normal,
            distance: t_min,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn ground(height: f32) -> StaticCollider {
        StaticCollider {
            shape: GroundShape::Plane {
                normal: Vec3::Y,
                offset: height,
            },
            surface: SurfaceType::Tarmac,
        }
    }

    #[test]
    fn downward_ray_hits_plane_within_range() {
        let query = RaycastQuery::new(Vec3::new(3.0, 0.5, -2.0), -Vec3::Y, 0.8);
        let hit = Raycast::against_static(&query, &ground(0.0)).expect("hit");
        assert!((hit.distance - 0.5).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Y);

        let short = RaycastQuery::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.8);
        assert!(Raycast::against_static(&short, &ground(0.0)).is_none());

        let upward = RaycastQuery::new(Vec3::new(0.0, 0.5, 0.0), Vec3::Y, 10.0);
        assert!(Raycast::against_static(&upward, &ground(0.0)).is_none());
    }

    #[test]
    fn box_hit_reports_top_face() {
        let collider = StaticCollider {
            shape: GroundShape::Box {
                center: Vec3::new(0.0, -0.5, 0.0),
                half_extents: Vec3::new(5.0, 0.5, 5.0),
            },
            surface: SurfaceType::Gravel,
        };
        let query = RaycastQuery::new(Vec3::new(1.0, 0.4, 1.0), -Vec3::Y, 1.0);
        let hit = Raycast::against_static(&query, &collider).expect("hit");
        assert!((hit.distance - 0.4).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn oriented_box_is_hit_in_world_space() {
        let transform = Transform::from_position_rotation(
            Vec3::new(0.0, 0.0, 10.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let query = RaycastQuery::new(Vec3::ZERO, Vec3::Z, 20.0);
        let hit = Raycast::against_oriented_box(&query, &transform, Vec3::new(2.0, 1.0, 0.5))
            .expect("hit");
        // Rotated a quarter turn, the 2 m half extent now lies along Z.
        assert!((hit.distance - 8.0).abs() < 1e-4);
        assert!((hit.normal + Vec3::Z).length() < 1e-4);
    }
}

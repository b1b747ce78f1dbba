use redline::{
    collision::queries::{GroundShape, Raycast, RaycastQuery, StaticCollider},
    BodyDesc, PhysicsProvider, Quat, SandboxWorld, SurfaceType, Vec3,
};

fn chassis(world: &mut SandboxWorld, position: Vec3, rotation: Quat) -> redline::BodyHandle {
    world.create_body(&BodyDesc {
        position,
        rotation,
        mass: 1_200.0,
        half_extents: Vec3::new(0.9, 0.5, 2.2),
        linear_damping: 0.0,
        angular_damping: 0.0,
    })
}

#[test]
fn raycast_respects_max_distance_and_exclusion() {
    let mut world = SandboxWorld::with_flat_ground(0.0);
    let own = chassis(&mut world, Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY);
    let other = chassis(&mut world, Vec3::new(0.0, 1.0, 10.0), Quat::IDENTITY);

    let origin = Vec3::new(0.0, 1.0, 0.0);
    assert!(world.cast_ray(origin, -Vec3::Y, 0.5, Some(own)).is_none());

    let ground = world
        .cast_ray(origin, -Vec3::Y, 5.0, Some(own))
        .expect("ground below");
    assert!((ground.distance - 1.0).abs() < 1e-5);
    assert_eq!(ground.normal, Some(Vec3::Y));

    let ahead = world
        .cast_ray(origin, Vec3::Z, 20.0, Some(own))
        .expect("other car ahead");
    assert!((ahead.distance - (10.0 - 2.2)).abs() < 1e-4);
    assert_eq!(ahead.normal, Some(-Vec3::Z));

    assert!(world.cast_ray(origin, Vec3::Z, 20.0, Some(other)).is_some());
}

#[test]
fn raycast_hits_rotated_chassis_on_its_face() {
    let mut world = SandboxWorld::new();
    let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    chassis(&mut world, Vec3::new(0.0, 0.0, 0.0), rotation);

    // Rotated a quarter turn, the long side now faces the X axis.
    let hit = world
        .cast_ray(Vec3::new(-10.0, 0.0, 0.0), Vec3::X, 20.0, None)
        .expect("hit");
    assert!((hit.distance - (10.0 - 2.2)).abs() < 1e-4);
    let normal = hit.normal.expect("sandbox reports normals");
    assert!((normal + Vec3::X).length() < 1e-4);
}

#[test]
fn raycast_reports_surface_of_closest_static() {
    let mut world = SandboxWorld::new();
    world.add_ground_plane(Vec3::Y, 0.0, SurfaceType::Grass);
    world.add_static_box(Vec3::new(0.0, 0.1, 0.0), Vec3::new(1.0, 0.1, 1.0), SurfaceType::Dirt);

    let on_box = world
        .cast_ray(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 2.0, None)
        .expect("hit");
    assert_eq!(on_box.surface, Some(SurfaceType::Dirt));
    assert!((on_box.distance - 0.8).abs() < 1e-5);

    let beside = world
        .cast_ray(Vec3::new(3.0, 1.0, 0.0), -Vec3::Y, 2.0, None)
        .expect("hit");
    assert_eq!(beside.surface, Some(SurfaceType::Grass));

    world.clear_ground();
    assert!(world.cast_ray(Vec3::new(3.0, 1.0, 0.0), -Vec3::Y, 2.0, None).is_none());
}

#[test]
fn tilted_plane_query_reports_its_normal() {
    let normal = Vec3::new(0.0, 1.0, 1.0).normalize();
    let collider = StaticCollider {
        shape: GroundShape::Plane {
            normal,
            offset: 0.0,
        },
        surface: SurfaceType::Tarmac,
    };
    let query = RaycastQuery::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 10.0);
    let hit = Raycast::against_static(&query, &collider).expect("hit");
    assert!((hit.normal - normal).length() < 1e-5);
    assert!((hit.distance - 2.0).abs() < 1e-4);
    assert!(hit.point.length() < 1e-4);
}

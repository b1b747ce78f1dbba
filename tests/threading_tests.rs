use redline::*;
use std::thread;

const DT: f32 = 1.0 / 60.0;

fn racer(lane: f32) -> (Vehicle, SandboxWorld) {
    let mut world = SandboxWorld::with_flat_ground(0.0);
    let mut vehicle = Vehicle::new(VehicleConfig::default()).expect("valid config");
    let height = vehicle.config().ride_height();
    vehicle.spawn(&mut world, Vec3::new(lane, height, 0.0), Quat::IDENTITY);
    vehicle.set_input(InputUpdate {
        throttle: Some(1.0),
        steering: Some(lane * 0.05),
        ..InputUpdate::default()
    });
    (vehicle, world)
}

#[test]
fn test_vehicle_is_sync_and_send() {
    fn assert_sync_send<T: Sync + Send>() {}
    assert_sync_send::<Vehicle>();
    assert_sync_send::<SandboxWorld>();
    assert_sync_send::<Fleet<SandboxWorld>>();
}

#[test]
fn test_vehicles_on_separate_threads() {
    let handles: Vec<_> = (0..4)
        .map(|lane| {
            thread::spawn(move || {
                let (mut vehicle, mut world) = racer(lane as f32);
                for _ in 0..120 {
                    vehicle.update(&mut world, DT);
                    world.step(DT);
                }
                vehicle.telemetry()
            })
        })
        .collect();

    for handle in handles {
        let telemetry = handle.join().expect("vehicle thread panicked");
        assert!(telemetry.speed > 5.0);
        assert_eq!(telemetry.wheels_on_ground, 4);
    }
}

#[test]
fn test_parallel_fleet_matches_sequential() {
    fn run(parallel: bool) -> Vec<Telemetry> {
        let mut fleet = Fleet::new();
        for lane in 0..6 {
            let (vehicle, world) = racer(lane as f32);
            fleet.push(vehicle, world);
        }
        fleet.set_parallel_enabled(parallel);
        for _ in 0..240 {
            fleet.step_with(DT, |world: &mut SandboxWorld, dt| world.step(dt));
        }
        fleet
            .members()
            .iter()
            .map(|member| member.vehicle.telemetry())
            .collect()
    }

    assert_eq!(run(true), run(false));
}

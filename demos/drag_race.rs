use redline::*;

const DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut world = SandboxWorld::with_flat_ground(0.0);
    let mut vehicle = match Vehicle::new(VehicleConfig::arcade_rwd()) {
        Ok(vehicle) => vehicle,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    let height = vehicle.config().ride_height();
    vehicle.spawn(&mut world, Vec3::new(0.0, height, 0.0), Quat::IDENTITY);
    vehicle.set_input(InputUpdate::throttle(1.0));

    let mut quarter_mile = None;
    for tick in 0..60 * 30 {
        vehicle.update(&mut world, DT);
        world.step(DT);

        if quarter_mile.is_none() && vehicle.transform().position.z >= 402.3 {
            quarter_mile = Some((vehicle.sim_time(), vehicle.telemetry().speed_kmh));
        }
        if tick % 60 == 0 {
            let t = vehicle.telemetry();
            println!(
                "t={:>5.1}s  {:>6.1} km/h  gear {}{}  {:>5.0} rpm  g {:.2}",
                vehicle.sim_time(),
                t.speed_kmh,
                t.gear,
                if t.is_shifting { "*" } else { " " },
                t.rpm,
                t.g_force
            );
        }
    }

    match quarter_mile {
        Some((time, speed)) => println!("quarter mile: {time:.2}s at {speed:.1} km/h"),
        None => println!("quarter mile not reached"),
    }
    vehicle.dispose(&mut world);
}

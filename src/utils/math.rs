//! Additional math helpers layered on top of `glam`.

use glam::Vec3;
use std::f32::consts::TAU;

/// Frame-rate independent exponential approach of `current` toward `target`.
///
/// Never overshoots: the result always lies between `current` and `target`.
pub fn exp_smooth(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let blend = 1.0 - (-rate.max(0.0) * dt.max(0.0)).exp();
    current + (target - current) * blend
}

/// Rescales `v` so its length does not exceed `max_length`.
///
/// Returns `None` when no change was needed.
pub fn clamp_length(v: Vec3, max_length: f32) -> Option<Vec3> {
    let length_sq = v.length_squared();
    if length_sq <= max_length * max_length {
        return None;
    }
    Some(v * (max_length / length_sq.sqrt()))
}

/// Wraps an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

/// Clamps into `[min, max]`, mapping NaN and infinities to `fallback`.
pub fn sanitize(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_smooth_approaches_without_overshoot() {
        let mut value = 0.0;
        for _ in 0..120 {
            let next = exp_smooth(value, 1.0, 8.0, 1.0 / 60.0);
            assert!(next >= value && next <= 1.0);
            value = next;
        }
        assert!(value > 0.99);
    }

    #[test]
    fn clamp_length_only_touches_long_vectors() {
        assert_eq!(clamp_length(Vec3::new(3.0, 0.0, 4.0), 10.0), None);
        let clamped = clamp_length(Vec3::new(30.0, 0.0, 40.0), 10.0).expect("clamped");
        assert!((clamped.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn sanitize_rejects_non_finite() {
        assert_eq!(sanitize(f32::NAN, -1.0, 1.0, 0.0), 0.0);
        assert_eq!(sanitize(f32::INFINITY, 0.0, 1.0, 0.0), 0.0);
        assert_eq!(sanitize(2.5, 0.0, 1.0, 0.0), 1.0);
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-5);
    }
}

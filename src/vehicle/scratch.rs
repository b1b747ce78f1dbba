use glam::Vec3;

/// Per-vehicle temporaries reused by every tick.
///
/// Owned by the vehicle rather than pooled globally, so independent vehicles
/// can be stepped on different threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickScratch {
    /// World-space strut mount points.
    pub mount_points: [Vec3; 4],
    /// Grounded state from the previous tick.
    pub was_grounded: [bool; 4],
    /// `compression / max_travel`, zero when airborne.
    pub compression_ratio: [f32; 4],
}

impl TickScratch {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

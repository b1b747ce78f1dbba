use log::{log_enabled, warn, Level};
use std::time::{Duration, Instant};

/// Scoped timer for the per-tick pipeline.
///
/// Emits trace-level timings and warns when the scope exceeds its budget.
/// Holds only a label and an `Instant`, so it is safe to use inside `update`.
pub struct ScopedTimer<'a> {
    label: &'a str,
    budget_ms: Option<f32>,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            budget_ms: None,
            start: Instant::now(),
        }
    }

    /// Timer that also warns if the scope runs longer than `budget_ms`.
    pub fn with_budget(label: &'a str, budget_ms: f32) -> Self {
        Self {
            budget_ms: Some(budget_ms),
            ..Self::new(label)
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if log_enabled!(Level::Trace) {
            log::trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
        if let Some(budget) = self.budget_ms {
            warn_if_frame_budget_exceeded(self.label, elapsed, budget);
        }
    }
}

/// Registers a warning when frame budget is exceeded.
pub fn warn_if_frame_budget_exceeded(label: &str, duration: Duration, budget_ms: f32) -> bool {
    let elapsed_ms = duration.as_secs_f32() * 1000.0;
    if elapsed_ms > budget_ms {
        warn!("{label} exceeded budget: {elapsed_ms:.2} ms > {budget_ms:.2} ms");
        return true;
    }
    false
}

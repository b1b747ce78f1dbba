//! Collision-driven damage and the performance penalty derived from it.

use std::collections::VecDeque;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::DamageConfig;

/// Upper bound on the collision history; the oldest entry is dropped past it.
pub const COLLISION_HISTORY_CAPACITY: usize = 32;

/// Damage recovered by a reset.
pub const RESET_RECOVERY: f32 = 0.2;

const SEVERITY_INCREMENTS: [f32; 4] = [0.05, 0.1, 0.2, 0.3];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DamageSeverity {
    #[default]
    None,
    Minor,
    Moderate,
    Severe,
    Catastrophic,
}

impl DamageSeverity {
    /// Classifies accumulated damage in `[0, 1]`.
    pub fn from_damage(damage: f32) -> Self {
        if damage >= 0.8 {
            DamageSeverity::Catastrophic
        } else if damage >= 0.6 {
            DamageSeverity::Severe
        } else if damage >= 0.4 {
            DamageSeverity::Moderate
        } else if damage >= 0.2 {
            DamageSeverity::Minor
        } else {
            DamageSeverity::None
        }
    }

    /// Classifies one impact against the ascending force thresholds and
    /// returns the damage it adds.
    pub fn from_impact(force: f32, thresholds: &[f32; 4]) -> (Self, f32) {
        const LEVELS: [DamageSeverity; 4] = [
            DamageSeverity::Minor,
            DamageSeverity::Moderate,
            DamageSeverity::Severe,
            DamageSeverity::Catastrophic,
        ];
        thresholds
            .iter()
            .zip(LEVELS.iter().zip(SEVERITY_INCREMENTS))
            .rev()
            .find(|(threshold, _)| force >= **threshold)
            .map_or((DamageSeverity::None, 0.0), |(_, (level, increment))| {
                (*level, increment)
            })
    }
}

/// An impact reported by an external collision source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Impact force in N.
    pub impact_force: f32,
    /// Seconds on the vehicle's simulation clock.
    pub timestamp: f32,
    /// Filled in on registration.
    #[serde(default)]
    pub severity: DamageSeverity,
}

impl CollisionEvent {
    pub fn new(impact_force: f32, timestamp: f32) -> Self {
        Self {
            impact_force,
            timestamp,
            severity: DamageSeverity::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageState {
    pub overall_damage: f32,
    pub severity: DamageSeverity,
    pub performance_penalty: f32,
    pub crash_count: u32,
    pub recent_collisions: VecDeque<CollisionEvent>,
}

impl Default for DamageState {
    fn default() -> Self {
        Self {
            overall_damage: 0.0,
            severity: DamageSeverity::None,
            performance_penalty: 0.0,
            crash_count: 0,
            recent_collisions: VecDeque::with_capacity(COLLISION_HISTORY_CAPACITY),
        }
    }
}

impl DamageState {
    pub fn damage_percent(&self) -> f32 {
        self.overall_damage * 100.0
    }
}

pub struct DamageModel {
    config: DamageConfig,
    state: DamageState,
}

impl DamageModel {
    pub fn new(config: DamageConfig) -> Self {
        Self {
            config,
            state: DamageState::default(),
        }
    }

    pub fn state(&self) -> &DamageState {
        &self.state
    }

    /// Multiplier applied to engine output and tire grip, in `(0, 1]`.
    pub fn multiplier(&self) -> f32 {
        1.0 - self.state.performance_penalty
    }

    /// Records an impact and returns the severity stamped onto it.
    pub fn register(&mut self, mut event: CollisionEvent) -> DamageSeverity {
        let force = if event.impact_force.is_finite() {
            event.impact_force.max(0.0)
        } else {
            0.0
        };
        let (severity, increment) = DamageSeverity::from_impact(force, &self.config.thresholds);
        event.severity = severity;

        if self.state.recent_collisions.len() >= COLLISION_HISTORY_CAPACITY {
            self.state.recent_collisions.pop_front();
        }
        self.state.recent_collisions.push_back(event);
        self.state.crash_count = self.state.crash_count.saturating_add(1);

        self.set_damage(self.state.overall_damage + increment);
        severity
    }

    /// Drops collisions older than the configured window.
    pub fn prune(&mut self, now: f32) {
        let window = self.config.history_window;
        self.state
            .recent_collisions
            .retain(|event| now - event.timestamp <= window);
    }

    /// Partial repair: damage only ever goes down here.
    pub fn recover(&mut self, amount: f32) {
        self.set_damage(self.state.overall_damage - amount.max(0.0));
    }

    fn set_damage(&mut self, damage: f32) {
        let previous = self.state.severity;
        self.state.overall_damage = damage.clamp(0.0, 1.0);
        self.state.performance_penalty =
            self.state.overall_damage * self.config.degradation_factor;
        self.state.severity = DamageSeverity::from_damage(self.state.overall_damage);
        if self.state.severity != previous {
            info!(
                "damage {:.0}%: {:?} -> {:?}",
                self.state.damage_percent(),
                previous,
                self.state.severity
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn severity_boundaries() {
        assert_eq!(DamageSeverity::from_damage(0.0), DamageSeverity::None);
        assert_eq!(DamageSeverity::from_damage(0.19999), DamageSeverity::None);
        assert_eq!(DamageSeverity::from_damage(0.2), DamageSeverity::Minor);
        assert_eq!(DamageSeverity::from_damage(0.4), DamageSeverity::Moderate);
        assert_eq!(DamageSeverity::from_damage(0.6), DamageSeverity::Severe);
        assert_eq!(DamageSeverity::from_damage(0.8), DamageSeverity::Catastrophic);
        assert_eq!(DamageSeverity::from_damage(1.0), DamageSeverity::Catastrophic);
    }

    #[test]
    fn impact_classification() {
        let thresholds = DamageConfig::default().thresholds;
        assert_eq!(
            DamageSeverity::from_impact(thresholds[0] - 1.0, &thresholds),
            (DamageSeverity::None, 0.0)
        );
        assert_eq!(
            DamageSeverity::from_impact(thresholds[0], &thresholds),
            (DamageSeverity::Minor, 0.05)
        );
        assert_eq!(
            DamageSeverity::from_impact(thresholds[2] + 1.0, &thresholds),
            (DamageSeverity::Severe, 0.2)
        );
        assert_eq!(
            DamageSeverity::from_impact(f32::MAX, &thresholds),
            (DamageSeverity::Catastrophic, 0.3)
        );
    }

    #[test]
    fn catastrophic_impact_on_pristine_car() {
        let config = DamageConfig::default();
        let mut model = DamageModel::new(config);
        let stamped = model.register(CollisionEvent::new(config.thresholds[3], 0.0));

        assert_eq!(stamped, DamageSeverity::Catastrophic);
        assert_eq!(
            model.state().recent_collisions.back().map(|e| e.severity),
            Some(DamageSeverity::Catastrophic)
        );
        assert_relative_eq!(model.state().overall_damage, 0.3);
        assert_relative_eq!(
            model.state().performance_penalty,
            0.3 * config.degradation_factor
        );
        assert_eq!(model.state().crash_count, 1);
    }

    #[test]
    fn damage_saturates_at_one() {
        let config = DamageConfig::default();
        let mut model = DamageModel::new(config);
        for i in 0..10 {
            model.register(CollisionEvent::new(1.0e9, i as f32));
            assert!(model.state().overall_damage <= 1.0);
        }
        assert_eq!(model.state().overall_damage, 1.0);
        assert_eq!(model.state().severity, DamageSeverity::Catastrophic);
        assert_relative_eq!(model.multiplier(), 1.0 - config.degradation_factor);
    }

    #[test]
    fn garbage_impacts_do_not_damage() {
        let mut model = DamageModel::new(DamageConfig::default());
        model.register(CollisionEvent::new(f32::NAN, 0.0));
        model.register(CollisionEvent::new(-1.0e6, 0.0));
        assert_eq!(model.state().overall_damage, 0.0);
        assert_eq!(model.state().crash_count, 2);
    }

    #[test]
    fn history_is_windowed_and_bounded() {
        let config = DamageConfig::default();
        let mut model = DamageModel::new(config);
        model.register(CollisionEvent::new(0.0, 0.0));
        model.register(CollisionEvent::new(0.0, 4.0));
        model.prune(config.history_window + 1.0);
        assert_eq!(model.state().recent_collisions.len(), 1);

        for i in 0..(COLLISION_HISTORY_CAPACITY + 8) {
            model.register(CollisionEvent::new(0.0, 10.0 + i as f32 * 0.01));
        }
        let history = &model.state().recent_collisions;
        assert_eq!(history.len(), COLLISION_HISTORY_CAPACITY);
        assert!(history.capacity() >= COLLISION_HISTORY_CAPACITY);
        assert_relative_eq!(history.front().map_or(0.0, |e| e.timestamp), 10.08, epsilon = 1e-4);
    }

    #[test]
    fn recovery_never_increases_damage() {
        let mut model = DamageModel::new(DamageConfig::default());
        model.recover(RESET_RECOVERY);
        assert_eq!(model.state().overall_damage, 0.0);

        model.register(CollisionEvent::new(1.0e9, 0.0));
        model.recover(RESET_RECOVERY);
        assert_relative_eq!(model.state().overall_damage, 0.1, epsilon = 1e-6);
        model.recover(-5.0);
        assert_relative_eq!(model.state().overall_damage, 0.1, epsilon = 1e-6);
    }
}

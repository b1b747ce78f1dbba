//! Many independent vehicles stepped together.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::provider::PhysicsProvider;
use crate::utils::logging::ScopedTimer;
use crate::vehicle::Vehicle;

/// A vehicle paired with the provider that owns its body.
pub struct FleetMember<P> {
    pub vehicle: Vehicle,
    pub provider: P,
}

/// Vehicles that share no state, updated sequentially or across threads.
pub struct Fleet<P> {
    members: Vec<FleetMember<P>>,
    parallel_enabled: bool,
}

impl<P> Default for Fleet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Fleet<P> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            parallel_enabled: cfg!(feature = "parallel"),
        }
    }

    /// Adds a member and returns its index.
    pub fn push(&mut self, vehicle: Vehicle, provider: P) -> usize {
        self.members.push(FleetMember { vehicle, provider });
        self.members.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&FleetMember<P>> {
        self.members.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut FleetMember<P>> {
        self.members.get_mut(index)
    }

    pub fn members(&self) -> &[FleetMember<P>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Enables or disables parallel updates. Has no effect without the
    /// `parallel` feature.
    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.parallel_enabled = enabled && cfg!(feature = "parallel");
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled
    }
}

impl<P: PhysicsProvider + Send> Fleet<P> {
    /// Runs one vehicle tick for every member.
    pub fn update(&mut self, dt: f32) {
        self.step_with(dt, |_, _| {});
    }

    /// Runs one vehicle tick for every member, then `step` on its provider.
    pub fn step_with<F>(&mut self, dt: f32, step: F)
    where
        F: Fn(&mut P, f32) + Send + Sync,
    {
        let tick = |member: &mut FleetMember<P>| {
            member.vehicle.update(&mut member.provider, dt);
            step(&mut member.provider, dt);
        };

        #[cfg(feature = "parallel")]
        if self.parallel_enabled {
            let _timer = ScopedTimer::new("fleet::parallel");
            self.members.par_iter_mut().for_each(tick);
            return;
        }

        let _timer = ScopedTimer::new("fleet::sequential");
        self.members.iter_mut().for_each(tick);
    }
}

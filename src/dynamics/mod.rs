//! Time integration for sandbox bodies.

pub mod integrator;

pub use integrator::Integrator;

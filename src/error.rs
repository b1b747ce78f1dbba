//! Error types for vehicle construction.

use thiserror::Error;

/// Failures that prevent a vehicle from being built.
///
/// Runtime edge cases (airborne wheels, zero speed, calls before spawning)
/// are never reported through this type; they degrade to zero forces or a
/// logged no-op instead.
#[derive(Debug, Error)]
pub enum VehicleError {
    /// A configuration value violates an invariant.
    #[error("invalid vehicle configuration: {0}")]
    InvalidConfig(String),

    /// A serialized configuration could not be decoded.
    #[error("failed to parse vehicle configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for vehicle construction.
pub type Result<T> = std::result::Result<T, VehicleError>;

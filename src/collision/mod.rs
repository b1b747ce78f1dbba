//! Ray queries against sandbox geometry.

pub mod queries;

pub use queries::{GroundShape, Raycast, RaycastQuery, ShapeHit, StaticCollider};

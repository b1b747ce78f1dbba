//! Utility helpers: math extensions, handle allocation and pipeline timing.

pub mod allocator;
pub mod logging;
pub mod math;

pub use allocator::{Arena, BodyHandle};
pub use math::*;

//! Common value types used across the animation engine.

pub mod color;
pub mod geometry;
pub mod error;

pub use color::Color;
pub use geometry::{Point, Size, EdgeSizes, Transform};
pub use error::{EngineError, EngineResult};

/// Linear interpolation between two values at `progress`.
#[inline]
pub fn lerp(from: f64, to: f64, progress: f64) -> f64 {
    from + (to - from) * progress
}

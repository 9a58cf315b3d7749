// Re-export glam for convenience
pub use glam::*;

// Lux math types
mod aabb;
mod interval;
mod onb;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use transform::Mat4Ext;

/// Color type alias (linear RGB, not clamped).
pub type Color = Vec3;

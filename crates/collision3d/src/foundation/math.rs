//! Math utilities and types
//!
//! Provides the vector aliases used across the collision library and a few
//! component-wise helpers nalgebra does not name directly.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
///
/// In horizontal-plane code the components are `(x, z)` of the 3D world.
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Tolerance for parallel and degenerate geometry checks
pub const EPSILON: f32 = 1e-6;

/// Stand-in for `1 / 0` in precomputed reciprocal directions
pub const INV_DIR_SENTINEL: f32 = 1e18;

/// Up axis
#[must_use]
pub fn up() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

/// Horizontal `(x, z)` part of a 3D vector
#[must_use]
pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Largest component of a 2D vector
#[must_use]
pub fn max_component_2d(v: Vec2) -> f32 {
    v.x.max(v.y)
}

/// 2D cross product (signed parallelogram area)
#[must_use]
pub fn cross_2d(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

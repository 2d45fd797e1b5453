//! Primitive collision shapes
//!
//! Each primitive is a small `Copy` value holding only dimensions; placement
//! comes from the [`Transform`](crate::foundation::transform::Transform)
//! passed with every query.
//!
//! - [`VertBox`] - axis-aligned box standing on its base
//! - [`Cylinder`] - vertical capped cylinder standing on its base
//! - [`Sphere`] - ray-only sphere
//! - [`RampRectangle`] - thick inclined slab
//! - [`RampTriangle`] - inclined triangle with one horizontal edge
//! - [`VerticalTriangle`] - wall triangle in the local XY plane
//! - [`VerticalCappedCone`] - vertical frustum standing on its base

mod capped_cone;
mod cylinder;
mod ramp_rectangle;
mod ramp_triangle;
mod sphere;
mod vert_box;
mod vertical_triangle;

pub use capped_cone::VerticalCappedCone;
pub use cylinder::Cylinder;
pub use ramp_rectangle::RampRectangle;
pub use ramp_triangle::RampTriangle;
pub use sphere::Sphere;
pub use vert_box::VertBox;
pub use vertical_triangle::VerticalTriangle;

/// How far past a footprint edge, in query radii, a ground contact still counts
pub const ON_EDGE_FACTOR: f32 = 0.5;

//! Collision shapes and the queries they answer
//!
//! # Architecture
//!
//! - **Model Space Storage**: shapes store only their dimensions; the caller
//!   passes a [`Transform`](crate::foundation::transform::Transform) with
//!   every query
//! - **Local Evaluation**: each query is moved into the shape's local frame,
//!   answered analytically there, and the normal is rotated back out
//! - **Enum Dispatch**: [`AnyPrimitive`] and [`AnyShape`] forward queries with
//!   a `match` over a closed set of variants
//!
//! # Module Organization
//!
//! - [`ray`] - Ray with precomputed reciprocal direction and octant signs
//! - [`shape`] - The [`CollisionShape`] contract and its result types
//! - [`convex`] - Slab test and iterative convex plane clipping
//! - [`triangle`] - Two-sided ray/triangle test
//! - [`primitives`] - Boxes, cylinders, spheres, ramps, triangles, cones
//! - [`heightmap`] - Terrain grid with a max-mipmap for ray traversal
//! - [`compound`] - Ordered lists of placed primitives
//! - [`any_shape`] - Tagged-union dispatchers
//!
//! # Query Conventions
//!
//! - Ray and movement results are fractions of the supplied displacement,
//!   always in `[0, 1]`
//! - A ray starting inside a solid reports `near = 0` and the reversed ray
//!   direction as normal
//! - On-ground offsets are query base height minus surface height, so a
//!   negative value means the query is sunk into the surface

pub mod any_shape;
pub mod compound;
pub mod convex;
pub mod heightmap;
pub mod primitives;
pub mod ray;
pub mod shape;
pub mod triangle;

// Re-export commonly used types
pub use any_shape::{AnyPrimitive, AnyShape, Primitive, Shape, ShapeType};
pub use compound::CompoundPrimitive;
pub use convex::{ConvexClip, Plane};
pub use heightmap::{HeightMap, HeightMapConfig, HeightMapError, HeightMapState};
pub use primitives::{
    Cylinder, RampRectangle, RampTriangle, Sphere, VertBox, VerticalCappedCone, VerticalTriangle,
};
pub use ray::RayInfo;
pub use shape::{CollisionShape, GroundContact, MovementHit, RayHit};
pub use triangle::Triangle;

//! # Collision3D
//!
//! Analytic collision queries for worlds whose geometry only ever rotates
//! about the vertical axis.
//!
//! ## Features
//!
//! - **Closed shape set**: boxes, cylinders, spheres, ramps, triangles and
//!   capped cones, each a small `Copy` value
//! - **Heightmap terrain**: max-mipmap pyramid for hierarchical ray traversal
//! - **Compound shapes**: ordered lists of placed primitives
//! - **Enum dispatch**: [`AnyShape`](physics::collision::AnyShape) routes every
//!   query with a `match`, no trait objects
//!
//! Every shape answers the same four queries: world AABB, ray test, cylinder
//! on-ground test and cylinder movement sweep.
//!
//! ## Quick Start
//!
//! ```rust
//! use collision3d::prelude::*;
//!
//! let shape = AnyShape::from(VertBox::new(Vec3::new(1.0, 1.0, 1.0)));
//! let player = Cylinder::new(1.8, 0.5);
//!
//! let contact = shape
//!     .cylinder_test_on_ground(&Transform::identity(), &player, Vec3::new(0.0, 3.0, 0.0))
//!     .expect("player stands above the box");
//! assert!((contact.offset_height - 1.0).abs() < 1e-6);
//!
//! let ray = RayInfo::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -10.0, 0.0));
//! let hit = shape.ray_test(&Transform::identity(), &ray).expect("ray hits the top face");
//! assert!((hit.near - 0.8).abs() < 1e-6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::{
            math::{Vec2, Vec3},
            rotation::Rotation,
            transform::Transform,
        },
        physics::collision::{
            AnyPrimitive, AnyShape, CollisionShape, CompoundPrimitive, Cylinder,
            GroundContact, HeightMap, HeightMapConfig, HeightMapError, MovementHit, Primitive,
            RampRectangle, RampTriangle, RayHit, RayInfo, Shape, ShapeType, Sphere, VertBox,
            VerticalCappedCone, VerticalTriangle,
        },
        spatial::Aabb,
    };
}

//! Physics module for collision detection
//!
//! Narrow-phase queries only: ray casts, ground snapping and cylinder
//! movement sweeps against a closed set of analytic shapes.

pub mod collision;

pub use collision::{
    AnyPrimitive,
    AnyShape,
    CollisionShape,
    CompoundPrimitive,
    RayHit,
    RayInfo,
};

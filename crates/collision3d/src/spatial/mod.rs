//! Spatial bounding volumes
//!
//! The collision shapes only need to hand an axis-aligned box to whatever
//! broad phase the caller runs; this module provides that box.

pub mod aabb;

pub use aabb::Aabb;

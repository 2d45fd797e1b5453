//! Foundation module - Core utilities and types
//!
//! This module provides the primitives every collision query builds on:
//! - Math type aliases and small vector helpers
//! - Vertical-axis rotation with a precomputed trigonometry table
//! - Rigid transforms (position plus rotation)
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod rotation;
pub mod transform;

//! Triangle used by ramp and terrain ray tests

use crate::foundation::math::{Vec3, EPSILON};

use super::ray::RayInfo;

/// A triangle in some local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    #[must_use]
    pub const fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized normal `(v1 - v0) × (v2 - v0)`
    #[must_use]
    pub fn scaled_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Möller–Trumbore ray-triangle intersection, both sides
    ///
    /// Returns `(t, u, v)` where `t` is the fraction of the ray's displacement
    /// and `u`, `v` are the barycentric weights of `v1` and `v2`. Only hits
    /// with `t ∈ [0, 1]` are returned.
    #[must_use]
    pub fn intersect_ray(&self, ray: &RayInfo) -> Option<(f32, f32, f32)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let dir = ray.dir();

        let h = dir.cross(&edge2);
        let a = edge1.dot(&h);
        // Scale the parallel check by the edge and ray lengths.
        if a.abs() <= EPSILON * edge1.norm() * edge2.norm() * ray.length() {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.start() - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * dir.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (0.0..=1.0).contains(&t).then_some((t, u, v))
    }

    /// Unit normal facing against the ray, or `None` for a degenerate triangle
    #[must_use]
    pub fn normal_facing(&self, ray: &RayInfo) -> Option<Vec3> {
        let n = self.scaled_normal().try_normalize(EPSILON)?;
        Some(if n.dot(&ray.dir()) > 0.0 { -n } else { n })
    }
}

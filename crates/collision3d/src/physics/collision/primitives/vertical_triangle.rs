//! Wall triangle standing in its local XY plane

use approx::abs_diff_eq;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{cross_2d, Vec2, Vec3, EPSILON};
use crate::foundation::transform::Transform;
use crate::physics::collision::convex::{convex_ray_test, Plane};
use crate::physics::collision::ray::RayInfo;
use crate::physics::collision::shape::{
    CollisionShape, GroundContact, MovementHit, RayHit,
};
use crate::spatial::Aabb;

use super::{Cylinder, ON_EDGE_FACTOR};

/// Zero-thickness triangle in the local plane `z = 0`
///
/// The first corner is the origin; `p1` and `p2` are `(x, y)` coordinates in
/// that plane. The unrotated face normal is `+z`. Degenerate triangles are
/// never hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalTriangle {
    /// Second corner `(x, y)`
    pub p1: Vec2,
    /// Third corner `(x, y)`
    pub p2: Vec2,
}

impl VerticalTriangle {
    /// Create a wall triangle
    #[must_use]
    pub const fn new(p1: Vec2, p2: Vec2) -> Self {
        Self { p1, p2 }
    }

    /// Corners in the local XY plane
    #[must_use]
    pub fn corners(&self) -> [Vec2; 3] {
        [Vec2::zeros(), self.p1, self.p2]
    }

    /// Twice the signed area; positive for counter-clockwise corners
    #[must_use]
    pub fn signed_double_area(&self) -> f32 {
        cross_2d(self.p1, self.p2)
    }

    /// Whether the corners are (nearly) collinear
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        abs_diff_eq!(self.signed_double_area(), 0.0, epsilon = EPSILON)
    }

    /// Whether a local `(x, y)` point lies inside or on the triangle
    #[must_use]
    pub fn contains_2d(&self, p: Vec2) -> bool {
        let area = self.signed_double_area();
        let pts = self.corners();
        (0..3).all(|i| {
            let a = pts[i];
            let b = pts[(i + 1) % 3];
            cross_2d(b - a, p - a) * area >= 0.0
        })
    }

    /// Outward unit normals and offsets of the three edges
    fn edges(&self) -> [(Vec2, f32); 3] {
        let orientation = self.signed_double_area().signum();
        let pts = self.corners();
        let mut edges = [(Vec2::zeros(), 0.0); 3];
        for (i, edge) in edges.iter_mut().enumerate() {
            let a = pts[i];
            let b = pts[(i + 1) % 3];
            let n = Vec2::new(b.y - a.y, a.x - b.x) * orientation;
            let n = n.try_normalize(EPSILON).unwrap_or_else(Vec2::zeros);
            *edge = (n, n.dot(&a));
        }
        edges
    }

    /// Highest point of the triangle above local `x`, with the upward normal
    /// of the edge that forms it
    fn top_profile(&self, x: f32) -> Option<(f32, Vec2)> {
        let pts = self.corners();
        let mut best: Option<(f32, Vec2)> = None;
        for i in 0..3 {
            let a = pts[i];
            let b = pts[(i + 1) % 3];
            let (lo, hi) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
            if x < lo || x > hi {
                continue;
            }
            let dx = b.x - a.x;
            let y = if dx.abs() < EPSILON {
                a.y.max(b.y)
            } else {
                a.y + (x - a.x) * (b.y - a.y) / dx
            };
            let mut n = Vec2::new(a.y - b.y, dx).try_normalize(EPSILON).unwrap_or_else(|| Vec2::new(0.0, 1.0));
            if n.y < 0.0 {
                n = -n;
            }
            if best.map_or(true, |(top, _)| y > top) {
                best = Some((y, n));
            }
        }
        best
    }

    /// Bounding planes of the volume a query cylinder's base must avoid
    ///
    /// In the wall plane this is the triangle grown by the query's side view
    /// `[-r, r] × [-height, 0]`; across the wall it spans `z ∈ [-r, r]`.
    fn movement_planes(&self, query: &Cylinder) -> [Plane; 9] {
        let r = query.radius;
        let h = query.height;
        let pts = self.corners();
        let (min_x, max_x) = pts.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        let (min_y, max_y) = pts.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let edge = |(n, offset): (Vec2, f32)| {
            let support = r * n.x.abs() + (-h * n.y).max(0.0);
            Plane::new(Vec3::new(n.x, n.y, 0.0), offset + support)
        };
        let edges = self.edges();
        [
            edge(edges[0]),
            edge(edges[1]),
            edge(edges[2]),
            Plane::new(Vec3::new(-1.0, 0.0, 0.0), -min_x + r),
            Plane::new(Vec3::new(1.0, 0.0, 0.0), max_x + r),
            Plane::new(Vec3::new(0.0, -1.0, 0.0), -min_y + h),
            Plane::new(Vec3::new(0.0, 1.0, 0.0), max_y),
            Plane::new(Vec3::new(0.0, 0.0, -1.0), r),
            Plane::new(Vec3::new(0.0, 0.0, 1.0), r),
        ]
    }
}

impl CollisionShape for VerticalTriangle {
    fn aabb(&self, trans: &Transform) -> Aabb {
        Aabb::from_points(
            self.corners()
                .iter()
                .map(|p| trans.apply(Vec3::new(p.x, p.y, 0.0))),
        )
    }

    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        if self.is_degenerate() {
            return None;
        }
        let start = ray.start();
        let dir = ray.dir();
        if dir.z.abs() < EPSILON * ray.length() {
            return None;
        }
        let near = -start.z / dir.z;
        if !(0.0..=1.0).contains(&near) {
            return None;
        }
        let p = ray.point_at(near);
        if !self.contains_2d(Vec2::new(p.x, p.y)) {
            return None;
        }
        Some(RayHit {
            near,
            normal: Vec3::new(0.0, 0.0, -dir.z.signum()),
        })
    }

    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact> {
        if self.is_degenerate() {
            return None;
        }
        let local = trans.to_local(pos);
        if local.z.abs() > cylinder.radius {
            return None;
        }
        let pts = self.corners();
        let min_x = pts.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = pts.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let beyond = (min_x - local.x).max(local.x - max_x);
        if beyond > cylinder.radius * ON_EDGE_FACTOR {
            return None;
        }
        let (top, n) = self.top_profile(local.x.clamp(min_x, max_x))?;
        Some(GroundContact {
            offset_height: local.y - top,
            normal: trans.rot.rotate(Vec3::new(n.x, n.y, 0.0)),
            on_edge: beyond > 0.0,
        })
    }

    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit> {
        if self.is_degenerate() || movement.is_degenerate() {
            return None;
        }
        let local = trans.ray_to_local(movement);
        convex_ray_test(&self.movement_planes(cylinder), &local)
            .map(|hit| MovementHit::from(hit.to_world(trans)))
    }
}

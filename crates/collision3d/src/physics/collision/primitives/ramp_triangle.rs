//! Inclined triangle with one horizontal edge

use serde::{Deserialize, Serialize};

use crate::foundation::math::{horizontal, Vec2, Vec3, EPSILON};
use crate::foundation::transform::Transform;
use crate::physics::collision::convex::{convex_ray_test, Plane};
use crate::physics::collision::ray::RayInfo;
use crate::physics::collision::shape::{CollisionShape, GroundContact, MovementHit, RayHit};
use crate::physics::collision::triangle::Triangle;
use crate::spatial::Aabb;

use super::{Cylinder, ON_EDGE_FACTOR};

/// Equilateral-footprint ramp triangle
///
/// Origin at the center of the horizontal edge `(-s/2, 0, 0) .. (s/2, 0, 0)`;
/// the third vertex is at `(0, height_of_vertex_on_z, s·√3/2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampTriangle {
    /// Length of each side of the horizontal footprint
    pub side_length: f32,
    /// Height of the vertex on +z above the horizontal edge
    pub height_of_vertex_on_z: f32,
}

impl RampTriangle {
    /// Create a ramp triangle
    #[must_use]
    pub const fn new(side_length: f32, height_of_vertex_on_z: f32) -> Self {
        Self {
            side_length,
            height_of_vertex_on_z,
        }
    }

    /// Depth of the footprint along z
    #[must_use]
    pub fn depth(&self) -> f32 {
        self.side_length * 3.0_f32.sqrt() * 0.5
    }

    /// Local vertices
    #[must_use]
    pub fn triangle(&self) -> Triangle {
        let half = self.side_length * 0.5;
        Triangle::new(
            Vec3::new(-half, 0.0, 0.0),
            Vec3::new(half, 0.0, 0.0),
            Vec3::new(0.0, self.height_of_vertex_on_z, self.depth()),
        )
    }

    /// Rise per unit of z
    #[must_use]
    pub fn slope(&self) -> f32 {
        let depth = self.depth();
        if depth > EPSILON {
            self.height_of_vertex_on_z / depth
        } else {
            0.0
        }
    }

    /// Local unit normal of the upper side
    #[must_use]
    pub fn surface_normal(&self) -> Vec3 {
        Vec3::new(0.0, 1.0, -self.slope()).normalize()
    }

    /// Footprint corners in `(x, z)`, counter-clockwise
    fn footprint(&self) -> [Vec2; 3] {
        let tri = self.triangle();
        [horizontal(tri.v0), horizontal(tri.v1), horizontal(tri.v2)]
    }

    /// Outward edge normals of the footprint with each edge's offset
    fn footprint_edges(&self) -> [(Vec2, f32); 3] {
        let pts = self.footprint();
        let mut edges = [(Vec2::zeros(), 0.0); 3];
        for (i, edge) in edges.iter_mut().enumerate() {
            let a = pts[i];
            let b = pts[(i + 1) % 3];
            let n = Vec2::new(b.y - a.y, a.x - b.x).normalize();
            *edge = (n, n.dot(&a));
        }
        edges
    }

    /// Greatest signed distance of a local `(x, z)` point outside any edge
    fn distance_outside(&self, p: Vec2) -> f32 {
        self.footprint_edges()
            .iter()
            .map(|(n, offset)| n.dot(&p) - offset)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Bounding planes of the volume a query cylinder's base must avoid
    ///
    /// Sides are pushed out by the query radius. The top is the surface
    /// raised by `|slope| · radius`; the bottom is the surface lowered by
    /// the query height plus the same amount.
    fn movement_planes(&self, query: &Cylinder) -> [Plane; 5] {
        let up = self.surface_normal();
        let spread = self.slope().abs() * query.radius * up.y;
        let edges = self.footprint_edges();
        let side = |(n, offset): (Vec2, f32)| Plane::new(Vec3::new(n.x, 0.0, n.y), offset + query.radius);
        [
            side(edges[0]),
            side(edges[1]),
            side(edges[2]),
            Plane::new(up, spread),
            Plane::new(-up, spread + query.height * up.y),
        ]
    }
}

impl CollisionShape for RampTriangle {
    fn aabb(&self, trans: &Transform) -> Aabb {
        let tri = self.triangle();
        Aabb::from_points([trans.apply(tri.v0), trans.apply(tri.v1), trans.apply(tri.v2)])
    }

    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        let tri = self.triangle();
        let (near, _, _) = tri.intersect_ray(ray)?;
        Some(RayHit {
            near,
            normal: tri.normal_facing(ray)?,
        })
    }

    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact> {
        let local = trans.to_local(pos);
        let outside = self.distance_outside(horizontal(local));
        if outside > cylinder.radius * ON_EDGE_FACTOR {
            return None;
        }
        let surface = local.z.clamp(0.0, self.depth()) * self.slope();
        Some(GroundContact {
            offset_height: local.y - surface,
            normal: trans.rot.rotate(self.surface_normal()),
            on_edge: outside > 0.0,
        })
    }

    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit> {
        if movement.is_degenerate() || self.depth() <= EPSILON {
            return None;
        }
        let local = trans.ray_to_local(movement);
        convex_ray_test(&self.movement_planes(cylinder), &local)
            .map(|hit| MovementHit::from(hit.to_world(trans)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::rotation::Rotation;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn ramp() -> RampTriangle {
        RampTriangle::new(2.0, 1.0)
    }

    #[test]
    fn test_vertical_ray_hits_surface() {
        let ray = RayInfo::new(Vec3::new(0.0, 5.0, 0.5), Vec3::new(0.0, -5.0, 0.5));
        let hit = ramp().ray_test(&Transform::identity(), &ray).expect("on the footprint");
        let surface = 0.5 / 3.0_f32.sqrt();
        assert_relative_eq!(hit.near, (5.0 - surface) / 10.0, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, ramp().surface_normal(), epsilon = EPSILON);
    }

    #[test]
    fn test_ray_from_below_faces_down() {
        let ray = RayInfo::new(Vec3::new(0.0, -5.0, 0.5), Vec3::new(0.0, 5.0, 0.5));
        let hit = ramp().ray_test(&Transform::identity(), &ray).expect("hit underside");
        assert!(hit.normal.y < 0.0);
    }

    #[test]
    fn test_ray_outside_footprint_misses() {
        let ray = RayInfo::new(Vec3::new(1.5, 5.0, 0.5), Vec3::new(1.5, -5.0, 0.5));
        assert!(ramp().ray_test(&Transform::identity(), &ray).is_none());
    }

    #[test]
    fn test_on_ground_plane_height() {
        let query = Cylinder::new(1.8, 0.5);
        let trans = Transform::new(Vec3::new(3.0, 1.0, 0.0), Rotation::from_degrees(180.0));
        // Local (0, 1) lies at world (3, -1) after the half turn.
        let contact = ramp()
            .cylinder_test_on_ground(&trans, &query, Vec3::new(3.0, 3.0, -1.0))
            .expect("inside the footprint");
        assert_relative_eq!(contact.offset_height, 2.0 - 1.0 / 3.0_f32.sqrt(), epsilon = EPSILON);
        assert!(!contact.on_edge);
        assert!(contact.normal.z > 0.0);
    }

    #[test]
    fn test_on_ground_edge_margin() {
        let query = Cylinder::new(1.8, 0.5);
        let id = Transform::identity();
        let edge = ramp()
            .cylinder_test_on_ground(&id, &query, Vec3::new(0.0, 1.0, -0.2))
            .expect("just in front of the low edge");
        assert!(edge.on_edge);
        assert_relative_eq!(edge.offset_height, 1.0);
        assert!(ramp().cylinder_test_on_ground(&id, &query, Vec3::new(0.0, 1.0, -0.3)).is_none());
    }

    #[test]
    fn test_movement_up_the_slope() {
        let query = Cylinder::new(1.8, 0.5);
        let walk = RayInfo::new(Vec3::new(0.0, 0.1, -5.0), Vec3::new(0.0, 0.1, 5.0));
        let hit = ramp()
            .cylinder_test_movement(&Transform::identity(), &query, &walk)
            .expect("slope blocks");
        let k = 1.0 / 3.0_f32.sqrt();
        let z_entry = (0.1 - k * 0.5) / k;
        assert_relative_eq!(hit.valid_movement_factor, (z_entry + 5.0) / 10.0, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, ramp().surface_normal(), epsilon = EPSILON);

        let over = RayInfo::new(Vec3::new(0.0, 5.0, -5.0), Vec3::new(0.0, 5.0, 5.0));
        assert!(ramp().cylinder_test_movement(&Transform::identity(), &query, &over).is_none());
    }

    #[test]
    fn test_aabb_contains_vertices() {
        let trans = Transform::new(Vec3::new(1.0, 0.5, 2.0), Rotation::from_steps(33));
        let aabb = ramp().aabb(&trans).expanded(EPSILON);
        let tri = ramp().triangle();
        for v in [tri.v0, tri.v1, tri.v2] {
            assert!(aabb.contains_point(trans.apply(v)));
        }
        assert_relative_eq!(aabb.max.y, 1.5, epsilon = 1e-4);
    }
}

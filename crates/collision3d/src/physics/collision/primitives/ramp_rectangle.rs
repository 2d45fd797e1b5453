//! Thick inclined slab

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Vec3, EPSILON};
use crate::foundation::transform::Transform;
use crate::physics::collision::convex::{convex_ray_test, Plane};
use crate::physics::collision::ray::RayInfo;
use crate::physics::collision::shape::{CollisionShape, GroundContact, MovementHit, RayHit};
use crate::spatial::Aabb;

use super::{Cylinder, ON_EDGE_FACTOR};

/// Ramp with its origin at the center of the slab
///
/// The mid surface is `y = z · half_height_skewness / half_depth` over
/// `|x| <= half_width`, `|z| <= half_depth`, thickened vertically by
/// `half_thickness` on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampRectangle {
    /// Half extent along x
    pub half_width: f32,
    /// Rise of the mid surface from the center to the `+z` edge
    pub half_height_skewness: f32,
    /// Half extent along z
    pub half_depth: f32,
    /// Half of the vertical thickness
    pub half_thickness: f32,
}

impl RampRectangle {
    /// Create a ramp
    #[must_use]
    pub const fn new(half_width: f32, half_height_skewness: f32, half_depth: f32, half_thickness: f32) -> Self {
        Self {
            half_width,
            half_height_skewness,
            half_depth,
            half_thickness,
        }
    }

    /// Rise per unit of z
    #[must_use]
    pub fn slope(&self) -> f32 {
        if self.half_depth > EPSILON {
            self.half_height_skewness / self.half_depth
        } else {
            0.0
        }
    }

    /// Local unit normal of the top surface
    #[must_use]
    pub fn surface_normal(&self) -> Vec3 {
        Vec3::new(0.0, self.half_depth, -self.half_height_skewness).normalize()
    }

    /// Bounding planes: four sides, then top and bottom
    #[must_use]
    pub fn planes(&self) -> [Plane; 6] {
        let top = self.surface_normal();
        // Vertical thickness measured along the tilted normal.
        let offset = self.half_thickness * top.y;
        [
            Plane::new(Vec3::new(0.0, 0.0, -1.0), self.half_depth),
            Plane::new(Vec3::new(1.0, 0.0, 0.0), self.half_width),
            Plane::new(Vec3::new(0.0, 0.0, 1.0), self.half_depth),
            Plane::new(Vec3::new(-1.0, 0.0, 0.0), self.half_width),
            Plane::new(top, offset),
            Plane::new(-top, offset),
        ]
    }

    /// Local height of the top surface at `z`, clamped to the footprint
    #[must_use]
    pub fn top_at(&self, z: f32) -> f32 {
        z.clamp(-self.half_depth, self.half_depth) * self.slope() + self.half_thickness
    }

    /// Minkowski sum with a query cylinder whose base sweeps the movement ray
    ///
    /// The slope is kept. A disk of radius `r` raises a sloped top by
    /// `|slope| · r`, so the thickness grows by that and by half the query
    /// height. The result must be placed half the query height lower.
    #[must_use]
    pub fn inflated_by(&self, query: &Cylinder) -> Self {
        let slope = self.slope();
        let half_depth = self.half_depth + query.radius;
        Self {
            half_width: self.half_width + query.radius,
            half_height_skewness: slope * half_depth,
            half_depth,
            half_thickness: self.half_thickness + 0.5 * query.height + slope.abs() * query.radius,
        }
    }
}

impl CollisionShape for RampRectangle {
    fn aabb(&self, trans: &Transform) -> Aabb {
        let (w, hs, d, t) = (
            self.half_width,
            self.half_height_skewness,
            self.half_depth,
            self.half_thickness,
        );
        let mut corners = Vec::with_capacity(8);
        for x in [-w, w] {
            for (z, mid) in [(-d, -hs), (d, hs)] {
                corners.push(trans.apply(Vec3::new(x, mid - t, z)));
                corners.push(trans.apply(Vec3::new(x, mid + t, z)));
            }
        }
        Aabb::from_points(corners)
    }

    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        convex_ray_test(&self.planes(), ray)
    }

    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact> {
        let local = trans.to_local(pos);
        let beyond_x = local.x.abs() - self.half_width;
        let beyond_z = local.z.abs() - self.half_depth;
        let margin = cylinder.radius * ON_EDGE_FACTOR;
        if beyond_x > margin || beyond_z > margin {
            return None;
        }
        Some(GroundContact {
            offset_height: local.y - self.top_at(local.z),
            normal: trans.rot.rotate(self.surface_normal()),
            on_edge: beyond_x > 0.0 || beyond_z > 0.0,
        })
    }

    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit> {
        if self.half_depth <= EPSILON {
            return None;
        }
        self.inflated_by(cylinder)
            .ray_test(&trans.raised(-0.5 * cylinder.height), movement)
            .map(MovementHit::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::rotation::Rotation;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn ramp() -> RampRectangle {
        RampRectangle::new(2.0, 1.0, 2.0, 0.1)
    }

    #[test]
    fn test_vertical_ray_hits_slope() {
        let ray = RayInfo::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -5.0, 0.0));
        let hit = ramp().ray_test(&Transform::identity(), &ray).expect("falls onto the ramp");
        assert_relative_eq!(hit.near, 0.49, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 2.0, -1.0).normalize(), epsilon = EPSILON);

        let high_end = RayInfo::new(Vec3::new(1.0, 5.0, 1.5), Vec3::new(1.0, -5.0, 1.5));
        let hit = ramp().ray_test(&Transform::identity(), &high_end).expect("hit");
        assert_relative_eq!(high_end.point_at(hit.near).y, 0.85, epsilon = EPSILON);
    }

    #[test]
    fn test_ray_misses_beside_ramp() {
        let ray = RayInfo::new(Vec3::new(2.5, 5.0, 0.0), Vec3::new(2.5, -5.0, 0.0));
        assert!(ramp().ray_test(&Transform::identity(), &ray).is_none());
    }

    #[test]
    fn test_ray_side_face_rotated() {
        let trans = Transform::new(Vec3::new(0.0, 0.0, 0.0), Rotation::from_degrees(90.0));
        // Local +x face (x = 2) maps to world -z.
        let ray = RayInfo::new(Vec3::new(0.0, 0.0, -6.0), Vec3::new(0.0, 0.0, 0.0));
        let hit = ramp().ray_test(&trans, &ray).expect("side face");
        assert_relative_eq!(hit.near, 4.0 / 6.0, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_on_ground_interpolates_along_z() {
        let r = ramp();
        let query = Cylinder::new(1.8, 0.5);
        let trans = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));

        let middle = r.cylinder_test_on_ground(&trans, &query, Vec3::new(0.0, 3.0, 0.0)).expect("middle");
        assert_relative_eq!(middle.offset_height, 1.9, epsilon = EPSILON);
        assert!(!middle.on_edge);

        let upper = r.cylinder_test_on_ground(&trans, &query, Vec3::new(0.0, 3.0, 1.0)).expect("upper");
        assert_relative_eq!(upper.offset_height, 1.4, epsilon = EPSILON);
        assert_relative_eq!(upper.normal, r.surface_normal(), epsilon = EPSILON);
    }

    #[test]
    fn test_on_ground_edge_margin() {
        let r = ramp();
        let query = Cylinder::new(1.8, 0.5);
        let id = Transform::identity();
        let edge = r.cylinder_test_on_ground(&id, &query, Vec3::new(0.0, 2.0, 2.2)).expect("within margin");
        assert!(edge.on_edge);
        assert_relative_eq!(edge.offset_height, 2.0 - 1.1, epsilon = EPSILON);
        assert!(r.cylinder_test_on_ground(&id, &query, Vec3::new(0.0, 2.0, 2.3)).is_none());
        assert!(r.cylinder_test_on_ground(&id, &query, Vec3::new(2.3, 2.0, 0.0)).is_none());
    }

    #[test]
    fn test_movement_against_slope() {
        let r = ramp();
        let query = Cylinder::new(1.8, 0.5);
        let walk = RayInfo::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0));
        let hit = r.cylinder_test_movement(&Transform::identity(), &query, &walk).expect("blocked");
        assert_relative_eq!(hit.valid_movement_factor, 0.43, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, r.surface_normal(), epsilon = EPSILON);

        let over = RayInfo::new(Vec3::new(0.0, 5.0, -5.0), Vec3::new(0.0, 5.0, 5.0));
        assert!(r.cylinder_test_movement(&Transform::identity(), &query, &over).is_none());
    }

    #[test]
    fn test_aabb_contains_hits() {
        let r = ramp();
        let trans = Transform::new(Vec3::new(1.0, 2.0, -1.0), Rotation::from_steps(25));
        let aabb = r.aabb(&trans).expanded(EPSILON);
        for (x, z) in [(0.0, 0.0), (1.5, 1.5), (-1.9, -1.9), (1.0, -0.5)] {
            let target = trans.apply(Vec3::new(x, 0.0, z));
            let ray = RayInfo::new(target + Vec3::new(0.0, 6.0, 0.0), target - Vec3::new(0.0, 6.0, 0.0));
            let hit = r.ray_test(&trans, &ray).expect("aimed at the ramp");
            assert!(aabb.contains_point(ray.point_at(hit.near)));
        }
    }
}

//! Box standing upright on its base

use serde::{Deserialize, Serialize};

use crate::foundation::math::{horizontal, max_component_2d, up, Vec2, Vec3};
use crate::foundation::rotation::Rotation;
use crate::foundation::transform::Transform;
use crate::physics::collision::convex::slab_ray_test;
use crate::physics::collision::ray::RayInfo;
use crate::physics::collision::shape::{CollisionShape, GroundContact, MovementHit, RayHit};
use crate::spatial::Aabb;

use super::Cylinder;

/// Box with its origin at the center of the base
///
/// Occupies `[-hx, 0, -hz] .. [hx, 2·hy, hz]` in local space. Works both as a
/// wall and as a floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertBox {
    /// Half size along each local axis
    pub half_extents: Vec3,
}

impl VertBox {
    /// Create a box from its half extents
    #[must_use]
    pub const fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// Local minimum corner
    #[must_use]
    pub fn local_min(&self) -> Vec3 {
        Vec3::new(-self.half_extents.x, 0.0, -self.half_extents.z)
    }

    /// Local maximum corner
    #[must_use]
    pub fn local_max(&self) -> Vec3 {
        Vec3::new(self.half_extents.x, 2.0 * self.half_extents.y, self.half_extents.z)
    }

    /// Height of the top face above the base
    #[must_use]
    pub fn height(&self) -> f32 {
        2.0 * self.half_extents.y
    }

    /// World-space horizontal half extents of the rotated footprint
    ///
    /// A box is unchanged by a half turn, and a quarter turn only swaps its x
    /// and z extents, so the rotation folds into `[0°, 90°)` where cos and sin
    /// are both non-negative.
    fn rotated_half_extents(&self, rot: Rotation) -> Vec2 {
        let quarter = Rotation::STEPS / 4;
        let mut steps = u16::from(rot.value()) % (Rotation::STEPS / 2);
        let (mut hx, mut hz) = (self.half_extents.x, self.half_extents.z);
        if steps >= quarter {
            steps -= quarter;
            std::mem::swap(&mut hx, &mut hz);
        }
        let (c, s) = Rotation::from_steps(i32::from(steps)).cos_sin();
        Vec2::new(c * hx + s * hz, s * hx + c * hz)
    }
}

impl CollisionShape for VertBox {
    fn aabb(&self, trans: &Transform) -> Aabb {
        let e = self.rotated_half_extents(trans.rot);
        Aabb::new(
            trans.pos + Vec3::new(-e.x, 0.0, -e.y),
            trans.pos + Vec3::new(e.x, self.height(), e.y),
        )
    }

    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        slab_ray_test(self.local_min(), self.local_max(), ray)
    }

    /// The query footprint is the disk of the query cylinder's radius,
    /// tested against the box footprint as a rounded rectangle.
    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact> {
        let local = horizontal(trans.to_local(pos));
        let d = local.abs() - Vec2::new(self.half_extents.x, self.half_extents.z);
        let inner = max_component_2d(d).min(0.0);
        let reach = cylinder.radius - inner;
        let outside = d.sup(&Vec2::zeros());
        if outside.norm_squared() >= reach * reach {
            return None;
        }
        Some(GroundContact {
            offset_height: pos.y - trans.pos.y - self.height(),
            normal: up(),
            on_edge: d.x > 0.0 || d.y > 0.0,
        })
    }

    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit> {
        if movement.is_degenerate() {
            return None;
        }
        let grow = Vec3::new(cylinder.radius, cylinder.height, cylinder.radius);
        let min = self.local_min() - grow;
        let max = self.local_max() + Vec3::new(cylinder.radius, 0.0, cylinder.radius);
        let local = trans.ray_to_local(movement);
        slab_ray_test(min, max, &local)
            .map(|hit| MovementHit::from(hit.to_world(trans)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn unit_box() -> VertBox {
        VertBox::new(Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_box_on_flat_ground() {
        let contact = unit_box()
            .cylinder_test_on_ground(&Transform::identity(), &Cylinder::new(1.0, 0.5), Vec3::new(0.0, 3.0, 0.0))
            .expect("standing on the box");
        assert_relative_eq!(contact.offset_height, 1.0);
        assert_relative_eq!(contact.normal, Vec3::new(0.0, 1.0, 0.0));
        assert!(!contact.on_edge);
    }

    #[test]
    fn test_on_ground_rounded_corner() {
        let b = unit_box();
        let id = Transform::identity();
        let query = Cylinder::new(1.0, 0.5);
        // 0.3 past both edges: corner distance 0.42 < 0.5
        let corner = b.cylinder_test_on_ground(&id, &query, Vec3::new(1.3, 2.0, 1.3)).expect("corner");
        assert!(corner.on_edge);
        // 0.4 past both edges: corner distance 0.57 > 0.5
        assert!(b.cylinder_test_on_ground(&id, &query, Vec3::new(1.4, 2.0, 1.4)).is_none());
        assert!(b.cylinder_test_on_ground(&id, &query, Vec3::new(1.45, 2.0, 0.0)).is_some());
    }

    #[test]
    fn test_on_ground_respects_rotation() {
        let b = VertBox::new(Vec3::new(3.0, 1.0, 0.5));
        let query = Cylinder::new(1.0, 0.1);
        let turned = Transform::new(Vec3::zeros(), Rotation::from_degrees(90.0));
        // Long axis now runs along world z.
        assert!(b.cylinder_test_on_ground(&turned, &query, Vec3::new(0.0, 2.0, 2.5)).is_some());
        assert!(b.cylinder_test_on_ground(&turned, &query, Vec3::new(2.5, 2.0, 0.0)).is_none());
    }

    #[test]
    fn test_ray_hits_top_face() {
        let trans = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
        let ray = RayInfo::new(Vec3::new(0.2, 10.0, 0.3), Vec3::new(0.2, 0.0, 0.3));
        let hit = unit_box().ray_test(&trans, &ray).expect("top face");
        assert_relative_eq!(hit.near, 0.7, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_ray_normal_rotates_to_world() {
        let b = VertBox::new(Vec3::new(1.0, 1.0, 2.0));
        let trans = Transform::new(Vec3::zeros(), Rotation::from_degrees(90.0));
        // Rotated by 90°, the local -z face (z = -2) faces world -x.
        let ray = RayInfo::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let hit = b.ray_test(&trans, &ray).expect("side hit");
        assert_relative_eq!(hit.near, 0.6, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_aabb_folds_rotation() {
        let b = VertBox::new(Vec3::new(2.0, 1.0, 1.0));
        let pos = Vec3::new(1.0, 1.0, 1.0);
        for (degrees, ex, ez) in [(0.0, 2.0, 1.0), (90.0, 1.0, 2.0), (180.0, 2.0, 1.0), (270.0, 1.0, 2.0)] {
            let aabb = b.aabb(&Transform::new(pos, Rotation::from_degrees(degrees)));
            assert_relative_eq!(aabb.min, pos - Vec3::new(ex, 0.0, ez), epsilon = EPSILON);
            assert_relative_eq!(aabb.max, pos + Vec3::new(ex, 2.0, ez), epsilon = EPSILON);
        }

        let diag = b.aabb(&Transform::new(Vec3::zeros(), Rotation::from_degrees(45.0)));
        let expected = 3.0 * std::f32::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(diag.max.x, expected, epsilon = EPSILON);
        assert_relative_eq!(diag.max.z, expected, epsilon = EPSILON);
    }

    #[test]
    fn test_aabb_contains_rotated_corners() {
        let b = VertBox::new(Vec3::new(2.0, 0.5, 0.7));
        for steps in (0..240).step_by(7) {
            let trans = Transform::new(Vec3::new(3.0, -1.0, 2.0), Rotation::from_steps(steps));
            let aabb = b.aabb(&trans).expanded(EPSILON);
            for x in [-2.0, 2.0] {
                for z in [-0.7, 0.7] {
                    for y in [0.0, 1.0] {
                        assert!(aabb.contains_point(trans.apply(Vec3::new(x, y, z))));
                    }
                }
            }
        }
    }

    #[test]
    fn test_movement_into_wall() {
        let wall = VertBox::new(Vec3::new(0.5, 1.0, 5.0));
        let query = Cylinder::new(1.8, 0.5);
        let walk = RayInfo::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0));
        let hit = wall
            .cylinder_test_movement(&Transform::identity(), &query, &walk)
            .expect("wall blocks");
        assert_relative_eq!(hit.valid_movement_factor, 0.4, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));

        // Walking below a floating box whose bottom is above the query's head.
        let floating = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        assert!(wall.cylinder_test_movement(&floating, &query, &walk).is_none());
    }
}

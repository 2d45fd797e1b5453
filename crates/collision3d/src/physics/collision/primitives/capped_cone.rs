//! Vertical capped cone (frustum)

use serde::{Deserialize, Serialize};

use crate::foundation::math::{horizontal, up, Vec3, EPSILON};
use crate::foundation::transform::Transform;
use crate::physics::collision::ray::RayInfo;
use crate::physics::collision::shape::{
    fraction_in_range, CollisionShape, GroundContact, MovementHit, RayHit,
};
use crate::spatial::Aabb;

use super::Cylinder;

/// Frustum with its origin at the center of the base
///
/// The radius changes linearly from `bottom_radius` at `y = 0` to
/// `top_radius` at `y = height`. Either radius may be the larger one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalCappedCone {
    /// Height above the base
    pub height: f32,
    /// Radius at the base
    pub bottom_radius: f32,
    /// Radius at the top
    pub top_radius: f32,
}

impl VerticalCappedCone {
    /// Create a capped cone
    #[must_use]
    pub const fn new(height: f32, bottom_radius: f32, top_radius: f32) -> Self {
        Self {
            height,
            bottom_radius,
            top_radius,
        }
    }

    /// Radius lost per unit of height
    fn taper(&self) -> f32 {
        if self.height > EPSILON {
            (self.bottom_radius - self.top_radius) / self.height
        } else {
            0.0
        }
    }

    /// Radius of the slice at local height `y`
    #[must_use]
    pub fn radius_at(&self, y: f32) -> f32 {
        self.bottom_radius - self.taper() * y
    }

    /// Whether a local point is inside or on the surface
    #[must_use]
    pub fn contains_local(&self, p: Vec3) -> bool {
        if p.y < 0.0 || p.y > self.height {
            return false;
        }
        let r = self.radius_at(p.y);
        horizontal(p).norm_squared() <= r * r
    }

    /// Outward normal of the slanted side at a local point
    fn side_normal(&self, p: Vec3) -> Vec3 {
        let radial = horizontal(p).try_normalize(EPSILON);
        radial.map_or_else(up, |d| Vec3::new(d.x, self.taper(), d.y).normalize())
    }

    /// Local height of the surface at horizontal distance `rho` from the axis
    fn surface_at(&self, rho: f32) -> Option<(f32, bool)> {
        if rho <= self.top_radius {
            return Some((self.height, false));
        }
        let taper = self.taper();
        if rho <= self.bottom_radius && taper > EPSILON {
            return Some(((self.bottom_radius - rho) / taper, true));
        }
        None
    }

    /// Entry parameter and local normal of the nearest boundary crossing,
    /// in world units along the unit direction
    fn first_crossing(&self, o: Vec3, u: Vec3) -> Option<(f32, Vec3)> {
        let mut best: Option<(f32, Vec3)> = None;
        let mut consider = |t: f32, normal: Vec3| {
            if t >= 0.0 && best.map_or(true, |(b, _)| t < b) {
                best = Some((t, normal));
            }
        };

        if u.y.abs() > EPSILON {
            for (cap_y, radius, normal_y) in [
                (0.0, self.bottom_radius, -1.0),
                (self.height, self.top_radius, 1.0),
            ] {
                let t = (cap_y - o.y) / u.y;
                let p = o + u * t;
                if horizontal(p).norm_squared() <= radius * radius {
                    consider(t, Vec3::new(0.0, normal_y, 0.0));
                }
            }
        }

        // x² + z² = (w - g·u.y·t)² with w the radius at the start height.
        let g = self.taper();
        let w = self.radius_at(o.y);
        let a = u.x * u.x + u.z * u.z - g * g * u.y * u.y;
        let b = 2.0 * (o.x * u.x + o.z * u.z + w * g * u.y);
        let c = o.x * o.x + o.z * o.z - w * w;
        let mut roots = [f32::NAN; 2];
        if a.abs() < EPSILON {
            if b.abs() > EPSILON {
                roots[0] = -c / b;
            }
        } else {
            let disc = b * b - 4.0 * a * c;
            if disc >= 0.0 {
                let s = disc.sqrt();
                roots = [(-b - s) / (2.0 * a), (-b + s) / (2.0 * a)];
            }
        }
        for t in roots.into_iter().filter(|t| t.is_finite()) {
            let p = o + u * t;
            if (0.0..=self.height).contains(&p.y) {
                consider(t, self.side_normal(p));
            }
        }

        best
    }
}

impl CollisionShape for VerticalCappedCone {
    fn aabb(&self, trans: &Transform) -> Aabb {
        let r = self.bottom_radius.max(self.top_radius);
        Aabb::new(
            trans.pos - Vec3::new(r, 0.0, r),
            trans.pos + Vec3::new(r, self.height, r),
        )
    }

    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        if self.contains_local(ray.start()) {
            return Some(RayHit::interior(ray));
        }
        let (t, normal) = self.first_crossing(ray.start(), ray.dir_normalized())?;
        let near = fraction_in_range(t, ray)?;
        Some(RayHit { near, normal })
    }

    /// The highest point of the cone under the query's footprint disk
    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact> {
        let local = trans.to_local(pos);
        let rho = horizontal(local).norm();
        let nearest = (rho - cylinder.radius).max(0.0);
        let (surface, on_side) = self.surface_at(nearest)?;
        let normal = if on_side {
            self.side_normal(Vec3::new(local.x, surface, local.z))
        } else {
            up()
        };
        Some(GroundContact {
            offset_height: local.y - surface,
            normal: trans.rot.rotate(normal),
            on_edge: rho > self.bottom_radius.max(self.top_radius),
        })
    }

    /// The swept volume is the cone grown by the query radius plus a
    /// cylinder covering the query height below the cone's widest slice.
    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit> {
        let cone = Self::new(
            self.height,
            self.bottom_radius + cylinder.radius,
            self.top_radius + cylinder.radius,
        );
        let (cone_trans, block, block_trans) = if self.bottom_radius >= self.top_radius {
            (
                *trans,
                Cylinder::new(cylinder.height, cone.bottom_radius),
                trans.raised(-cylinder.height),
            )
        } else {
            (
                trans.raised(-cylinder.height),
                Cylinder::new(cylinder.height, cone.top_radius),
                trans.raised(self.height - cylinder.height),
            )
        };
        let hits = [
            cone.ray_test(&cone_trans, movement),
            block.ray_test(&block_trans, movement),
        ];
        hits.into_iter()
            .flatten()
            .min_by(|a, b| a.near.total_cmp(&b.near))
            .map(MovementHit::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::rotation::Rotation;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn cone() -> VerticalCappedCone {
        VerticalCappedCone::new(2.0, 2.0, 1.0)
    }

    fn slope_normal(sign_x: f32) -> Vec3 {
        Vec3::new(sign_x, 0.5, 0.0).normalize()
    }

    #[test]
    fn test_vertical_rays() {
        let id = Transform::identity();
        let axis = RayInfo::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 0.0, 0.0));
        let hit = cone().ray_test(&id, &axis).expect("top cap");
        assert_relative_eq!(hit.near, 0.8, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 1.0, 0.0));

        let slope = RayInfo::new(Vec3::new(1.5, 10.0, 0.0), Vec3::new(1.5, 0.0, 0.0));
        let hit = cone().ray_test(&id, &slope).expect("slanted side");
        assert_relative_eq!(hit.near, 0.9, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, slope_normal(1.0), epsilon = EPSILON);

        let below = RayInfo::new(Vec3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 5.0, 0.0));
        let hit = cone().ray_test(&id, &below).expect("bottom cap");
        assert_relative_eq!(hit.near, 0.5, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_horizontal_rays() {
        let id = Transform::identity();
        let side = RayInfo::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0));
        let hit = cone().ray_test(&id, &side).expect("side");
        assert_relative_eq!(hit.near, 0.35, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, slope_normal(-1.0), epsilon = EPSILON);

        let above = RayInfo::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::new(5.0, 3.0, 0.0));
        assert!(cone().ray_test(&id, &above).is_none());
    }

    #[test]
    fn test_inverted_cone_overhang() {
        let funnel = VerticalCappedCone::new(2.0, 0.5, 2.0);
        let ray = RayInfo::new(Vec3::new(1.5, -5.0, 0.0), Vec3::new(1.5, 5.0, 0.0));
        let hit = funnel.ray_test(&Transform::identity(), &ray).expect("underside of the overhang");
        // Radius 1.5 is reached at y = 4/3.
        assert_relative_eq!(ray.point_at(hit.near).y, 4.0 / 3.0, epsilon = 1e-4);
        assert!(hit.normal.y < 0.0);
    }

    #[test]
    fn test_on_ground() {
        let query = Cylinder::new(1.8, 0.5);
        let trans = Transform::new(Vec3::new(0.0, 1.0, 0.0), Rotation::from_steps(12));

        let top = cone().cylinder_test_on_ground(&trans, &query, Vec3::new(0.0, 4.0, 0.0)).expect("top");
        assert_relative_eq!(top.offset_height, 1.0, epsilon = EPSILON);
        assert_relative_eq!(top.normal, Vec3::new(0.0, 1.0, 0.0));

        let side = cone().cylinder_test_on_ground(&trans, &query, Vec3::new(0.0, 4.0, 2.0)).expect("slope");
        assert_relative_eq!(side.offset_height, 2.0, epsilon = EPSILON);
        assert!(side.normal.y > 0.0 && side.normal.z > 0.0);
        assert!(!side.on_edge);

        let rim = cone().cylinder_test_on_ground(&trans, &query, Vec3::new(0.0, 4.0, 2.4)).expect("rim");
        assert!(rim.on_edge);
        assert!(cone().cylinder_test_on_ground(&trans, &query, Vec3::new(0.0, 4.0, 2.6)).is_none());
    }

    #[test]
    fn test_movement() {
        let query = Cylinder::new(1.8, 0.5);
        let id = Transform::identity();

        let low = RayInfo::new(Vec3::new(-5.0, -0.5, 0.0), Vec3::new(5.0, -0.5, 0.0));
        let hit = cone().cylinder_test_movement(&id, &query, &low).expect("head bumps the base");
        assert_relative_eq!(hit.valid_movement_factor, 0.25, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);

        let mid = RayInfo::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0));
        let hit = cone().cylinder_test_movement(&id, &query, &mid).expect("slope blocks");
        assert_relative_eq!(hit.valid_movement_factor, 0.3, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, slope_normal(-1.0), epsilon = EPSILON);

        let over = RayInfo::new(Vec3::new(-5.0, 2.5, 0.0), Vec3::new(5.0, 2.5, 0.0));
        assert!(cone().cylinder_test_movement(&id, &query, &over).is_none());
    }

    #[test]
    fn test_aabb_contains_hits() {
        let trans = Transform::new(Vec3::new(4.0, -2.0, 1.0), Rotation::from_steps(77));
        let aabb = cone().aabb(&trans).expanded(EPSILON);
        for dir in [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.3), Vec3::new(-0.7, 0.2, 0.7)] {
            let target = trans.pos + Vec3::new(0.0, 1.0, 0.0);
            let ray = RayInfo::new(target - dir * 8.0, target);
            let hit = cone().ray_test(&trans, &ray).expect("aimed at the cone");
            assert!(aabb.contains_point(ray.point_at(hit.near)));
        }
    }
}

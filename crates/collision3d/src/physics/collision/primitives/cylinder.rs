//! Vertical capped cylinder

use serde::{Deserialize, Serialize};

use crate::foundation::math::{horizontal, up, Vec3, EPSILON};
use crate::foundation::transform::Transform;
use crate::physics::collision::ray::RayInfo;
use crate::physics::collision::shape::{
    fraction_in_range, CollisionShape, GroundContact, MovementHit, RayHit,
};
use crate::spatial::Aabb;

/// Vertical cylinder with its origin at the center of the base
///
/// Occupies `y ∈ [0, height]` and `x² + z² <= radius²` in local space.
/// Also the query volume for ground and movement tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    /// Height above the base
    pub height: f32,
    /// Radius
    pub radius: f32,
}

impl Cylinder {
    /// Create a cylinder
    #[must_use]
    pub const fn new(height: f32, radius: f32) -> Self {
        Self { height, radius }
    }

    /// Whether a local point is inside or on the surface
    #[must_use]
    pub fn contains_local(&self, p: Vec3) -> bool {
        p.y >= 0.0 && p.y <= self.height && horizontal(p).norm_squared() <= self.radius * self.radius
    }

    /// Minkowski sum with a query cylinder whose base sweeps the movement ray
    ///
    /// The result must be placed `query.height` lower than this cylinder.
    #[must_use]
    pub fn inflated_by(&self, query: &Self) -> Self {
        Self::new(self.height + query.height, self.radius + query.radius)
    }
}

impl CollisionShape for Cylinder {
    fn aabb(&self, trans: &Transform) -> Aabb {
        let r = self.radius;
        Aabb::new(
            trans.pos - Vec3::new(r, 0.0, r),
            trans.pos + Vec3::new(r, self.height, r),
        )
    }

    /// Nearest crossing of the caps or the side
    ///
    /// Caps are accepted by the horizontal distance of the crossing point
    /// itself, so nearly vertical rays that drift outside the radius miss.
    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        let o = ray.start();
        let u = ray.dir_normalized();
        if self.contains_local(o) {
            return Some(RayHit::interior(ray));
        }

        let r2 = self.radius * self.radius;
        let mut best: Option<(f32, Vec3)> = None;
        let mut consider = |t: f32, normal: Vec3| {
            if t >= 0.0 && best.map_or(true, |(b, _)| t < b) {
                best = Some((t, normal));
            }
        };

        if u.y.abs() > EPSILON {
            for (cap_y, normal_y) in [(0.0, -1.0), (self.height, 1.0)] {
                let t = (cap_y - o.y) / u.y;
                if horizontal(o + u * t).norm_squared() <= r2 {
                    consider(t, Vec3::new(0.0, normal_y, 0.0));
                }
            }
        }

        // x² + z² = r² along the ray, solved without cancellation.
        let a = u.x * u.x + u.z * u.z;
        let b = 2.0 * (o.x * u.x + o.z * u.z);
        let c = horizontal(o).norm_squared() - r2;
        let disc = b * b - 4.0 * a * c;
        if a > EPSILON * EPSILON && disc >= 0.0 {
            let q = -0.5 * (b + b.signum() * disc.sqrt());
            let roots = [q / a, c / q];
            for t in roots.into_iter().filter(|t| t.is_finite()) {
                let p = o + u * t;
                if (0.0..=self.height).contains(&p.y) {
                    consider(t, Vec3::new(p.x, 0.0, p.z) / self.radius);
                }
            }
        }

        let (t, normal) = best?;
        let near = fraction_in_range(t, ray)?;
        Some(RayHit { near, normal })
    }

    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact> {
        let d2 = horizontal(pos - trans.pos).norm_squared();
        let reach = self.radius + cylinder.radius;
        if reach * reach < d2 {
            return None;
        }
        Some(GroundContact {
            offset_height: pos.y - trans.pos.y - self.height,
            normal: up(),
            on_edge: d2 > self.radius * self.radius,
        })
    }

    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit> {
        self.inflated_by(cylinder)
            .ray_test(&trans.raised(-cylinder.height), movement)
            .map(MovementHit::from)
    }
}

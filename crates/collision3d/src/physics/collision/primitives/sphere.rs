//! Sphere, only usable as a ray target

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::foundation::transform::Transform;
use crate::physics::collision::ray::RayInfo;
use crate::physics::collision::shape::{
    fraction_in_range, CollisionShape, GroundContact, MovementHit, RayHit,
};
use crate::spatial::Aabb;

use super::Cylinder;

/// Sphere with its origin at the center
///
/// Ground and movement tests are not supported: calling them is a
/// programming error that asserts in debug builds and returns `None` in
/// release builds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Radius
    pub radius: f32,
}

impl Sphere {
    /// Create a sphere
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl CollisionShape for Sphere {
    fn aabb(&self, trans: &Transform) -> Aabb {
        Aabb::from_center_extents(trans.pos, Vec3::repeat(self.radius))
    }

    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        let oc = ray.start();
        let u = ray.dir_normalized();
        let r2 = self.radius * self.radius;
        if oc.norm_squared() <= r2 {
            return Some(RayHit::interior(ray));
        }

        let b = oc.dot(&u);
        let qc = oc - u * b;
        let h = r2 - qc.norm_squared();
        if h < 0.0 {
            return None;
        }
        let t = -b - h.sqrt();
        let near = fraction_in_range(t, ray)?;
        Some(RayHit {
            near,
            normal: (oc + u * t) / self.radius,
        })
    }

    fn cylinder_test_on_ground(
        &self,
        _trans: &Transform,
        _cylinder: &Cylinder,
        _pos: Vec3,
    ) -> Option<GroundContact> {
        debug_assert!(false, "Sphere does not support cylinder on-ground tests");
        log::error!("Sphere::cylinder_test_on_ground called; spheres are ray-only");
        None
    }

    fn cylinder_test_movement(
        &self,
        _trans: &Transform,
        _cylinder: &Cylinder,
        _movement: &RayInfo,
    ) -> Option<MovementHit> {
        debug_assert!(false, "Sphere does not support cylinder movement tests");
        log::error!("Sphere::cylinder_test_movement called; spheres are ray-only");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_pointing_away_misses() {
        let sphere = Sphere::new(1.0);
        let ray = RayInfo::from_dir(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(sphere.ray_test(&Transform::identity(), &ray).is_none());
    }

    #[test]
    fn test_ray_hits_front() {
        let sphere = Sphere::new(1.0);
        let trans = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        let ray = RayInfo::new(Vec3::new(0.0, 2.0, -5.0), Vec3::new(0.0, 2.0, 5.0));
        let hit = sphere.ray_test(&trans, &ray).expect("head-on hit");
        assert_relative_eq!(hit.near, 0.4, epsilon = 1e-6);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert!(sphere.aabb(&trans).expanded(1e-5).contains_point(ray.point_at(hit.near)));
    }

    #[test]
    fn test_ray_grazing_and_short() {
        let sphere = Sphere::new(1.0);
        let id = Transform::identity();
        let offset = RayInfo::new(Vec3::new(-5.0, 1.5, 0.0), Vec3::new(5.0, 1.5, 0.0));
        assert!(sphere.ray_test(&id, &offset).is_none());
        let short = RayInfo::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0));
        assert!(sphere.ray_test(&id, &short).is_none());
    }

    #[test]
    fn test_ray_from_inside() {
        let sphere = Sphere::new(2.0);
        let ray = RayInfo::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.5, 3.0, 0.0));
        let hit = sphere.ray_test(&Transform::identity(), &ray).expect("inside");
        assert_relative_eq!(hit.near, 0.0);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "on-ground"))]
    fn test_on_ground_unsupported() {
        let sphere = Sphere::new(1.0);
        let result = sphere.cylinder_test_on_ground(
            &Transform::identity(),
            &Cylinder::new(1.0, 0.5),
            Vec3::new(0.0, 2.0, 0.0),
        );
        assert!(result.is_none());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "movement"))]
    fn test_movement_unsupported() {
        let sphere = Sphere::new(1.0);
        let movement = RayInfo::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0));
        let result =
            sphere.cylinder_test_movement(&Transform::identity(), &Cylinder::new(1.0, 0.5), &movement);
        assert!(result.is_none());
    }
}

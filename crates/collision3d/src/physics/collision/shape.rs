//! Shared query contract for collision shapes
//!
//! Shapes store their dimensions in model space. Each query takes the world
//! transform, moves the query into the shape's frame, and rotates any normal
//! back out.

use crate::foundation::math::Vec3;
use crate::foundation::transform::Transform;
use crate::spatial::Aabb;

use super::primitives::Cylinder;
use super::ray::RayInfo;

/// Result of a ray test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Fraction of the ray's displacement before contact, in `[0, 1]`
    pub near: f32,
    /// Surface normal at the contact
    pub normal: Vec3,
}

impl RayHit {
    /// Hit for a ray starting inside a solid
    #[must_use]
    pub fn interior(ray: &RayInfo) -> Self {
        Self {
            near: 0.0,
            normal: -ray.dir_normalized(),
        }
    }

    /// Same hit with the normal moved from `trans`' local frame to its parent
    #[must_use]
    pub fn to_world(self, trans: &Transform) -> Self {
        Self {
            near: self.near,
            normal: trans.rot.rotate(self.normal),
        }
    }
}

/// Result of an on-ground test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    /// Query base height minus surface height; negative when sunk in
    pub offset_height: f32,
    /// World-space surface normal under the query
    pub normal: Vec3,
    /// Supported by the rim of the footprint rather than the surface proper
    pub on_edge: bool,
}

/// Result of a cylinder movement sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementHit {
    /// Fraction of the movement that is free, in `[0, 1]`
    pub valid_movement_factor: f32,
    /// World-space normal of the blocking surface
    pub normal: Vec3,
}

impl From<RayHit> for MovementHit {
    fn from(hit: RayHit) -> Self {
        Self {
            valid_movement_factor: hit.near,
            normal: hit.normal,
        }
    }
}

/// Queries every collision shape answers
///
/// `None` means no hit, no support, or an unsupported query.
pub trait CollisionShape {
    /// World-space bounds of the shape placed at `trans`
    fn aabb(&self, trans: &Transform) -> Aabb;

    /// Cast a world-space ray against the shape placed at `trans`
    fn ray_test(&self, trans: &Transform, ray: &RayInfo) -> Option<RayHit> {
        if ray.is_degenerate() {
            return None;
        }
        let local = trans.ray_to_local(ray);
        self.ray_test_local(&local).map(|hit| hit.to_world(trans))
    }

    /// Cast a ray already expressed in the shape's frame; the normal stays local
    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit>;

    /// Test whether a vertical cylinder whose base is at `pos` stands on the shape
    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact>;

    /// Sweep a vertical cylinder whose base follows `movement`
    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit>;
}

/// Accept a root of a ray/surface equation measured in world units
///
/// Converts to a fraction of the ray and rejects anything behind the start
/// or past the end.
#[must_use]
pub(crate) fn fraction_in_range(t_abs: f32, ray: &RayInfo) -> Option<f32> {
    if t_abs < 0.0 {
        return None;
    }
    let near = t_abs / ray.length();
    (near <= 1.0).then_some(near)
}

//! Rigid placement: a translation plus a rotation about +Y

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::math::{Vec2, Vec3};
use super::rotation::Rotation;

/// Position and vertical-axis rotation
///
/// Shapes carry no placement of their own; every query takes a `Transform`
/// and converts into the shape's local frame with [`Transform::to_local`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Translation in world space
    pub pos: Vec3,
    /// Rotation about the vertical axis
    pub rot: Rotation,
}

impl Transform {
    /// Create a transform from position and rotation
    #[must_use]
    pub const fn new(pos: Vec3, rot: Rotation) -> Self {
        Self { pos, rot }
    }

    /// Create an identity transform
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    #[must_use]
    pub fn from_position(pos: Vec3) -> Self {
        Self {
            pos,
            rot: Rotation::IDENTITY,
        }
    }

    /// Transform a local point into the parent frame
    #[must_use]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.rot.rotate(v) + self.pos
    }

    /// Transform a local horizontal `(x, z)` point into the parent frame
    #[must_use]
    pub fn apply_2d(&self, v: Vec2) -> Vec2 {
        self.rot.rotate_2d(v) + Vec2::new(self.pos.x, self.pos.z)
    }

    /// Bring a parent-frame point into the local frame
    #[must_use]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        self.rot.to_local(v - self.pos)
    }

    /// Bring a parent-frame horizontal `(x, z)` point into the local frame
    #[must_use]
    pub fn to_local_2d(&self, v: Vec2) -> Vec2 {
        self.rot.to_local_2d(v - Vec2::new(self.pos.x, self.pos.z))
    }

    /// Transform that undoes this one
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rot = self.rot.inverse();
        Self {
            pos: -rot.rotate(self.pos),
            rot,
        }
    }

    /// Copy with the position moved vertically
    #[must_use]
    pub fn raised(&self, dy: f32) -> Self {
        Self {
            pos: self.pos + Vec3::new(0.0, dy, 0.0),
            rot: self.rot,
        }
    }
}

/// `a * b` places `b` inside `a`: `b` is first applied, then `a`
impl Mul for Transform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            pos: self.apply(rhs.pos),
            rot: self.rot + rhs.rot,
        }
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        *self * *rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn sample() -> Transform {
        Transform::new(Vec3::new(3.0, -1.0, 2.0), Rotation::from_degrees(45.0))
    }

    #[test]
    fn test_identity_is_noop() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(Transform::identity().apply(p), p);
        assert_relative_eq!(Transform::identity().to_local(p), p);
    }

    #[test]
    fn test_to_local_inverts_apply() {
        let t = sample();
        let p = Vec3::new(-4.0, 0.5, 7.0);
        assert_relative_eq!(t.to_local(t.apply(p)), p, epsilon = EPSILON);
        assert_relative_eq!(t.inverse().apply(t.apply(p)), p, epsilon = EPSILON);

        let q = Vec2::new(1.5, -2.5);
        assert_relative_eq!(t.to_local_2d(t.apply_2d(q)), q, epsilon = EPSILON);
    }

    #[test]
    fn test_apply_2d_matches_horizontal_part() {
        let t = sample();
        let p = Vec3::new(2.0, 9.0, -1.0);
        let world = t.apply(p);
        let flat = t.apply_2d(Vec2::new(p.x, p.z));
        assert_relative_eq!(flat, Vec2::new(world.x, world.z), epsilon = EPSILON);
    }

    #[test]
    fn test_compose_applies_right_first() {
        let a = sample();
        let b = Transform::new(Vec3::new(0.0, 1.0, -5.0), Rotation::from_steps(30));
        let p = Vec3::new(1.0, 1.0, 1.0);
        assert_relative_eq!((a * b).apply(p), a.apply(b.apply(p)), epsilon = EPSILON);
        assert_eq!((a * b).rot, a.rot + b.rot);
        assert_relative_eq!((&a * &b).pos, (a * b).pos);
    }

    #[test]
    fn test_raised_keeps_rotation() {
        let t = sample().raised(2.0);
        assert_relative_eq!(t.pos.y, 1.0);
        assert_eq!(t.rot, sample().rot);
    }
}

//! Ordered list of placed primitives answering as one shape

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::foundation::transform::Transform;
use crate::spatial::Aabb;

use super::any_shape::AnyPrimitive;
use super::primitives::Cylinder;
use super::ray::RayInfo;
use super::shape::{CollisionShape, GroundContact, MovementHit, RayHit};

/// Primitives sharing one owner transform
///
/// Each child's transform is relative to the compound. Queries combine the
/// children's answers:
/// - rays keep the nearest hit, the earlier child on ties
/// - on-ground keeps the largest offset height
/// - movement keeps the smallest free fraction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompoundPrimitive {
    /// Children in query order
    pub children: Vec<AnyPrimitive>,
}

impl CompoundPrimitive {
    /// Create a compound from its children
    #[must_use]
    pub const fn new(children: Vec<AnyPrimitive>) -> Self {
        Self { children }
    }

    /// Append a child
    pub fn push(&mut self, child: impl Into<AnyPrimitive>) {
        self.children.push(child.into());
    }

    /// Number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether there are no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl FromIterator<AnyPrimitive> for CompoundPrimitive {
    fn from_iter<I: IntoIterator<Item = AnyPrimitive>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl CollisionShape for CompoundPrimitive {
    fn aabb(&self, trans: &Transform) -> Aabb {
        self.children
            .iter()
            .fold(Aabb::EMPTY, |acc, child| acc.union(&child.aabb(trans)))
    }

    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for child in &self.children {
            if let Some(hit) = child.ray_test_local(ray) {
                if best.map_or(true, |b| hit.near < b.near) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact> {
        let mut best: Option<GroundContact> = None;
        for child in &self.children {
            if let Some(contact) = child.cylinder_test_on_ground(trans, cylinder, pos) {
                if best.map_or(true, |b| contact.offset_height > b.offset_height) {
                    best = Some(contact);
                }
            }
        }
        best
    }

    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit> {
        let mut best: Option<MovementHit> = None;
        for child in &self.children {
            if let Some(hit) = child.cylinder_test_movement(trans, cylinder, movement) {
                if best.map_or(true, |b| hit.valid_movement_factor < b.valid_movement_factor) {
                    best = Some(hit);
                }
            }
        }
        best
    }
}

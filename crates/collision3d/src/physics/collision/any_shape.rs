//! Tagged unions over every collision shape
//!
//! [`AnyPrimitive`] holds one of the primitive shapes with its transform and
//! is what [`CompoundPrimitive`] stores. [`AnyShape`] widens that set with
//! compounds and heightmaps. Both forward each query with a `match`.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::foundation::transform::Transform;
use crate::spatial::Aabb;

use super::compound::CompoundPrimitive;
use super::heightmap::HeightMap;
use super::primitives::{
    Cylinder, RampRectangle, RampTriangle, Sphere, VertBox, VerticalCappedCone, VerticalTriangle,
};
use super::ray::RayInfo;
use super::shape::{CollisionShape, GroundContact, MovementHit, RayHit};

/// Stable numeric tag of every shape kind
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// Empty slot
    Invalid = 0,
    /// [`VertBox`]
    VertBox = 1,
    /// [`Cylinder`]
    Cylinder = 2,
    /// [`Sphere`]
    Sphere = 3,
    /// [`RampRectangle`]
    RampRectangle = 4,
    /// [`VerticalTriangle`]
    VerticalTriangle = 5,
    /// [`RampTriangle`]
    RampTriangle = 6,
    /// [`VerticalCappedCone`]
    VerticalCappedCone = 7,
    /// [`HeightMap`]
    HeightMap = 62,
    /// [`CompoundPrimitive`]
    Compound = 63,
}

/// One primitive shape, or nothing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Primitive {
    /// Answers every query with no hit
    #[default]
    Invalid,
    /// Axis-aligned box
    VertBox(VertBox),
    /// Vertical cylinder
    Cylinder(Cylinder),
    /// Sphere
    Sphere(Sphere),
    /// Thick ramp
    RampRectangle(RampRectangle),
    /// Triangular ramp
    RampTriangle(RampTriangle),
    /// Wall triangle
    VerticalTriangle(VerticalTriangle),
    /// Vertical frustum
    VerticalCappedCone(VerticalCappedCone),
}

/// Any shape a world object can carry, or nothing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Shape {
    /// Answers every query with no hit
    #[default]
    Invalid,
    /// Axis-aligned box
    VertBox(VertBox),
    /// Vertical cylinder
    Cylinder(Cylinder),
    /// Sphere
    Sphere(Sphere),
    /// Thick ramp
    RampRectangle(RampRectangle),
    /// Triangular ramp
    RampTriangle(RampTriangle),
    /// Wall triangle
    VerticalTriangle(VerticalTriangle),
    /// Vertical frustum
    VerticalCappedCone(VerticalCappedCone),
    /// Ordered list of placed primitives
    Compound(CompoundPrimitive),
    /// Terrain grid
    HeightMap(Box<HeightMap>),
}

/// Run `$body` with `$s` bound to the concrete shape, or evaluate `$none`
macro_rules! dispatch {
    ($enum:ident, $value:expr, $s:ident => $body:expr, $none:expr $(, $extra:ident)*) => {
        match $value {
            $enum::Invalid => $none,
            $enum::VertBox($s) => $body,
            $enum::Cylinder($s) => $body,
            $enum::Sphere($s) => $body,
            $enum::RampRectangle($s) => $body,
            $enum::RampTriangle($s) => $body,
            $enum::VerticalTriangle($s) => $body,
            $enum::VerticalCappedCone($s) => $body,
            $($enum::$extra($s) => $body,)*
        }
    };
}

/// Implement the four queries for an enum by forwarding to its variants
macro_rules! impl_collision_shape {
    ($enum:ident $(, $extra:ident)*) => {
        impl CollisionShape for $enum {
            fn aabb(&self, trans: &Transform) -> Aabb {
                dispatch!($enum, self, s => s.aabb(trans), Aabb::EMPTY $(, $extra)*)
            }

            fn ray_test(&self, trans: &Transform, ray: &RayInfo) -> Option<RayHit> {
                dispatch!($enum, self, s => s.ray_test(trans, ray), None $(, $extra)*)
            }

            fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
                dispatch!($enum, self, s => s.ray_test_local(ray), None $(, $extra)*)
            }

            fn cylinder_test_on_ground(
                &self,
                trans: &Transform,
                cylinder: &Cylinder,
                pos: Vec3,
            ) -> Option<GroundContact> {
                dispatch!($enum, self, s => s.cylinder_test_on_ground(trans, cylinder, pos), None $(, $extra)*)
            }

            fn cylinder_test_movement(
                &self,
                trans: &Transform,
                cylinder: &Cylinder,
                movement: &RayInfo,
            ) -> Option<MovementHit> {
                dispatch!($enum, self, s => s.cylinder_test_movement(trans, cylinder, movement), None $(, $extra)*)
            }
        }
    };
}

impl_collision_shape!(Primitive);
impl_collision_shape!(Shape, Compound, HeightMap);

impl Primitive {
    /// Numeric tag of the held shape
    #[must_use]
    pub const fn shape_type(&self) -> ShapeType {
        match self {
            Self::Invalid => ShapeType::Invalid,
            Self::VertBox(_) => ShapeType::VertBox,
            Self::Cylinder(_) => ShapeType::Cylinder,
            Self::Sphere(_) => ShapeType::Sphere,
            Self::RampRectangle(_) => ShapeType::RampRectangle,
            Self::RampTriangle(_) => ShapeType::RampTriangle,
            Self::VerticalTriangle(_) => ShapeType::VerticalTriangle,
            Self::VerticalCappedCone(_) => ShapeType::VerticalCappedCone,
        }
    }
}

impl Shape {
    /// Numeric tag of the held shape
    #[must_use]
    pub const fn shape_type(&self) -> ShapeType {
        match self {
            Self::Invalid => ShapeType::Invalid,
            Self::VertBox(_) => ShapeType::VertBox,
            Self::Cylinder(_) => ShapeType::Cylinder,
            Self::Sphere(_) => ShapeType::Sphere,
            Self::RampRectangle(_) => ShapeType::RampRectangle,
            Self::RampTriangle(_) => ShapeType::RampTriangle,
            Self::VerticalTriangle(_) => ShapeType::VerticalTriangle,
            Self::VerticalCappedCone(_) => ShapeType::VerticalCappedCone,
            Self::Compound(_) => ShapeType::Compound,
            Self::HeightMap(_) => ShapeType::HeightMap,
        }
    }
}

impl From<Primitive> for Shape {
    fn from(primitive: Primitive) -> Self {
        dispatch!(Primitive, primitive, s => s.into(), Self::Invalid)
    }
}

impl From<CompoundPrimitive> for Shape {
    fn from(compound: CompoundPrimitive) -> Self {
        Self::Compound(compound)
    }
}

impl From<Box<HeightMap>> for Shape {
    fn from(map: Box<HeightMap>) -> Self {
        Self::HeightMap(map)
    }
}

impl From<HeightMap> for Shape {
    fn from(map: HeightMap) -> Self {
        Self::HeightMap(Box::new(map))
    }
}

/// A primitive placed by a transform
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnyPrimitive {
    /// Held shape
    pub shape: Primitive,
    /// Placement relative to whatever owns this primitive
    pub trans: Transform,
}

/// Any shape placed by a transform
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnyShape {
    /// Held shape
    pub shape: Shape,
    /// Placement relative to whatever owns this shape
    pub trans: Transform,
}

macro_rules! impl_placed {
    ($placed:ident, $inner:ident) => {
        impl $placed {
            /// Place `shape` at `trans`
            #[must_use]
            pub fn new(shape: impl Into<$inner>, trans: Transform) -> Self {
                Self {
                    shape: shape.into(),
                    trans,
                }
            }

            /// Replace the held shape and reset the transform to identity
            pub fn assign(&mut self, shape: impl Into<$inner>) {
                let shape = shape.into();
                log::trace!(
                    "Reassigning {:?} to {:?}",
                    self.shape.shape_type(),
                    shape.shape_type()
                );
                self.shape = shape;
                self.trans = Transform::identity();
            }

            /// Numeric tag of the held shape
            #[must_use]
            pub const fn shape_type(&self) -> ShapeType {
                self.shape.shape_type()
            }

            /// Whether a shape is held
            #[must_use]
            pub const fn is_valid(&self) -> bool {
                !matches!(self.shape, $inner::Invalid)
            }
        }

        impl CollisionShape for $placed {
            fn aabb(&self, trans: &Transform) -> Aabb {
                self.shape.aabb(&(trans * &self.trans))
            }

            fn ray_test(&self, trans: &Transform, ray: &RayInfo) -> Option<RayHit> {
                self.shape.ray_test(&(trans * &self.trans), ray)
            }

            fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
                let local = self.trans.ray_to_local(ray);
                self.shape
                    .ray_test_local(&local)
                    .map(|hit| hit.to_world(&self.trans))
            }

            fn cylinder_test_on_ground(
                &self,
                trans: &Transform,
                cylinder: &Cylinder,
                pos: Vec3,
            ) -> Option<GroundContact> {
                self.shape
                    .cylinder_test_on_ground(&(trans * &self.trans), cylinder, pos)
            }

            fn cylinder_test_movement(
                &self,
                trans: &Transform,
                cylinder: &Cylinder,
                movement: &RayInfo,
            ) -> Option<MovementHit> {
                self.shape
                    .cylinder_test_movement(&(trans * &self.trans), cylinder, movement)
            }
        }

    };
}

impl_placed!(AnyPrimitive, Primitive);
impl_placed!(AnyShape, Shape);

/// Unplaced shapes convert with an identity transform
macro_rules! impl_from_unplaced {
    ($placed:ident: $($shape:ty),*) => {
        $(
            impl From<$shape> for $placed {
                fn from(shape: $shape) -> Self {
                    Self::new(shape, Transform::identity())
                }
            }
        )*
    };
}

impl_from_unplaced!(
    AnyPrimitive: Primitive, VertBox, Cylinder, Sphere, RampRectangle, RampTriangle,
    VerticalTriangle, VerticalCappedCone
);
impl_from_unplaced!(
    AnyShape: Shape, Primitive, VertBox, Cylinder, Sphere, RampRectangle, RampTriangle,
    VerticalTriangle, VerticalCappedCone, CompoundPrimitive, HeightMap, Box<HeightMap>
);

impl From<AnyPrimitive> for AnyShape {
    fn from(primitive: AnyPrimitive) -> Self {
        Self::new(primitive.shape, primitive.trans)
    }
}

macro_rules! impl_from_primitive {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Primitive {
                fn from(shape: $variant) -> Self {
                    Self::$variant(shape)
                }
            }

            impl From<$variant> for Shape {
                fn from(shape: $variant) -> Self {
                    Self::$variant(shape)
                }
            }
        )*
    };
}

impl_from_primitive!(
    VertBox,
    Cylinder,
    Sphere,
    RampRectangle,
    RampTriangle,
    VerticalTriangle,
    VerticalCappedCone
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::rotation::Rotation;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn down_ray(x: f32, z: f32) -> RayInfo {
        RayInfo::new(Vec3::new(x, 10.0, z), Vec3::new(x, -10.0, z))
    }

    #[test]
    fn test_shape_type_numbering() {
        assert_eq!(ShapeType::Invalid as u8, 0);
        assert_eq!(ShapeType::VerticalTriangle as u8, 5);
        assert_eq!(ShapeType::VerticalCappedCone as u8, 7);
        assert_eq!(ShapeType::HeightMap as u8, 62);
        assert_eq!(ShapeType::Compound as u8, 63);
        assert_eq!(AnyShape::from(RampTriangle::new(1.0, 1.0)).shape_type(), ShapeType::RampTriangle);
        assert_eq!(AnyShape::from(CompoundPrimitive::default()).shape_type(), ShapeType::Compound);
    }

    #[test]
    fn test_invalid_answers_nothing() {
        let shape = AnyShape::default();
        let id = Transform::identity();
        let query = Cylinder::new(1.8, 0.5);
        assert!(!shape.is_valid());
        assert_eq!(shape.aabb(&id), Aabb::EMPTY);
        assert!(shape.ray_test(&id, &down_ray(0.0, 0.0)).is_none());
        assert!(shape.cylinder_test_on_ground(&id, &query, Vec3::zeros()).is_none());
        assert!(shape.cylinder_test_movement(&id, &query, &down_ray(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_reassign_cylinder_to_sphere() {
        let mut shape = AnyShape::new(
            Cylinder::new(2.0, 1.0),
            Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),
        );
        assert_eq!(shape.shape_type(), ShapeType::Cylinder);
        let hit = shape.ray_test(&Transform::identity(), &down_ray(5.0, 0.0)).expect("top cap");
        assert_relative_eq!(hit.near, 0.4, epsilon = EPSILON);

        shape.assign(Sphere::new(1.0));
        assert_eq!(shape.shape_type(), ShapeType::Sphere);
        assert_eq!(shape.trans, Transform::identity());
        let hit = shape.ray_test(&Transform::identity(), &down_ray(0.0, 0.0)).expect("sphere top");
        assert_relative_eq!(hit.near, 0.45, epsilon = EPSILON);
        assert!(shape.ray_test(&Transform::identity(), &down_ray(5.0, 0.0)).is_none());
    }

    #[test]
    fn test_transforms_compose() {
        let placed = AnyPrimitive::new(
            VertBox::new(Vec3::new(1.0, 1.0, 1.0)),
            Transform::new(Vec3::new(3.0, 0.0, 0.0), Rotation::IDENTITY),
        );
        let owner = Transform::new(Vec3::new(0.0, 1.0, 0.0), Rotation::from_degrees(90.0));
        let world = &owner * &placed.trans;

        let aabb = placed.aabb(&owner);
        assert_eq!(aabb, placed.shape.aabb(&world));
        assert!(aabb.contains_point(world.pos + Vec3::new(0.0, 1.0, 0.0)));

        let ray = down_ray(world.pos.x, world.pos.z);
        let hit = placed.ray_test(&owner, &ray).expect("box top");
        assert_relative_eq!(hit.near, (10.0 - 3.0) / 20.0, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);

        let local = owner.ray_to_local(&ray);
        let via_local = placed.ray_test_local(&local).expect("same hit");
        assert_relative_eq!(via_local.near, hit.near, epsilon = EPSILON);
    }

    #[test]
    fn test_widening_keeps_placement() {
        let trans = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        let primitive = AnyPrimitive::new(Sphere::new(0.5), trans);
        let shape = AnyShape::from(primitive);
        assert_eq!(shape.shape_type(), ShapeType::Sphere);
        assert_eq!(shape.trans, trans);
        assert_eq!(Shape::from(Primitive::Invalid), Shape::Invalid);
    }

    #[test]
    fn test_heightmap_shape_clones_deeply() {
        let mut map = HeightMap::new(3, 1.0, 1.0).expect("valid grid");
        map.generate_mipmap();
        let shape = AnyShape::from(map);
        let mut copy = shape.clone();
        if let Shape::HeightMap(map) = &mut copy.shape {
            assert!(map.update([1, 1], 4.0));
        }
        assert_ne!(copy, shape);
        assert_eq!(shape.shape_type(), ShapeType::HeightMap);

        let query = Cylinder::new(1.8, 0.5);
        let contact = shape
            .cylinder_test_on_ground(&Transform::identity(), &query, Vec3::new(0.5, 2.0, 1.5))
            .expect("flat original");
        assert_relative_eq!(contact.offset_height, 2.0);
    }

    #[test]
    fn test_primitive_round_trips_through_ron() {
        let placed = AnyPrimitive::new(
            RampRectangle::new(1.0, 0.5, 2.0, 0.25),
            Transform::new(Vec3::new(1.0, 2.0, 3.0), Rotation::from_steps(40)),
        );
        let text = ron::to_string(&placed).expect("serializes");
        let parsed: AnyPrimitive = ron::from_str(&text).expect("parses");
        assert_eq!(parsed, placed);
    }
}

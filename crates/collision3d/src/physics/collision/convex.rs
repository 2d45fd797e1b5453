//! Ray tests against axis-aligned boxes and convex polyhedra
//!
//! Both routines work in the ray's own parametrization: `t = 0` is the start
//! and `t = 1` the end of the segment.

use crate::foundation::math::{Vec3, EPSILON};

use super::ray::RayInfo;
use super::shape::RayHit;

/// Raw slab interval of a ray against a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabInterval {
    /// Entry parameter, may be negative when the start is inside
    pub near: f32,
    /// Exit parameter
    pub far: f32,
    /// Axis whose slab produced `near`
    pub near_axis: usize,
}

/// Clip a ray against the slabs of `[min, max]`
///
/// Near and far slab of each axis are picked through the ray's sign table.
/// Returns `None` only when the slabs do not overlap along the infinite line.
#[must_use]
pub fn slab_interval(min: Vec3, max: Vec3, ray: &RayInfo) -> Option<SlabInterval> {
    let bounds = [min, max];
    let signs = ray.signs();
    let inv = ray.inv_dir();
    let start = ray.start();

    let mut near = f32::NEG_INFINITY;
    let mut far = f32::INFINITY;
    let mut near_axis = 0;
    for axis in 0..3 {
        let t0 = (bounds[signs[axis]][axis] - start[axis]) * inv[axis];
        let t1 = (bounds[1 - signs[axis]][axis] - start[axis]) * inv[axis];
        if t0 > near {
            near = t0;
            near_axis = axis;
        }
        far = far.min(t1);
    }

    (near <= far).then_some(SlabInterval { near, far, near_axis })
}

/// Ray test against the box `[min, max]`
///
/// The normal is the outward face normal of the entry slab. A start inside
/// the box hits at `near = 0` with the reversed ray direction as normal.
#[must_use]
pub fn slab_ray_test(min: Vec3, max: Vec3, ray: &RayInfo) -> Option<RayHit> {
    let interval = slab_interval(min, max, ray)?;
    if interval.far < 0.0 || interval.near > 1.0 {
        return None;
    }
    if interval.near < 0.0 {
        return Some(RayHit::interior(ray));
    }
    let mut normal = Vec3::zeros();
    normal[interval.near_axis] = if ray.signs()[interval.near_axis] == 1 { 1.0 } else { -1.0 };
    Some(RayHit { near: interval.near, normal })
}

/// Half-space `normal · p <= offset`, normal pointing outward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Outward unit normal
    pub normal: Vec3,
    /// Signed distance of the plane from the origin along `normal`
    pub offset: f32,
}

impl Plane {
    /// Create a plane from an outward normal and offset
    #[must_use]
    pub const fn new(normal: Vec3, offset: f32) -> Self {
        Self { normal, offset }
    }

    /// Plane through `point` with outward `normal`
    #[must_use]
    pub fn through(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal,
            offset: normal.dot(&point),
        }
    }

    /// Positive outside, negative inside
    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) - self.offset
    }
}

/// Interval of a ray inside a convex polyhedron
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvexClip {
    /// Entry parameter, `-inf` if no plane is entered
    pub near: f32,
    /// Exit parameter, `+inf` if no plane is left
    pub far: f32,
    /// Plane that produced `near`
    pub front_face: Option<usize>,
    /// Plane that produced `far`
    pub back_face: Option<usize>,
}

/// Clip a ray against the intersection of half-spaces
///
/// Planes are processed in order, narrowing `[near, far]`. A ray parallel to
/// a plane is rejected when it runs outside it and ignores the plane
/// otherwise. Returns `None` once the interval becomes empty.
#[must_use]
pub fn clip_ray_convex(planes: &[Plane], ray: &RayInfo) -> Option<ConvexClip> {
    let start = ray.start();
    let dir = ray.dir();
    let mut clip = ConvexClip {
        near: f32::NEG_INFINITY,
        far: f32::INFINITY,
        front_face: None,
        back_face: None,
    };

    for (id, plane) in planes.iter().enumerate() {
        let dist = plane.signed_distance(start);
        let denom = plane.normal.dot(&dir);
        if denom.abs() < EPSILON {
            if dist > 0.0 {
                return None;
            }
            continue;
        }
        let t = -dist / denom;
        if denom < 0.0 {
            if t > clip.near {
                clip.near = t;
                clip.front_face = Some(id);
            }
        } else if t < clip.far {
            clip.far = t;
            clip.back_face = Some(id);
        }
        if clip.near > clip.far {
            return None;
        }
    }

    Some(clip)
}

/// Ray test against a convex polyhedron given by its bounding planes
///
/// Uses the same `[0, 1]` range and interior-start policy as
/// [`slab_ray_test`].
#[must_use]
pub fn convex_ray_test(planes: &[Plane], ray: &RayInfo) -> Option<RayHit> {
    let clip = clip_ray_convex(planes, ray)?;
    if clip.far < 0.0 || clip.near > 1.0 {
        return None;
    }
    match clip.front_face {
        Some(face) if clip.near >= 0.0 => Some(RayHit {
            near: clip.near,
            normal: planes[face].normal,
        }),
        _ => Some(RayHit::interior(ray)),
    }
}

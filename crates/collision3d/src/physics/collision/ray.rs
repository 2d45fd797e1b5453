//! Ray segment with precomputed traversal data
//!
//! A [`RayInfo`] is a finite segment from `start` to `end`. The displacement
//! `dir` is not normalized: its length is the distance the query may travel,
//! and every hit is reported as a fraction of it.

use crate::foundation::math::{Vec3, INV_DIR_SENTINEL};
use crate::foundation::transform::Transform;

/// Ray segment for casts and movement sweeps
///
/// Fields are private and only set by the constructors, so the derived data
/// (`inv_dir`, `signs`, `dir_normalized`, ...) always matches `start`/`dir`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayInfo {
    start: Vec3,
    end: Vec3,
    dir: Vec3,
    dir_normalized: Vec3,
    inv_dir: Vec3,
    length: f32,
    signs: [usize; 3],
}

impl RayInfo {
    /// Segment from `start` to `end`
    #[must_use]
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self::from_dir(start, end - start)
    }

    /// Segment from `start` along the full displacement `dir`
    #[must_use]
    pub fn from_dir(start: Vec3, dir: Vec3) -> Self {
        let length = dir.norm();
        let dir_normalized = if length > 0.0 { dir / length } else { Vec3::zeros() };
        let inv_dir = dir.map(|c| if c == 0.0 { INV_DIR_SENTINEL } else { 1.0 / c });
        let signs = [
            usize::from(inv_dir.x < 0.0),
            usize::from(inv_dir.y < 0.0),
            usize::from(inv_dir.z < 0.0),
        ];
        Self {
            start,
            end: start + dir,
            dir,
            dir_normalized,
            inv_dir,
            length,
            signs,
        }
    }

    /// Start point
    #[must_use]
    pub const fn start(&self) -> Vec3 {
        self.start
    }

    /// End point, `start + dir`
    #[must_use]
    pub const fn end(&self) -> Vec3 {
        self.end
    }

    /// Full displacement
    #[must_use]
    pub const fn dir(&self) -> Vec3 {
        self.dir
    }

    /// Unit direction, zero for a degenerate ray
    #[must_use]
    pub const fn dir_normalized(&self) -> Vec3 {
        self.dir_normalized
    }

    /// Per-component `1 / dir`; zero components hold a large positive sentinel
    #[must_use]
    pub const fn inv_dir(&self) -> Vec3 {
        self.inv_dir
    }

    /// Length of `dir`
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    /// Per-axis `1` where the direction is negative, else `0`
    ///
    /// Indexes `[min, max]` pairs to select the near slab without branching.
    #[must_use]
    pub const fn signs(&self) -> [usize; 3] {
        self.signs
    }

    /// Whether the segment has no length
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.length <= f32::EPSILON
    }

    /// Point at fraction `t` of the segment
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start + self.dir * t
    }
}

impl Transform {
    /// Bring a parent-frame ray into the local frame
    ///
    /// Start is translated and rotated, the displacement rotated, and all
    /// derived fields rebuilt. Lengths are preserved, so hit fractions
    /// computed in the local frame are valid in the parent frame.
    #[must_use]
    pub fn ray_to_local(&self, ray: &RayInfo) -> RayInfo {
        RayInfo::from_dir(self.to_local(ray.start), self.rot.to_local(ray.dir))
    }
}

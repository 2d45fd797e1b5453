//! Heightmap terrain
//!
//! A square grid of `2^k + 1` height samples with one material byte per
//! sample. Sample `(x, z)` sits at local `(x·hs, h·vs, z·hs)`; each cell is
//! split into two triangles along its `(x, z)–(x+1, z+1)` diagonal.
//!
//! Ray tests descend a max-mipmap from the single root node, slab testing
//! each node's box in grid space. Children are visited in the order the ray
//! enters them, so the first leaf hit usually prunes the rest.

mod mipmap;
mod snapshot;

pub use crate::config::HeightMapConfig;
pub use mipmap::MaxMipmap;

use crate::foundation::math::{horizontal, Vec2, Vec3, EPSILON};
use crate::foundation::transform::Transform;
use crate::physics::collision::convex::slab_interval;
use crate::physics::collision::primitives::Cylinder;
use crate::physics::collision::ray::RayInfo;
use crate::physics::collision::shape::{CollisionShape, GroundContact, MovementHit, RayHit};
use crate::physics::collision::triangle::Triangle;
use crate::spatial::Aabb;

/// Largest accepted samples per side
pub const MAX_RESOLUTION: usize = (1 << 14) + 1;

/// Heightmap construction and snapshot errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HeightMapError {
    /// Samples per side is not `2^k + 1` with `k >= 1`
    #[error("resolution {0} is not 2^k + 1 within the supported range")]
    InvalidResolution(usize),

    /// A scale is zero, negative or not finite
    #[error("invalid scale: horizontal {horizontal}, vertical {vertical}")]
    InvalidScale {
        /// Requested horizontal scale
        horizontal: f32,
        /// Requested vertical scale
        vertical: f32,
    },

    /// Height buffer length differs from `resolution²`
    #[error("expected {expected} height samples, got {actual}")]
    SampleCountMismatch {
        /// `resolution²`
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Material buffer length differs from `resolution²`
    #[error("expected {expected} material samples, got {actual}")]
    MaterialCountMismatch {
        /// `resolution²`
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Malformed binary snapshot
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Whether the mipmap reflects the current heights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightMapState {
    /// Freshly allocated or bulk edited; queries fail until the mipmap is rebuilt
    Allocated,
    /// Mipmap is current
    Ready,
}

/// Terrain grid with a max-mipmap for ray traversal
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    resolution: usize,
    horizontal_scale: f32,
    vertical_scale: f32,
    inv_scale: Vec3,
    max_dh1: f32,
    max_dh11: f32,
    min_height: f32,
    heights: Vec<f32>,
    material: Vec<u8>,
    mipmap: MaxMipmap,
    state: HeightMapState,
}

impl HeightMap {
    /// Slope limit applied by [`HeightMap::new`]
    pub const DEFAULT_MAX_WALKABLE_SLOPE_DEGREES: f32 = 45.0;

    /// Allocate a flat map of `resolution × resolution` samples
    pub fn new(
        resolution: usize,
        horizontal_scale: f32,
        vertical_scale: f32,
    ) -> Result<Self, HeightMapError> {
        if !(3..=MAX_RESOLUTION).contains(&resolution) || !(resolution - 1).is_power_of_two() {
            return Err(HeightMapError::InvalidResolution(resolution));
        }
        let valid = |s: f32| s.is_finite() && s > 0.0;
        if !valid(horizontal_scale) || !valid(vertical_scale) {
            return Err(HeightMapError::InvalidScale {
                horizontal: horizontal_scale,
                vertical: vertical_scale,
            });
        }

        let samples = resolution * resolution;
        let heights = vec![0.0; samples];
        let mut map = Self {
            resolution,
            horizontal_scale,
            vertical_scale,
            inv_scale: Vec3::new(1.0 / horizontal_scale, 1.0 / vertical_scale, 1.0 / horizontal_scale),
            max_dh1: 0.0,
            max_dh11: 0.0,
            min_height: 0.0,
            mipmap: MaxMipmap::build(&heights, resolution - 1),
            heights,
            material: vec![0; samples],
            state: HeightMapState::Allocated,
        };
        map.set_max_walkable_slope(Self::DEFAULT_MAX_WALKABLE_SLOPE_DEGREES);
        log::debug!(
            "Allocated {resolution}x{resolution} heightmap ({} mipmap levels)",
            map.levels()
        );
        Ok(map)
    }

    /// Allocate a flat map from settings
    pub fn from_config(config: &HeightMapConfig) -> Result<Self, HeightMapError> {
        let mut map = Self::new(config.resolution, config.horizontal_scale, config.vertical_scale)?;
        map.set_max_walkable_slope(config.max_walkable_slope_degrees);
        Ok(map)
    }

    /// Copy in every sample and rebuild the mipmap
    ///
    /// An empty `materials` slice resets every material to 0.
    pub fn init_set(&mut self, heights: &[f32], materials: &[u8]) -> Result<(), HeightMapError> {
        let expected = self.heights.len();
        if heights.len() != expected {
            return Err(HeightMapError::SampleCountMismatch {
                expected,
                actual: heights.len(),
            });
        }
        if !materials.is_empty() && materials.len() != expected {
            return Err(HeightMapError::MaterialCountMismatch {
                expected,
                actual: materials.len(),
            });
        }

        self.heights.copy_from_slice(heights);
        if materials.is_empty() {
            self.material.fill(0);
        } else {
            self.material.copy_from_slice(materials);
        }
        self.generate_mipmap();
        Ok(())
    }

    /// Rebuild every mipmap level from the samples
    pub fn generate_mipmap(&mut self) {
        self.min_height = self.heights.iter().copied().fold(f32::INFINITY, f32::min);
        self.mipmap = MaxMipmap::build(&self.heights, self.cells());
        self.state = HeightMapState::Ready;
        log::trace!("Rebuilt heightmap mipmap, max height {}", self.mipmap.max());
    }

    /// Write one sample and refresh the nodes above it
    ///
    /// Returns `false` when `coord` lies outside the grid.
    pub fn update(&mut self, coord: [usize; 2], value: f32) -> bool {
        let Some(index) = self.index(coord) else {
            return false;
        };
        self.heights[index] = value;
        if self.state == HeightMapState::Ready {
            // min_height only has to stay a lower bound.
            self.min_height = self.min_height.min(value);
            self.mipmap.update_sample(&self.heights, coord[0], coord[1]);
        } else {
            self.generate_mipmap();
        }
        true
    }

    /// Height of a sample in height units
    #[must_use]
    pub fn get(&self, coord: [usize; 2]) -> Option<f32> {
        self.index(coord).map(|i| self.heights[i])
    }

    /// Material of a sample
    #[must_use]
    pub fn material(&self, coord: [usize; 2]) -> Option<u8> {
        self.index(coord).map(|i| self.material[i])
    }

    /// Set the material of a sample; `false` outside the grid
    pub fn set_material(&mut self, coord: [usize; 2], material: u8) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.material[i] = material;
                true
            }
            None => false,
        }
    }

    /// All samples, row-major
    #[must_use]
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Bulk access to the samples
    ///
    /// Marks the mipmap stale; call [`HeightMap::generate_mipmap`] afterwards.
    pub fn heights_mut(&mut self) -> &mut [f32] {
        self.state = HeightMapState::Allocated;
        &mut self.heights
    }

    /// All materials, row-major
    #[must_use]
    pub fn materials(&self) -> &[u8] {
        &self.material
    }

    /// Node maxima of one mipmap level; level 0 has one node per cell
    #[must_use]
    pub fn mipmap_level(&self, level: usize) -> Option<&[f32]> {
        self.mipmap.level(level)
    }

    /// Number of mipmap levels
    #[must_use]
    pub fn levels(&self) -> usize {
        self.mipmap.level_count()
    }

    /// Samples per side
    #[must_use]
    pub const fn resolution(&self) -> usize {
        self.resolution
    }

    /// Cells per side
    #[must_use]
    pub const fn cells(&self) -> usize {
        self.resolution - 1
    }

    /// Mipmap freshness
    #[must_use]
    pub const fn state(&self) -> HeightMapState {
        self.state
    }

    /// World distance between neighbouring samples
    #[must_use]
    pub const fn horizontal_scale(&self) -> f32 {
        self.horizontal_scale
    }

    /// World height of one height unit
    #[must_use]
    pub const fn vertical_scale(&self) -> f32 {
        self.vertical_scale
    }

    /// Fractional grid coordinate under a world position
    ///
    /// Not clamped; values outside `[0, cells]` lie off the map.
    #[must_use]
    pub fn convert_global_pos_to_coord(&self, trans: &Transform, pos: Vec3) -> Vec2 {
        horizontal(trans.to_local(pos)) * self.inv_scale.x
    }

    /// Set the steepest walkable slope
    ///
    /// Stored as the largest height difference, in height units, allowed
    /// along a cell edge and along its diagonal.
    pub fn set_max_walkable_slope(&mut self, degrees: f32) {
        let degrees = degrees.clamp(0.0, 90.0);
        self.max_dh1 = if degrees >= 90.0 {
            f32::INFINITY
        } else {
            self.horizontal_scale * degrees.to_radians().tan() / self.vertical_scale
        };
        self.max_dh11 = self.max_dh1 * std::f32::consts::SQRT_2;
    }

    fn index(&self, [x, z]: [usize; 2]) -> Option<usize> {
        (x < self.resolution && z < self.resolution).then_some(x + z * self.resolution)
    }

    fn sample(&self, x: usize, z: usize) -> f32 {
        self.heights[x + z * self.resolution]
    }

    fn is_ready(&self) -> bool {
        if self.state == HeightMapState::Ready {
            return true;
        }
        log::warn!("Heightmap queried before its mipmap was generated");
        false
    }

    /// Lowest and highest sample; rescanned while the mipmap is stale
    fn height_range(&self) -> (f32, f32) {
        match self.state {
            HeightMapState::Ready => (self.min_height, self.mipmap.max()),
            HeightMapState::Allocated => self
                .heights
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h))),
        }
    }

    /// Children of node `(nx, nz)` at `level` in the order the ray reaches them
    ///
    /// The first child holds the entry point at `near`; the next is across
    /// whichever midline the ray crosses first.
    #[allow(clippy::cast_precision_loss)]
    fn child_order(level: usize, nx: usize, nz: usize, ray: &RayInfo, near: f32) -> [(usize, usize); 4] {
        let half = 1usize << (level - 1);
        let mid = Vec2::new(((2 * nx + 1) * half) as f32, ((2 * nz + 1) * half) as f32);
        let enter = near.max(0.0);
        let entry = ray.point_at(enter);
        let (cx, cz) = (usize::from(entry.x >= mid.x), usize::from(entry.z >= mid.y));

        let ahead = |t: f32| if t > enter { t } else { f32::INFINITY };
        let tx = ahead((mid.x - ray.start().x) * ray.inv_dir().x);
        let tz = ahead((mid.y - ray.start().z) * ray.inv_dir().z);
        let (second, third) = if tx <= tz {
            ((1 - cx, cz), (cx, 1 - cz))
        } else {
            ((cx, 1 - cz), (1 - cx, cz))
        };
        [(cx, cz), second, third, (1 - cx, 1 - cz)]
    }

    /// Descend into node `(nx, nz)` of `level`, keeping the nearest hit
    #[allow(clippy::cast_precision_loss)]
    fn visit(&self, level: usize, nx: usize, nz: usize, ray: &RayInfo, best: &mut Option<(f32, Vec3)>) {
        let size = 1usize << level;
        let min = Vec3::new((nx * size) as f32, self.min_height, (nz * size) as f32);
        let max = Vec3::new(
            ((nx + 1) * size) as f32,
            self.mipmap.node(level, nx, nz),
            ((nz + 1) * size) as f32,
        );
        let Some(span) = slab_interval(min, max, ray) else {
            return;
        };
        let limit = best.map_or(1.0, |(t, _)| t);
        if span.far < 0.0 || span.near > limit {
            return;
        }

        if level == 0 {
            self.test_cell(nx, nz, ray, best);
            return;
        }

        for (dx, dz) in Self::child_order(level, nx, nz, ray, span.near) {
            self.visit(level - 1, 2 * nx + dx, 2 * nz + dz, ray, best);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn test_cell(&self, cx: usize, cz: usize, ray: &RayInfo, best: &mut Option<(f32, Vec3)>) {
        let corner = |dx: usize, dz: usize| {
            let (x, z) = (cx + dx, cz + dz);
            Vec3::new(x as f32, self.sample(x, z), z as f32)
        };
        let (p00, p10, p01, p11) = (corner(0, 0), corner(1, 0), corner(0, 1), corner(1, 1));

        for tri in [Triangle::new(p00, p10, p11), Triangle::new(p00, p11, p01)] {
            let Some((t, _, _)) = tri.intersect_ray(ray) else {
                continue;
            };
            if best.is_some_and(|(nearest, _)| t >= nearest) {
                continue;
            }
            if let Some(normal) = tri.normal_facing(ray) {
                *best = Some((t, normal));
            }
        }
    }
}

impl CollisionShape for HeightMap {
    #[allow(clippy::cast_precision_loss)]
    fn aabb(&self, trans: &Transform) -> Aabb {
        let extent = self.cells() as f32 * self.horizontal_scale;
        let (low, high) = self.height_range();
        let (low, high) = (low * self.vertical_scale, high * self.vertical_scale);
        let corners = [(0.0, 0.0), (extent, 0.0), (0.0, extent), (extent, extent)];
        Aabb::from_points(corners.into_iter().flat_map(|(x, z)| {
            [
                trans.apply(Vec3::new(x, low, z)),
                trans.apply(Vec3::new(x, high, z)),
            ]
        }))
    }

    fn ray_test_local(&self, ray: &RayInfo) -> Option<RayHit> {
        if !self.is_ready() {
            return None;
        }
        let grid = RayInfo::new(
            ray.start().component_mul(&self.inv_scale),
            ray.end().component_mul(&self.inv_scale),
        );
        let mut best = None;
        self.visit(self.levels() - 1, 0, 0, &grid, &mut best);
        let (near, grid_normal) = best?;
        // Normals scale by the inverse of the grid-to-local stretch.
        let normal = grid_normal.component_mul(&self.inv_scale).try_normalize(EPSILON)?;
        Some(RayHit { near, normal })
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cylinder_test_on_ground(
        &self,
        trans: &Transform,
        _cylinder: &Cylinder,
        pos: Vec3,
    ) -> Option<GroundContact> {
        if !self.is_ready() {
            return None;
        }
        let local = trans.to_local(pos);
        let coord = horizontal(local) * self.inv_scale.x;
        let extent = 0.0..=self.cells() as f32;
        if !extent.contains(&coord.x) || !extent.contains(&coord.y) {
            return None;
        }

        let last = self.cells() - 1;
        let cx = (coord.x.floor() as usize).min(last);
        let cz = (coord.y.floor() as usize).min(last);
        let fx = coord.x - cx as f32;
        let fz = coord.y - cz as f32;

        let h00 = self.sample(cx, cz);
        let h10 = self.sample(cx + 1, cz);
        let h01 = self.sample(cx, cz + 1);
        let h11 = self.sample(cx + 1, cz + 1);
        let (edges, dh_dx, dh_dz) = if fz > fx {
            ([h01 - h00, h11 - h01], h11 - h01, h01 - h00)
        } else {
            ([h10 - h00, h11 - h10], h10 - h00, h11 - h10)
        };
        if edges.iter().any(|dh| dh.abs() > self.max_dh1) || (h11 - h00).abs() > self.max_dh11 {
            log::trace!("Heightmap cell ({cx}, {cz}) too steep to stand on");
            return None;
        }

        let height = h00 + fx * dh_dx + fz * dh_dz;
        let stretch = self.vertical_scale * self.inv_scale.x;
        let normal = Vec3::new(-dh_dx * stretch, 1.0, -dh_dz * stretch).normalize();
        Some(GroundContact {
            offset_height: local.y - height * self.vertical_scale,
            normal: trans.rot.rotate(normal),
            on_edge: false,
        })
    }

    fn cylinder_test_movement(
        &self,
        trans: &Transform,
        _cylinder: &Cylinder,
        movement: &RayInfo,
    ) -> Option<MovementHit> {
        self.ray_test(trans, movement).map(MovementHit::from)
    }
}

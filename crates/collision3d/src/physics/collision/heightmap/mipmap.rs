//! Max-mipmap pyramid over a square height grid
//!
//! Level 0 holds one value per grid cell: the maximum of its four corner
//! samples. Every further level halves the side and stores the maximum of
//! the 2×2 block below it, down to a single node covering the whole map.

/// Pyramid of per-node maximum heights
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaxMipmap {
    cells: usize,
    levels: Vec<Vec<f32>>,
}

impl MaxMipmap {
    /// Build every level from row-major samples with `cells + 1` per side
    ///
    /// `cells` must be a power of two.
    #[must_use]
    pub fn build(heights: &[f32], cells: usize) -> Self {
        let mut mipmap = Self {
            cells,
            levels: Vec::with_capacity(cells.trailing_zeros() as usize + 1),
        };
        let mut side = cells;
        while side > 0 {
            mipmap.levels.push(vec![f32::NEG_INFINITY; side * side]);
            side /= 2;
        }
        mipmap.refresh(heights, [0, cells - 1], [0, cells - 1]);
        mipmap
    }

    /// Number of levels
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Nodes per side at `level`
    #[must_use]
    pub const fn side(&self, level: usize) -> usize {
        self.cells >> level
    }

    /// Row-major node maxima of one level
    #[must_use]
    pub fn level(&self, level: usize) -> Option<&[f32]> {
        self.levels.get(level).map(Vec::as_slice)
    }

    /// Maximum of the node at `(x, z)` on `level`
    #[must_use]
    pub fn node(&self, level: usize, x: usize, z: usize) -> f32 {
        self.levels[level][x + z * self.side(level)]
    }

    /// Maximum over the whole grid
    #[must_use]
    pub fn max(&self) -> f32 {
        self.levels
            .last()
            .and_then(|top| top.first().copied())
            .unwrap_or(f32::NEG_INFINITY)
    }

    /// Recompute the ancestors of the sample at `(x, z)` after it changed
    ///
    /// A sample touches at most 2×2 cells, and each level above touches at
    /// most 2×2 nodes, so the cost is proportional to the level count.
    pub fn update_sample(&mut self, heights: &[f32], x: usize, z: usize) {
        let last = self.cells - 1;
        let xs = [x.saturating_sub(1), x.min(last)];
        let zs = [z.saturating_sub(1), z.min(last)];
        self.refresh(heights, xs, zs);
    }

    /// Recompute level 0 over the inclusive cell ranges, then every parent
    fn refresh(&mut self, heights: &[f32], mut xs: [usize; 2], mut zs: [usize; 2]) {
        let stride = self.cells + 1;
        let sample = |x: usize, z: usize| heights[x + z * stride];
        let base = &mut self.levels[0];
        for cz in zs[0]..=zs[1] {
            for cx in xs[0]..=xs[1] {
                base[cx + cz * self.cells] = sample(cx, cz)
                    .max(sample(cx + 1, cz))
                    .max(sample(cx, cz + 1))
                    .max(sample(cx + 1, cz + 1));
            }
        }

        for level in 1..self.levels.len() {
            xs = [xs[0] / 2, xs[1] / 2];
            zs = [zs[0] / 2, zs[1] / 2];
            let child_side = self.side(level - 1);
            let side = self.side(level);
            let (lower, upper) = self.levels.split_at_mut(level);
            let child = &lower[level - 1];
            let parent = &mut upper[0];
            for nz in zs[0]..=zs[1] {
                for nx in xs[0]..=xs[1] {
                    let c = |dx: usize, dz: usize| child[(2 * nx + dx) + (2 * nz + dz) * child_side];
                    parent[nx + nz * side] = c(0, 0).max(c(1, 0)).max(c(0, 1)).max(c(1, 1));
                }
            }
        }
    }
}

//! Kernel launch geometry
//!
//! Batched kernels use a two-dimensional grid: `grid.x` tiles the larger
//! problem dimension in blocks of `block.x` threads and `grid.y` enumerates
//! batch elements. Each `(block.x, block.y)` pair is independent work; no
//! kernel synchronizes across batch elements.

/// Three-component launch dimension
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dim3 {
    /// Fastest-varying component
    pub x: u32,
    /// Second component (batch index for grids)
    pub y: u32,
    /// Third component
    pub z: u32,
}

impl Dim3 {
    /// Create a dimension from three components
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// One-dimensional extent
    #[inline]
    pub const fn x(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Number of points covered
    #[inline]
    pub const fn volume(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }
}

/// Grid and block dimensions of one kernel launch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Number of blocks in each dimension
    pub grid: Dim3,
    /// Number of threads per block in each dimension
    pub block: Dim3,
}

impl LaunchConfig {
    /// Largest `grid.y` a single launch may use
    ///
    /// Larger batch counts are issued as consecutive launches over
    /// [`batch_chunks`].
    pub const MAX_GRID_Y: usize = 65535;

    /// Grid covering `extent` work items per batch element in tiles of
    /// `block_size` threads, one grid row per batch element
    ///
    /// `extent` and `batch_count` must be non-zero; `batch_count` must not
    /// exceed [`Self::MAX_GRID_Y`].
    #[inline]
    pub fn batched(extent: usize, batch_count: usize, block_size: u32) -> Self {
        debug_assert!(extent > 0 && batch_count > 0);
        debug_assert!(batch_count <= Self::MAX_GRID_Y);
        let blocks = (extent - 1) / block_size as usize + 1;
        Self {
            grid: Dim3::new(blocks as u32, batch_count as u32, 1),
            block: Dim3::x(block_size),
        }
    }

    /// Total number of threads launched
    #[inline]
    pub fn total_threads(&self) -> u64 {
        self.grid.volume() * self.block.volume()
    }
}

/// Position of one thread within a launch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThreadIdx {
    /// Block index within the grid
    pub block: Dim3,
    /// Thread index within the block
    pub thread: Dim3,
    /// Block dimensions of the launch
    pub block_dim: Dim3,
}

impl ThreadIdx {
    /// Global index along x: `block.x * block_dim.x + thread.x`
    #[inline]
    pub fn global_x(&self) -> usize {
        self.block.x as usize * self.block_dim.x as usize + self.thread.x as usize
    }

    /// Batch element this thread works on (`block.y`)
    #[inline]
    pub fn batch(&self) -> usize {
        self.block.y as usize
    }
}

/// Split `batch_count` into `(first_batch, len)` chunks no larger than
/// [`LaunchConfig::MAX_GRID_Y`]
pub fn batch_chunks(batch_count: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..batch_count)
        .step_by(LaunchConfig::MAX_GRID_Y)
        .map(move |first| (first, (batch_count - first).min(LaunchConfig::MAX_GRID_Y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batched_grid_covers_extent() {
        let cfg = LaunchConfig::batched(50, 3, 512);
        assert_eq!(cfg.grid, Dim3::new(1, 3, 1));
        assert_eq!(cfg.block, Dim3::x(512));

        let cfg = LaunchConfig::batched(1025, 2, 512);
        assert_eq!(cfg.grid.x, 3);
        assert!(cfg.grid.x as usize * 512 >= 1025);
        assert_eq!(cfg.total_threads(), 3 * 2 * 512);
    }

    #[test]
    fn test_global_x() {
        let t = ThreadIdx {
            block: Dim3::new(2, 7, 0),
            thread: Dim3::x(5),
            block_dim: Dim3::x(64),
        };
        assert_eq!(t.global_x(), 133);
        assert_eq!(t.batch(), 7);
    }

    #[test]
    fn test_batch_chunks() {
        assert_eq!(batch_chunks(0).count(), 0);
        assert_eq!(batch_chunks(10).collect::<Vec<_>>(), vec![(0, 10)]);
        let chunks: Vec<_> = batch_chunks(LaunchConfig::MAX_GRID_Y * 2 + 5).collect();
        assert_eq!(
            chunks,
            vec![
                (0, LaunchConfig::MAX_GRID_Y),
                (LaunchConfig::MAX_GRID_Y, LaunchConfig::MAX_GRID_Y),
                (LaunchConfig::MAX_GRID_Y * 2, 5)
            ]
        );
    }
}

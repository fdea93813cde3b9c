//! Cascade engine.
//!
//! Builds every pyramid level shallower than a populated starting depth.
//!
//! ```text
//!   depth 0            ┌───┐
//!                      │ M │ ◀── merge(quartet of depth-1 tiles)
//!                      └───┘
//!   depth 1        ┌───┬───┐
//!                  │ M │ M │ ◀── merge(quartets of depth-2 tiles)
//!                  ├───┼───┤
//!                  │ M │ M │
//!                  └───┴───┘
//!   depth start  (populated by some other process)
//! ```
//!
//! The sequential [`Cascade::run`] visits positions in post-order, so every
//! child a position needs has already been written when it is reached.
//! [`Cascade::run_parallel`] gets the same guarantee by finishing one whole
//! level before starting the level above.

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::error::{CascadeError, RasterError};
use crate::pyramid::{
    check_depth, positions_at_depth, traverse, TilePos, QUARTET_SIZE, TILE_SIZE,
};
use crate::raster::{Image, ImageMode};
use crate::store::{MissingTile, TileIo};

use super::merge::Merger;

/// Summary of a completed cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeStats {
    /// Depth the cascade started from
    pub start_depth: u32,

    /// Number of tiles merged and written
    pub tiles_written: u64,
}

/// Downsamples a populated pyramid level all the way up to the root.
///
/// # Example
///
/// ```no_run
/// use sky_pyramid::cascade::{averaging_merger, Cascade};
/// use sky_pyramid::raster::ImageMode;
/// use sky_pyramid::store::{MissingTile, NamingScheme, TileStore};
///
/// let store = TileStore::new("/data/survey", NamingScheme::Hierarchical);
/// let stats = Cascade::new(&store, ImageMode::F32)
///     .with_missing(MissingTile::Masked)
///     .run(6, &averaging_merger)?;
/// println!("wrote {} tiles", stats.tiles_written);
/// # Ok::<(), sky_pyramid::error::CascadeError>(())
/// ```
pub struct Cascade<'a, S: TileIo> {
    store: &'a S,
    mode: ImageMode,
    missing: MissingTile,
}

impl<'a, S: TileIo> Cascade<'a, S> {
    /// Create a cascade over `store` reading and writing tiles in `mode`.
    ///
    /// Missing child tiles are treated as all-zero unless
    /// [`with_missing`](Self::with_missing) says otherwise.
    pub fn new(store: &'a S, mode: ImageMode) -> Self {
        Self {
            store,
            mode,
            missing: MissingTile::default(),
        }
    }

    /// Set the policy applied when a child tile does not exist.
    ///
    /// With [`MissingTile::Absent`] a missing child is an error.
    pub fn with_missing(mut self, missing: MissingTile) -> Self {
        self.missing = missing;
        self
    }

    /// Run the cascade sequentially, in post-order.
    ///
    /// Every tile at `start` must already be present (or be acceptable as
    /// missing under the configured policy). A `start` past
    /// [`MAX_DEPTH`](crate::pyramid::MAX_DEPTH) is rejected before any tile
    /// is touched.
    pub fn run<M: Merger>(&self, start: u32, merger: &M) -> Result<CascadeStats, CascadeError> {
        let positions = traverse(start)?;
        info!(start, mode = %self.mode, missing = %self.missing, "Starting cascade");

        let mut stats = CascadeStats {
            start_depth: start,
            tiles_written: 0,
        };

        for pos in positions {
            if pos.n == start {
                continue;
            }
            self.build_tile(pos, merger)?;
            stats.tiles_written += 1;
        }

        info!(tiles = stats.tiles_written, "Cascade finished");
        Ok(stats)
    }

    /// Run the cascade one level at a time, merging each level in parallel.
    ///
    /// Produces the same tiles as [`run`](Self::run).
    pub fn run_parallel<M: Merger>(
        &self,
        start: u32,
        merger: &M,
    ) -> Result<CascadeStats, CascadeError> {
        check_depth(start)?;
        info!(start, mode = %self.mode, missing = %self.missing, "Starting parallel cascade");

        let mut stats = CascadeStats {
            start_depth: start,
            tiles_written: 0,
        };

        for depth in (0..start).rev() {
            let level: Vec<TilePos> = positions_at_depth(depth)?.collect();
            debug!(depth, tiles = level.len(), "Merging level");

            level
                .par_iter()
                .try_for_each(|&pos| self.build_tile(pos, merger))?;

            stats.tiles_written += level.len() as u64;
        }

        info!(tiles = stats.tiles_written, "Cascade finished");
        Ok(stats)
    }

    /// Merge the four children of `pos` and write the result at `pos`.
    fn build_tile<M: Merger>(&self, pos: TilePos, merger: &M) -> Result<(), CascadeError> {
        let mut quartet = Image::zeros(self.mode, QUARTET_SIZE, QUARTET_SIZE);

        for (i, child) in pos.children().into_iter().enumerate() {
            let tile = self
                .store
                .read_tile(child, self.mode, self.missing)?
                .ok_or(CascadeError::MissingChild { parent: pos, child })?;

            if tile.width() != TILE_SIZE || tile.height() != TILE_SIZE {
                return Err(CascadeError::ChildShape {
                    child,
                    source: RasterError::Shape(format!(
                        "expected {}x{}, got {}x{}",
                        TILE_SIZE,
                        TILE_SIZE,
                        tile.width(),
                        tile.height()
                    )),
                });
            }

            let x = (i % 2) * TILE_SIZE;
            let y = (i / 2) * TILE_SIZE;
            quartet
                .paste(&tile, x, y)
                .map_err(|source| CascadeError::ChildShape { child, source })?;
        }

        let merged = merger.merge(&quartet);
        self.check_merged(pos, &merged)?;

        trace!(%pos, "Writing merged tile");
        self.store.write_tile(pos, &merged)?;
        Ok(())
    }

    fn check_merged(&self, pos: TilePos, merged: &Image) -> Result<(), CascadeError> {
        if merged.mode() != self.mode {
            return Err(CascadeError::MergerOutput {
                pos,
                message: format!("mode changed from {} to {}", self.mode, merged.mode()),
            });
        }
        if merged.width() != TILE_SIZE || merged.height() != TILE_SIZE {
            return Err(CascadeError::MergerOutput {
                pos,
                message: format!(
                    "expected {}x{} tile, got {}x{}",
                    TILE_SIZE,
                    TILE_SIZE,
                    merged.width(),
                    merged.height()
                ),
            });
        }
        Ok(())
    }
}

/// Downsample tiles from depth `start` all the way to the top of the pyramid.
///
/// Shorthand for `Cascade::new(store, mode).with_missing(missing).run(start, merger)`.
pub fn cascade_images<S: TileIo, M: Merger>(
    store: &S,
    start: u32,
    mode: ImageMode,
    merger: &M,
    missing: MissingTile,
) -> Result<CascadeStats, CascadeError> {
    Cascade::new(store, mode)
        .with_missing(missing)
        .run(start, merger)
}

// =============================================================================
// Tests
// =============================================================================

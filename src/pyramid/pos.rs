//! Tile position arithmetic.
//!
//! A tile position is a `(depth, x, y)` triple in a quad-tree. Depth 0 holds a
//! single tile; every level below splits each tile into four children.
//!
//! ```text
//!          depth n                  depth n+1
//!   ┌───────────────────┐     ┌─────────┬─────────┐
//!   │                   │     │ (2x,2y) │(2x+1,2y)│
//!   │       (x, y)      │ ──▶ ├─────────┼─────────┤
//!   │                   │     │(2x,2y+1)│(2x+1,   │
//!   └───────────────────┘     │         │   2y+1) │
//!                             └─────────┴─────────┘
//! ```

use std::fmt;

use crate::error::PositionError;

// =============================================================================
// Constants
// =============================================================================

/// Edge length of a single tile in pixels.
pub const TILE_SIZE: usize = 256;

/// Edge length of a buffer holding a 2x2 grid of tiles.
pub const QUARTET_SIZE: usize = 2 * TILE_SIZE;

/// Deepest level whose tile counts fit in a `u64`.
pub const MAX_DEPTH: u32 = 31;

// =============================================================================
// TilePos
// =============================================================================

/// A tile position in the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TilePos {
    /// Depth (0 = root)
    pub n: u32,

    /// Column index within the level (0-indexed from left)
    pub x: u32,

    /// Row index within the level (0-indexed from top)
    pub y: u32,
}

impl TilePos {
    /// The single tile at depth 0.
    pub const ROOT: TilePos = TilePos { n: 0, x: 0, y: 0 };

    /// Create a new tile position.
    pub const fn new(n: u32, x: u32, y: u32) -> Self {
        Self { n, x, y }
    }

    /// Whether `x` and `y` both lie within `[0, 2^n)` and `n <= MAX_DEPTH`.
    pub fn is_valid(&self) -> bool {
        if self.n > MAX_DEPTH {
            return false;
        }
        let side = 1u64 << self.n;
        u64::from(self.x) < side && u64::from(self.y) < side
    }

    /// Return this position's parent and the quadrant this tile occupies in it.
    ///
    /// The quadrant is returned as `(x_bit, y_bit)`, each 0 or 1, so that
    /// `x == 2 * parent.x + x_bit` and `y == 2 * parent.y + y_bit`.
    ///
    /// # Errors
    ///
    /// Fails with [`PositionError::RootHasNoParent`] when `n < 1`.
    pub fn parent(&self) -> Result<(TilePos, u32, u32), PositionError> {
        if self.n < 1 {
            return Err(PositionError::RootHasNoParent(*self));
        }

        let parent = TilePos::new(self.n - 1, self.x / 2, self.y / 2);
        Ok((parent, self.x % 2, self.y % 2))
    }

    /// Return the four children of this position.
    ///
    /// The order is always top left, top right, bottom left, bottom right.
    pub fn children(&self) -> [TilePos; 4] {
        let n = self.n + 1;
        let x = self.x * 2;
        let y = self.y * 2;

        [
            TilePos::new(n, x, y),
            TilePos::new(n, x + 1, y),
            TilePos::new(n, x, y + 1),
            TilePos::new(n, x + 1, y + 1),
        ]
    }

    /// Determine whether this tile lies inside `shallower` (or is the same tile).
    ///
    /// # Errors
    ///
    /// Fails with [`PositionError::InvertedDepths`] if `self` is shallower
    /// than `shallower`.
    pub fn is_descendant_of(&self, shallower: &TilePos) -> Result<bool, PositionError> {
        if self.n < shallower.n {
            return Err(PositionError::InvertedDepths {
                deeper: *self,
                shallower: *shallower,
            });
        }

        let mut current = *self;
        while current.n > shallower.n {
            current = current.parent()?.0;
        }

        Ok(current.x == shallower.x && current.y == shallower.y)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}X{}Y{}", self.n, self.x, self.y)
    }
}

// =============================================================================
// Level Arithmetic
// =============================================================================

/// Fail with [`PositionError::DepthOutOfRange`] if `depth` exceeds [`MAX_DEPTH`].
pub fn check_depth(depth: u32) -> Result<(), PositionError> {
    if depth > MAX_DEPTH {
        return Err(PositionError::DepthOutOfRange(depth));
    }
    Ok(())
}

/// Number of tiles in the pyramid level at `depth` (`4^depth`).
///
/// Returns `None` when the count does not fit in a `u64`.
#[inline]
pub fn tiles_at_depth(depth: u32) -> Option<u64> {
    1u64.checked_shl(depth.checked_mul(2)?)
}

/// Total number of tiles in a pyramid from depth 0 through `depth` inclusive.
///
/// Returns `None` past [`MAX_DEPTH`].
#[inline]
pub fn cumulative_tiles(depth: u32) -> Option<u64> {
    if depth > MAX_DEPTH {
        return None;
    }
    Some((((1u128 << (2 * (depth + 1))) - 1) / 3) as u64)
}

/// Smallest power of two that is at least `n` and at least one tile wide.
///
/// Used to size buffers that must align to tile boundaries; anything smaller
/// than a tile is bumped up to [`TILE_SIZE`].
#[inline]
pub fn round_up_tile_size(n: u64) -> u64 {
    n.max(TILE_SIZE as u64).next_power_of_two()
}

// =============================================================================
// Tests
// =============================================================================

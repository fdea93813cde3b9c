//! Tile pyramid indexing.
//!
//! - [`TilePos`]: a `(depth, x, y)` position with parent/child arithmetic
//! - [`traverse`]: post-order walk over every position down to a depth
//! - Level arithmetic: [`tiles_at_depth`], [`cumulative_tiles`],
//!   [`round_up_tile_size`], [`check_depth`]

mod pos;
mod traverse;

pub use pos::{
    check_depth, cumulative_tiles, round_up_tile_size, tiles_at_depth, TilePos, MAX_DEPTH,
    QUARTET_SIZE, TILE_SIZE,
};
pub use traverse::{positions_at_depth, traverse, PostOrder};

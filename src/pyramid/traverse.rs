//! Pyramid traversal.
//!
//! [`traverse`] walks every position down to a maximum depth in post-order:
//! a tile is yielded only after all four of its children (and therefore all
//! of its descendants) have been yielded. Consumers that build a tile from its
//! children can process positions in yield order without extra bookkeeping.
//!
//! The walk keeps an explicit stack of frames, one per level, so memory use is
//! proportional to the depth rather than to the number of tiles.

use std::iter::FusedIterator;

use crate::error::PositionError;

use super::pos::{cumulative_tiles, TilePos};

/// One level of the in-progress walk: a position and how many of its
/// children have already been descended into.
#[derive(Debug, Clone, Copy)]
struct Frame {
    pos: TilePos,
    next_child: u8,
}

/// Post-order iterator over a pyramid. Created by [`traverse`].
#[derive(Debug, Clone)]
pub struct PostOrder {
    max_depth: u32,
    stack: Vec<Frame>,
    remaining: u64,
}

/// Generate every tile position from depth 0 to `max_depth`, children first.
///
/// Each call returns a fresh, independent iterator. The root is always the
/// last position yielded, and exactly `cumulative_tiles(max_depth)` positions
/// are produced.
///
/// # Errors
///
/// Fails with [`PositionError::DepthOutOfRange`] past [`MAX_DEPTH`](super::MAX_DEPTH).
pub fn traverse(max_depth: u32) -> Result<PostOrder, PositionError> {
    let remaining =
        cumulative_tiles(max_depth).ok_or(PositionError::DepthOutOfRange(max_depth))?;

    let mut stack = Vec::with_capacity(max_depth as usize + 1);
    stack.push(Frame {
        pos: TilePos::ROOT,
        next_child: 0,
    });

    Ok(PostOrder {
        max_depth,
        stack,
        remaining,
    })
}

impl Iterator for PostOrder {
    type Item = TilePos;

    fn next(&mut self) -> Option<TilePos> {
        loop {
            let frame = self.stack.last_mut()?;

            if frame.pos.n == self.max_depth || frame.next_child == 4 {
                let pos = frame.pos;
                self.stack.pop();
                self.remaining -= 1;
                return Some(pos);
            }

            let child = frame.pos.children()[frame.next_child as usize];
            frame.next_child += 1;
            self.stack.push(Frame {
                pos: child,
                next_child: 0,
            });
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for PostOrder {}

/// Iterate over every position at a single depth, in row-major order.
pub fn positions_at_depth(
    depth: u32,
) -> Result<impl Iterator<Item = TilePos> + Clone, PositionError> {
    super::pos::check_depth(depth)?;
    let side = 1u32 << depth;
    Ok((0..side).flat_map(move |y| (0..side).map(move |x| TilePos::new(depth, x, y))))
}

// =============================================================================
// Tests
// =============================================================================

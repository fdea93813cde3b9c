//! Cascade engine and mergers.
//!
//! - [`Cascade`]: builds shallower pyramid levels from a populated level
//! - [`Merger`]: downsamples a 2x2 grid of child tiles into one tile
//! - [`averaging_merger`]: the reference merger, a masked quartet mean

mod engine;
mod merge;

pub use engine::{cascade_images, Cascade, CascadeStats};
pub use merge::{averaging_merger, Merger};

//! # sky-pyramid
//!
//! Quad-tree tile pyramids for large sky-survey images.
//!
//! A pyramid stores an image as 256x256 tiles at many resolutions. Depth 0 is
//! a single tile covering everything; each deeper level doubles the
//! resolution. This crate provides the indexing and storage of such pyramids
//! and the cascade that fills coarse levels from a populated fine level.
//!
//! ## Architecture
//!
//! - [`pyramid`] - Tile position arithmetic and post-order traversal
//! - [`store`] - Tile store: naming schemes, missing-tile policy, metadata
//! - [`cascade`] - Cascade engine and merger functions
//! - [`raster`] - Tile buffers and their PNG/TIFF encodings
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use sky_pyramid::cascade::{averaging_merger, cascade_images};
//! use sky_pyramid::raster::ImageMode;
//! use sky_pyramid::store::{MissingTile, NamingScheme, TileStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Tiles at depth 4 were produced by an earlier reprojection step.
//!     let store = TileStore::with_scheme_name("/data/survey", "L/Y/YX")?;
//!     assert_eq!(store.scheme(), NamingScheme::Hierarchical);
//!
//!     let stats = cascade_images(
//!         &store,
//!         4,
//!         ImageMode::Rgb,
//!         &averaging_merger,
//!         MissingTile::Zeros,
//!     )?;
//!     println!("{} tiles written", stats.tiles_written);
//!     Ok(())
//! }
//! ```

pub mod cascade;
pub mod config;
pub mod error;
pub mod pyramid;
pub mod raster;
pub mod store;

// Re-export commonly used types
pub use cascade::{averaging_merger, cascade_images, Cascade, CascadeStats, Merger};
pub use config::{CascadeConfig, Cli, Command, InfoConfig, PathConfig, PyramidArgs};
pub use error::{CascadeError, ConfigError, PositionError, RasterError, StoreError};
pub use pyramid::{
    cumulative_tiles, positions_at_depth, round_up_tile_size, tiles_at_depth, traverse, TilePos,
    TILE_SIZE,
};
pub use raster::{Image, ImageMode};
pub use store::{MissingTile, NamingScheme, PyramidManifest, TileIo, TileStore};

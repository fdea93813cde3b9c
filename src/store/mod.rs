//! Tile storage.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             Cascade Engine              │
//! └────────────────────┬────────────────────┘
//!                      │  TileIo
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               TileStore                 │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ NamingScheme │  │  MissingTile    │  │
//! │  │ (pos → path) │  │  (not-found →   │  │
//! │  │              │  │   placeholder)  │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          raster::load / save            │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileStore`]: filesystem store rooted at a base directory
//! - [`TileIo`]: the read/write seam the cascade engine depends on
//! - [`NamingScheme`]: `L/Y/YX` (hierarchical) or `LXY` (flat) layout
//! - [`MissingTile`]: what a read of a missing tile returns
//! - [`PyramidManifest`]: JSON sidecar describing the pyramid

mod manifest;
mod scheme;
mod tile_store;

pub use manifest::{PyramidManifest, MANIFEST_NAME};
pub use scheme::NamingScheme;
pub use tile_store::{ensure_dir, MissingTile, TileIo, TileStore};

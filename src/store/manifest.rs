//! Pyramid manifest sidecar.
//!
//! A small JSON document kept next to the tiles describing how the pyramid is
//! laid out, so later tools do not need to be told the scheme and depth again.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{PositionError, StoreError};
use crate::pyramid::{cumulative_tiles, TILE_SIZE};
use crate::raster::ImageMode;

use super::scheme::NamingScheme;
use super::tile_store::TileStore;

/// File name of the manifest under the pyramid's base directory.
pub const MANIFEST_NAME: &str = "pyramid.json";

/// Layout description of a tile pyramid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidManifest {
    pub scheme: NamingScheme,
    pub url_template: String,
    /// Deepest populated level
    pub depth: u32,
    pub tile_size: usize,
    pub mode: ImageMode,
    /// Number of tiles from depth 0 through `depth`
    pub tile_count: u64,
}

impl PyramidManifest {
    /// Fails if `depth` is past [`MAX_DEPTH`](crate::pyramid::MAX_DEPTH).
    pub fn new(
        scheme: NamingScheme,
        depth: u32,
        mode: ImageMode,
    ) -> Result<Self, PositionError> {
        let tile_count = cumulative_tiles(depth).ok_or(PositionError::DepthOutOfRange(depth))?;
        Ok(Self {
            scheme,
            url_template: scheme.url_template().to_string(),
            depth,
            tile_size: TILE_SIZE,
            mode,
            tile_count,
        })
    }

    /// Manifest describing the pyramid held by `store`.
    pub fn for_store(
        store: &TileStore,
        depth: u32,
        mode: ImageMode,
    ) -> Result<Self, PositionError> {
        Self::new(store.scheme(), depth, mode)
    }

    /// Write the manifest into the store's base directory.
    pub fn write(&self, store: &TileStore) -> Result<(), StoreError> {
        let mut writer = store.open_metadata_write(MANIFEST_NAME)?;
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| {
            StoreError::Metadata {
                name: MANIFEST_NAME.to_string(),
                source,
            }
        })?;
        writer.flush().map_err(|source| StoreError::Io {
            path: store.base_dir().join(MANIFEST_NAME),
            source,
        })
    }

    /// Read the manifest from the store's base directory.
    pub fn read(store: &TileStore) -> Result<Self, StoreError> {
        let reader = store.open_metadata_read(MANIFEST_NAME)?;
        serde_json::from_reader(reader).map_err(|source| StoreError::Metadata {
            name: MANIFEST_NAME.to_string(),
            source,
        })
    }
}

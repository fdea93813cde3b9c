//! Test utilities for integration tests.
//!
//! Helpers for building scratch pyramids on disk and filling levels with
//! synthetic tiles.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ndarray::Array3;
use tempfile::TempDir;

use sky_pyramid::pyramid::{positions_at_depth, TilePos, TILE_SIZE};
use sky_pyramid::raster::{Image, ImageMode};
use sky_pyramid::store::{MissingTile, NamingScheme, TileIo, TileStore};

// =============================================================================
// Scratch Pyramid
// =============================================================================

/// A tile store in a temporary directory, removed when dropped.
pub struct ScratchPyramid {
    // Held for its Drop impl.
    _dir: TempDir,
    pub store: TileStore,
}

impl ScratchPyramid {
    pub fn new(scheme: NamingScheme) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = TileStore::new(dir.path().join("pyramid"), scheme);
        Self { _dir: dir, store }
    }

    /// Write a tile at every position of `depth`, valued by `value(pos)`.
    pub fn populate(&self, depth: u32, mode: ImageMode, value: impl Fn(TilePos) -> f32) {
        for pos in positions_at_depth(depth).expect("valid depth") {
            self.store
                .write_tile(pos, &constant_tile(mode, value(pos)))
                .expect("write tile");
        }
    }

    pub fn read(&self, pos: TilePos, mode: ImageMode) -> Option<Image> {
        self.store
            .read_tile(pos, mode, MissingTile::Absent)
            .expect("read tile")
    }

    /// Raw bytes of every tile file shallower than `depth`, keyed by position.
    pub fn file_bytes_above(&self, depth: u32, mode: ImageMode) -> BTreeMap<TilePos, Vec<u8>> {
        let mut out = BTreeMap::new();
        for d in 0..depth {
            for pos in positions_at_depth(d).expect("valid depth") {
                let path = self.tile_file(pos, mode);
                out.insert(pos, std::fs::read(&path).expect("read tile file"));
            }
        }
        out
    }

    pub fn tile_file(&self, pos: TilePos, mode: ImageMode) -> PathBuf {
        self.store
            .tile_path(pos, mode.default_extension())
            .expect("tile path")
    }
}

// =============================================================================
// Tile Builders
// =============================================================================

/// A full-size tile with every sample set to `value`.
///
/// For `Rgba` the alpha channel is opaque.
pub fn constant_tile(mode: ImageMode, value: f32) -> Image {
    let shape = (TILE_SIZE, TILE_SIZE, mode.channels());
    match mode {
        ImageMode::F32 => Image::from_f32(Array3::from_elem(shape, value)).unwrap(),
        ImageMode::Rgb => Image::from_u8(mode, Array3::from_elem(shape, value as u8)).unwrap(),
        ImageMode::Rgba => {
            let data = Array3::from_shape_fn(shape, |(_, _, c)| if c == 3 { 255 } else { value as u8 });
            Image::from_u8(mode, data).unwrap()
        }
    }
}

/// Mean of the samples in `image` that are not NaN.
pub fn nan_mean(image: &Image) -> f64 {
    let samples = image.as_f32().expect("float image");
    let (sum, count) = samples
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0f64, 0u64), |(s, n), &v| (s + f64::from(v), n + 1));
    sum / count as f64
}

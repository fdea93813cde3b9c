//! Filesystem tile store.
//!
//! [`TileStore`] owns the mapping from tile positions to files under a base
//! directory. Callers never build tile paths themselves.
//!
//! # Missing Tiles
//!
//! Reads of a tile that does not exist are resolved locally through a
//! [`MissingTile`] policy instead of being reported as errors. Every other
//! failure (permissions, corrupt data) propagates.
//!
//! # Directories
//!
//! Resolving a tile path creates the directories that will contain it. All
//! directory creation goes through [`ensure_dir`], which treats an existing
//! directory as success, including when parallel workers race to create the
//! same one.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::trace;

use crate::error::{ConfigError, RasterError, StoreError};
use crate::pyramid::{TilePos, TILE_SIZE};
use crate::raster::{self, Image, ImageMode};

use super::scheme::NamingScheme;

// =============================================================================
// Missing-Tile Policy
// =============================================================================

/// What a read returns when the requested tile does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTile {
    /// Return no image.
    Absent,

    /// Return a tile-sized buffer in which every pixel is masked.
    Masked,

    /// Return a tile-sized all-zero buffer.
    #[default]
    Zeros,
}

impl MissingTile {
    /// The placeholder image this policy substitutes for a missing tile.
    pub fn placeholder(&self, mode: ImageMode) -> Option<Image> {
        match self {
            MissingTile::Absent => None,
            MissingTile::Masked => Some(Image::masked(mode, TILE_SIZE, TILE_SIZE)),
            MissingTile::Zeros => Some(Image::zeros(mode, TILE_SIZE, TILE_SIZE)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MissingTile::Absent => "none",
            MissingTile::Masked => "masked",
            MissingTile::Zeros => "zeros",
        }
    }
}

impl fmt::Display for MissingTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingTile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(MissingTile::Absent),
            "masked" => Ok(MissingTile::Masked),
            "zeros" => Ok(MissingTile::Zeros),
            _ => Err(ConfigError::UnknownMissingPolicy(s.to_string())),
        }
    }
}

// =============================================================================
// TileIo Trait
// =============================================================================

/// Whole-tile reads and writes keyed by position.
///
/// This is the seam the cascade engine works through. Implementations must be
/// shareable across threads so levels can be processed in parallel.
pub trait TileIo: Sync {
    /// Read the tile at `pos` in `mode`.
    ///
    /// Returns `Ok(None)` only when the tile does not exist and `missing` is
    /// [`MissingTile::Absent`].
    fn read_tile(
        &self,
        pos: TilePos,
        mode: ImageMode,
        missing: MissingTile,
    ) -> Result<Option<Image>, StoreError>;

    /// Write `image` as the tile at `pos`, replacing any existing tile.
    fn write_tile(&self, pos: TilePos, image: &Image) -> Result<(), StoreError>;
}

// =============================================================================
// TileStore
// =============================================================================

/// Tile pyramid stored as files under a base directory.
///
/// The naming scheme is fixed at construction.
///
/// # Example
///
/// ```no_run
/// use sky_pyramid::pyramid::TilePos;
/// use sky_pyramid::store::{NamingScheme, TileStore};
///
/// let store = TileStore::new("/data/survey", NamingScheme::Hierarchical);
/// let path = store.tile_path(TilePos::new(2, 3, 1), "png").unwrap();
/// assert_eq!(path.to_str(), Some("/data/survey/2/1/1_3.png"));
/// assert_eq!(store.url_template(), "{1}/{3}/{3}_{2}");
/// ```
#[derive(Debug, Clone)]
pub struct TileStore {
    base_dir: PathBuf,
    scheme: NamingScheme,
}

impl TileStore {
    /// Create a store rooted at `base_dir`. Nothing is created on disk yet.
    pub fn new(base_dir: impl Into<PathBuf>, scheme: NamingScheme) -> Self {
        Self {
            base_dir: base_dir.into(),
            scheme,
        }
    }

    /// Create a store from a scheme identifier (`"L/Y/YX"` or `"LXY"`).
    pub fn with_scheme_name(
        base_dir: impl Into<PathBuf>,
        scheme: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(base_dir, scheme.parse()?))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn scheme(&self) -> NamingScheme {
        self.scheme
    }

    /// URL template for viewer descriptions, e.g. `{1}/{3}/{3}_{2}`.
    pub fn url_template(&self) -> &'static str {
        self.scheme.url_template()
    }

    /// Get the path for a tile, creating its containing directories.
    pub fn tile_path(&self, pos: TilePos, extension: &str) -> Result<PathBuf, StoreError> {
        let dir = self.scheme.tile_dir(&self.base_dir, pos);
        ensure_dir(&dir)?;
        Ok(dir.join(self.scheme.file_name(pos, extension)))
    }

    /// Open a metadata file under the base directory for reading.
    pub fn open_metadata_read(&self, name: &str) -> Result<BufReader<File>, StoreError> {
        let path = self.base_dir.join(name);
        let file = File::open(&path).map_err(|source| StoreError::Io { path, source })?;
        Ok(BufReader::new(file))
    }

    /// Open a metadata file under the base directory for writing, truncating
    /// any existing contents.
    pub fn open_metadata_write(&self, name: &str) -> Result<BufWriter<File>, StoreError> {
        ensure_dir(&self.base_dir)?;
        let path = self.base_dir.join(name);
        let file = File::create(&path).map_err(|source| StoreError::Io { path, source })?;
        Ok(BufWriter::new(file))
    }
}

impl TileIo for TileStore {
    fn read_tile(
        &self,
        pos: TilePos,
        mode: ImageMode,
        missing: MissingTile,
    ) -> Result<Option<Image>, StoreError> {
        let path = self.tile_path(pos, mode.default_extension())?;

        match raster::load(&path, mode) {
            Ok(image) => Ok(Some(image)),
            Err(RasterError::NotFound(_)) => {
                trace!(%pos, policy = %missing, "tile missing");
                Ok(missing.placeholder(mode))
            }
            Err(RasterError::IncompatibleMode { expected, found, .. }) => {
                Err(StoreError::ModeMismatch {
                    pos,
                    expected,
                    found,
                })
            }
            Err(source) => Err(StoreError::Raster { pos, source }),
        }
    }

    fn write_tile(&self, pos: TilePos, image: &Image) -> Result<(), StoreError> {
        let path = self.tile_path(pos, image.mode().default_extension())?;
        trace!(%pos, path = %path.display(), "writing tile");
        raster::save(image, &path).map_err(|source| StoreError::Raster { pos, source })
    }
}

/// Create `dir` and its parents. An existing directory is not an error.
///
/// `create_dir_all` already tolerates another thread creating a component
/// between its existence check and its own `mkdir`.
pub fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

// =============================================================================
// Tests
// =============================================================================

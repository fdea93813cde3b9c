use std::path::PathBuf;

use thiserror::Error;

use crate::pyramid::TilePos;
use crate::raster::ImageMode;

/// Configuration errors, raised before any tile work begins
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Naming scheme is not one of the supported layouts
    #[error("Unsupported naming scheme: {0:?} (expected \"L/Y/YX\" or \"LXY\")")]
    UnknownScheme(String),

    /// Missing-tile policy is not recognized
    #[error("Unsupported missing-tile policy: {0:?} (expected \"none\", \"masked\" or \"zeros\")")]
    UnknownMissingPolicy(String),

    /// Image mode is not recognized
    #[error("Unsupported image mode: {0:?} (expected \"rgb\", \"rgba\" or \"f32\")")]
    UnknownMode(String),

    /// Any other invalid setting
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Contract violations in tile position arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The root tile has no parent
    #[error("Cannot take the parent of {0}: depth must be at least 1")]
    RootHasNoParent(TilePos),

    /// Ancestor test called with the depths swapped
    #[error("Position {deeper} is shallower than {shallower}")]
    InvertedDepths { deeper: TilePos, shallower: TilePos },

    /// Depth whose tile counts do not fit in a `u64`
    #[error("Depth {0} is deeper than the maximum of {max}", max = crate::pyramid::MAX_DEPTH)]
    DepthOutOfRange(u32),
}

/// Errors from loading, saving, or manipulating raster buffers
#[derive(Debug, Error)]
pub enum RasterError {
    /// The file does not exist
    #[error("Image not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other filesystem failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but could not be decoded
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// The image could not be encoded or written
    #[error("Failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    /// The stored pixel data cannot be represented in the requested mode
    #[error("Cannot read {} as {expected}: stored data is {found}", path.display())]
    IncompatibleMode {
        path: PathBuf,
        expected: ImageMode,
        found: String,
    },

    /// Buffer geometry does not fit the requested operation
    #[error("Shape mismatch: {0}")]
    Shape(String),
}

/// Errors from the tile store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Directory creation or metadata stream failure
    #[error("Storage error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tile could not be read or written
    #[error("Tile {pos}: {source}")]
    Raster {
        pos: TilePos,
        #[source]
        source: RasterError,
    },

    /// A metadata document could not be serialized or parsed
    #[error("Invalid metadata in {name}: {source}")]
    Metadata {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored tile cannot be read in the requested mode without losing data
    #[error("Tile {pos} is stored as {found}, which cannot be read as {expected}")]
    ModeMismatch {
        pos: TilePos,
        expected: ImageMode,
        found: String,
    },
}

/// Errors from the cascade engine
#[derive(Debug, Error)]
pub enum CascadeError {
    /// Error from the underlying tile store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The starting depth is out of range
    #[error(transparent)]
    Position(#[from] PositionError),

    /// A required child tile does not exist (strict missing-tile policy)
    #[error("Child tile {child} of {parent} does not exist")]
    MissingChild { parent: TilePos, child: TilePos },

    /// A child tile could not be placed into the quartet buffer
    #[error("Child tile {child} has unusable geometry: {source}")]
    ChildShape {
        child: TilePos,
        #[source]
        source: RasterError,
    },

    /// The merger returned a buffer that breaks the merger contract
    #[error("Merger output for {pos} is invalid: {message}")]
    MergerOutput { pos: TilePos, message: String },
}

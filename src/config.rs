//! Configuration management for sky-pyramid.
//!
//! The CLI is built with clap. Every option can also be supplied through an
//! environment variable with the `SKY_PYRAMID_` prefix.
//!
//! # Subcommands
//!
//! - `cascade` - Build all levels above a populated depth
//! - `path` - Print the file path of a tile
//! - `info` - Print tile counts and layout details
//!
//! # Environment Variables
//!
//! - `SKY_PYRAMID_BASE_DIR` - Pyramid base directory
//! - `SKY_PYRAMID_SCHEME` - Naming scheme, `L/Y/YX` or `LXY` (default: L/Y/YX)
//! - `SKY_PYRAMID_START_DEPTH` - Depth the cascade starts from
//! - `SKY_PYRAMID_MODE` - Tile mode, `rgb`, `rgba` or `f32` (default: rgb)
//! - `SKY_PYRAMID_MISSING` - Missing-tile policy, `none`, `masked` or `zeros`
//!   (default: zeros)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::ConfigError;
use crate::pyramid::{TilePos, MAX_DEPTH};
use crate::raster::ImageMode;
use crate::store::{MissingTile, NamingScheme, TileStore};

// =============================================================================
// Default Values
// =============================================================================

/// Default naming scheme identifier.
pub const DEFAULT_SCHEME: &str = "L/Y/YX";

/// Default tile mode.
pub const DEFAULT_MODE: &str = "rgb";

/// Default missing-tile policy for the cascade.
pub const DEFAULT_MISSING: &str = "zeros";

/// Default tile file extension for `path`.
pub const DEFAULT_EXTENSION: &str = "png";

// =============================================================================
// CLI Arguments
// =============================================================================

/// sky-pyramid - quad-tree tile pyramids for sky-survey imagery.
#[derive(Parser, Debug, Clone)]
#[command(name = "sky-pyramid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build every level above a populated depth by merging child tiles.
    Cascade(CascadeConfig),

    /// Print the file path of a tile (creating its directories).
    Path(PathConfig),

    /// Print tile counts and layout details.
    Info(InfoConfig),
}

/// Location and layout of a pyramid on disk.
#[derive(Args, Debug, Clone)]
pub struct PyramidArgs {
    /// Pyramid base directory.
    #[arg(long, env = "SKY_PYRAMID_BASE_DIR")]
    pub base_dir: PathBuf,

    /// Tile naming scheme: "L/Y/YX" (hierarchical) or "LXY" (flat).
    #[arg(long, default_value = DEFAULT_SCHEME, env = "SKY_PYRAMID_SCHEME")]
    pub scheme: String,
}

impl PyramidArgs {
    pub fn scheme(&self) -> Result<NamingScheme, ConfigError> {
        self.scheme.parse()
    }

    /// Build the tile store these arguments describe.
    pub fn open_store(&self) -> Result<TileStore, ConfigError> {
        TileStore::with_scheme_name(&self.base_dir, &self.scheme)
    }
}

/// Arguments for `cascade`.
#[derive(Args, Debug, Clone)]
pub struct CascadeConfig {
    #[command(flatten)]
    pub pyramid: PyramidArgs,

    /// Depth whose tiles are already populated.
    #[arg(long, env = "SKY_PYRAMID_START_DEPTH")]
    pub start_depth: u32,

    /// Tile mode: "rgb", "rgba" or "f32".
    #[arg(long, default_value = DEFAULT_MODE, env = "SKY_PYRAMID_MODE")]
    pub mode: String,

    /// What to use for a missing child tile: "none" (fail), "masked" or "zeros".
    #[arg(long, default_value = DEFAULT_MISSING, env = "SKY_PYRAMID_MISSING")]
    pub missing: String,

    /// Merge each level in parallel.
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
}

impl CascadeConfig {
    /// Validate the configuration before any tile is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pyramid.scheme()?;
        self.mode()?;
        self.missing()?;

        if self.start_depth > MAX_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "start_depth must be at most {}, got {}",
                MAX_DEPTH, self.start_depth
            )));
        }

        Ok(())
    }

    pub fn mode(&self) -> Result<ImageMode, ConfigError> {
        self.mode.parse()
    }

    pub fn missing(&self) -> Result<MissingTile, ConfigError> {
        self.missing.parse()
    }
}

/// Arguments for `path`.
#[derive(Args, Debug, Clone)]
pub struct PathConfig {
    #[command(flatten)]
    pub pyramid: PyramidArgs,

    /// File extension of the tile.
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Tile depth.
    pub n: u32,

    /// Tile column.
    pub x: u32,

    /// Tile row.
    pub y: u32,
}

impl PathConfig {
    /// Validate the configuration and return the requested position.
    pub fn validate(&self) -> Result<TilePos, ConfigError> {
        self.pyramid.scheme()?;

        let pos = TilePos::new(self.n, self.x, self.y);
        if !pos.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "tile {} is outside its level (x and y must be below 2^n)",
                pos
            )));
        }
        if self.extension.is_empty() {
            return Err(ConfigError::Invalid("extension must not be empty".to_string()));
        }

        Ok(pos)
    }
}

/// Arguments for `info`.
#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// Deepest level to report.
    #[arg(long)]
    pub depth: Option<u32>,

    /// Pyramid base directory; when given, its layout and manifest are shown.
    #[arg(long, env = "SKY_PYRAMID_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Tile naming scheme: "L/Y/YX" (hierarchical) or "LXY" (flat).
    #[arg(long, default_value = DEFAULT_SCHEME, env = "SKY_PYRAMID_SCHEME")]
    pub scheme: String,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheme.parse::<NamingScheme>()?;

        if let Some(depth) = self.depth {
            if depth > MAX_DEPTH {
                return Err(ConfigError::Invalid(format!(
                    "depth must be at most {}, got {}",
                    MAX_DEPTH, depth
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

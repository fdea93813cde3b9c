//! Tile naming schemes.
//!
//! A naming scheme maps a tile position to a location under the pyramid's
//! base directory, and provides the matching URL template for viewer
//! descriptions (`{1}` = depth, `{2}` = x, `{3}` = y).
//!
//! | Scheme   | Path for `(n=2, x=3, y=1)` | URL template      |
//! |----------|----------------------------|-------------------|
//! | `L/Y/YX` | `2/1/1_3.png`              | `{1}/{3}/{3}_{2}` |
//! | `LXY`    | `L2X3Y1.png`               | `L{1}X{2}Y{3}`    |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pyramid::TilePos;

/// The on-disk layout of a tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NamingScheme {
    /// `<base>/<n>/<y>/<y>_<x>.<ext>`
    #[default]
    #[serde(rename = "L/Y/YX")]
    Hierarchical,

    /// `<base>/L<n>X<x>Y<y>.<ext>`
    #[serde(rename = "LXY")]
    Flat,
}

impl NamingScheme {
    /// The identifier used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            NamingScheme::Hierarchical => "L/Y/YX",
            NamingScheme::Flat => "LXY",
        }
    }

    /// Placeholder template describing tile URLs under this scheme.
    pub fn url_template(&self) -> &'static str {
        match self {
            NamingScheme::Hierarchical => "{1}/{3}/{3}_{2}",
            NamingScheme::Flat => "L{1}X{2}Y{3}",
        }
    }

    /// Directory under `base` that holds the tile at `pos`.
    pub fn tile_dir(&self, base: &Path, pos: TilePos) -> PathBuf {
        match self {
            NamingScheme::Hierarchical => base.join(pos.n.to_string()).join(pos.y.to_string()),
            NamingScheme::Flat => base.to_path_buf(),
        }
    }

    /// File name of the tile at `pos`.
    pub fn file_name(&self, pos: TilePos, extension: &str) -> String {
        match self {
            NamingScheme::Hierarchical => format!("{}_{}.{}", pos.y, pos.x, extension),
            NamingScheme::Flat => format!("L{}X{}Y{}.{}", pos.n, pos.x, pos.y, extension),
        }
    }

    /// Full path of the tile at `pos`. Pure; creates nothing.
    pub fn tile_path(&self, base: &Path, pos: TilePos, extension: &str) -> PathBuf {
        self.tile_dir(base, pos).join(self.file_name(pos, extension))
    }
}

impl fmt::Display for NamingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamingScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L/Y/YX" => Ok(NamingScheme::Hierarchical),
            "LXY" => Ok(NamingScheme::Flat),
            _ => Err(ConfigError::UnknownScheme(s.to_string())),
        }
    }
}

//! In-memory tile buffers.

use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RasterError};

// =============================================================================
// Image Mode
// =============================================================================

/// Pixel data mode of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// 8-bit RGB. Cannot express masked pixels; masked buffers are black.
    Rgb,
    /// 8-bit RGBA. Pixels with zero alpha are masked.
    Rgba,
    /// Single-channel 32-bit float. NaN pixels are masked.
    F32,
}

impl ImageMode {
    /// Number of samples per pixel.
    pub fn channels(&self) -> usize {
        match self {
            ImageMode::Rgb => 3,
            ImageMode::Rgba => 4,
            ImageMode::F32 => 1,
        }
    }

    /// File extension used when saving tiles in this mode.
    pub fn default_extension(&self) -> &'static str {
        match self {
            ImageMode::Rgb | ImageMode::Rgba => "png",
            ImageMode::F32 => "tif",
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMode::Rgb => "rgb",
            ImageMode::Rgba => "rgba",
            ImageMode::F32 => "f32",
        }
    }
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ImageMode::Rgb),
            "rgba" => Ok(ImageMode::Rgba),
            "f32" | "float32" => Ok(ImageMode::F32),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

// =============================================================================
// Pixel Data
// =============================================================================

/// Raw samples laid out as `(rows, columns, channels)`.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// 8-bit samples, for `Rgb` and `Rgba`
    U8(Array3<u8>),

    /// 32-bit float samples, for `F32`
    F32(Array3<f32>),
}

impl PixelData {
    fn shape(&self) -> &[usize] {
        match self {
            PixelData::U8(a) => a.shape(),
            PixelData::F32(a) => a.shape(),
        }
    }
}

// =============================================================================
// Image
// =============================================================================

/// A raster buffer tagged with its pixel mode.
///
/// The sample type and channel count always agree with the mode: `Rgb` and
/// `Rgba` hold `u8` samples with 3 and 4 channels, `F32` holds one `f32`
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    mode: ImageMode,
    data: PixelData,
}

impl Image {
    /// Allocate an all-zero buffer.
    pub fn zeros(mode: ImageMode, width: usize, height: usize) -> Self {
        let shape = (height, width, mode.channels());
        let data = match mode {
            ImageMode::Rgb | ImageMode::Rgba => PixelData::U8(Array3::zeros(shape)),
            ImageMode::F32 => PixelData::F32(Array3::zeros(shape)),
        };
        Self { mode, data }
    }

    /// Allocate a buffer in which every pixel is masked.
    ///
    /// Float buffers are filled with NaN, RGBA buffers with transparent black.
    /// RGB has no way to express a mask, so it gets plain black.
    pub fn masked(mode: ImageMode, width: usize, height: usize) -> Self {
        match mode {
            ImageMode::F32 => Self {
                mode,
                data: PixelData::F32(Array3::from_elem((height, width, 1), f32::NAN)),
            },
            _ => Self::zeros(mode, width, height),
        }
    }

    /// Wrap 8-bit samples. `mode` must be `Rgb` or `Rgba` with a matching
    /// channel axis.
    pub fn from_u8(mode: ImageMode, data: Array3<u8>) -> Result<Self, RasterError> {
        if mode == ImageMode::F32 {
            return Err(RasterError::Shape(
                "8-bit samples cannot back an f32 image".to_string(),
            ));
        }
        Self::checked(mode, PixelData::U8(data))
    }

    /// Wrap single-channel float samples.
    pub fn from_f32(data: Array3<f32>) -> Result<Self, RasterError> {
        Self::checked(ImageMode::F32, PixelData::F32(data))
    }

    /// Wrap samples already known to agree with `mode`.
    pub(crate) fn from_parts(mode: ImageMode, data: PixelData) -> Self {
        debug_assert_eq!(data.shape()[2], mode.channels());
        Self { mode, data }
    }

    fn checked(mode: ImageMode, data: PixelData) -> Result<Self, RasterError> {
        let channels = data.shape()[2];
        if channels != mode.channels() {
            return Err(RasterError::Shape(format!(
                "{} image needs {} channels, got {}",
                mode,
                mode.channels(),
                channels
            )));
        }
        Ok(Self { mode, data })
    }

    /// Pixel mode of this buffer.
    pub fn mode(&self) -> ImageMode {
        self.mode
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }

    /// Borrow the raw samples.
    pub fn data(&self) -> &PixelData {
        &self.data
    }

    /// Take ownership of the raw samples.
    pub fn into_data(self) -> PixelData {
        self.data
    }

    /// The samples of an `Rgb` or `Rgba` buffer, `None` for `F32`.
    pub fn as_u8(&self) -> Option<&Array3<u8>> {
        match &self.data {
            PixelData::U8(a) => Some(a),
            PixelData::F32(_) => None,
        }
    }

    /// The samples of an `F32` buffer, `None` for 8-bit modes.
    pub fn as_f32(&self) -> Option<&Array3<f32>> {
        match &self.data {
            PixelData::F32(a) => Some(a),
            PixelData::U8(_) => None,
        }
    }

    /// Copy `tile` into this buffer with its top-left corner at `(x, y)`.
    pub fn paste(&mut self, tile: &Image, x: usize, y: usize) -> Result<(), RasterError> {
        if tile.mode != self.mode {
            return Err(RasterError::Shape(format!(
                "cannot paste a {} tile into a {} buffer",
                tile.mode, self.mode
            )));
        }

        let (w, h) = (tile.width(), tile.height());
        if x + w > self.width() || y + h > self.height() {
            return Err(RasterError::Shape(format!(
                "{}x{} tile at ({}, {}) does not fit in {}x{} buffer",
                w,
                h,
                x,
                y,
                self.width(),
                self.height()
            )));
        }

        match (&mut self.data, &tile.data) {
            (PixelData::U8(dst), PixelData::U8(src)) => {
                dst.slice_mut(s![y..y + h, x..x + w, ..]).assign(src)
            }
            (PixelData::F32(dst), PixelData::F32(src)) => {
                dst.slice_mut(s![y..y + h, x..x + w, ..]).assign(src)
            }
            // Modes are equal, so the sample types are too.
            _ => unreachable!("mode and sample type disagree"),
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Reading and writing tile files.
//!
//! 8-bit modes are stored as PNG through the `image` crate. Float tiles are
//! stored as single-channel 32-bit float TIFF through the `tiff` crate, since
//! PNG cannot carry float samples or NaN masks.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use image::{DynamicImage, ExtendedColorType, ImageFormat, ImageReader};
use ndarray::Array3;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

use crate::error::RasterError;

use super::buffer::{Image, ImageMode, PixelData};

/// Load the tile at `path` in the requested mode.
///
/// # Errors
///
/// - [`RasterError::NotFound`] if the file does not exist
/// - [`RasterError::Io`] for any other filesystem failure
/// - [`RasterError::Decode`] if the contents are not a readable image
/// - [`RasterError::IncompatibleMode`] if the stored samples cannot be
///   represented in `mode` without loss. Gray and RGB files widen to RGB or
///   RGBA; files with an alpha channel can only be read as RGBA.
pub fn load(path: &Path, mode: ImageMode) -> Result<Image, RasterError> {
    match mode {
        ImageMode::Rgb | ImageMode::Rgba => load_8bit(path, mode),
        ImageMode::F32 => load_float(path),
    }
}

/// Save `image` to `path`, replacing any existing file.
pub fn save(img: &Image, path: &Path) -> Result<(), RasterError> {
    let width = img.width() as u32;
    let height = img.height() as u32;

    match img.data() {
        PixelData::U8(data) => {
            let color = match img.mode() {
                ImageMode::Rgb => ExtendedColorType::Rgb8,
                _ => ExtendedColorType::Rgba8,
            };
            let raw: Vec<u8> = data.iter().copied().collect();

            image::save_buffer_with_format(path, &raw, width, height, color, ImageFormat::Png)
                .map_err(|e| RasterError::Encode {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
        }
        PixelData::F32(data) => {
            let raw: Vec<f32> = data.iter().copied().collect();
            let file = File::create(path).map_err(|e| io_error(path, e))?;
            let mut writer = BufWriter::new(file);

            {
                let mut encoder =
                    TiffEncoder::new(&mut writer).map_err(|e| encode_error(path, e))?;
                encoder
                    .write_image::<colortype::Gray32Float>(width, height, &raw)
                    .map_err(|e| encode_error(path, e))?;
            }

            writer.flush().map_err(|e| io_error(path, e))
        }
    }
}

fn load_8bit(path: &Path, mode: ImageMode) -> Result<Image, RasterError> {
    let reader = ImageReader::open(path)
        .map_err(|e| io_error(path, e))?
        .with_guessed_format()
        .map_err(|e| io_error(path, e))?;

    let decoded = reader.decode().map_err(|e| RasterError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let (width, height) = (decoded.width() as usize, decoded.height() as usize);
    let has_alpha = match &decoded {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => false,
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageRgba8(_) => true,
        other => return Err(incompatible(path, mode, other)),
    };

    // Widening is lossless; reading an alpha channel as RGB would unmask pixels.
    if has_alpha && mode == ImageMode::Rgb {
        return Err(incompatible(path, mode, &decoded));
    }

    let raw = match mode {
        ImageMode::Rgb => decoded.to_rgb8().into_raw(),
        _ => decoded.to_rgba8().into_raw(),
    };

    let data = Array3::from_shape_vec((height, width, mode.channels()), raw)
        .map_err(|e| RasterError::Shape(e.to_string()))?;
    Image::from_u8(mode, data)
}

fn load_float(path: &Path) -> Result<Image, RasterError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(|e| decode_error(path, e))?;

    let (width, height) = decoder.dimensions().map_err(|e| decode_error(path, e))?;
    let color = decoder.colortype().map_err(|e| decode_error(path, e))?;
    if color != tiff::ColorType::Gray(32) {
        return Err(RasterError::IncompatibleMode {
            path: path.to_path_buf(),
            expected: ImageMode::F32,
            found: format!("{:?}", color),
        });
    }

    let samples = match decoder.read_image().map_err(|e| decode_error(path, e))? {
        DecodingResult::F32(samples) => samples,
        _ => {
            return Err(RasterError::IncompatibleMode {
                path: path.to_path_buf(),
                expected: ImageMode::F32,
                found: "32-bit integer samples".to_string(),
            })
        }
    };

    let data = Array3::from_shape_vec((height as usize, width as usize, 1), samples)
        .map_err(|e| RasterError::Shape(e.to_string()))?;
    Image::from_f32(data)
}

fn incompatible(path: &Path, mode: ImageMode, decoded: &DynamicImage) -> RasterError {
    RasterError::IncompatibleMode {
        path: path.to_path_buf(),
        expected: mode,
        found: format!("{:?}", decoded.color()),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> RasterError {
    if source.kind() == ErrorKind::NotFound {
        RasterError::NotFound(path.to_path_buf())
    } else {
        RasterError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn decode_error(path: &Path, err: tiff::TiffError) -> RasterError {
    match err {
        tiff::TiffError::IoError(source) => io_error(path, source),
        other => RasterError::Decode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

fn encode_error(path: &Path, err: tiff::TiffError) -> RasterError {
    match err {
        tiff::TiffError::IoError(source) => io_error(path, source),
        other => RasterError::Encode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

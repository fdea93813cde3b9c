//! Mergers: downsampling a 2x2 grid of tiles into one tile.
//!
//! A merger receives a buffer whose first two axes are twice the tile edge
//! length (four child tiles stacked top-left, top-right, bottom-left,
//! bottom-right) and returns a buffer one tile edge long in each of those
//! axes, with the same channels and sample type.
//!
//! Each output pixel is computed from a quartet of spatially adjacent input
//! pixels. A quartet never straddles two children, so a missing child only
//! ever affects its own quadrant of the output.

use ndarray::{Array3, ArrayView3};

use crate::raster::{Image, ImageMode, PixelData};

/// Downsamples a quartet buffer into a single tile.
pub trait Merger: Sync {
    fn merge(&self, quartet: &Image) -> Image;
}

impl<F> Merger for F
where
    F: Fn(&Image) -> Image + Sync,
{
    fn merge(&self, quartet: &Image) -> Image {
        self(quartet)
    }
}

/// Average each quartet of pixels, skipping masked samples.
///
/// - `F32`: NaN samples are ignored. A quartet that is entirely NaN stays NaN.
/// - `Rgba`: pixels with zero alpha are ignored. A fully transparent quartet
///   produces a transparent black pixel.
/// - `Rgb`: plain mean of all four pixels.
///
/// Integer means are truncated toward zero.
pub fn averaging_merger(quartet: &Image) -> Image {
    let data = match quartet.data() {
        PixelData::F32(a) => PixelData::F32(average_f32(a.view())),
        PixelData::U8(a) if quartet.mode() == ImageMode::Rgba => {
            PixelData::U8(average_rgba(a.view()))
        }
        PixelData::U8(a) => PixelData::U8(average_u8(a.view())),
    };
    Image::from_parts(quartet.mode(), data)
}

fn half_shape(a: &ArrayView3<'_, impl Copy>) -> (usize, usize, usize) {
    let (h, w, c) = a.dim();
    (h / 2, w / 2, c)
}

fn samples<T: Copy>(a: &ArrayView3<'_, T>, r: usize, c: usize, ch: usize) -> [T; 4] {
    let (r, c) = (2 * r, 2 * c);
    [
        a[[r, c, ch]],
        a[[r, c + 1, ch]],
        a[[r + 1, c, ch]],
        a[[r + 1, c + 1, ch]],
    ]
}

fn average_f32(a: ArrayView3<'_, f32>) -> Array3<f32> {
    Array3::from_shape_fn(half_shape(&a), |(r, c, ch)| {
        let (sum, count) = samples(&a, r, c, ch)
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0f64, 0u32), |(s, n), &v| (s + f64::from(v), n + 1));

        if count == 0 {
            f32::NAN
        } else {
            (sum / f64::from(count)) as f32
        }
    })
}

fn average_u8(a: ArrayView3<'_, u8>) -> Array3<u8> {
    Array3::from_shape_fn(half_shape(&a), |(r, c, ch)| {
        let sum: u16 = samples(&a, r, c, ch).iter().map(|&v| u16::from(v)).sum();
        (sum / 4) as u8
    })
}

fn average_rgba(a: ArrayView3<'_, u8>) -> Array3<u8> {
    const ALPHA: usize = 3;

    Array3::from_shape_fn(half_shape(&a), |(r, c, ch)| {
        let alpha = samples(&a, r, c, ALPHA);
        let values = samples(&a, r, c, ch);

        let (sum, count) = values
            .iter()
            .zip(alpha.iter())
            .filter(|&(_, &alpha)| alpha != 0)
            .fold((0u16, 0u16), |(s, n), (&v, _)| (s + u16::from(v), n + 1));

        if count == 0 {
            0
        } else {
            (sum / count) as u8
        }
    })
}

// =============================================================================
// Tests
// =============================================================================

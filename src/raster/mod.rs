//! Raster collaborator.
//!
//! The pyramid core only moves whole tiles around; this module owns the pixel
//! buffers and their on-disk encodings.
//!
//! - [`Image`] / [`ImageMode`]: a mode-tagged `(rows, cols, channels)` buffer
//! - [`load`] / [`save`]: tile file I/O, with not-found distinguishable from
//!   every other failure

mod buffer;
mod codec;

pub use self::buffer::{Image, ImageMode, PixelData};
pub use self::codec::{load, save};

//! Tile store integration tests.
//!
//! Tests verify:
//! - Path layout for both naming schemes
//! - URL templates match the layout
//! - Tiles survive a write/read cycle through real files
//! - Missing-tile policies and error propagation

use std::fs;

use ndarray::Array3;
use sky_pyramid::error::{ConfigError, StoreError};
use sky_pyramid::pyramid::{TilePos, TILE_SIZE};
use sky_pyramid::raster::{Image, ImageMode};
use sky_pyramid::store::{MissingTile, NamingScheme, TileIo, TileStore};

use super::test_utils::{constant_tile, ScratchPyramid};

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_hierarchical_layout() {
    let pyramid = ScratchPyramid::new(NamingScheme::Hierarchical);
    let base = pyramid.store.base_dir().to_path_buf();

    let path = pyramid.store.tile_path(TilePos::new(2, 3, 1), "png").unwrap();
    assert_eq!(path, base.join("2").join("1").join("1_3.png"));
}

#[test]
fn test_flat_layout() {
    let pyramid = ScratchPyramid::new(NamingScheme::Flat);
    let base = pyramid.store.base_dir().to_path_buf();

    let path = pyramid.store.tile_path(TilePos::new(2, 3, 1), "png").unwrap();
    assert_eq!(path, base.join("L2X3Y1.png"));
}

#[test]
fn test_url_template_matches_layout() {
    for scheme in [NamingScheme::Hierarchical, NamingScheme::Flat] {
        let pyramid = ScratchPyramid::new(scheme);
        let pos = TilePos::new(5, 17, 9);

        let expanded = pyramid
            .store
            .url_template()
            .replace("{1}", &pos.n.to_string())
            .replace("{2}", &pos.x.to_string())
            .replace("{3}", &pos.y.to_string());

        let path = pyramid.store.tile_path(pos, "png").unwrap();
        let relative = path.strip_prefix(pyramid.store.base_dir()).unwrap();
        assert_eq!(
            format!("{}.png", expanded),
            relative.to_string_lossy().replace('\\', "/")
        );
    }
}

#[test]
fn test_invalid_scheme_is_config_error() {
    let result = TileStore::with_scheme_name("/tmp/never-used", "L/X/Y/Z");
    assert!(matches!(result, Err(ConfigError::UnknownScheme(_))));
}

// =============================================================================
// Reads and Writes
// =============================================================================

#[test]
fn test_rgb_tile_on_disk() {
    let pyramid = ScratchPyramid::new(NamingScheme::Hierarchical);
    let pos = TilePos::new(1, 0, 1);

    pyramid
        .store
        .write_tile(pos, &constant_tile(ImageMode::Rgb, 77.0))
        .unwrap();
    assert!(pyramid
        .store
        .base_dir()
        .join("1")
        .join("1")
        .join("1_0.png")
        .is_file());

    let tile = pyramid.read(pos, ImageMode::Rgb).unwrap();
    assert_eq!(tile, constant_tile(ImageMode::Rgb, 77.0));
}

#[test]
fn test_rgba_tile_on_disk() {
    let pyramid = ScratchPyramid::new(NamingScheme::Flat);
    let pos = TilePos::new(2, 1, 2);

    pyramid
        .store
        .write_tile(pos, &constant_tile(ImageMode::Rgba, 12.0))
        .unwrap();
    let tile = pyramid.read(pos, ImageMode::Rgba).unwrap();
    assert_eq!(tile, constant_tile(ImageMode::Rgba, 12.0));
}

#[test]
fn test_missing_policies_on_disk() {
    let pyramid = ScratchPyramid::new(NamingScheme::Hierarchical);
    let pos = TilePos::new(3, 2, 2);

    let none = pyramid
        .store
        .read_tile(pos, ImageMode::Rgba, MissingTile::Absent)
        .unwrap();
    assert!(none.is_none());

    let masked = pyramid
        .store
        .read_tile(pos, ImageMode::Rgba, MissingTile::Masked)
        .unwrap()
        .unwrap();
    assert_eq!((masked.width(), masked.height()), (TILE_SIZE, TILE_SIZE));
    assert_eq!(masked.mode(), ImageMode::Rgba);
    assert!(masked.as_u8().unwrap().iter().all(|&v| v == 0));
}

#[test]
fn test_unreadable_tile_is_storage_error() {
    let pyramid = ScratchPyramid::new(NamingScheme::Flat);
    let pos = TilePos::ROOT;
    let path = pyramid.tile_file(pos, ImageMode::Rgb);
    fs::write(&path, b"\x89PNG but truncated").unwrap();

    for policy in [MissingTile::Absent, MissingTile::Masked, MissingTile::Zeros] {
        let result = pyramid.store.read_tile(pos, ImageMode::Rgb, policy);
        assert!(
            matches!(result, Err(StoreError::Raster { .. })),
            "policy {} swallowed a corrupt tile",
            policy
        );
    }
}

#[test]
fn test_masked_rgba_tile_cannot_be_read_as_rgb() {
    let pyramid = ScratchPyramid::new(NamingScheme::Hierarchical);
    let pos = TilePos::new(1, 1, 1);

    // Colour 200 under zero alpha: every pixel is masked.
    let data = Array3::from_shape_fn((TILE_SIZE, TILE_SIZE, 4), |(_, _, c)| {
        if c == 3 {
            0
        } else {
            200
        }
    });
    let transparent = Image::from_u8(ImageMode::Rgba, data).unwrap();
    pyramid.store.write_tile(pos, &transparent).unwrap();

    let result = pyramid.store.read_tile(pos, ImageMode::Rgb, MissingTile::Zeros);
    assert!(
        matches!(result, Err(StoreError::ModeMismatch { expected: ImageMode::Rgb, .. })),
        "masked pixels were read back as opaque colour"
    );
    assert_eq!(pyramid.read(pos, ImageMode::Rgba).unwrap(), transparent);
}

#[test]
fn test_metadata_lives_at_base() {
    use std::io::Write;

    let pyramid = ScratchPyramid::new(NamingScheme::Hierarchical);
    let mut writer = pyramid.store.open_metadata_write("index.wtml").unwrap();
    writer.write_all(b"<ImageSet/>").unwrap();
    writer.flush().unwrap();
    drop(writer);

    let path = pyramid.store.base_dir().join("index.wtml");
    assert_eq!(fs::read(path).unwrap(), b"<ImageSet/>");
}

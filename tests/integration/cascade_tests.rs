//! Cascade integration tests.
//!
//! Tests verify:
//! - A populated level cascades into correct parent tiles on disk
//! - Missing children are handled by the configured policy
//! - Repeated and parallel cascades produce byte-identical files

use sky_pyramid::cascade::{averaging_merger, cascade_images, Cascade};
use sky_pyramid::error::{CascadeError, PositionError};
use sky_pyramid::pyramid::{
    cumulative_tiles, positions_at_depth, TilePos, MAX_DEPTH, TILE_SIZE,
};
use sky_pyramid::raster::ImageMode;
use sky_pyramid::store::{MissingTile, NamingScheme, TileIo};

use super::test_utils::{constant_tile, nan_mean, ScratchPyramid};

const HALF: usize = TILE_SIZE / 2;

/// Value of each depth-1 tile in the four-tile scenario, in child order.
fn quadrant_value(pos: TilePos) -> f32 {
    [10.0, 20.0, 30.0, 40.0][(pos.y * 2 + pos.x) as usize]
}

// =============================================================================
// End-to-End
// =============================================================================

#[test]
fn test_four_constant_tiles_average_to_25() {
    let pyramid = ScratchPyramid::new(NamingScheme::Hierarchical);
    pyramid.populate(1, ImageMode::Rgb, quadrant_value);

    let stats = cascade_images(
        &pyramid.store,
        1,
        ImageMode::Rgb,
        &averaging_merger,
        MissingTile::Zeros,
    )
    .unwrap();
    assert_eq!(stats.tiles_written, 1);

    let root = pyramid.read(TilePos::ROOT, ImageMode::Rgb).unwrap();
    let px = root.as_u8().unwrap();

    // Each child lands, downsampled, in its own quadrant.
    assert_eq!(px[[0, 0, 0]], 10);
    assert_eq!(px[[HALF - 1, HALF - 1, 1]], 10);
    assert_eq!(px[[0, HALF, 2]], 20);
    assert_eq!(px[[HALF, 0, 0]], 30);
    assert_eq!(px[[TILE_SIZE - 1, TILE_SIZE - 1, 0]], 40);

    let total: u64 = px.iter().map(|&v| u64::from(v)).sum();
    assert_eq!(total / px.len() as u64, 25);
}

#[test]
fn test_float_pyramid_depth_two() {
    let pyramid = ScratchPyramid::new(NamingScheme::Flat);
    pyramid.populate(2, ImageMode::F32, |p| (p.x + 4 * p.y) as f32);

    Cascade::new(&pyramid.store, ImageMode::F32)
        .with_missing(MissingTile::Absent)
        .run(2, &averaging_merger)
        .unwrap();

    for pos in positions_at_depth(1).unwrap() {
        let tile = pyramid.read(pos, ImageMode::F32).unwrap();
        let expected: f64 = pos
            .children()
            .iter()
            .map(|c| f64::from(c.x + 4 * c.y))
            .sum::<f64>()
            / 4.0;
        assert_eq!(nan_mean(&tile), expected, "tile {}", pos);
    }

    let root = pyramid.read(TilePos::ROOT, ImageMode::F32).unwrap();
    assert_eq!(nan_mean(&root), 7.5);
    assert!(pyramid.store.base_dir().join("L0X0Y0.tif").is_file());
}

#[test]
fn test_masked_missing_child_uses_present_pixels() {
    let pyramid = ScratchPyramid::new(NamingScheme::Hierarchical);
    for pos in positions_at_depth(1).unwrap().filter(|p| *p != TilePos::new(1, 1, 0)) {
        let tile = constant_tile(ImageMode::F32, quadrant_value(pos));
        pyramid.store.write_tile(pos, &tile).unwrap();
    }

    Cascade::new(&pyramid.store, ImageMode::F32)
        .with_missing(MissingTile::Masked)
        .run(1, &averaging_merger)
        .unwrap();

    let root = pyramid.read(TilePos::ROOT, ImageMode::F32).unwrap();
    let px = root.as_f32().unwrap();

    assert!(px[[0, HALF, 0]].is_nan());
    assert!(px[[HALF - 1, TILE_SIZE - 1, 0]].is_nan());
    assert_eq!(px[[0, 0, 0]], 10.0);
    assert_eq!(px[[TILE_SIZE - 1, 0, 0]], 30.0);

    // Mean over the present data only: (10 + 30 + 40) / 3.
    let mean = nan_mean(&root);
    assert!((mean - 80.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_absent_policy_fails_on_missing_child() {
    let pyramid = ScratchPyramid::new(NamingScheme::Flat);
    pyramid.populate(2, ImageMode::Rgb, |_| 5.0);
    std::fs::remove_file(pyramid.tile_file(TilePos::new(2, 3, 3), ImageMode::Rgb)).unwrap();

    let result = Cascade::new(&pyramid.store, ImageMode::Rgb)
        .with_missing(MissingTile::Absent)
        .run(2, &averaging_merger);

    match result {
        Err(CascadeError::MissingChild { parent, child }) => {
            assert_eq!(parent, TilePos::new(1, 1, 1));
            assert_eq!(child, TilePos::new(2, 3, 3));
        }
        other => panic!("expected MissingChild, got {:?}", other),
    }

    // Post-order: the three earlier depth-1 parents were already written.
    assert!(pyramid.read(TilePos::new(1, 0, 1), ImageMode::Rgb).is_some());
    assert!(pyramid.read(TilePos::ROOT, ImageMode::Rgb).is_none());
}

#[test]
fn test_start_depth_past_max_writes_nothing() {
    let pyramid = ScratchPyramid::new(NamingScheme::Flat);

    let result = cascade_images(
        &pyramid.store,
        MAX_DEPTH + 1,
        ImageMode::Rgb,
        &averaging_merger,
        MissingTile::Zeros,
    );
    assert!(matches!(
        result,
        Err(CascadeError::Position(PositionError::DepthOutOfRange(_)))
    ));
    assert!(!pyramid.store.base_dir().exists());
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_cascade_is_idempotent() {
    let pyramid = ScratchPyramid::new(NamingScheme::Hierarchical);
    pyramid.populate(3, ImageMode::Rgba, |p| ((p.x * 31 + p.y * 17) % 251) as f32);

    let cascade = Cascade::new(&pyramid.store, ImageMode::Rgba);
    let first_stats = cascade.run(3, &averaging_merger).unwrap();
    let first = pyramid.file_bytes_above(3, ImageMode::Rgba);

    let second_stats = cascade.run(3, &averaging_merger).unwrap();
    let second = pyramid.file_bytes_above(3, ImageMode::Rgba);

    assert_eq!(first_stats, second_stats);
    assert_eq!(first.len() as u64, cumulative_tiles(2).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_parallel_matches_sequential_on_disk() {
    let value = |p: TilePos| (p.x * 3 + p.y) as f32 * 0.25;

    let sequential = ScratchPyramid::new(NamingScheme::Flat);
    sequential.populate(3, ImageMode::F32, value);
    Cascade::new(&sequential.store, ImageMode::F32)
        .run(3, &averaging_merger)
        .unwrap();

    let parallel = ScratchPyramid::new(NamingScheme::Flat);
    parallel.populate(3, ImageMode::F32, value);
    let stats = Cascade::new(&parallel.store, ImageMode::F32)
        .run_parallel(3, &averaging_merger)
        .unwrap();

    assert_eq!(stats.tiles_written, cumulative_tiles(2).unwrap());
    assert_eq!(
        sequential.file_bytes_above(3, ImageMode::F32),
        parallel.file_bytes_above(3, ImageMode::F32)
    );
}

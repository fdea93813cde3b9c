//! sky-pyramid - build and inspect quad-tree tile pyramids.

use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sky_pyramid::{
    cascade::{averaging_merger, Cascade},
    config::{CascadeConfig, Cli, Command, InfoConfig, PathConfig},
    error::{ConfigError, StoreError},
    pyramid::{check_depth, cumulative_tiles, tiles_at_depth},
    raster::ImageMode,
    store::{MissingTile, PyramidManifest, TileStore},
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Cascade(config) => run_cascade(config),
        Command::Path(config) => run_path(config),
        Command::Info(config) => run_info(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "sky_pyramid=debug"
    } else {
        "sky_pyramid=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Cascade Command
// =============================================================================

fn run_cascade(config: CascadeConfig) -> ExitCode {
    let (store, mode, missing) = match resolve_cascade(&config) {
        Ok(resolved) => resolved,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration:");
    info!("  Base directory: {}", store.base_dir().display());
    info!("  Scheme: {} ({})", store.scheme(), store.url_template());
    info!("  Start depth: {}", config.start_depth);
    info!("  Mode: {}", mode);
    info!("  Missing tiles: {}", missing);

    if config.start_depth == 0 {
        warn!("Start depth is 0; there are no shallower levels to build");
    }

    let cascade = Cascade::new(&store, mode).with_missing(missing);
    let started = Instant::now();
    let result = if config.parallel {
        cascade.run_parallel(config.start_depth, &averaging_merger)
    } else {
        cascade.run(config.start_depth, &averaging_merger)
    };

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            error!("Cascade failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Wrote {} tiles in {:.2?}",
        stats.tiles_written,
        started.elapsed()
    );

    let manifest = match PyramidManifest::for_store(&store, config.start_depth, mode) {
        Ok(manifest) => manifest,
        Err(e) => {
            error!("Failed to describe pyramid: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = manifest.write(&store) {
        error!("Failed to write manifest: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Validate the cascade configuration and build what it describes.
fn resolve_cascade(
    config: &CascadeConfig,
) -> Result<(TileStore, ImageMode, MissingTile), ConfigError> {
    config.validate()?;
    Ok((config.pyramid.open_store()?, config.mode()?, config.missing()?))
}

// =============================================================================
// Path Command
// =============================================================================

fn run_path(config: PathConfig) -> ExitCode {
    let pos = match config.validate() {
        Ok(pos) => pos,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = match config.pyramid.open_store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match store.tile_path(pos, &config.extension) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let store = match &config.base_dir {
        Some(base) => match TileStore::with_scheme_name(base, &config.scheme) {
            Ok(store) => Some(store),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let manifest = match &store {
        Some(store) => match PyramidManifest::read(store) {
            Ok(manifest) => Some(manifest),
            Err(StoreError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                None
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    if let Some(store) = &store {
        println!("Pyramid: {}", store.base_dir().display());
        match &manifest {
            Some(manifest) => {
                println!("  Scheme:       {}", manifest.scheme);
                println!("  URL template: {}", manifest.url_template);
                println!("  Depth:        {}", manifest.depth);
                println!("  Mode:         {}", manifest.mode);
                println!("  Tile size:    {}", manifest.tile_size);
            }
            None => {
                println!("  Scheme:       {}", store.scheme());
                println!("  URL template: {}", store.url_template());
                println!("  (no manifest)");
            }
        }
        println!();
    }

    let depth = config
        .depth
        .or_else(|| manifest.as_ref().map(|m| m.depth))
        .unwrap_or(0);

    // A manifest read from disk may carry any depth.
    if let Err(e) = check_depth(depth) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    println!("{:>5}  {:>20}  {:>20}", "depth", "tiles", "cumulative");
    for d in 0..=depth {
        let (Some(tiles), Some(cumulative)) = (tiles_at_depth(d), cumulative_tiles(d)) else {
            break;
        };
        println!("{:>5}  {:>20}  {:>20}", d, tiles, cumulative);
    }

    ExitCode::SUCCESS
}

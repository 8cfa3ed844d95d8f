#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World Generator
//!
//! Parallel procedural generation of voxel terrain, meshed and grouped into
//! regions ready for rendering and collision.
//!
//! ## Key Modules
//!
//! * `world` - Configuration, the chunk grid, and the generation state machine
//! * `voxels` - Packed blocks, chunks, the heightfield, and the per-worker task
//! * `meshing` - Face-culled mesh data, regions and collision shapes
//! * `task_management` - Worker threads polled without blocking
//! * `core` - Shared resources for multithreaded access
//!
//! ## Pipeline
//!
//! The world is split into a grid of chunks. Worker threads fill chunks from a
//! deterministic heightfield and push the non-empty ones into a shared buffer.
//! Once every worker has exited, chunks are bucketed into regions, hidden faces
//! are culled against every voxel of the region, and each region receives one
//! merged mesh and a triangle collision shape.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voxel_worldgen::{meshing::MeshBufferTemplate, world::{ChunkManager, WorldConfig}};
//!
//! let template = Arc::new(MeshBufferTemplate::new());
//! let mut manager = ChunkManager::new(WorldConfig::default(), Some(template));
//! let regions = manager.generate_blocking().expect("world generation");
//! println!("{} regions", regions.len());
//! ```

use std::sync::Arc;

use log::{error, info, warn};

pub mod core;
pub mod error;
pub mod meshing;
pub mod task_management;
pub mod voxels;
pub mod world;

use meshing::MeshBufferTemplate;
use world::{ChunkManager, WorldConfig};

/// Environment variable naming a JSON world configuration file.
pub const CONFIG_PATH_VARIABLE: &str = "VOXEL_WORLDGEN_CONFIG";

/// Generates a world from the configuration named by [`CONFIG_PATH_VARIABLE`],
/// or the defaults, and logs a summary of every region.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::var(CONFIG_PATH_VARIABLE) {
        Ok(path) => match WorldConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Could not load {}: {}; using defaults", path, err);
                WorldConfig::default()
            }
        },
        Err(_) => WorldConfig::default(),
    };

    let template = Arc::new(MeshBufferTemplate::new());
    let mut manager = ChunkManager::new(config, Some(template));

    match manager.generate_blocking() {
        Ok(regions) => {
            for region in regions {
                let key = region.key();
                info!(
                    "Region ({}, {}): {} chunks, {} triangles",
                    key.x,
                    key.z,
                    region.chunk_count(),
                    region.mesh().triangle_count()
                );
            }
        }
        Err(err) => error!("World generation failed: {}", err),
    }
}

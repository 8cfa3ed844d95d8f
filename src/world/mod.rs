//! # World Module
//!
//! Top level of world generation: configuration, the chunk grid, and the
//! [`ChunkManager`] state machine that turns both into meshed regions.

pub mod chunk_manager;
pub mod config;
pub mod grid;

pub use chunk_manager::{assemble_regions, ChunkManager, GenerationReport, GenerationState};
pub use config::WorldConfig;
pub use grid::WorldGrid;

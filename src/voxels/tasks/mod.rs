//! # Voxel Task System
//!
//! Work run by the generation worker pool.

pub mod chunk_generation_task;

//! # Core Module
//!
//! Concurrency primitives shared by the generation pipeline.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking.
//!   The chunk manager uses it as the single result buffer that worker threads
//!   append generated chunk data to.
//!
//! ## Usage
//! ```rust
//! use voxel_worldgen::core::MtResource;
//!
//! let buffer = MtResource::new(Vec::<u32>::new());
//! buffer.get_mut().push(7);
//! assert_eq!(buffer.get().len(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;

//! # Voxel World Generator Entry Point
//!
//! Calls into the library's `run()` to generate a world and log its regions.
//!
//! ## Usage
//!
//! ```bash
//! VOXEL_WORLDGEN_CONFIG=world.json RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_worldgen::run();
}

//! World generation configuration.
//!
//! Every option has a default, so a config file only needs the fields it
//! changes:
//!
//! ```json
//! {
//!     "world_dimensions": [256, 64, 256],
//!     "seed": 1337,
//!     "palette": [{ "r": 0.3, "g": 0.6, "b": 0.2 }]
//! }
//! ```

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;
use crate::voxels::block::Color;
use crate::voxels::chunk::{CHUNK_DIMENSION, MAX_CHUNK_DIMENSION};
use crate::voxels::heightfield::HeightfieldSettings;

/// Recognised world generation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World size in blocks along x, y and z.
    pub world_dimensions: [u32; 3],
    /// Chunk edge length in blocks (1 to 16).
    pub chunk_size: u32,
    /// Region edge length in chunks, along x and z.
    pub region_size: u32,
    /// Noise seed.
    pub seed: u32,
    /// Requested worker threads; bounded by the machine.
    pub thread_count: usize,
    /// Terrain height for a fully raised column. Defaults to the world height.
    pub max_height: Option<f64>,
    /// Scale applied to world coordinates before noise sampling.
    pub noise_frequency: f64,
    /// Colours cycled by height inside each chunk.
    pub palette: Vec<Color>,
    /// Chunk count above which a warning is logged.
    pub chunk_count_warning_threshold: usize,
    /// Skip meshing chunks that are completely buried.
    pub skip_buried_chunks: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            world_dimensions: [128, 64, 128],
            chunk_size: CHUNK_DIMENSION as u32,
            region_size: 4,
            seed: 0,
            thread_count: 4,
            max_height: None,
            noise_frequency: 0.01,
            palette: vec![
                Color::rgb(0.42, 0.30, 0.20),
                Color::rgb(0.35, 0.55, 0.25),
                Color::rgb(0.55, 0.55, 0.50),
                Color::rgb(0.30, 0.45, 0.20),
            ],
            chunk_count_warning_threshold: 16_384,
            skip_buried_chunks: false,
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// [`WorldGenError::ConfigParse`] if the text is not a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self, WorldGenError> {
        Ok(serde_json::from_str::<WorldConfig>(json)?.normalized())
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    /// [`WorldGenError::ConfigIo`] if the file cannot be read, or
    /// [`WorldGenError::ConfigParse`] if it is not a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorldGenError> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        info!("Loaded world config from {}", path.display());
        Ok(config)
    }

    /// Clamps values into the ranges the generator supports.
    pub fn normalized(mut self) -> Self {
        let max_chunk = MAX_CHUNK_DIMENSION as u32;
        if !(1..=max_chunk).contains(&self.chunk_size) {
            let clamped = self.chunk_size.clamp(1, max_chunk);
            warn!(
                "chunk_size {} is outside 1..={}, using {}",
                self.chunk_size, max_chunk, clamped
            );
            self.chunk_size = clamped;
        }
        if self.region_size == 0 {
            warn!("region_size must be at least 1, using 1");
            self.region_size = 1;
        }
        if self.palette.is_empty() {
            warn!("Empty palette, terrain will use the default colour");
        }
        self
    }

    /// Height reached by a column whose noise value is 1.
    pub fn effective_max_height(&self) -> f64 {
        self.max_height
            .unwrap_or(self.world_dimensions[1] as f64)
    }

    /// Settings every worker builds its heightfield from.
    pub fn heightfield_settings(&self) -> HeightfieldSettings {
        HeightfieldSettings {
            seed: self.seed,
            frequency: self.noise_frequency,
            max_height: self.effective_max_height(),
        }
    }
}

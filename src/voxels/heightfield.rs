//! # Heightfield Module
//!
//! Deterministic terrain height from three octaves of Perlin noise.
//!
//! ```text
//! n      = noise(p) + 0.5 * noise(2p) + 0.25 * noise(4p)
//! value  = clamp((n + 1) / 2, 0, 1)
//! shaped = value ^ 2.1
//! height = max_height * shaped
//! ```
//!
//! The height is a pure function of the world column and the settings. Every
//! worker thread builds its own [`Heightfield`] from the same
//! [`HeightfieldSettings`], so two workers always agree on the height of a column
//! that sits on the seam between their chunks.

use noise::{NoiseFn, Perlin};

/// Exponent that biases the terrain towards low ground.
pub const HEIGHT_SHAPING_EXPONENT: f64 = 2.1;

/// Weights of the three octaves, at frequency multipliers 1, 2 and 4.
const OCTAVES: [(f64, f64); 3] = [(1.0, 1.0), (2.0, 0.5), (4.0, 0.25)];

/// Parameters that fully determine a heightfield.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeightfieldSettings {
    /// Seed of the Perlin permutation table.
    pub seed: u32,
    /// Scale applied to world coordinates before sampling the base octave.
    pub frequency: f64,
    /// Height of a column whose shaped noise value is 1.
    pub max_height: f64,
}

/// Terrain height sampler.
///
/// Cheap to construct; build one per thread instead of sharing.
#[derive(Clone, Debug)]
pub struct Heightfield {
    noise: Perlin,
    settings: HeightfieldSettings,
}

impl Heightfield {
    /// Creates a heightfield for the given settings.
    ///
    /// # Arguments
    /// * `settings` - Seed, base frequency and maximum height
    pub fn new(settings: HeightfieldSettings) -> Self {
        Heightfield {
            noise: Perlin::new(settings.seed),
            settings,
        }
    }

    /// Settings this heightfield was built from.
    pub fn settings(&self) -> HeightfieldSettings {
        self.settings
    }

    /// Samples the terrain height at a world column.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let px = x * self.settings.frequency;
        let pz = z * self.settings.frequency;

        let n: f64 = OCTAVES
            .iter()
            .map(|&(scale, weight)| weight * self.noise.get([px * scale, pz * scale]))
            .sum();

        let value = ((n + 1.0) / 2.0).clamp(0.0, 1.0);
        self.settings.max_height * value.powf(HEIGHT_SHAPING_EXPONENT)
    }

    /// Terrain height of a world column, floored to whole blocks.
    pub fn column_height(&self, x: i32, z: i32) -> i32 {
        self.sample(x as f64, z as f64).floor() as i32
    }
}

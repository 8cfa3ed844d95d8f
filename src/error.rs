//! Error type for world generation.

use std::fmt;

use crate::world::GenerationState;

/// Errors surfaced by the chunk manager and configuration loading.
#[derive(Debug)]
pub enum WorldGenError {
    /// No region template was supplied; nothing could receive the meshes.
    MissingRegionTemplate,
    /// An operation was called in the wrong generation state.
    InvalidState {
        /// State the operation requires.
        expected: GenerationState,
        /// State the manager was in.
        found: GenerationState,
    },
    /// The configuration file could not be read.
    ConfigIo(std::io::Error),
    /// The configuration file is not valid JSON for `WorldConfig`.
    ConfigParse(serde_json::Error),
}

impl fmt::Display for WorldGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldGenError::MissingRegionTemplate => {
                write!(f, "no region template configured, world generation aborted")
            }
            WorldGenError::InvalidState { expected, found } => {
                write!(f, "expected generation state {expected:?}, found {found:?}")
            }
            WorldGenError::ConfigIo(e) => write!(f, "failed to read world config: {e}"),
            WorldGenError::ConfigParse(e) => write!(f, "failed to parse world config: {e}"),
        }
    }
}

impl std::error::Error for WorldGenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorldGenError::ConfigIo(e) => Some(e),
            WorldGenError::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WorldGenError {
    fn from(e: std::io::Error) -> Self {
        WorldGenError::ConfigIo(e)
    }
}

impl From<serde_json::Error> for WorldGenError {
    fn from(e: serde_json::Error) -> Self {
        WorldGenError::ConfigParse(e)
    }
}

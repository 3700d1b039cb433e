//! Errors that end a generation run.

use ridgeline_config::ConfigError;
use ridgeline_terrain::TerrainError;

/// Anything that can stop the generator.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The configuration was unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Terrain synthesis failed.
    #[error("terrain generation failed: {0}")]
    Terrain(#[from] TerrainError),

    /// A preview image could not be encoded or written.
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    /// An output file or directory could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

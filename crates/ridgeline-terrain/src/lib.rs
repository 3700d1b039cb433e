//! Procedural heightmap synthesis: diamond-square detail, radial and fractal mountains,
//! range normalization, and splat weight derivation.

mod diamond_square;
mod error;
mod flatten;
mod fractal_mountain;
mod grid;
mod mountain;
mod normalize;
mod pipeline;
mod seed;
mod sink;
mod steepness;

pub mod debug_viz;
pub mod splat;

pub use diamond_square::{ClampPolicy, CoarseLevel, DiamondSquare, DiamondSquareParams, PassReport};
pub use error::TerrainError;
pub use flatten::{FlattenMode, flatten};
pub use fractal_mountain::FractalMountain;
pub use grid::{Grid, Heightmap, validate_resolution};
pub use mountain::{MountainBlend, MountainShaper, MountainSpec};
pub use normalize::{HeightStats, height_stats, normalize};
pub use pipeline::{
    FractalPeak, GeneratedTerrain, PipelineConfig, Stage, StageStats, TerrainPipeline,
};
pub use seed::{
    DisplacementSource, NoDisplacement, RngDisplacement, decay_factor, derive_seed, terrain_rng,
};
pub use sink::{HeightSink, SplatSink};
pub use splat::{LayerRoles, SplatLayer, SplatMap, SplatPolicy, SplatSampling};
pub use steepness::{SteepnessCurve, TerrainScale, steepness_degrees, surface_normal};

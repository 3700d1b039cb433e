//! Configuration for the ridgeline terrain generator.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line via clap, and tolerate missing or unknown fields so older and newer
//! files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BlendSetting, ClampSetting, CoarseSetting, Config, CurveSetting, DebugConfig,
    DisplacementConfig, FlattenSetting, FractalPeakConfig, MountainConfig, MountainEntry,
    MountainLayout, OutputConfig, RoleConfig, ScaleConfig, SplatConfig, TerrainConfig,
    default_config_dir,
};
pub use error::ConfigError;

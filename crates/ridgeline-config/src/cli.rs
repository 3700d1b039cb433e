//! Command-line argument parsing for the generator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Ridgeline command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "ridgeline", about = "Procedural heightmap and splat map generator")]
pub struct CliArgs {
    /// Grid resolution (power of two).
    #[arg(long)]
    pub resolution: Option<u32>,

    /// RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Diamond-square roughness.
    #[arg(long)]
    pub roughness: Option<f32>,

    /// Initial diamond-square displacement.
    #[arg(long)]
    pub displacement: Option<f32>,

    /// Output directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(res) = args.resolution {
            self.terrain.resolution = res;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = Some(seed);
        }
        if let Some(r) = args.roughness {
            self.displacement.roughness = r;
        }
        if let Some(d) = args.displacement {
            self.displacement.initial_displacement = d;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

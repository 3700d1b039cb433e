//! Command-line terrain generator.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p ridgeline-app -- --resolution 512 --seed 7` to write
//! previews of a 513x513 heightmap into the configured output directory.

mod error;
mod output;
mod settings;

use clap::Parser;
use ridgeline_config::{CliArgs, Config, default_config_dir};
use ridgeline_terrain::{RngDisplacement, Stage, TerrainPipeline, derive_seed, terrain_rng};
use tracing::{error, info};

use crate::error::AppError;

fn run(config: &Config) -> Result<(), AppError> {
    config.validate()?;

    let seed = config.terrain.seed.unwrap_or_else(rand::random);
    info!(seed, resolution = config.terrain.resolution, "starting generation");

    let pipeline = TerrainPipeline::new(settings::pipeline_config(config))?;
    let mut source = RngDisplacement::new(terrain_rng(derive_seed(seed, "heightmap")));
    let terrain = pipeline.generate(&mut source)?;

    for stage in terrain.stages() {
        info!(
            stage = ?stage.stage,
            min = stage.stats.min,
            max = stage.stats.max,
            mean = stage.stats.mean,
            "stage complete"
        );
    }
    if terrain.stage(Stage::Normalize).is_none() && config.terrain.normalize.is_some() {
        info!("heightmap left unnormalized");
    }
    info!(
        passes = terrain.passes().computed_passes,
        final_displacement = terrain.passes().final_displacement,
        "diamond-square finished"
    );

    let written =
        output::write_outputs(&terrain, &pipeline.config().splat_policy, &config.output)?;
    info!(files = written.len(), dir = %config.output.directory.display(), "done");
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    ridgeline_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config) {
        error!("{e}");
        std::process::exit(1);
    }
}

//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Displacement larger than this many height ranges only ever hits the clamp.
const MAX_DISPLACEMENT_SPANS: f32 = 1000.0;

/// Resolve the default configuration directory.
///
/// Uses the platform config directory when there is one, otherwise `./config`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("ridgeline"))
        .unwrap_or_else(|| PathBuf::from("config"))
}

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Grid and base shape settings.
    pub terrain: TerrainConfig,
    /// Diamond-square detail settings.
    pub displacement: DisplacementConfig,
    /// Mountain placement.
    pub mountains: MountainConfig,
    /// Texture layer policy.
    pub splat: SplatConfig,
    /// World scale used when measuring slopes.
    pub scale: ScaleConfig,
    /// What to write and where.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Base shape applied before anything else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum FlattenSetting {
    /// Constant height everywhere.
    Uniform {
        /// Fill height.
        height: f32,
    },
    /// Low plateau dropping toward the border.
    EdgeFalloff {
        /// Plateau height.
        amplitude: f32,
    },
    /// Height rising with distance from the origin corner.
    OriginRamp,
}

/// Grid and base shape configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Grid resolution; a power of two. The grid holds `resolution + 1` samples per side.
    pub resolution: u32,
    /// RNG seed. `None` picks a fresh seed on every run.
    pub seed: Option<u64>,
    /// Lower clamp bound during refinement.
    pub min_height: f32,
    /// Upper clamp bound during refinement.
    pub max_height: f32,
    /// Initial shape.
    pub flatten: FlattenSetting,
    /// Final rescale target, or `None` to keep raw values.
    pub normalize: Option<(f32, f32)>,
}

/// When refined values are clamped.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClampSetting {
    /// After every write.
    #[default]
    EveryStep,
    /// Once at the end.
    Final,
}

/// How the coarsest diamond-square level is produced.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoarseSetting {
    /// Force a central peak with a low rim.
    #[default]
    Seeded,
    /// Keep what the earlier stages wrote.
    Preserve,
    /// Compute it from the corners.
    Computed,
}

/// Diamond-square configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplacementConfig {
    /// Displacement magnitude of the first computed level.
    pub initial_displacement: f32,
    /// Decay exponent; each level multiplies the magnitude by `2^-roughness`.
    pub roughness: f32,
    /// Centre height used by [`CoarseSetting::Seeded`].
    pub peak_height: f32,
    /// Edge midpoint height used by [`CoarseSetting::Seeded`].
    pub floor_height: f32,
    /// Clamp timing.
    pub clamp: ClampSetting,
    /// Coarse level handling.
    pub coarse_level: CoarseSetting,
    /// Re-average the centre after refinement.
    pub soften_peak: bool,
}

/// How mountains combine with existing terrain.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlendSetting {
    /// Only raise.
    #[default]
    Max,
    /// Replace.
    Overwrite,
}

/// One radial mountain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MountainEntry {
    /// Peak column.
    pub center_x: i32,
    /// Peak row.
    pub center_y: i32,
    /// Base radius in cells.
    pub radius: u32,
    /// Height at the rim.
    pub min_height: f32,
    /// Height at the peak.
    pub max_height: f32,
}

/// Which radial mountains to raise.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum MountainLayout {
    /// No radial mountains.
    None,
    /// Three-peak ridge scaled to the grid.
    #[default]
    Preset,
    /// An explicit list.
    Explicit(Vec<MountainEntry>),
}

/// One diamond-square generated peak.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FractalPeakConfig {
    /// Footprint left column.
    pub origin_x: u32,
    /// Footprint top row.
    pub origin_y: u32,
    /// Base radius in cells.
    pub radius: u32,
}

/// Mountain configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MountainConfig {
    /// Radial mountains.
    pub layout: MountainLayout,
    /// Rim height of the preset peaks.
    pub preset_floor: f32,
    /// Blend mode for radial and fractal mountains.
    pub blend: BlendSetting,
    /// Fractal peaks stamped after the radial mountains.
    pub fractal_peaks: Vec<FractalPeakConfig>,
    /// Initial displacement for fractal peaks.
    pub fractal_displacement: f32,
    /// Roughness for fractal peaks.
    pub fractal_roughness: f32,
}

/// Layer index written by each band of the splat policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoleConfig {
    /// Constant-weight mid-range layer.
    pub base: usize,
    /// Mid-range layer fading with height.
    pub grass: usize,
    /// Mid-range layer growing with height.
    pub dirt: usize,
    /// Valley layer.
    pub valley: usize,
    /// Steep peak layer.
    pub cliff: usize,
    /// Peak layer.
    pub snow: usize,
}

/// Mapping from slope angle to steepness.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub enum CurveSetting {
    /// `1 - 1 / (degrees + 1)`.
    #[default]
    Reciprocal,
    /// `degrees / max_degrees`.
    Linear {
        /// Angle mapping to 1.0.
        max_degrees: f32,
    },
}

/// Splat policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplatConfig {
    /// One name per texture layer.
    pub layer_names: Vec<String>,
    /// Heights below this are valley.
    pub valley_threshold: f32,
    /// Heights above this are peak.
    pub peak_threshold: f32,
    /// Base layer weight in the mid band.
    pub base_weight: f32,
    /// Band-to-layer mapping.
    pub roles: RoleConfig,
    /// Steepness curve.
    pub curve: CurveSetting,
    /// Splat map size in texels; `None` matches the heightmap.
    pub alphamap_size: Option<(u32, u32)>,
}

/// World scale configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScaleConfig {
    /// Horizontal distance between samples.
    pub cell_size: f32,
    /// World height of a sample value of 1.0.
    pub height_scale: f32,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving all output files.
    pub directory: PathBuf,
    /// Write a color-banded elevation preview.
    pub heightmap_png: bool,
    /// Write a grayscale elevation preview.
    pub grayscale_png: bool,
    /// Write a blended splat preview.
    pub splat_png: bool,
    /// Write a dominant-layer splat preview.
    pub dominant_png: bool,
    /// Write raw little-endian `f32` heights.
    pub raw_heights: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            resolution: 256,
            seed: None,
            min_height: 0.0,
            max_height: 1.0,
            flatten: FlattenSetting::EdgeFalloff { amplitude: 0.1 },
            normalize: Some((0.0, 1.0)),
        }
    }
}

impl Default for DisplacementConfig {
    fn default() -> Self {
        Self {
            initial_displacement: 0.8,
            roughness: 1.0,
            peak_height: 1.0,
            floor_height: 0.0,
            clamp: ClampSetting::EveryStep,
            coarse_level: CoarseSetting::Seeded,
            soften_peak: true,
        }
    }
}

impl Default for MountainConfig {
    fn default() -> Self {
        Self {
            layout: MountainLayout::Preset,
            preset_floor: 0.1,
            blend: BlendSetting::Max,
            fractal_peaks: Vec::new(),
            fractal_displacement: 0.2,
            fractal_roughness: 2.0,
        }
    }
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            base: 0,
            grass: 1,
            dirt: 2,
            valley: 3,
            cliff: 2,
            snow: 4,
        }
    }
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            layer_names: ["base", "grass", "dirt", "valley", "snow"]
                .into_iter()
                .map(String::from)
                .collect(),
            valley_threshold: 0.09,
            peak_threshold: 0.8,
            base_weight: 0.1,
            roles: RoleConfig::default(),
            curve: CurveSetting::Reciprocal,
            alphamap_size: None,
        }
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            height_scale: 32.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            heightmap_png: true,
            grayscale_png: true,
            splat_png: true,
            dominant_png: false,
            raw_heights: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl Config {
    /// Reject values no run could use, naming the field at fault.
    ///
    /// Deeper checks (mountain geometry, layer roles) happen when the pipeline
    /// is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolution = self.terrain.resolution;
        if resolution < 2 || !resolution.is_power_of_two() {
            return Err(ConfigError::InvalidValue {
                field: "terrain.resolution",
                reason: format!("{resolution} is not a power of two >= 2"),
            });
        }
        let (min, max) = (self.terrain.min_height, self.terrain.max_height);
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(ConfigError::InvalidValue {
                field: "terrain.max_height",
                reason: format!("range [{min}, {max}] is empty"),
            });
        }
        let finite = [
            ("displacement.roughness", self.displacement.roughness),
            ("displacement.initial_displacement", self.displacement.initial_displacement),
            ("displacement.peak_height", self.displacement.peak_height),
            ("displacement.floor_height", self.displacement.floor_height),
            ("mountains.fractal_displacement", self.mountains.fractal_displacement),
            ("mountains.fractal_roughness", self.mountains.fractal_roughness),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{value} is not finite"),
                });
            }
        }
        let span = max - min;
        for (field, value) in [
            ("displacement.initial_displacement", self.displacement.initial_displacement),
            ("mountains.fractal_displacement", self.mountains.fractal_displacement),
        ] {
            if value.abs() > MAX_DISPLACEMENT_SPANS * span.max(1.0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{value} is far outside the height range [{min}, {max}]"),
                });
            }
        }
        if self.splat.layer_names.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "splat.layer_names",
                reason: "at least one layer is required".to_string(),
            });
        }
        if self.splat.valley_threshold > self.splat.peak_threshold {
            return Err(ConfigError::InvalidValue {
                field: "splat.valley_threshold",
                reason: format!(
                    "{} exceeds peak threshold {}",
                    self.splat.valley_threshold, self.splat.peak_threshold
                ),
            });
        }
        Ok(())
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}

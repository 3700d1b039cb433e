//! End-to-end heightmap and splat map generation.
//!
//! Stages run strictly in order on a grid owned by the run: flatten, radial
//! mountains, fractal peaks, diamond-square detail, normalization, splat
//! derivation. The caller only ever sees the finished [`GeneratedTerrain`].

use crate::diamond_square::{DiamondSquare, DiamondSquareParams, PassReport};
use crate::error::TerrainError;
use crate::flatten::{FlattenMode, flatten};
use crate::fractal_mountain::FractalMountain;
use crate::grid::{Grid, Heightmap, validate_resolution};
use crate::mountain::{MountainBlend, MountainShaper, MountainSpec};
use crate::normalize::{HeightStats, height_stats, normalize};
use crate::seed::DisplacementSource;
use crate::sink::{HeightSink, SplatSink};
use crate::splat::{SplatMap, SplatPolicy, SplatSampling};
use crate::steepness::{SteepnessCurve, TerrainScale};

/// A fractal peak placed by its footprint's top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct FractalPeak {
    /// Footprint left column.
    pub origin_x: usize,
    /// Footprint top row.
    pub origin_y: usize,
    /// Base radius in cells.
    pub radius: u32,
}

/// Everything one generation run needs.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Grid resolution; must be `2^k` with `k >= 1`.
    pub resolution: u32,
    /// Initial shape of the grid.
    pub flatten: FlattenMode,
    /// Radial mountains, applied in order.
    pub mountains: Vec<MountainSpec>,
    /// How mountains and fractal peaks combine with existing terrain.
    pub mountain_blend: MountainBlend,
    /// Diamond-square generated peaks stamped after the radial mountains.
    pub fractal_peaks: Vec<FractalPeak>,
    /// Parameters for the fractal peaks.
    pub fractal_params: DiamondSquareParams,
    /// Detail pass parameters, including the clamp range.
    pub displacement: DiamondSquareParams,
    /// Target range for the final rescale, or `None` to keep raw values.
    pub normalize_to: Option<(f32, f32)>,
    /// Splat weight policy.
    pub splat_policy: SplatPolicy,
    /// Splat map size in texels; `None` matches the grid.
    pub splat_size: Option<(usize, usize)>,
    /// World scale for slope measurement.
    pub scale: TerrainScale,
    /// Slope-to-steepness mapping.
    pub steepness_curve: SteepnessCurve,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution: 256,
            flatten: FlattenMode::default(),
            mountains: Vec::new(),
            mountain_blend: MountainBlend::Max,
            fractal_peaks: Vec::new(),
            fractal_params: FractalMountain::default_params(),
            displacement: DiamondSquareParams::default(),
            normalize_to: Some((0.0, 1.0)),
            splat_policy: SplatPolicy::default(),
            splat_size: None,
            scale: TerrainScale::default(),
            steepness_curve: SteepnessCurve::default(),
        }
    }
}

/// Pipeline stage, used to label statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// After the base shape.
    Flatten,
    /// After radial mountains and fractal peaks.
    Mountains,
    /// After diamond-square.
    Detail,
    /// After the final rescale.
    Normalize,
}

/// Statistics captured after one stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageStats {
    /// The stage just completed.
    pub stage: Stage,
    /// Grid statistics at that point.
    pub stats: HeightStats,
}

/// The result of a run: an immutable heightmap and its splat map.
#[derive(Clone, Debug)]
pub struct GeneratedTerrain {
    heightmap: Heightmap,
    splat: SplatMap,
    stages: Vec<StageStats>,
    passes: PassReport,
}

impl GeneratedTerrain {
    /// The finished heightmap.
    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    /// The derived splat map.
    pub fn splat(&self) -> &SplatMap {
        &self.splat
    }

    /// Statistics after each stage, in execution order.
    pub fn stages(&self) -> &[StageStats] {
        &self.stages
    }

    /// Statistics recorded for `stage`, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<HeightStats> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.stats)
    }

    /// Diamond-square summary.
    pub fn passes(&self) -> &PassReport {
        &self.passes
    }

    /// Push every elevation to `sink`, exactly once per cell.
    pub fn apply_heights(&self, sink: &mut impl HeightSink) {
        for (x, y, h) in self.heightmap.iter() {
            sink.write(x, y, h);
        }
    }

    /// Push every splat texel to `sink`.
    pub fn apply_splat(&self, sink: &mut impl SplatSink) {
        self.splat.apply(sink);
    }
}

/// A validated, reusable generation pipeline.
#[derive(Clone, Debug)]
pub struct TerrainPipeline {
    config: PipelineConfig,
}

impl TerrainPipeline {
    /// Validate `config` up front so that [`generate`](Self::generate) fails
    /// before allocating anything.
    ///
    /// # Errors
    ///
    /// Resolution, height range, mountain and splat policy errors.
    pub fn new(config: PipelineConfig) -> Result<Self, TerrainError> {
        validate_resolution(config.resolution)?;

        let (min, max) = (config.displacement.min_height, config.displacement.max_height);
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(TerrainError::InvalidHeightRange { min, max });
        }
        if let Some((lo, hi)) = config.normalize_to
            && !(lo.is_finite() && hi.is_finite() && lo <= hi)
        {
            return Err(TerrainError::InvalidHeightRange { min: lo, max: hi });
        }
        for spec in &config.mountains {
            spec.validate()?;
        }
        for peak in &config.fractal_peaks {
            if peak.radius == 0 {
                return Err(TerrainError::InvalidMountain(
                    "fractal peak radius must be at least 1".to_string(),
                ));
            }
            if u64::from(peak.radius) * 2 > u64::from(config.resolution) {
                return Err(TerrainError::InvalidMountain(format!(
                    "fractal peak radius {} does not fit a resolution {} grid",
                    peak.radius, config.resolution
                )));
            }
        }
        config.splat_policy.validate()?;

        Ok(Self { config })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage and return the finished terrain.
    ///
    /// All random draws come from `source`, in a fixed order, so the same
    /// seeded source always yields the same terrain.
    pub fn generate(
        &self,
        source: &mut impl DisplacementSource,
    ) -> Result<GeneratedTerrain, TerrainError> {
        let config = &self.config;
        let mut stages = Vec::with_capacity(4);
        let mut record = |stage: Stage, grid: &Grid| {
            let stats = height_stats(grid);
            log::debug!(
                "{stage:?}: min {:.4} max {:.4} mean {:.4}",
                stats.min,
                stats.max,
                stats.mean
            );
            stages.push(StageStats { stage, stats });
        };

        let mut grid = Grid::new(config.resolution, config.displacement.min_height)?;
        log::info!(
            "generating {0}x{0} heightmap",
            grid.width()
        );

        flatten(&mut grid, config.flatten);
        record(Stage::Flatten, &grid);

        let shaper = MountainShaper::new(config.mountain_blend);
        shaper.apply_all(&mut grid, &config.mountains)?;
        for peak in &config.fractal_peaks {
            let mountain = FractalMountain::generate(peak.radius, &config.fractal_params, source)?;
            mountain.stamp(&mut grid, peak.origin_x, peak.origin_y, config.mountain_blend)?;
        }
        record(Stage::Mountains, &grid);

        let passes = DiamondSquare::new(config.displacement.clone()).run(&mut grid, source)?;
        record(Stage::Detail, &grid);

        if let Some((lo, hi)) = config.normalize_to {
            match normalize(&mut grid, lo, hi) {
                Ok(_) => record(Stage::Normalize, &grid),
                Err(TerrainError::DegenerateRange { value }) => {
                    log::warn!("heightmap is flat at {value}; skipping rescale");
                }
                Err(e) => return Err(e),
            }
        }

        let sampling = SplatSampling {
            width: config.splat_size.map_or(grid.width(), |(w, _)| w),
            height: config.splat_size.map_or(grid.height(), |(_, h)| h),
            scale: config.scale,
            curve: config.steepness_curve,
        };
        let splat = SplatMap::derive(&grid, &config.splat_policy, &sampling)?;
        log::info!(
            "splat map {}x{} with {} layers",
            splat.width(),
            splat.height(),
            splat.layer_count()
        );

        Ok(GeneratedTerrain {
            heightmap: grid.into_heightmap(),
            splat,
            stages,
            passes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diamond_square::CoarseLevel;
    use crate::seed::{NoDisplacement, RngDisplacement};

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_invalid_resolution_rejected_before_generation() {
        let err = TerrainPipeline::new(PipelineConfig {
            resolution: 100,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, TerrainError::InvalidResolution(100));
    }

    #[test]
    fn test_invalid_mountain_rejected_up_front() {
        let err = TerrainPipeline::new(PipelineConfig {
            mountains: vec![MountainSpec::new(1, 1, 2, 1.0, 0.0)],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, TerrainError::InvalidMountain(_)));
    }

    #[test]
    fn test_fractal_peak_wider_than_grid_rejected() {
        let peak = |radius| FractalPeak {
            origin_x: 0,
            origin_y: 0,
            radius,
        };
        let err = TerrainPipeline::new(PipelineConfig {
            resolution: 16,
            fractal_peaks: vec![peak(9)],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, TerrainError::InvalidMountain(_)));

        let err = TerrainPipeline::new(PipelineConfig {
            resolution: 16,
            fractal_peaks: vec![peak(u32::MAX)],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, TerrainError::InvalidMountain(_)));

        assert!(
            TerrainPipeline::new(PipelineConfig {
                resolution: 16,
                fractal_peaks: vec![peak(8)],
                ..Default::default()
            })
            .is_ok()
        );
    }

    #[test]
    fn test_full_run_normalizes_into_unit_range() {
        let pipeline = TerrainPipeline::new(PipelineConfig {
            resolution: 64,
            flatten: FlattenMode::EdgeFalloff { amplitude: 0.1 },
            mountains: MountainSpec::range_preset(65, 65, 0.1),
            ..Default::default()
        })
        .unwrap();
        let terrain = pipeline.generate(&mut RngDisplacement::seeded(7)).unwrap();

        let map = terrain.heightmap();
        assert_eq!((map.width(), map.height()), (65, 65));
        let stats = terrain.stage(Stage::Normalize).expect("normalize ran");
        assert_eq!((stats.min, stats.max), (0.0, 1.0));
        assert!(map.values().iter().all(|v| (0.0..=1.0).contains(v)));

        let stages: Vec<Stage> = terrain.stages().iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Flatten, Stage::Mountains, Stage::Detail, Stage::Normalize]
        );
        assert_eq!(terrain.passes().half_steps, vec![32, 16, 8, 4, 2, 1]);
    }

    #[test]
    fn test_splat_weights_sum_to_one_everywhere() {
        let pipeline = TerrainPipeline::new(PipelineConfig {
            resolution: 32,
            ..Default::default()
        })
        .unwrap();
        let terrain = pipeline.generate(&mut RngDisplacement::seeded(11)).unwrap();
        let splat = terrain.splat();
        for y in 0..splat.height() {
            for x in 0..splat.width() {
                let sum: f32 = splat.get(x, y).unwrap().iter().sum();
                assert!((sum - 1.0).abs() < EPSILON, "texel ({x}, {y}) sums to {sum}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let pipeline = TerrainPipeline::new(PipelineConfig {
            resolution: 32,
            fractal_peaks: vec![FractalPeak {
                origin_x: 4,
                origin_y: 4,
                radius: 6,
            }],
            ..Default::default()
        })
        .unwrap();
        let a = pipeline.generate(&mut RngDisplacement::seeded(3)).unwrap();
        let b = pipeline.generate(&mut RngDisplacement::seeded(3)).unwrap();
        assert_eq!(a.heightmap(), b.heightmap());
        assert_eq!(a.splat(), b.splat());
    }

    #[test]
    fn test_flat_result_skips_rescale() {
        // Preserve + no displacement + uniform base: every level averages equal values.
        let pipeline = TerrainPipeline::new(PipelineConfig {
            resolution: 8,
            flatten: FlattenMode::Uniform { height: 0.5 },
            displacement: DiamondSquareParams {
                initial_displacement: 0.0,
                coarse_level: CoarseLevel::Preserve,
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();
        let terrain = pipeline.generate(&mut NoDisplacement).unwrap();
        assert!(terrain.stage(Stage::Normalize).is_none());
        assert!(terrain.heightmap().values().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_apply_heights_visits_each_cell_once() {
        let pipeline = TerrainPipeline::new(PipelineConfig {
            resolution: 8,
            ..Default::default()
        })
        .unwrap();
        let terrain = pipeline.generate(&mut RngDisplacement::seeded(1)).unwrap();

        let mut seen = vec![0u32; 81];
        terrain.apply_heights(&mut |x: usize, y: usize, h: f32| {
            assert_eq!(terrain.heightmap().get(x, y).unwrap(), h);
            seen[y * 9 + x] += 1;
        });
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_custom_splat_size() {
        let pipeline = TerrainPipeline::new(PipelineConfig {
            resolution: 16,
            splat_size: Some((8, 4)),
            ..Default::default()
        })
        .unwrap();
        let terrain = pipeline.generate(&mut RngDisplacement::seeded(9)).unwrap();
        assert_eq!((terrain.splat().width(), terrain.splat().height()), (8, 4));

        let mut texels = 0;
        terrain.apply_splat(&mut |_: usize, _: usize, _: &[f32]| texels += 1);
        assert_eq!(texels, 32);
    }
}

//! Translation from the on-disk configuration to a terrain pipeline.

use ridgeline_config::{
    BlendSetting, ClampSetting, CoarseSetting, Config, CurveSetting, FlattenSetting,
    MountainLayout,
};
use ridgeline_terrain::{
    ClampPolicy, CoarseLevel, DiamondSquareParams, FlattenMode, FractalPeak, LayerRoles,
    MountainBlend, MountainSpec, PipelineConfig, SplatPolicy, SteepnessCurve, TerrainScale,
};

fn flatten_mode(setting: FlattenSetting) -> FlattenMode {
    match setting {
        FlattenSetting::Uniform { height } => FlattenMode::Uniform { height },
        FlattenSetting::EdgeFalloff { amplitude } => FlattenMode::EdgeFalloff { amplitude },
        FlattenSetting::OriginRamp => FlattenMode::OriginRamp,
    }
}

fn blend(setting: BlendSetting) -> MountainBlend {
    match setting {
        BlendSetting::Max => MountainBlend::Max,
        BlendSetting::Overwrite => MountainBlend::Overwrite,
    }
}

fn curve(setting: CurveSetting) -> SteepnessCurve {
    match setting {
        CurveSetting::Reciprocal => SteepnessCurve::Reciprocal,
        CurveSetting::Linear { max_degrees } => SteepnessCurve::Linear { max_degrees },
    }
}

fn mountains(config: &Config) -> Vec<MountainSpec> {
    let samples = config.terrain.resolution as usize + 1;
    match &config.mountains.layout {
        MountainLayout::None => Vec::new(),
        MountainLayout::Preset => {
            MountainSpec::range_preset(samples, samples, config.mountains.preset_floor)
        }
        MountainLayout::Explicit(entries) => entries
            .iter()
            .map(|m| MountainSpec::new(m.center_x, m.center_y, m.radius, m.min_height, m.max_height))
            .collect(),
    }
}

/// Build the pipeline configuration for `config`.
pub fn pipeline_config(config: &Config) -> PipelineConfig {
    let terrain = &config.terrain;
    let disp = &config.displacement;

    let displacement = DiamondSquareParams {
        initial_displacement: disp.initial_displacement,
        roughness: disp.roughness,
        min_height: terrain.min_height,
        max_height: terrain.max_height,
        peak_height: disp.peak_height,
        floor_height: disp.floor_height,
        clamp: match disp.clamp {
            ClampSetting::EveryStep => ClampPolicy::EveryStep,
            ClampSetting::Final => ClampPolicy::Final,
        },
        coarse_level: match disp.coarse_level {
            CoarseSetting::Seeded => CoarseLevel::Seeded,
            CoarseSetting::Preserve => CoarseLevel::Preserve,
            CoarseSetting::Computed => CoarseLevel::Computed,
        },
        soften_peak: disp.soften_peak,
    };

    let fractal_params = DiamondSquareParams {
        initial_displacement: config.mountains.fractal_displacement,
        roughness: config.mountains.fractal_roughness,
        min_height: terrain.min_height,
        max_height: terrain.max_height,
        floor_height: terrain.min_height,
        ..Default::default()
    };

    let splat = &config.splat;
    let roles = &splat.roles;
    let splat_policy = SplatPolicy {
        layer_names: splat.layer_names.clone(),
        valley_threshold: splat.valley_threshold,
        peak_threshold: splat.peak_threshold,
        base_weight: splat.base_weight,
        roles: LayerRoles {
            base: roles.base,
            grass: roles.grass,
            dirt: roles.dirt,
            valley: roles.valley,
            cliff: roles.cliff,
            snow: roles.snow,
        },
    };

    PipelineConfig {
        resolution: terrain.resolution,
        flatten: flatten_mode(terrain.flatten),
        mountains: mountains(config),
        mountain_blend: blend(config.mountains.blend),
        fractal_peaks: config
            .mountains
            .fractal_peaks
            .iter()
            .map(|p| FractalPeak {
                origin_x: p.origin_x as usize,
                origin_y: p.origin_y as usize,
                radius: p.radius,
            })
            .collect(),
        fractal_params,
        displacement,
        normalize_to: terrain.normalize,
        splat_policy,
        splat_size: splat
            .alphamap_size
            .map(|(w, h)| (w as usize, h as usize)),
        scale: TerrainScale {
            cell_size: config.scale.cell_size,
            height_scale: config.scale.height_scale,
        },
        steepness_curve: curve(splat.curve),
    }
}

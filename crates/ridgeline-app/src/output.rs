//! Writing generated terrain to disk.

use std::path::{Path, PathBuf};

use ridgeline_config::OutputConfig;
use ridgeline_terrain::debug_viz::{
    DEFAULT_LAYER_PALETTE, DebugImage, render_dominant_layer, render_grayscale,
    render_heightmap_debug, render_splat_debug,
};
use ridgeline_terrain::{GeneratedTerrain, SplatPolicy};

use crate::error::AppError;

/// Encode `image` as PNG at `path`.
pub fn write_png(image: DebugImage, path: &Path) -> Result<(), AppError> {
    let (width, height) = image.dimensions();
    let buffer = image::RgbaImage::from_raw(width, height, image.into_raw()).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "pixel buffer does not match image dimensions",
        )
    })?;
    buffer.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Row-major little-endian `f32` heights, pushed through the height sink.
pub fn raw_heights(terrain: &GeneratedTerrain) -> Vec<u8> {
    let map = terrain.heightmap();
    let mut bytes = vec![0u8; map.width() * map.height() * 4];
    let width = map.width();
    terrain.apply_heights(&mut |x: usize, y: usize, h: f32| {
        let at = (y * width + x) * 4;
        bytes[at..at + 4].copy_from_slice(&h.to_le_bytes());
    });
    bytes
}

/// Write every output enabled in `output`. Returns the paths written.
pub fn write_outputs(
    terrain: &GeneratedTerrain,
    policy: &SplatPolicy,
    output: &OutputConfig,
) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(&output.directory)?;
    let mut written = Vec::new();
    let mut emit = |name: &str, image: DebugImage| -> Result<(), AppError> {
        let path = output.directory.join(name);
        write_png(image, &path)?;
        tracing::info!(path = %path.display(), "wrote preview");
        written.push(path);
        Ok(())
    };

    if output.heightmap_png {
        emit("heightmap.png", render_heightmap_debug(terrain.heightmap(), policy))?;
    }
    if output.grayscale_png {
        emit("heightmap_gray.png", render_grayscale(terrain.heightmap()))?;
    }
    if output.splat_png {
        emit("splat.png", render_splat_debug(terrain.splat(), &DEFAULT_LAYER_PALETTE))?;
    }
    if output.dominant_png {
        emit(
            "splat_dominant.png",
            render_dominant_layer(terrain.splat(), &DEFAULT_LAYER_PALETTE),
        )?;
    }

    if output.raw_heights {
        let path = output.directory.join("heights.r32");
        std::fs::write(&path, raw_heights(terrain))?;
        tracing::info!(path = %path.display(), "wrote raw heights");
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridgeline_terrain::{PipelineConfig, RngDisplacement, TerrainPipeline};

    fn small_terrain() -> GeneratedTerrain {
        TerrainPipeline::new(PipelineConfig {
            resolution: 16,
            ..Default::default()
        })
        .unwrap()
        .generate(&mut RngDisplacement::seeded(5))
        .unwrap()
    }

    #[test]
    fn test_raw_heights_layout() {
        let terrain = small_terrain();
        let bytes = raw_heights(&terrain);
        assert_eq!(bytes.len(), 17 * 17 * 4);

        let at = (3 * 17 + 2) * 4;
        let h = f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        assert_eq!(h, terrain.heightmap().get(2, 3).unwrap());
    }

    #[test]
    fn test_write_outputs_respects_flags() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            directory: dir.path().join("out"),
            heightmap_png: true,
            grayscale_png: false,
            splat_png: true,
            dominant_png: false,
            raw_heights: true,
        };
        let written =
            write_outputs(&small_terrain(), &SplatPolicy::default(), &output).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["heightmap.png", "splat.png", "heights.r32"]);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_png_round_trips_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        write_png(render_grayscale(small_terrain().heightmap()), &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (17, 17));
    }
}

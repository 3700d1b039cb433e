//! Preview renderers for heightmaps and splat maps.

use super::image::DebugImage;
use crate::grid::Heightmap;
use crate::splat::{SplatMap, SplatPolicy};

/// Colors for the default five-layer policy: base, grass, dirt, valley, snow.
pub const DEFAULT_LAYER_PALETTE: [[u8; 3]; 5] = [
    [120, 110, 90],
    [70, 150, 50],
    [130, 95, 60],
    [40, 80, 160],
    [240, 240, 245],
];

/// Generate a color-coded elevation image, one pixel per sample.
///
/// The bands follow the splat policy thresholds so the preview lines up with
/// the texture layers: blue valleys, green to brown slopes, grey to white peaks.
pub fn render_heightmap_debug(map: &Heightmap, policy: &SplatPolicy) -> DebugImage {
    let mut image = DebugImage::new(map.width() as u32, map.height() as u32);
    for (x, y, h) in map.iter() {
        image.set_rgb(x as u32, y as u32, height_to_color(h, policy));
    }
    image
}

/// Map a height in `[0, 1]` to an RGB color.
pub fn height_to_color(height: f32, policy: &SplatPolicy) -> [u8; 3] {
    let h = height.clamp(0.0, 1.0);
    let valley = policy.valley_threshold;
    let peak = policy.peak_threshold;

    if h < valley {
        // Valley floor: deepens toward zero
        let t = if valley > 0.0 { h / valley } else { 1.0 };
        [20, (40.0 + t * 40.0) as u8, (120.0 + t * 60.0) as u8]
    } else if h < peak {
        let t = ((h - valley) / (peak - valley)).clamp(0.0, 1.0);
        [
            (40.0 + t * 100.0) as u8,
            (150.0 - t * 50.0) as u8,
            (40.0 + t * 20.0) as u8,
        ]
    } else {
        let span = (1.0 - peak).max(f32::EPSILON);
        let base = 160.0 + ((h - peak) / span).min(1.0) * 95.0;
        [base as u8, base as u8, base as u8]
    }
}

/// Generate a plain grayscale image with black at 0 and white at 1.
pub fn render_grayscale(map: &Heightmap) -> DebugImage {
    let mut image = DebugImage::new(map.width() as u32, map.height() as u32);
    for (x, y, h) in map.iter() {
        let v = (h.clamp(0.0, 1.0) * 255.0).round() as u8;
        image.set_rgb(x as u32, y as u32, [v, v, v]);
    }
    image
}

fn palette_color(palette: &[[u8; 3]], layer: usize) -> [u8; 3] {
    if palette.is_empty() {
        [0, 0, 0]
    } else {
        palette[layer % palette.len()]
    }
}

/// Blend each texel's layer colors by weight.
///
/// Layers beyond the end of `palette` wrap around to its start.
pub fn render_splat_debug(splat: &SplatMap, palette: &[[u8; 3]]) -> DebugImage {
    let mut image = DebugImage::new(splat.width() as u32, splat.height() as u32);
    splat.apply(&mut |x: usize, y: usize, weights: &[f32]| {
        let mut rgb = [0.0f32; 3];
        for (layer, &w) in weights.iter().enumerate() {
            let color = palette_color(palette, layer);
            for (acc, c) in rgb.iter_mut().zip(color) {
                *acc += w * c as f32;
            }
        }
        let [r, g, b] = rgb.map(|c| c.round().clamp(0.0, 255.0) as u8);
        image.set_rgb(x as u32, y as u32, [r, g, b]);
    });
    image
}

/// Paint each texel with the color of its heaviest layer.
pub fn render_dominant_layer(splat: &SplatMap, palette: &[[u8; 3]]) -> DebugImage {
    let mut image = DebugImage::new(splat.width() as u32, splat.height() as u32);
    for y in 0..splat.height() {
        for x in 0..splat.width() {
            if let Some(layer) = splat.dominant_layer(x, y) {
                image.set_rgb(x as u32, y as u32, palette_color(palette, layer));
            }
        }
    }
    image
}

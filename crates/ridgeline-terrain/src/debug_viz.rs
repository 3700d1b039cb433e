//! Terrain debug visualization: preview images of generated heightmaps and splat maps.
//!
//! Provides [`DebugImage`] and rendering functions that turn a [`Heightmap`](crate::Heightmap)
//! or a [`SplatMap`](crate::SplatMap) into RGBA pixels. Encoding to a file
//! format is left to the caller.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    DEFAULT_LAYER_PALETTE, height_to_color, render_dominant_layer, render_grayscale,
    render_heightmap_debug, render_splat_debug,
};

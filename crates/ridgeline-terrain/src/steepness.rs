//! Slope sampling from a heightmap.

use glam::Vec3;

use crate::error::TerrainError;
use crate::grid::Grid;

/// World-space size of a grid, used to turn height differences into angles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainScale {
    /// Horizontal distance between neighbouring samples.
    pub cell_size: f32,
    /// World height corresponding to a sample value of 1.0.
    pub height_scale: f32,
}

impl Default for TerrainScale {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            height_scale: 32.0,
        }
    }
}

/// Maps a slope angle in degrees into `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SteepnessCurve {
    /// `1 - 1 / (degrees + 1)`. Saturates quickly, so any visible slope reads as steep.
    #[default]
    Reciprocal,
    /// `degrees / max_degrees`, clamped.
    Linear {
        /// Angle that maps to 1.0.
        max_degrees: f32,
    },
}

impl SteepnessCurve {
    /// Normalize an angle.
    pub fn apply(self, degrees: f32) -> f32 {
        let degrees = degrees.max(0.0);
        match self {
            SteepnessCurve::Reciprocal => 1.0 - 1.0 / (degrees + 1.0),
            SteepnessCurve::Linear { max_degrees } if max_degrees > 0.0 => {
                (degrees / max_degrees).clamp(0.0, 1.0)
            }
            SteepnessCurve::Linear { .. } => 0.0,
        }
    }
}

/// Surface normal at `(x, y)` from central differences, one-sided at the border.
pub fn surface_normal(
    grid: &Grid,
    x: usize,
    y: usize,
    scale: TerrainScale,
) -> Result<Vec3, TerrainError> {
    // Bounds check for the sample itself; neighbours are clamped below.
    grid.get(x, y)?;
    let last_x = grid.width() - 1;
    let last_y = grid.height() - 1;

    let (x0, x1) = (x.saturating_sub(1), (x + 1).min(last_x));
    let (y0, y1) = (y.saturating_sub(1), (y + 1).min(last_y));

    let slope = |a: f32, b: f32, span: usize| {
        if span == 0 {
            0.0
        } else {
            (b - a) * scale.height_scale / (span as f32 * scale.cell_size)
        }
    };
    let dx = slope(grid.get(x0, y)?, grid.get(x1, y)?, x1 - x0);
    let dy = slope(grid.get(x, y0)?, grid.get(x, y1)?, y1 - y0);

    Ok(Vec3::new(-dx, 1.0, -dy).normalize())
}

/// Slope angle at `(x, y)` in degrees, 0 for flat ground and approaching 90 for cliffs.
pub fn steepness_degrees(
    grid: &Grid,
    x: usize,
    y: usize,
    scale: TerrainScale,
) -> Result<f32, TerrainError> {
    let normal = surface_normal(grid, x, y, scale)?;
    Ok(normal.angle_between(Vec3::Y).to_degrees())
}

//! Base shapes written into a grid before any mountains or detail.

use crate::grid::Grid;

/// How [`flatten`] initializes a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlattenMode {
    /// Every cell gets the same height.
    Uniform {
        /// The height to write.
        height: f32,
    },
    /// A low plateau that drops off towards the border.
    ///
    /// With `d = min(x, W - x, y, H - y) + 1` each cell gets
    /// `(1 - 1 / (d / 2 + 1)^2) * amplitude`.
    EdgeFalloff {
        /// Plateau height reached far from the border.
        amplitude: f32,
    },
    /// Height equal to the normalized distance from cell `(0, 0)`.
    OriginRamp,
}

impl Default for FlattenMode {
    fn default() -> Self {
        FlattenMode::Uniform { height: 0.0 }
    }
}

/// Overwrite every cell of `grid` according to `mode`.
pub fn flatten(grid: &mut Grid, mode: FlattenMode) {
    let last_x = grid.width() - 1;
    let last_y = grid.height() - 1;
    match mode {
        FlattenMode::Uniform { height } => grid.fill(height),
        FlattenMode::EdgeFalloff { amplitude } => grid.map_in_place(|x, y, _| {
            edge_falloff(x.min(last_x - x).min(y).min(last_y - y), amplitude)
        }),
        FlattenMode::OriginRamp => grid.map_in_place(|x, y, _| {
            let u = x as f32 / last_x as f32;
            let v = y as f32 / last_y as f32;
            crate::seed::det_distance(u, v)
        }),
    }
}

fn edge_falloff(border_distance: usize, amplitude: f32) -> f32 {
    let d = (border_distance + 1) as f32;
    let t = d / 2.0 + 1.0;
    (1.0 - 1.0 / (t * t)) * amplitude
}

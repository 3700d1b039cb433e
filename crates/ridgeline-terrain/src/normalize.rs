//! Value-range statistics and linear renormalization.

use crate::error::TerrainError;
use crate::grid::Grid;

/// Minimum, maximum and mean over every sample of a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightStats {
    /// Smallest sample.
    pub min: f32,
    /// Largest sample.
    pub max: f32,
    /// Arithmetic mean of all samples.
    pub mean: f32,
}

impl HeightStats {
    /// `max - min`.
    pub fn range(&self) -> f32 {
        self.max - self.min
    }
}

/// Scan `grid` once for its min, max and mean.
pub fn height_stats(grid: &Grid) -> HeightStats {
    let values = grid.values();
    let (min, max, total) = values.iter().fold(
        (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
        |(min, max, total), &v| (min.min(v), max.max(v), total + v as f64),
    );
    HeightStats {
        min,
        max,
        mean: (total / values.len() as f64) as f32,
    }
}

/// Linearly remap every sample from its current `[min, max]` into
/// `[target_min, target_max]`. Returns the statistics measured before the remap.
///
/// # Errors
///
/// Returns [`TerrainError::DegenerateRange`] without touching the grid if every
/// sample is equal. Callers decide whether a flat grid is acceptable as-is.
pub fn normalize(
    grid: &mut Grid,
    target_min: f32,
    target_max: f32,
) -> Result<HeightStats, TerrainError> {
    let stats = height_stats(grid);
    if stats.max == stats.min {
        return Err(TerrainError::DegenerateRange { value: stats.min });
    }

    let scale = (target_max - target_min) / (stats.max - stats.min);
    grid.map_in_place(|_, _, v| {
        let mapped = target_min + (v - stats.min) * scale;
        // Pin the extremes so rounding never leaves the target range.
        if v == stats.min {
            target_min
        } else if v == stats.max {
            target_max
        } else {
            mapped
        }
    });
    Ok(stats)
}

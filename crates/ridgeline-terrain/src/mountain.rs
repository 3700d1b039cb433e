//! Radial mountain shaping.
//!
//! Stamps circular peaks whose profile is the average of a parabolic and a
//! conical falloff. With [`MountainBlend::Max`] a peak only ever raises terrain,
//! so several peaks accumulate regardless of order.

use crate::error::TerrainError;
use crate::grid::Grid;
use crate::seed::det_distance;

/// A circular elevation feature.
#[derive(Clone, Debug, PartialEq)]
pub struct MountainSpec {
    /// Peak column in grid coordinates. May lie outside the grid.
    pub center_x: i32,
    /// Peak row in grid coordinates. May lie outside the grid.
    pub center_y: i32,
    /// Base radius in grid cells.
    pub radius: u32,
    /// Height at the rim of the base.
    pub min_height: f32,
    /// Height at the peak.
    pub max_height: f32,
}

impl MountainSpec {
    /// Create a mountain spanning `[min_height, max_height]`.
    pub fn new(center_x: i32, center_y: i32, radius: u32, min_height: f32, max_height: f32) -> Self {
        Self {
            center_x,
            center_y,
            radius,
            min_height,
            max_height,
        }
    }

    /// Check the height pair is finite and ordered.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.min_height.is_finite() || !self.max_height.is_finite() {
            return Err(TerrainError::InvalidMountain(format!(
                "non-finite heights [{}, {}]",
                self.min_height, self.max_height
            )));
        }
        if self.min_height > self.max_height {
            return Err(TerrainError::InvalidMountain(format!(
                "min height {} above max height {}",
                self.min_height, self.max_height
            )));
        }
        Ok(())
    }

    /// Height of this mountain at distance `distance` from the peak, or `None`
    /// outside the circular base.
    pub fn height_at_distance(&self, distance: f32) -> Option<f32> {
        let radius = self.radius as f32;
        if distance > radius {
            return None;
        }
        let factor = if self.radius == 0 {
            1.0
        } else {
            let t = distance / radius;
            let parabola = 1.0 - t * t;
            let cone = 1.0 - t;
            (parabola + cone) / 2.0
        };
        Some(self.min_height + factor * (self.max_height - self.min_height))
    }

    /// The three-peak ridge used as the default landscape.
    ///
    /// `width`/`height` are sample counts. The main peak sits at two thirds of
    /// each axis; the second is shifted one radius left, the third two radii
    /// left and one radius up.
    pub fn range_preset(width: usize, height: usize, floor: f32) -> Vec<MountainSpec> {
        let px = ((width / 3) * 2) as i32;
        let py = ((height / 3) * 2) as i32;
        let r = (width.min(height) / 8) as i32;
        [(px, py), (px - r, py), (px - 2 * r, py - r)]
            .into_iter()
            .map(|(x, y)| MountainSpec::new(x, y, r as u32, floor, 1.0))
            .collect()
    }
}

/// How a computed mountain height combines with existing terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MountainBlend {
    /// Keep the higher of the two.
    #[default]
    Max,
    /// Replace existing terrain inside the base.
    Overwrite,
}

impl MountainBlend {
    /// Combine a computed height with the existing one.
    #[inline]
    pub fn combine(self, computed: f32, existing: f32) -> f32 {
        match self {
            MountainBlend::Max => computed.max(existing),
            MountainBlend::Overwrite => computed,
        }
    }
}

/// Applies [`MountainSpec`]s to a grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct MountainShaper {
    blend: MountainBlend,
}

impl MountainShaper {
    /// Create a shaper with the given blend mode.
    pub fn new(blend: MountainBlend) -> Self {
        Self { blend }
    }

    /// Returns the blend mode.
    pub fn blend(&self) -> MountainBlend {
        self.blend
    }

    /// Stamp one mountain. Returns the number of cells inside its base.
    ///
    /// Only the part of the `(2r + 1)^2` bounding box that overlaps the grid
    /// is visited.
    pub fn apply(&self, grid: &mut Grid, spec: &MountainSpec) -> Result<usize, TerrainError> {
        spec.validate()?;

        let r = spec.radius as i64;
        let (cx, cy) = (spec.center_x as i64, spec.center_y as i64);
        let x_lo = (cx - r).max(0);
        let y_lo = (cy - r).max(0);
        let x_hi = (cx + r).min(grid.width() as i64 - 1);
        let y_hi = (cy + r).min(grid.height() as i64 - 1);

        let mut touched = 0;
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let distance = det_distance((x - cx) as f32, (y - cy) as f32);
                let Some(height) = spec.height_at_distance(distance) else {
                    continue;
                };
                let (ux, uy) = (x as usize, y as usize);
                let existing = grid.get(ux, uy)?;
                grid.set(ux, uy, self.blend.combine(height, existing))?;
                touched += 1;
            }
        }

        log::debug!(
            "mountain at ({}, {}) r={} touched {touched} cells",
            spec.center_x,
            spec.center_y,
            spec.radius
        );
        Ok(touched)
    }

    /// Stamp every mountain in order.
    pub fn apply_all(&self, grid: &mut Grid, specs: &[MountainSpec]) -> Result<usize, TerrainError> {
        for spec in specs {
            spec.validate()?;
        }
        let mut touched = 0;
        for spec in specs {
            touched += self.apply(grid, spec)?;
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_profile_peak_rim_and_midpoint() {
        let spec = MountainSpec::new(0, 0, 10, 0.1, 1.0);
        assert!((spec.height_at_distance(0.0).unwrap() - 1.0).abs() < EPSILON);
        assert!((spec.height_at_distance(10.0).unwrap() - 0.1).abs() < EPSILON);
        // t = 0.5: parabola 0.75, cone 0.5, factor 0.625
        let mid = spec.height_at_distance(5.0).unwrap();
        assert!((mid - (0.1 + 0.625 * 0.9)).abs() < EPSILON, "got {mid}");
        assert_eq!(spec.height_at_distance(10.01), None);
    }

    #[test]
    fn test_base_is_circular() {
        let mut grid = Grid::new(32, 0.0).unwrap();
        let spec = MountainSpec::new(16, 16, 8, 0.2, 1.0);
        MountainShaper::default().apply(&mut grid, &spec).unwrap();

        // Corner of the bounding box is outside the circle.
        assert_eq!(grid.get(24, 24).unwrap(), 0.0);
        // Cardinal rim point is inside.
        assert!((grid.get(24, 16).unwrap() - 0.2).abs() < EPSILON);
        assert!((grid.get(16, 16).unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_max_blend_never_lowers_terrain() {
        let mut grid = Grid::new(16, 0.0).unwrap();
        grid.map_in_place(|x, y, _| ((x * 7 + y * 3) % 11) as f32 / 10.0);
        let before = grid.clone();

        let spec = MountainSpec::new(8, 8, 6, 0.0, 0.6);
        MountainShaper::new(MountainBlend::Max)
            .apply(&mut grid, &spec)
            .unwrap();

        for ((x, y, after), (_, _, old)) in grid.iter().zip(before.iter()) {
            assert!(after >= old, "cell ({x}, {y}) lowered from {old} to {after}");
        }
    }

    #[test]
    fn test_reapplying_same_spec_is_noop() {
        let mut grid = Grid::new(16, 0.05).unwrap();
        let shaper = MountainShaper::default();
        let spec = MountainSpec::new(5, 9, 4, 0.1, 0.9);
        shaper.apply(&mut grid, &spec).unwrap();
        let once = grid.clone();
        shaper.apply(&mut grid, &spec).unwrap();
        assert_eq!(grid, once);
    }

    #[test]
    fn test_overwrite_blend_lowers_higher_terrain() {
        let mut grid = Grid::new(8, 1.0).unwrap();
        let spec = MountainSpec::new(4, 4, 2, 0.0, 0.5);
        MountainShaper::new(MountainBlend::Overwrite)
            .apply(&mut grid, &spec)
            .unwrap();
        assert!((grid.get(4, 4).unwrap() - 0.5).abs() < EPSILON);
        assert_eq!(grid.get(0, 0).unwrap(), 1.0, "outside the base is untouched");
    }

    #[test]
    fn test_mountain_clipped_at_grid_edge() {
        let mut grid = Grid::new(8, 0.0).unwrap();
        let spec = MountainSpec::new(0, 0, 3, 0.0, 1.0);
        let touched = MountainShaper::default().apply(&mut grid, &spec).unwrap();
        // Quarter disc of radius 3 on integer lattice, including axes.
        assert_eq!(touched, 11);
        assert!((grid.get(0, 0).unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_radius_touches_only_peak() {
        let mut grid = Grid::new(4, 0.0).unwrap();
        let spec = MountainSpec::new(2, 2, 0, 0.3, 0.7);
        let touched = MountainShaper::default().apply(&mut grid, &spec).unwrap();
        assert_eq!(touched, 1);
        assert!((grid.get(2, 2).unwrap() - 0.7).abs() < EPSILON);
    }

    #[test]
    fn test_inverted_heights_rejected() {
        let mut grid = Grid::new(4, 0.0).unwrap();
        let spec = MountainSpec::new(2, 2, 1, 0.9, 0.1);
        assert!(matches!(
            MountainShaper::default().apply(&mut grid, &spec),
            Err(TerrainError::InvalidMountain(_))
        ));
    }

    #[test]
    fn test_accumulation_is_order_independent() {
        let specs = [
            MountainSpec::new(10, 10, 6, 0.1, 0.8),
            MountainSpec::new(14, 12, 5, 0.0, 1.0),
        ];
        let shaper = MountainShaper::default();

        let mut forward = Grid::new(32, 0.0).unwrap();
        shaper.apply_all(&mut forward, &specs).unwrap();

        let mut reverse = Grid::new(32, 0.0).unwrap();
        let reversed: Vec<_> = specs.iter().rev().cloned().collect();
        shaper.apply_all(&mut reverse, &reversed).unwrap();

        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_range_preset_layout() {
        let specs = MountainSpec::range_preset(513, 513, 0.1);
        assert_eq!(specs.len(), 3);
        assert_eq!((specs[0].center_x, specs[0].center_y), (342, 342));
        assert_eq!(specs[0].radius, 64);
        assert_eq!((specs[1].center_x, specs[1].center_y), (278, 342));
        assert_eq!((specs[2].center_x, specs[2].center_y), (214, 278));
        assert!(specs.iter().all(|s| s.min_height == 0.1 && s.max_height == 1.0));
    }
}

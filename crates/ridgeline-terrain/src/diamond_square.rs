//! Diamond-square midpoint displacement.
//!
//! Refines a square `(2^k + 1)` grid level by level. Each level first fills the
//! centres of the current squares from their four corners (square pass), then
//! fills the edge midpoints from their in-bounds axis neighbours (diamond pass).
//! Displacement shrinks by `2^(-roughness)` after every computed level.

use crate::error::TerrainError;
use crate::grid::Grid;
use crate::seed::{DisplacementSource, decay_factor};

/// When displaced values are clamped into `[min_height, max_height]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClampPolicy {
    /// Clamp every written cell immediately.
    #[default]
    EveryStep,
    /// Let values overshoot during refinement and clamp once at the end.
    Final,
}

/// How the coarsest level (`hs = resolution / 2`) is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoarseLevel {
    /// Force the centre to the peak height and the four edge midpoints to the floor.
    #[default]
    Seeded,
    /// Keep whatever the grid already holds at the coarse lattice points.
    Preserve,
    /// Compute the coarse level like any other, from the four corners.
    Computed,
}

/// Parameters for one diamond-square run.
#[derive(Clone, Debug, PartialEq)]
pub struct DiamondSquareParams {
    /// Displacement magnitude for the first computed level.
    pub initial_displacement: f32,
    /// Decay exponent. Higher values give smoother terrain. Typical range: 1.0-2.0.
    pub roughness: f32,
    /// Lower clamp bound.
    pub min_height: f32,
    /// Upper clamp bound.
    pub max_height: f32,
    /// Height forced at the grid centre by [`CoarseLevel::Seeded`].
    pub peak_height: f32,
    /// Height forced at the edge midpoints by [`CoarseLevel::Seeded`].
    pub floor_height: f32,
    /// Clamp timing.
    pub clamp: ClampPolicy,
    /// Coarse level handling.
    pub coarse_level: CoarseLevel,
    /// Re-average the centre from its diagonal neighbours after refinement.
    pub soften_peak: bool,
}

impl Default for DiamondSquareParams {
    fn default() -> Self {
        Self {
            initial_displacement: 0.8,
            roughness: 1.0,
            min_height: 0.0,
            max_height: 1.0,
            peak_height: 1.0,
            floor_height: 0.0,
            clamp: ClampPolicy::EveryStep,
            coarse_level: CoarseLevel::Seeded,
            soften_peak: true,
        }
    }
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct PassReport {
    /// Half-step of every level visited, coarsest first.
    pub half_steps: Vec<usize>,
    /// Number of levels that ran square and diamond passes.
    pub computed_passes: u32,
    /// Displacement magnitude left after the last decay.
    pub final_displacement: f32,
}

/// The diamond-square engine.
#[derive(Clone, Debug, Default)]
pub struct DiamondSquare {
    params: DiamondSquareParams,
}

impl DiamondSquare {
    /// Create an engine with the given parameters.
    pub fn new(params: DiamondSquareParams) -> Self {
        Self { params }
    }

    /// Returns the engine parameters.
    pub fn params(&self) -> &DiamondSquareParams {
        &self.params
    }

    fn validate(&self, grid: &Grid) -> Result<(), TerrainError> {
        if !grid.is_square() {
            // Report the axis that disagrees with the x resolution.
            return Err(TerrainError::InvalidResolution((grid.height() - 1) as u32));
        }
        let resolution = grid.resolution();
        if resolution < 2 || !resolution.is_power_of_two() {
            return Err(TerrainError::InvalidResolution(resolution as u32));
        }
        let (min, max) = (self.params.min_height, self.params.max_height);
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(TerrainError::InvalidHeightRange { min, max });
        }
        Ok(())
    }

    /// Refine `grid` in place.
    ///
    /// The four corners must already hold their baseline values; they are never
    /// written. Validation happens before the first write, so on error the grid
    /// is untouched.
    ///
    /// # Errors
    ///
    /// [`TerrainError::InvalidResolution`] for a non-square or non power-of-two
    /// grid, [`TerrainError::InvalidHeightRange`] for an unusable clamp range.
    pub fn run(
        &self,
        grid: &mut Grid,
        source: &mut impl DisplacementSource,
    ) -> Result<PassReport, TerrainError> {
        self.validate(grid)?;

        let resolution = grid.resolution();
        let decay = decay_factor(self.params.roughness);
        let mut dis = self.params.initial_displacement;
        let mut half_steps = Vec::new();
        let mut computed_passes = 0;

        let mut hs = resolution / 2;
        match self.params.coarse_level {
            CoarseLevel::Seeded => self.seed_coarse_level(grid, hs)?,
            CoarseLevel::Preserve => {}
            CoarseLevel::Computed => {
                self.refine_level(grid, hs, dis, source)?;
                dis *= decay;
                computed_passes += 1;
            }
        }
        half_steps.push(hs);
        hs /= 2;

        while hs >= 1 {
            self.refine_level(grid, hs, dis, source)?;
            dis *= decay;
            computed_passes += 1;
            half_steps.push(hs);
            hs /= 2;
        }

        if self.params.soften_peak {
            let center = resolution / 2;
            let corners = grid.diagonal_neighbors(center, center, 1)?;
            let avg = corners.iter().sum::<f32>() / 4.0;
            grid.set(center, center, self.clamp_step(avg))?;
        }

        if self.params.clamp == ClampPolicy::Final {
            let (min, max) = (self.params.min_height, self.params.max_height);
            grid.map_in_place(|x, y, v| {
                let is_corner = (x == 0 || x == resolution) && (y == 0 || y == resolution);
                if is_corner { v } else { v.clamp(min, max) }
            });
        }

        log::trace!(
            "diamond-square {resolution}: {computed_passes} passes, final displacement {dis}"
        );

        Ok(PassReport {
            half_steps,
            computed_passes,
            final_displacement: dis,
        })
    }

    fn seed_coarse_level(&self, grid: &mut Grid, hs: usize) -> Result<(), TerrainError> {
        let resolution = grid.resolution();
        let floor = self.clamp_step(self.params.floor_height);
        grid.set(hs, hs, self.clamp_step(self.params.peak_height))?;
        grid.set(hs, 0, floor)?;
        grid.set(hs, resolution, floor)?;
        grid.set(0, hs, floor)?;
        grid.set(resolution, hs, floor)?;
        Ok(())
    }

    /// One level: every square point is written before any diamond point reads it.
    fn refine_level(
        &self,
        grid: &mut Grid,
        hs: usize,
        dis: f32,
        source: &mut impl DisplacementSource,
    ) -> Result<(), TerrainError> {
        let resolution = grid.resolution();
        let step = hs * 2;

        for y in (hs..resolution).step_by(step) {
            for x in (hs..resolution).step_by(step) {
                let corners = grid.diagonal_neighbors(x, y, hs)?;
                let avg = corners.iter().sum::<f32>() / 4.0;
                self.displace(grid, x, y, avg, dis, source)?;
            }
        }

        // Diamond points sit where exactly one of x/hs, y/hs is odd.
        for y in (0..=resolution).step_by(hs) {
            let x_start = if (y / hs) % 2 == 0 { hs } else { 0 };
            for x in (x_start..=resolution).step_by(step) {
                let (sum, count) = grid
                    .axis_neighbors(x, y, hs)
                    .fold((0.0f32, 0u32), |(s, c), v| (s + v, c + 1));
                self.displace(grid, x, y, sum / count as f32, dis, source)?;
            }
        }

        Ok(())
    }

    fn displace(
        &self,
        grid: &mut Grid,
        x: usize,
        y: usize,
        avg: f32,
        dis: f32,
        source: &mut impl DisplacementSource,
    ) -> Result<(), TerrainError> {
        let value = avg + source.displace(dis);
        grid.set(x, y, self.clamp_step(value))
    }

    #[inline]
    fn clamp_step(&self, value: f32) -> f32 {
        match self.params.clamp {
            ClampPolicy::EveryStep => value.clamp(self.params.min_height, self.params.max_height),
            ClampPolicy::Final => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{NoDisplacement, RngDisplacement};

    const EPSILON: f32 = 1e-6;

    fn flat_params() -> DiamondSquareParams {
        DiamondSquareParams {
            initial_displacement: 0.0,
            ..Default::default()
        }
    }

    fn assert_close(actual: f32, expected: f32, what: &str) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "{what}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_five_by_five_exact_averages() {
        let mut grid = Grid::new(4, 0.0).unwrap();
        let engine = DiamondSquare::new(flat_params());
        let report = engine.run(&mut grid, &mut NoDisplacement).unwrap();

        assert_eq!(report.half_steps, vec![2, 1]);
        assert_eq!(report.computed_passes, 1);

        // Square points: mean of (floor, floor, floor, peak).
        for (x, y) in [(1, 1), (3, 1), (1, 3), (3, 3)] {
            assert_close(grid.get(x, y).unwrap(), 0.25, "square point");
        }

        // Edge diamond points average three in-bounds neighbours, not four.
        for (x, y) in [(1, 0), (3, 0), (0, 1), (4, 1), (0, 3), (4, 3), (1, 4), (3, 4)] {
            assert_close(grid.get(x, y).unwrap(), 0.25 / 3.0, "edge diamond point");
        }

        // Interior diamond points: (0.25 + 0.25 + 0 + 1) / 4.
        for (x, y) in [(2, 1), (1, 2), (3, 2), (2, 3)] {
            assert_close(grid.get(x, y).unwrap(), 0.375, "interior diamond point");
        }

        // Seeded diamond around the centre stays at the floor.
        for (x, y) in [(2, 0), (0, 2), (4, 2), (2, 4)] {
            assert_close(grid.get(x, y).unwrap(), 0.0, "seeded floor point");
        }

        // Post-step: centre re-averaged from its four new diagonal neighbours.
        assert_close(grid.get(2, 2).unwrap(), 0.25, "softened centre");
    }

    #[test]
    fn test_without_softening_centre_keeps_peak() {
        let mut grid = Grid::new(4, 0.0).unwrap();
        let engine = DiamondSquare::new(DiamondSquareParams {
            soften_peak: false,
            ..flat_params()
        });
        engine.run(&mut grid, &mut NoDisplacement).unwrap();
        assert_close(grid.get(2, 2).unwrap(), 1.0, "unsoftened centre");
    }

    #[test]
    fn test_resolution_two_runs_single_level() {
        let mut grid = Grid::new(2, 0.0).unwrap();
        let engine = DiamondSquare::new(flat_params());
        let report = engine.run(&mut grid, &mut NoDisplacement).unwrap();

        assert_eq!(report.half_steps, vec![1], "loop body must run exactly once");
        assert_eq!(report.computed_passes, 0);
        // The centre is softened back to the mean of the four corners.
        assert_close(grid.get(1, 1).unwrap(), 0.0, "centre");
    }

    #[test]
    fn test_resolution_two_computed_level() {
        let mut grid = Grid::new(2, 0.0).unwrap();
        grid.set(0, 0, 0.4).unwrap();
        let engine = DiamondSquare::new(DiamondSquareParams {
            coarse_level: CoarseLevel::Computed,
            soften_peak: false,
            ..flat_params()
        });
        let report = engine.run(&mut grid, &mut NoDisplacement).unwrap();
        assert_eq!(report.half_steps, vec![1]);
        assert_eq!(report.computed_passes, 1);
        assert_close(grid.get(1, 1).unwrap(), 0.1, "centre");
        // (0,1): neighbours (1,1)=0.1, (0,0)=0.4, (0,2)=0.0.
        assert_close(grid.get(0, 1).unwrap(), 0.5 / 3.0, "edge");
    }

    #[test]
    fn test_values_stay_within_clamp_range() {
        let mut grid = Grid::new(64, 0.2).unwrap();
        let engine = DiamondSquare::new(DiamondSquareParams {
            initial_displacement: 2.0,
            min_height: 0.0,
            max_height: 1.0,
            ..Default::default()
        });
        engine
            .run(&mut grid, &mut RngDisplacement::seeded(1234))
            .unwrap();

        for (x, y, v) in grid.iter() {
            assert!(
                (0.0..=1.0).contains(&v),
                "cell ({x}, {y}) = {v} escaped the clamp range"
            );
        }
    }

    #[test]
    fn test_final_clamp_policy_still_bounds_output() {
        let mut grid = Grid::new(32, 0.5).unwrap();
        let engine = DiamondSquare::new(DiamondSquareParams {
            initial_displacement: 3.0,
            clamp: ClampPolicy::Final,
            ..Default::default()
        });
        engine.run(&mut grid, &mut RngDisplacement::seeded(5)).unwrap();
        assert!(grid.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_corners_never_written() {
        let mut grid = Grid::new(16, 0.0).unwrap();
        let corners = [(0, 0, 0.1), (16, 0, 0.2), (0, 16, 0.3), (16, 16, 0.4)];
        for (x, y, v) in corners {
            grid.set(x, y, v).unwrap();
        }

        let engine = DiamondSquare::new(DiamondSquareParams {
            initial_displacement: 0.5,
            ..Default::default()
        });
        engine.run(&mut grid, &mut RngDisplacement::seeded(77)).unwrap();

        for (x, y, v) in corners {
            assert_eq!(grid.get(x, y).unwrap(), v, "corner ({x}, {y}) changed");
        }
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let engine = DiamondSquare::new(DiamondSquareParams::default());
        let mut a = Grid::new(32, 0.0).unwrap();
        let mut b = Grid::new(32, 0.0).unwrap();
        engine.run(&mut a, &mut RngDisplacement::seeded(42)).unwrap();
        engine.run(&mut b, &mut RngDisplacement::seeded(42)).unwrap();
        assert_eq!(a, b);

        let mut c = Grid::new(32, 0.0).unwrap();
        engine.run(&mut c, &mut RngDisplacement::seeded(43)).unwrap();
        assert_ne!(a, c, "different seeds should produce different terrain");
    }

    #[test]
    fn test_displacement_decays_per_computed_pass() {
        let mut grid = Grid::new(16, 0.0).unwrap();
        let engine = DiamondSquare::new(DiamondSquareParams {
            initial_displacement: 0.8,
            roughness: 1.0,
            ..Default::default()
        });
        let report = engine.run(&mut grid, &mut NoDisplacement).unwrap();
        assert_eq!(report.half_steps, vec![8, 4, 2, 1]);
        assert_eq!(report.computed_passes, 3);
        assert_close(report.final_displacement, 0.8 * 0.125, "final displacement");
    }

    #[test]
    fn test_preserve_keeps_coarse_lattice() {
        let mut grid = Grid::new(4, 0.0).unwrap();
        grid.set(2, 2, 0.9).unwrap();
        grid.set(2, 0, 0.3).unwrap();
        let engine = DiamondSquare::new(DiamondSquareParams {
            coarse_level: CoarseLevel::Preserve,
            soften_peak: false,
            ..flat_params()
        });
        engine.run(&mut grid, &mut NoDisplacement).unwrap();
        assert_close(grid.get(2, 2).unwrap(), 0.9, "preserved centre");
        assert_close(grid.get(2, 0).unwrap(), 0.3, "preserved midpoint");
        // (1,1): (0 + 0.3 + 0 + 0.9) / 4
        assert_close(grid.get(1, 1).unwrap(), 0.3, "square point over preserved data");
    }

    #[test]
    fn test_non_square_grid_rejected_without_mutation() {
        let mut grid = Grid::with_resolutions(8, 4, 0.5).unwrap();
        let before = grid.clone();
        let err = DiamondSquare::default()
            .run(&mut grid, &mut NoDisplacement)
            .unwrap_err();
        assert_eq!(err, TerrainError::InvalidResolution(4));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_seeded_coarse_level_respects_narrow_range() {
        let mut grid = Grid::new(8, 0.2).unwrap();
        let engine = DiamondSquare::new(DiamondSquareParams {
            min_height: 0.2,
            max_height: 0.5,
            soften_peak: false,
            ..flat_params()
        });
        engine.run(&mut grid, &mut NoDisplacement).unwrap();

        let escaped: Vec<_> = grid
            .iter()
            .filter(|(_, _, v)| !(0.2..=0.5).contains(v))
            .collect();
        assert!(escaped.is_empty(), "cells outside [0.2, 0.5]: {escaped:?}");
        assert_close(grid.get(4, 4).unwrap(), 0.5, "peak clamped to max");
        assert_close(grid.get(4, 0).unwrap(), 0.2, "floor clamped to min");
    }

    #[test]
    fn test_inverted_height_range_rejected() {
        let mut grid = Grid::new(4, 0.0).unwrap();
        let engine = DiamondSquare::new(DiamondSquareParams {
            min_height: 1.0,
            max_height: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            engine.run(&mut grid, &mut NoDisplacement),
            Err(TerrainError::InvalidHeightRange { .. })
        ));
    }
}

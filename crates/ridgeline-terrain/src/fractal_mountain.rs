//! Standalone fractal peaks stamped into a larger terrain.
//!
//! A [`FractalMountain`] runs diamond-square on a private grid just large enough
//! to hold a `(2r + 1)^2` footprint, with the peak forced at its centre, and
//! then hands the footprint to a host through [`HeightSink`].

use crate::diamond_square::{CoarseLevel, DiamondSquare, DiamondSquareParams};
use crate::error::TerrainError;
use crate::grid::Grid;
use crate::mountain::MountainBlend;
use crate::seed::{DisplacementSource, det_distance};
use crate::sink::HeightSink;

/// A diamond-square generated peak of a fixed radius.
#[derive(Clone, Debug)]
pub struct FractalMountain {
    radius: u32,
    offset: usize,
    grid: Grid,
}

impl FractalMountain {
    /// Parameters giving a single smooth peak: small displacement, fast decay.
    pub fn default_params() -> DiamondSquareParams {
        DiamondSquareParams {
            initial_displacement: 0.2,
            roughness: 2.0,
            ..Default::default()
        }
    }

    /// Generate a peak of `radius` cells.
    ///
    /// The working grid has resolution `next_power_of_two(2 * radius)`; its
    /// corners start at `params.floor_height` and the coarse level is always
    /// seeded so the centre carries the peak.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidMountain`] for a zero radius or one whose
    /// working grid would not fit a `u32` resolution.
    pub fn generate(
        radius: u32,
        params: &DiamondSquareParams,
        source: &mut impl DisplacementSource,
    ) -> Result<Self, TerrainError> {
        if radius == 0 {
            return Err(TerrainError::InvalidMountain(
                "fractal mountain radius must be at least 1".to_string(),
            ));
        }
        let too_large = || TerrainError::InvalidMountain(format!("radius {radius} too large"));
        let footprint = radius.checked_mul(2).ok_or_else(too_large)?;
        let resolution = footprint
            .checked_next_power_of_two()
            .ok_or_else(too_large)?;

        let mut grid = Grid::new(resolution, params.floor_height)?;
        let engine = DiamondSquare::new(DiamondSquareParams {
            coarse_level: CoarseLevel::Seeded,
            ..params.clone()
        });
        engine.run(&mut grid, source)?;

        let offset = (resolution - footprint) as usize / 2;
        log::debug!("fractal mountain r={radius} on a {resolution} grid, offset {offset}");
        Ok(Self {
            radius,
            offset,
            grid,
        })
    }

    /// Base radius in cells.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length of the footprint in samples (`2r + 1`).
    pub fn footprint(&self) -> usize {
        self.radius as usize * 2 + 1
    }

    /// Height at footprint-local `(x, y)`, or `None` outside the footprint.
    pub fn height_at(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.footprint() || y >= self.footprint() {
            return None;
        }
        self.grid.get(x + self.offset, y + self.offset).ok()
    }

    fn inside_base(&self, x: usize, y: usize) -> bool {
        let r = self.radius as f32;
        det_distance(x as f32 - r, y as f32 - r) <= r
    }

    /// Send every footprint cell to `sink` at `(origin_x + x, origin_y + y)`.
    ///
    /// With `circular` set, cells outside the circular base are skipped.
    pub fn apply_heights(
        &self,
        origin_x: usize,
        origin_y: usize,
        circular: bool,
        sink: &mut impl HeightSink,
    ) {
        let size = self.footprint();
        for y in 0..size {
            for x in 0..size {
                if circular && !self.inside_base(x, y) {
                    continue;
                }
                if let Some(h) = self.height_at(x, y) {
                    sink.write(origin_x + x, origin_y + y, h);
                }
            }
        }
    }

    /// Stamp the peak into `target` with its footprint's top-left at the origin.
    ///
    /// Cells falling outside `target` are clipped. Returns the number written.
    pub fn stamp(
        &self,
        target: &mut Grid,
        origin_x: usize,
        origin_y: usize,
        blend: MountainBlend,
    ) -> Result<usize, TerrainError> {
        let mut pending = Vec::with_capacity(self.footprint() * self.footprint());
        self.apply_heights(origin_x, origin_y, true, &mut |x: usize, y: usize, h: f32| {
            if target.contains(x, y) {
                pending.push((x, y, h));
            }
        });
        for &(x, y, h) in &pending {
            let existing = target.get(x, y)?;
            target.set(x, y, blend.combine(h, existing))?;
        }
        Ok(pending.len())
    }
}

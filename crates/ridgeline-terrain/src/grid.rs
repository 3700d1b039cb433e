//! Fixed-size elevation grid with bounds-checked access.
//!
//! A [`Grid`] of resolution `W x H` stores `(W + 1) x (H + 1)` samples so that
//! repeated halving of a power-of-two step lands exactly on every sample.
//! Once synthesis finishes the grid is frozen into an immutable [`Heightmap`].

use crate::error::TerrainError;

/// Check that `resolution` is `2^k` for some `k >= 1`.
///
/// Returns the number of samples along one axis (`resolution + 1`). Called
/// before any allocation so an invalid request never produces a partial grid.
pub fn validate_resolution(resolution: u32) -> Result<usize, TerrainError> {
    if resolution < 2 || !resolution.is_power_of_two() {
        return Err(TerrainError::InvalidResolution(resolution));
    }
    Ok(resolution as usize + 1)
}

/// A mutable 2D array of elevation samples, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<f32>,
}

impl Grid {
    /// Create a square grid of `resolution + 1` samples per side, every cell set to `fill`.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidResolution`] if `resolution` is not a power of two >= 2.
    pub fn new(resolution: u32, fill: f32) -> Result<Self, TerrainError> {
        Self::with_resolutions(resolution, resolution, fill)
    }

    /// Create a rectangular grid with independent power-of-two resolutions per axis.
    pub fn with_resolutions(
        resolution_x: u32,
        resolution_y: u32,
        fill: f32,
    ) -> Result<Self, TerrainError> {
        let width = validate_resolution(resolution_x)?;
        let height = validate_resolution(resolution_y)?;
        Ok(Self {
            width,
            height,
            cells: vec![fill; width * height],
        })
    }

    /// Number of samples along the x axis (`W + 1`).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of samples along the y axis (`H + 1`).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Largest valid x index (`W`). For square grids this is the resolution.
    pub fn resolution(&self) -> usize {
        self.width - 1
    }

    /// Returns `true` if both axes share the same resolution.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Returns `true` if `(x, y)` addresses a sample.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Result<usize, TerrainError> {
        if self.contains(x, y) {
            Ok(y * self.width + x)
        } else {
            Err(TerrainError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Read the sample at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::OutOfBounds`] if the index is outside `[0, W] x [0, H]`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Result<f32, TerrainError> {
        let idx = self.index(x, y)?;
        Ok(self.cells[idx])
    }

    /// Overwrite the sample at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) -> Result<(), TerrainError> {
        let idx = self.index(x, y)?;
        self.cells[idx] = value;
        Ok(())
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: f32) {
        self.cells.fill(value);
    }

    /// The four diagonal neighbours at distance `distance`, in the order
    /// `(-d,-d)`, `(+d,-d)`, `(-d,+d)`, `(+d,+d)`.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::OutOfBounds`] if any corner falls outside the grid.
    pub fn diagonal_neighbors(
        &self,
        x: usize,
        y: usize,
        distance: usize,
    ) -> Result<[f32; 4], TerrainError> {
        let oob = || TerrainError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        };
        let left = x.checked_sub(distance).ok_or_else(oob)?;
        let top = y.checked_sub(distance).ok_or_else(oob)?;
        let right = x + distance;
        let bottom = y + distance;
        Ok([
            self.get(left, top)?,
            self.get(right, top)?,
            self.get(left, bottom)?,
            self.get(right, bottom)?,
        ])
    }

    /// The in-bounds axis neighbours at distance `distance` (left, right, up, down).
    ///
    /// Out-of-bounds neighbours are skipped rather than read as zero, so an
    /// edge sample yields three values and a corner two.
    pub fn axis_neighbors(
        &self,
        x: usize,
        y: usize,
        distance: usize,
    ) -> impl Iterator<Item = f32> + '_ {
        let candidates = [
            x.checked_sub(distance).map(|nx| (nx, y)),
            Some((x + distance, y)),
            y.checked_sub(distance).map(|ny| (x, ny)),
            Some((x, y + distance)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter_map(move |(nx, ny)| self.get(nx, ny).ok())
    }

    /// Iterate over every sample as `(x, y, value)`, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % width, i / width, v))
    }

    /// Raw samples in row-major order.
    pub fn values(&self) -> &[f32] {
        &self.cells
    }

    /// Apply `f(x, y, value)` to every sample, storing the result.
    pub fn map_in_place(&mut self, mut f: impl FnMut(usize, usize, f32) -> f32) {
        let width = self.width;
        for (i, cell) in self.cells.iter_mut().enumerate() {
            *cell = f(i % width, i / width, *cell);
        }
    }

    /// Freeze the grid into a read-only [`Heightmap`].
    pub fn into_heightmap(self) -> Heightmap {
        Heightmap { grid: self }
    }
}

/// An immutable heightmap handed to callers once synthesis has completed.
///
/// Callers can read samples but never observe or cause partial synthesis states.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    grid: Grid,
}

impl Heightmap {
    /// Number of samples along the x axis.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Number of samples along the y axis.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Read the sample at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<f32, TerrainError> {
        self.grid.get(x, y)
    }

    /// Iterate over every sample as `(x, y, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.grid.iter()
    }

    /// Raw samples in row-major order.
    pub fn values(&self) -> &[f32] {
        self.grid.values()
    }

    /// Borrow the underlying grid for read-only algorithms.
    pub fn as_grid(&self) -> &Grid {
        &self.grid
    }
}

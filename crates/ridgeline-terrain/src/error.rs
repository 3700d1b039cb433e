//! Terrain synthesis error types.

/// Errors raised while building or synthesizing a heightmap.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// A cell index fell outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Grid width in samples.
        width: usize,
        /// Grid height in samples.
        height: usize,
    },

    /// A resolution is not a power of two of at least 2, or the grid's axes disagree.
    #[error("unsupported resolution {0}: grids must be square with a power-of-two side >= 2")]
    InvalidResolution(u32),

    /// The clamp range is inverted or not finite.
    #[error("invalid height range [{min}, {max}]")]
    InvalidHeightRange {
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// Every cell holds the same value, so there is no range to rescale.
    #[error("cannot rescale a flat grid (every cell is {value})")]
    DegenerateRange {
        /// The single value held by every cell.
        value: f32,
    },

    /// A splat weight vector summed to zero or less.
    #[error("splat weights sum to zero")]
    DegenerateWeights,

    /// A mountain has an inverted or non-finite height pair.
    #[error("invalid mountain: {0}")]
    InvalidMountain(String),

    /// The splat policy references a layer the layer count cannot hold.
    #[error("splat policy needs {required} layers but only {available} are configured")]
    LayerCountMismatch {
        /// Number of layers the policy's roles require.
        required: usize,
        /// Configured layer count.
        available: usize,
    },
}

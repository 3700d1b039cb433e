//! Capabilities through which finished data is pushed to a host.
//!
//! The synthesis code never depends on a host terrain type; a host implements
//! these traits (or passes a closure) and receives one call per cell.

/// Receives final elevation values.
pub trait HeightSink {
    /// Store `height` at `(x, y)`.
    fn write(&mut self, x: usize, y: usize, height: f32);
}

impl<F> HeightSink for F
where
    F: FnMut(usize, usize, f32),
{
    fn write(&mut self, x: usize, y: usize, height: f32) {
        self(x, y, height)
    }
}

/// Receives per-texel texture weights.
pub trait SplatSink {
    /// Store the weight vector for texel `(x, y)`. `weights` sums to 1.
    fn write_weights(&mut self, x: usize, y: usize, weights: &[f32]);
}

impl<F> SplatSink for F
where
    F: FnMut(usize, usize, &[f32]),
{
    fn write_weights(&mut self, x: usize, y: usize, weights: &[f32]) {
        self(x, y, weights)
    }
}

//! Seeded randomness and deterministic math for terrain synthesis.
//!
//! All random draws flow through a single sequential [`DisplacementSource`] so
//! that a fixed seed reproduces the same heightmap on every platform.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Derive an independent sub-seed for a named stream of a run.
///
/// Uses SipHash (via std's `DefaultHasher`) so that, for example, the
/// fractal-mountain stream does not share draws with the main displacement.
pub fn derive_seed(seed: u64, stream: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    stream.hash(&mut hasher);
    hasher.finish()
}

/// Build the deterministic RNG used for a generation run.
pub fn terrain_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Supplies the random perturbation added to each displaced cell.
pub trait DisplacementSource {
    /// Draw a value uniformly from `[-magnitude, magnitude]`.
    fn displace(&mut self, magnitude: f32) -> f32;
}

/// Largest magnitude [`RngDisplacement`] draws with; larger requests are capped.
pub const MAX_MAGNITUDE: f32 = f32::MAX / 4.0;

/// Uniform displacement drawn from any [`Rng`].
#[derive(Clone, Debug)]
pub struct RngDisplacement<R: Rng> {
    rng: R,
}

impl<R: Rng> RngDisplacement<R> {
    /// Wrap an RNG as a displacement source.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngDisplacement<ChaCha8Rng> {
    /// Convenience constructor for a seeded ChaCha8 stream.
    pub fn seeded(seed: u64) -> Self {
        Self::new(terrain_rng(seed))
    }
}

impl<R: Rng> DisplacementSource for RngDisplacement<R> {
    fn displace(&mut self, magnitude: f32) -> f32 {
        let magnitude = magnitude.abs();
        if magnitude == 0.0 || !magnitude.is_finite() {
            return 0.0;
        }
        // The sampler scales the span `2 * magnitude` up slightly; it must stay finite.
        let magnitude = magnitude.min(MAX_MAGNITUDE);
        self.rng.random_range(-magnitude..=magnitude)
    }
}

/// A source that never perturbs. Makes every pass an exact average.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDisplacement;

impl DisplacementSource for NoDisplacement {
    fn displace(&mut self, _magnitude: f32) -> f32 {
        0.0
    }
}

/// Per-pass displacement decay factor `2^(-roughness)`, via `libm`.
#[inline]
pub fn decay_factor(roughness: f32) -> f32 {
    libm::powf(2.0, -roughness)
}

/// Deterministic 2D Euclidean distance using `libm`.
#[inline]
pub fn det_distance(dx: f32, dy: f32) -> f32 {
    libm::sqrtf(dx * dx + dy * dy)
}

//! Texture-layer weights derived from height and steepness.
//!
//! [`SplatPolicy`] is a small policy table: thresholds split the height range
//! into valley, mid-range and peak bands, and [`LayerRoles`] says which texture
//! layer each band writes into. [`SplatMap`] applies a policy over a grid.

use crate::error::TerrainError;
use crate::grid::Grid;
use crate::sink::SplatSink;
use crate::steepness::{SteepnessCurve, TerrainScale, steepness_degrees};

/// Layer indices written by each band of the policy.
///
/// Two roles may share an index; their weights then add up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerRoles {
    /// Constant-weight layer under mid-range terrain.
    pub base: usize,
    /// Mid-range layer fading as `1 - height^2`.
    pub grass: usize,
    /// Mid-range layer growing with height.
    pub dirt: usize,
    /// Only layer below the valley threshold.
    pub valley: usize,
    /// Peak layer weighted by `steepness * height`.
    pub cliff: usize,
    /// Peak layer weighted by `steepness`.
    pub snow: usize,
}

impl LayerRoles {
    fn max_index(&self) -> usize {
        [
            self.base,
            self.grass,
            self.dirt,
            self.valley,
            self.cliff,
            self.snow,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

impl Default for LayerRoles {
    fn default() -> Self {
        Self {
            base: 0,
            grass: 1,
            dirt: 2,
            valley: 3,
            cliff: 2,
            snow: 4,
        }
    }
}

/// Piecewise height/steepness policy for splat weights.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatPolicy {
    /// Layer names, one per texture layer, in layer order.
    pub layer_names: Vec<String>,
    /// Heights strictly below this route entirely to the valley layer.
    pub valley_threshold: f32,
    /// Heights strictly above this use the peak band.
    pub peak_threshold: f32,
    /// Weight of the base layer in the mid-range band.
    pub base_weight: f32,
    /// Which layer each band writes into.
    pub roles: LayerRoles,
}

impl Default for SplatPolicy {
    fn default() -> Self {
        Self {
            layer_names: ["base", "grass", "dirt", "valley", "snow"]
                .into_iter()
                .map(String::from)
                .collect(),
            valley_threshold: 0.09,
            peak_threshold: 0.8,
            base_weight: 0.1,
            roles: LayerRoles::default(),
        }
    }
}

impl SplatPolicy {
    /// Number of texture layers.
    pub fn layer_count(&self) -> usize {
        self.layer_names.len()
    }

    /// Check that every role points at an existing layer.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::LayerCountMismatch`] otherwise.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let required = self.roles.max_index() + 1;
        if required > self.layer_count() {
            return Err(TerrainError::LayerCountMismatch {
                required,
                available: self.layer_count(),
            });
        }
        Ok(())
    }

    /// Weights for one cell. Pure: reads nothing but its arguments.
    ///
    /// `height` and `steepness` are expected in `[0, 1]`. The result always sums
    /// to 1; an all-zero raw vector falls back to a uniform distribution.
    ///
    /// Every role must index an existing layer, which [`validate`](Self::validate)
    /// checks. Debug builds assert it; release builds drop weight aimed at a
    /// missing layer.
    pub fn weights(&self, height: f32, steepness: f32) -> SplatLayer {
        debug_assert!(
            self.validate().is_ok(),
            "splat roles index {} layers but only {} exist",
            self.roles.max_index() + 1,
            self.layer_count()
        );
        let mut raw = vec![0.0; self.layer_count()];
        let mut add = |layer: usize, w: f32| {
            if let Some(slot) = raw.get_mut(layer) {
                *slot += w;
            }
        };

        let roles = &self.roles;
        if height < self.valley_threshold {
            add(roles.valley, 1.0);
        } else if height > self.peak_threshold {
            add(roles.cliff, steepness * height);
            add(roles.snow, steepness);
        } else {
            add(roles.base, self.base_weight);
            add(roles.grass, 1.0 - height * height);
            add(roles.dirt, height);
        }

        SplatLayer::normalized(raw).unwrap_or_else(|_| {
            log::trace!("degenerate splat weights at h={height} s={steepness}, using uniform");
            SplatLayer::uniform(self.layer_count())
        })
    }

    /// Pair each weight of `layer` with its layer name.
    pub fn named<'a>(&'a self, layer: &'a SplatLayer) -> impl Iterator<Item = (&'a str, f32)> {
        self.layer_names
            .iter()
            .map(String::as_str)
            .zip(layer.weights().iter().copied())
    }
}

/// Per-cell texture weights: non-negative and summing to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatLayer {
    weights: Vec<f32>,
}

impl SplatLayer {
    /// Clamp negative entries to zero and divide by the sum.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::DegenerateWeights`] if the clamped sum is not positive.
    pub fn normalized(mut raw: Vec<f32>) -> Result<Self, TerrainError> {
        for w in raw.iter_mut() {
            *w = w.max(0.0);
        }
        let sum: f32 = raw.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Err(TerrainError::DegenerateWeights);
        }
        for w in raw.iter_mut() {
            *w /= sum;
        }
        Ok(Self { weights: raw })
    }

    /// Equal weight on every layer.
    pub fn uniform(layers: usize) -> Self {
        let w = if layers == 0 { 0.0 } else { 1.0 / layers as f32 };
        Self {
            weights: vec![w; layers],
        }
    }

    /// Weights in layer order.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns `true` if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Index of the heaviest layer. Ties resolve to the lowest index.
    pub fn dominant(&self) -> Option<usize> {
        dominant_index(&self.weights)
    }
}

fn dominant_index(weights: &[f32]) -> Option<usize> {
    weights
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &w)| match best {
            Some((_, bw)) if bw >= w => best,
            _ => Some((i, w)),
        })
        .map(|(i, _)| i)
}

/// How a splat map samples the heightmap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplatSampling {
    /// Splat map width in texels.
    pub width: usize,
    /// Splat map height in texels.
    pub height: usize,
    /// World scale used to measure slopes.
    pub scale: TerrainScale,
    /// Mapping from slope angle to `[0, 1]`.
    pub curve: SteepnessCurve,
}

impl SplatSampling {
    /// One texel per grid sample.
    pub fn matching(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            scale: TerrainScale::default(),
            curve: SteepnessCurve::default(),
        }
    }
}

/// Nearest grid sample for texel `texel` of `texels`, over `samples` grid samples.
fn nearest_sample(texel: usize, texels: usize, samples: usize) -> usize {
    if texels <= 1 {
        return 0;
    }
    let u = texel as f32 / (texels - 1) as f32;
    ((u * (samples - 1) as f32).round() as usize).min(samples - 1)
}

/// A texel grid of layer weight vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatMap {
    width: usize,
    height: usize,
    layers: usize,
    weights: Vec<f32>,
}

impl SplatMap {
    /// Derive weights for every texel from the nearest grid sample.
    ///
    /// Heights are clamped into `[0, 1]` before the policy sees them. The grid
    /// is only read.
    pub fn derive(
        grid: &Grid,
        policy: &SplatPolicy,
        sampling: &SplatSampling,
    ) -> Result<Self, TerrainError> {
        policy.validate()?;
        if sampling.width == 0 || sampling.height == 0 {
            return Err(TerrainError::InvalidResolution(0));
        }

        let layers = policy.layer_count();
        let mut weights = Vec::with_capacity(sampling.width * sampling.height * layers);
        for ty in 0..sampling.height {
            let gy = nearest_sample(ty, sampling.height, grid.height());
            for tx in 0..sampling.width {
                let gx = nearest_sample(tx, sampling.width, grid.width());
                let height = grid.get(gx, gy)?.clamp(0.0, 1.0);
                let degrees = steepness_degrees(grid, gx, gy, sampling.scale)?;
                let layer = policy.weights(height, sampling.curve.apply(degrees));
                weights.extend_from_slice(layer.weights());
            }
        }

        Ok(Self {
            width: sampling.width,
            height: sampling.height,
            layers,
            weights,
        })
    }

    /// Width in texels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of layers per texel.
    pub fn layer_count(&self) -> usize {
        self.layers
    }

    /// Weights at texel `(x, y)`, or `None` outside the map.
    pub fn get(&self, x: usize, y: usize) -> Option<&[f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.layers;
        Some(&self.weights[start..start + self.layers])
    }

    /// Index of the heaviest layer at `(x, y)`.
    pub fn dominant_layer(&self, x: usize, y: usize) -> Option<usize> {
        self.get(x, y).and_then(dominant_index)
    }

    /// Push every texel's weights into `sink`, row by row.
    pub fn apply(&self, sink: &mut impl SplatSink) {
        if self.layers == 0 {
            return;
        }
        for (i, texel) in self.weights.chunks_exact(self.layers).enumerate() {
            sink.write_weights(i % self.width, i / self.width, texel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_sums_to_one(layer: &SplatLayer) {
        assert!(
            (layer.sum() - 1.0).abs() < EPSILON,
            "weights {:?} sum to {}",
            layer.weights(),
            layer.sum()
        );
    }

    #[test]
    fn test_valley_routes_to_single_layer() {
        let policy = SplatPolicy::default();
        let layer = policy.weights(0.05, 0.7);
        assert_eq!(layer.weights(), &[0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_mid_range_blend() {
        let policy = SplatPolicy::default();
        let h = 0.5;
        let layer = policy.weights(h, 0.3);
        // raw: base 0.1, grass 0.75, dirt 0.5 -> sum 1.35
        let expected = [0.1 / 1.35, 0.75 / 1.35, 0.5 / 1.35, 0.0, 0.0];
        for (i, (&got, want)) in layer.weights().iter().zip(expected).enumerate() {
            assert!((got - want).abs() < EPSILON, "layer {i}: expected {want}, got {got}");
        }
        assert_sums_to_one(&layer);
    }

    #[test]
    fn test_peak_splits_between_cliff_and_snow() {
        let policy = SplatPolicy::default();
        let layer = policy.weights(0.9, 0.5);
        // raw: cliff 0.45, snow 0.5
        assert!((layer.weights()[2] - 0.45 / 0.95).abs() < EPSILON);
        assert!((layer.weights()[4] - 0.5 / 0.95).abs() < EPSILON);
        assert_eq!(layer.dominant(), Some(4));
    }

    #[test]
    fn test_flat_peak_falls_back_to_uniform() {
        let policy = SplatPolicy::default();
        let layer = policy.weights(0.95, 0.0);
        assert_eq!(layer, SplatLayer::uniform(5));
        assert_sums_to_one(&layer);
    }

    #[test]
    fn test_weights_always_sum_to_one() {
        let policy = SplatPolicy::default();
        for hi in 0..=20 {
            for si in 0..=10 {
                let layer = policy.weights(hi as f32 / 20.0, si as f32 / 10.0);
                assert_sums_to_one(&layer);
                assert!(layer.weights().iter().all(|&w| w >= 0.0));
            }
        }
    }

    #[test]
    fn test_negative_raw_weights_clamped() {
        let layer = SplatLayer::normalized(vec![-1.0, 2.0, 2.0]).unwrap();
        assert_eq!(layer.weights(), &[0.0, 0.5, 0.5]);
        assert_eq!(
            SplatLayer::normalized(vec![-1.0, 0.0]),
            Err(TerrainError::DegenerateWeights)
        );
    }

    #[test]
    fn test_policy_with_too_few_layers_rejected() {
        let policy = SplatPolicy {
            layer_names: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        };
        assert_eq!(
            policy.validate(),
            Err(TerrainError::LayerCountMismatch {
                required: 5,
                available: 3
            })
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "splat roles index 5 layers but only 3 exist")]
    fn test_weights_on_unvalidated_policy_asserts() {
        let policy = SplatPolicy {
            layer_names: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        };
        let _ = policy.weights(0.9, 0.5);
    }

    #[test]
    fn test_named_weights() {
        let policy = SplatPolicy::default();
        let layer = policy.weights(0.0, 0.0);
        let valley: Vec<_> = policy.named(&layer).filter(|(_, w)| *w > 0.0).collect();
        assert_eq!(valley, vec![("valley", 1.0)]);
    }

    #[test]
    fn test_splat_map_matches_policy_per_cell() {
        let mut grid = Grid::new(8, 0.0).unwrap();
        grid.map_in_place(|x, _, _| x as f32 / 8.0);
        let policy = SplatPolicy::default();
        let sampling = SplatSampling::matching(&grid);
        let map = SplatMap::derive(&grid, &policy, &sampling).unwrap();

        assert_eq!((map.width(), map.height(), map.layer_count()), (9, 9, 5));
        assert_eq!(map.dominant_layer(0, 4), Some(3), "x=0 is valley floor");

        let degrees = steepness_degrees(&grid, 4, 4, sampling.scale).unwrap();
        let expected = policy.weights(0.5, sampling.curve.apply(degrees));
        assert_eq!(map.get(4, 4), Some(expected.weights()));
        assert_eq!(map.get(9, 0), None);
    }

    #[test]
    fn test_splat_map_resamples_to_other_size() {
        let grid = Grid::new(16, 0.5).unwrap();
        let sampling = SplatSampling {
            width: 4,
            height: 6,
            ..SplatSampling::matching(&grid)
        };
        let map = SplatMap::derive(&grid, &SplatPolicy::default(), &sampling).unwrap();
        assert_eq!((map.width(), map.height()), (4, 6));

        let mut calls = 0;
        map.apply(&mut |_x: usize, _y: usize, w: &[f32]| {
            assert!((w.iter().sum::<f32>() - 1.0).abs() < EPSILON);
            calls += 1;
        });
        assert_eq!(calls, 24);
    }

    #[test]
    fn test_nearest_sample_endpoints() {
        assert_eq!(nearest_sample(0, 4, 17), 0);
        assert_eq!(nearest_sample(3, 4, 17), 16);
        assert_eq!(nearest_sample(0, 1, 17), 0);
    }
}

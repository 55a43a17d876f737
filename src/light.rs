//! The light contract: a light contributes zero or more samples toward a
//! shaded point, each a direction, a distance to test for occlusion, and a
//! contributed radiance.

use cgmath::{Point3, Vector3};

use crate::color::Rgb;

/// One sample drawn from a light toward a shaded point.
#[derive(Clone, Copy, Debug)]
pub struct LightSample {
    /// Unit direction from the shaded point toward the light sample.
    pub direction: Vector3<f64>,
    /// Distance to the sample, used as the shadow ray's `t_max`.
    pub distance: f64,
    /// Radiance contributed by this sample before occlusion test.
    pub radiance: Rgb,
}

/// A light source. Implementations must be safe to call concurrently from
/// multiple tile worker threads.
pub trait Light: Send + Sync {
    fn name(&self) -> &str;

    /// Number of samples [`Self::generate_samples`] will push for one
    /// shading point; callers reserve capacity with it.
    fn sample_count(&self) -> usize;

    /// Appends this light's samples toward `point` at `time` into `out`.
    fn generate_samples(&self, point: Point3<f64>, time: f64, out: &mut Vec<LightSample>);

    /// Precomputed per-scene-finalize setup (e.g. building an importance
    /// table). The default is a no-op; lights with nothing to precompute
    /// need not override it.
    fn preprocess(&self) {}
}

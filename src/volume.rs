//! The volume contract: a density field queried in object space by the
//! raymarcher inside a volume instance's interval.

use cgmath::Point3;

use crate::box3::Box3;

/// A voxel or procedural density field, queried in the volume's own object
/// space. Implementations must be safe to call concurrently from multiple
/// tile worker threads.
pub trait VolumeSource: Send + Sync {
    fn name(&self) -> &str;

    /// Object-space bounds of the field; points outside must return `0.0`
    /// density (the raymarcher relies on this to skip outside its
    /// instance's accelerator interval rather than as a hard invariant).
    fn bounds(&self) -> Box3;

    /// Density at an object-space point, `>= 0.0`.
    fn sample(&self, point: Point3<f64>, time: f64) -> f64;
}

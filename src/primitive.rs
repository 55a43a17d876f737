//! The primitive-set contract: the seam between accelerator code and
//! geometry code. Any payload that implements
//! [`PrimitiveSet`] is usable by [`crate::accel::grid::Grid`] and
//! [`crate::accel::bvh::Bvh`] without either accelerator knowing what kind
//! of geometry it holds.

use cgmath::{Point2, Point3, Vector3};

use crate::box3::Box3;
use crate::color::Rgb;
use crate::geometry::Ray;
use crate::instance::InstanceId;

/// A surface hit: everything downstream shading needs to know about the
/// point where a ray struck a primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub t_hit: f64,
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
    pub color: Rgb,
    pub uv: Point2<f64>,
    pub dpds: Vector3<f64>,
    pub dpdt: Vector3<f64>,
    /// The instance this intersection belongs to. Filled in by the layer
    /// that owns the instance (a primitive set does not know its own
    /// instance id); `InstanceId::NONE` until then.
    pub instance: InstanceId,
    pub primitive_id: usize,
}

impl Intersection {
    /// The "no hit yet" sentinel: `t_hit = +∞`.
    pub fn miss() -> Self {
        Self {
            t_hit: f64::INFINITY,
            point: Point3::new(0.0, 0.0, 0.0),
            normal: Vector3::new(0.0, 0.0, 1.0),
            color: Rgb::ONE,
            uv: Point2::new(0.0, 0.0),
            dpds: Vector3::new(0.0, 0.0, 0.0),
            dpdt: Vector3::new(0.0, 0.0, 0.0),
            instance: InstanceId::NONE,
            primitive_id: usize::MAX,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.t_hit.is_finite()
    }
}

/// A named, opaque collection of primitives exposing a four-function
/// contract. Implementations must be safe to query
/// (`primitive_intersect`, `primitive_bounds`) concurrently from multiple
/// threads; mutating the underlying geometry after `bounds()` has been
/// called is undefined behavior from the accelerator's point of view.
pub trait PrimitiveSet: Send + Sync {
    /// A short name for diagnostics/logging (e.g. `"triangle_mesh"`).
    fn name(&self) -> &str;

    /// Number of primitives in the set.
    fn count(&self) -> usize;

    /// Aggregate (unpadded) bounds over every primitive in the set.
    fn bounds(&self) -> Box3;

    /// Bounds of a single primitive; must contain every point the
    /// primitive may be hit at, for any `time`.
    fn primitive_bounds(&self, id: usize) -> Box3;

    /// Intersects a single primitive. Must return a miss
    /// (`Intersection::miss()`, i.e. `t_hit = +inf`) rather than a hit
    /// outside `ray.t_min..=ray.t_max`.
    fn primitive_intersect(&self, id: usize, time: f64, ray: &Ray) -> Intersection;
}

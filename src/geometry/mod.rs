//! Primitive geometry kernels: ray–triangle, ray–sphere, ray–cubic-Bézier,
//! and ray–AABB tests. These are pure functions operating on raw
//! geometric data; the accelerators and primitive sets in [`crate::accel`]
//! and [`crate::primitive`] are built on top of them but do not know which
//! kernel backs a given primitive.

pub mod bezier;
pub mod sphere;
pub mod triangle;

use cgmath::{Point3, Vector3};

/// A ray: origin, direction, and a valid parameter range `[t_min, t_max]`.
///
/// The direction is expected to be unit length by the time a ray enters a
/// geometry kernel or accelerator, but is not required to be unit length
/// when first constructed from a camera or before an instance transform is
/// applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub dir: Vector3<f64>,
    pub t_min: f64,
    pub t_max: f64,
}

impl Ray {
    pub fn new(origin: Point3<f64>, dir: Vector3<f64>) -> Self {
        Self {
            origin,
            dir,
            t_min: 0.0,
            t_max: f64::INFINITY,
        }
    }

    pub fn with_range(origin: Point3<f64>, dir: Vector3<f64>, t_min: f64, t_max: f64) -> Self {
        Self {
            origin,
            dir,
            t_min,
            t_max,
        }
    }

    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.dir * t
    }

    #[inline]
    pub fn in_range(&self, t: f64) -> bool {
        t >= self.t_min && t <= self.t_max
    }

    /// `t_max` rescaled by `scale`, preserving `+inf`. Used when re-deriving
    /// a ray's range in a frame where its direction has been rescaled.
    #[inline]
    pub(crate) fn t_max_scaled(&self, scale: f64) -> f64 {
        if self.t_max.is_finite() {
            self.t_max * scale
        } else {
            self.t_max
        }
    }

    /// Returns a copy of this ray with a unit-length direction (and `t_min`,
    /// `t_max` rescaled so the same world-space points are still reachable).
    pub fn normalized(&self) -> Self {
        use cgmath::InnerSpace as _;
        let len = self.dir.magnitude();
        if len == 0.0 || !len.is_finite() {
            return *self;
        }
        Self {
            origin: self.origin,
            dir: self.dir / len,
            t_min: self.t_min * len,
            t_max: if self.t_max.is_finite() {
                self.t_max * len
            } else {
                self.t_max
            },
        }
    }
}

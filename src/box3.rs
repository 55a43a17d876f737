//! Axis-aligned bounding boxes and the ray–box slab test.
//!
//! After any `add_point`/`add_box`, `min <= max` component-wise. Rays test
//! against boxes expanded by a fixed padding `eps = 1e-4` to guard against
//! floating-point misses at shared edges.

use cgmath::{Point3, Vector3};

use crate::geometry::Ray;

/// Padding applied to accelerator bounds before ray tests.
pub const BOUNDS_EPSILON: f64 = 1e-4;

/// An axis-aligned bounding box. `min` and `max` are kept component-wise
/// ordered by construction; an empty box (no points added yet) is
/// represented by `min > max` and must not be queried directly — callers
/// build boxes via [`Box3::empty`] followed by `add_point`/`add_box`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Box3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Box3 {
    /// An inverted box that contains no points; the identity value for
    /// `add_point`/`add_box` accumulation.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y && min.z <= max.z);
        Self { min, max }
    }

    pub fn from_point(p: Point3<f64>) -> Self {
        Self { min: p, max: p }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn add_point(&mut self, p: Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    #[inline]
    pub fn add_box(&mut self, other: Box3) {
        if other.is_empty() {
            return;
        }
        self.add_point(other.min);
        self.add_point(other.max);
    }

    pub fn union(a: Box3, b: Box3) -> Box3 {
        let mut r = a;
        r.add_box(b);
        r
    }

    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
            0.5 * (self.min.z + self.max.z),
        )
    }

    #[inline]
    pub fn widths(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns a copy of this box expanded outward by `eps` on every side.
    #[inline]
    pub fn padded(&self, eps: f64) -> Box3 {
        let e = Vector3::new(eps, eps, eps);
        Box3::new(self.min - e, self.max + e)
    }

    /// Index of the axis (0=x, 1=y, 2=z) along which this box is longest.
    #[inline]
    pub fn longest_axis(&self) -> usize {
        let w = self.widths();
        if w.x >= w.y && w.x >= w.z {
            0
        } else if w.y >= w.z {
            1
        } else {
            2
        }
    }

    #[inline]
    pub fn contains_point(&self, p: Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Ray–box slab test. Returns the hit interval `[t_min, t_max]` if the
    /// ray (restricted to `ray.t_min..=ray.t_max`) intersects this box, else
    /// `None`. Handles rays parallel to a slab (zero direction component)
    /// without dividing by zero: such a ray either always or never crosses
    /// that slab, decided by whether the origin lies within it.
    #[inline]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f64, f64)> {
        let mut t_min = ray.t_min;
        let mut t_max = ray.t_max;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.dir[axis];
            let lo = self.min[axis];
            let hi = self.max[axis];

            if dir == 0.0 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv_d = 1.0 / dir;
            let mut t0 = (lo - origin) * inv_d;
            let mut t1 = (hi - origin) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn add_point_keeps_min_le_max() {
        let mut b = Box3::empty();
        b.add_point(Point3::new(1.0, -2.0, 3.0));
        b.add_point(Point3::new(-1.0, 5.0, 0.0));
        assert!(b.min.x <= b.max.x && b.min.y <= b.max.y && b.min.z <= b.max.z);
        assert_eq!(b.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Point3::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn ray_parallel_to_slab_handled() {
        let b = Box3::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray {
            origin: Point3::new(0.0, 0.0, -5.0),
            dir: Vector3::new(0.0, 0.0, 1.0),
            t_min: 0.0,
            t_max: f64::INFINITY,
        };
        let hit = b.intersect_ray(&ray);
        assert!(hit.is_some());
        let (t0, t1) = hit.unwrap();
        assert!(t0.is_finite() && t1.is_finite());
    }

    #[test]
    fn ray_missing_box_in_parallel_slab() {
        let b = Box3::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray {
            origin: Point3::new(5.0, 0.0, -5.0),
            dir: Vector3::new(0.0, 0.0, 1.0),
            t_min: 0.0,
            t_max: f64::INFINITY,
        };
        assert!(b.intersect_ray(&ray).is_none());
    }

    #[test]
    fn padding_covers_floating_point_edge_misses() {
        let b = Box3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)).padded(BOUNDS_EPSILON);
        assert!(b.min.x < 0.0 && b.max.x > 1.0);
    }
}

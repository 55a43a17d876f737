//! Ray–sphere intersection, used by the point-cloud primitive set.

use cgmath::{InnerSpace as _, Point3};

use super::Ray;

/// Result of a successful ray–sphere hit: parameter `t` and the unit
/// outward normal at the hit point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereHit {
    pub t: f64,
}

/// Standard quadratic ray–sphere test. Chooses the smallest root greater
/// than `ray.t_min`; returns `None` if both roots are `<= ray.t_min` or the
/// ray misses the sphere entirely.
pub fn intersect(ray: &Ray, center: Point3<f64>, radius: f64) -> Option<SphereHit> {
    let oc = ray.origin - center;
    let a = ray.dir.dot(ray.dir);
    let b = 2.0 * oc.dot(ray.dir);
    let c = oc.dot(oc) - radius * radius;

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = (-b - sqrt_disc) / (2.0 * a);
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    let (t_near, t_far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

    let t = if t_near > ray.t_min {
        t_near
    } else if t_far > ray.t_min {
        t_far
    } else {
        return None;
    };

    if !ray.in_range(t) {
        return None;
    }
    Some(SphereHit { t })
}

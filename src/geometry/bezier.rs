//! Ray–cubic-Bézier intersection (Nakamaru–Ono).
//!
//! The control points are transformed into a ray-aligned frame (ray origin
//! at the local origin, ray direction along local `+z`), recursively
//! subdivided by de Casteljau to a depth derived from the curve's flatness,
//! and at leaf level tested as a line segment against a cylindrical width
//! envelope around the local `z` axis.

use cgmath::{InnerSpace as _, Point3, Vector3};

use super::Ray;

/// Result of a successful ray–curve hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierHit {
    pub t: f64,
    /// Parameter along the curve, `0..=1`.
    pub v: f64,
}

/// Builds an orthonormal basis `(x, y, z)` with `z` parallel to `dir`
/// (which need not be unit length; the basis vectors returned are unit).
fn ray_basis(dir: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let z = dir.normalize();
    // Pick whichever world axis is least parallel to z to avoid a
    // degenerate cross product.
    let helper = if z.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    let x = helper.cross(z).normalize();
    let y = z.cross(x);
    (x, y, z)
}

/// Flatness bound via the maximum second difference of the control
/// polygon, converted to a subdivision depth and clamped to `[1, 5]`.
fn recursion_depth(cp: &[Vector3<f64>; 4]) -> u32 {
    let d0 = cp[0] - cp[1] * 2.0 + cp[2];
    let d1 = cp[1] - cp[2] * 2.0 + cp[3];
    let l0 = d0.x.abs().max(d0.y.abs()).max(d1.x.abs()).max(d1.y.abs());
    if l0 <= 1e-12 {
        return 1;
    }
    // Depth at which linear interpolation error falls below a small
    // fraction of the flatness bound: each subdivision level quarters it.
    let depth = (l0 / 1e-3).log(4.0).ceil().max(1.0) as u32;
    depth.clamp(1, 5)
}

fn de_casteljau_split(cp: [Vector3<f64>; 4]) -> ([Vector3<f64>; 4], [Vector3<f64>; 4]) {
    let p01 = (cp[0] + cp[1]) * 0.5;
    let p12 = (cp[1] + cp[2]) * 0.5;
    let p23 = (cp[2] + cp[3]) * 0.5;
    let p012 = (p01 + p12) * 0.5;
    let p123 = (p12 + p23) * 0.5;
    let p0123 = (p012 + p123) * 0.5;
    ([cp[0], p01, p012, p0123], [p0123, p123, p23, cp[3]])
}

/// Closest point on segment `a..b` to the origin, in the xy plane;
/// returns the parametric position `s` in `[0, 1]` along the segment.
fn closest_s_to_origin_xy(a: Vector3<f64>, b: Vector3<f64>) -> f64 {
    let d = Vector3::new(b.x - a.x, b.y - a.y, 0.0);
    let len2 = d.x * d.x + d.y * d.y;
    if len2 <= 1e-18 {
        return 0.0;
    }
    let s = -(a.x * d.x + a.y * d.y) / len2;
    s.clamp(0.0, 1.0)
}

fn leaf_test(
    cp: [Vector3<f64>; 4],
    width_lo: f64,
    width_hi: f64,
    v_lo: f64,
    v_hi: f64,
    ray_t_min: f64,
    ray_t_max: f64,
) -> Option<BezierHit> {
    let a = cp[0];
    let b = cp[3];
    let s = closest_s_to_origin_xy(a, b);
    let closest = a + (b - a) * s;
    let dist = (closest.x * closest.x + closest.y * closest.y).sqrt();
    let width = width_lo + (width_hi - width_lo) * s;
    if dist > width * 0.5 {
        return None;
    }
    let t = closest.z;
    if t < ray_t_min || t > ray_t_max {
        return None;
    }
    let v = v_lo + (v_hi - v_lo) * s;
    Some(BezierHit { t, v })
}

fn subdivide_and_test(
    cp: [Vector3<f64>; 4],
    width_lo: f64,
    width_hi: f64,
    v_lo: f64,
    v_hi: f64,
    depth: u32,
    ray: &Ray,
    best: &mut Option<BezierHit>,
) {
    if depth == 0 {
        if let Some(hit) = leaf_test(cp, width_lo, width_hi, v_lo, v_hi, ray.t_min, ray.t_max) {
            if best.map_or(true, |b| hit.t < b.t) {
                *best = Some(hit);
            }
        }
        return;
    }
    let (left, right) = de_casteljau_split(cp);
    let v_mid = 0.5 * (v_lo + v_hi);
    let width_mid = 0.5 * (width_lo + width_hi);
    subdivide_and_test(left, width_lo, width_mid, v_lo, v_mid, depth - 1, ray, best);
    subdivide_and_test(right, width_mid, width_hi, v_mid, v_hi, depth - 1, ray, best);
}

/// Tests a single cubic Bézier segment (4 control points, width at each
/// control point) against `ray`. `widths` gives the curve's radius at
/// parameters `0, 1/3, 2/3, 1`; only the endpoints are used as a linear
/// width envelope per subdivision level.
pub fn intersect(ray: &Ray, control: [Point3<f64>; 4], widths: [f64; 4]) -> Option<BezierHit> {
    let (bx, by, bz) = ray_basis(ray.dir);
    let dir_len = ray.dir.magnitude();
    if dir_len == 0.0 {
        return None;
    }
    let to_local = |p: Point3<f64>| -> Vector3<f64> {
        let rel = p - ray.origin;
        Vector3::new(rel.dot(bx), rel.dot(by), rel.dot(bz))
    };
    let local: [Vector3<f64>; 4] = [
        to_local(control[0]),
        to_local(control[1]),
        to_local(control[2]),
        to_local(control[3]),
    ];

    let depth = recursion_depth(&local);
    let mut best = None;
    subdivide_and_test(
        local,
        widths[0],
        widths[3],
        0.0,
        1.0,
        depth,
        &Ray::with_range(ray.origin, ray.dir, ray.t_min * dir_len, ray.t_max_scaled(dir_len)),
        &mut best,
    );
    // `subdivide_and_test` worked in a frame where `dir` has length
    // `dir_len`, so the accepted `t` is already scaled to that frame; undo
    // the scale to report `t` in terms of the caller's (possibly
    // non-unit) `ray.dir`.
    best.map(|hit| BezierHit {
        t: hit.t / dir_len,
        v: hit.v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_curve_hits_like_a_line() {
        // A degenerate (straight) cubic lying along x in the z=0 plane.
        let control = [
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-0.33, 0.0, 0.0),
            Point3::new(0.33, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let widths = [0.1, 0.1, 0.1, 0.1];
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = intersect(&ray, control, widths).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-6);
        assert!((hit.v - 0.5).abs() < 0.05);
    }

    #[test]
    fn misses_when_ray_far_from_curve() {
        let control = [
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-0.33, 0.0, 0.0),
            Point3::new(0.33, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let widths = [0.1, 0.1, 0.1, 0.1];
        let ray = Ray::new(Point3::new(0.0, 10.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(intersect(&ray, control, widths).is_none());
    }

    #[test]
    fn depth_is_clamped_to_one_through_five() {
        let flat = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(3.0, 0.0, 0.0),
        ];
        assert_eq!(recursion_depth(&flat), 1);

        let jagged = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1000.0, 0.0),
            Vector3::new(0.0, -1000.0, 0.0),
            Vector3::new(0.0, 1000.0, 0.0),
        ];
        assert_eq!(recursion_depth(&jagged), 5);
    }
}

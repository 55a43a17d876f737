//! Ray–triangle intersection (Möller–Trumbore).

use cgmath::{InnerSpace as _, Point3};

use super::Ray;

/// Determinant epsilon below which a ray is considered parallel to (or
/// nearly parallel to) the triangle's plane.
pub const DETERMINANT_EPSILON: f64 = 1e-6;

/// Result of a successful ray–triangle hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleHit {
    pub t: f64,
    /// Barycentric coordinate associated with vertex `b` (often called `u`).
    pub u: f64,
    /// Barycentric coordinate associated with vertex `c` (often called `v`).
    pub v: f64,
}

/// Whether back-facing triangles (normal pointing away from the ray) are
/// culled or reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Culling {
    None,
    BackFace,
}

/// Möller–Trumbore ray–triangle test.
///
/// `a`, `b`, `c` are the triangle vertices in order; the returned
/// barycentric weight of `a` is `1 - u - v`.
pub fn intersect(
    ray: &Ray,
    a: Point3<f64>,
    b: Point3<f64>,
    c: Point3<f64>,
    culling: Culling,
) -> Option<TriangleHit> {
    let edge1 = b - a;
    let edge2 = c - a;
    let pvec = ray.dir.cross(edge2);
    let det = edge1.dot(pvec);

    if culling == Culling::BackFace && det < DETERMINANT_EPSILON {
        return None;
    }
    if det.abs() < DETERMINANT_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if !ray.in_range(t) {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn unit_triangle() -> (Point3<f64>, Point3<f64>, Point3<f64>) {
        (
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn center_hit_has_expected_barycentrics() {
        let (a, b, c) = unit_triangle();
        let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = intersect(&ray, a, b, c, Culling::None).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-9);
        assert!((hit.u - 0.2).abs() < 1e-9);
        assert!((hit.v - 0.2).abs() < 1e-9);
    }

    #[test]
    fn miss_outside_triangle() {
        let (a, b, c) = unit_triangle();
        let ray = Ray::new(Point3::new(2.0, 2.0, -1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(intersect(&ray, a, b, c, Culling::None).is_none());
    }

    #[test]
    fn t_outside_ray_range_is_rejected() {
        let (a, b, c) = unit_triangle();
        let ray = Ray::with_range(Point3::new(0.2, 0.2, -1.0), Vector3::new(0.0, 0.0, 1.0), 0.0, 0.5);
        assert!(intersect(&ray, a, b, c, Culling::None).is_none());
    }

    #[test]
    fn shared_edge_hits_exactly_one_of_two_coplanar_triangles() {
        // Two coplanar triangles sharing the edge from (1,0,0) to (0,1,0),
        // covering the unit square split along its diagonal.
        let a1 = Point3::new(0.0, 0.0, 0.0);
        let b1 = Point3::new(1.0, 0.0, 0.0);
        let c1 = Point3::new(0.0, 1.0, 0.0);

        let a2 = Point3::new(1.0, 1.0, 0.0);
        let b2 = Point3::new(0.0, 1.0, 0.0);
        let c2 = Point3::new(1.0, 0.0, 0.0);

        // Ray aimed at the edge midpoint (0.5, 0.5, 0).
        let ray = Ray::new(Point3::new(0.5, 0.5, -1.0), Vector3::new(0.0, 0.0, 1.0));
        let hit1 = intersect(&ray, a1, b1, c1, Culling::None);
        let hit2 = intersect(&ray, a2, b2, c2, Culling::None);
        assert!(hit1.is_some() ^ hit2.is_some());
        let t = hit1.or(hit2).unwrap().t;
        assert!((t - 1.0).abs() < 1e-6);
    }
}

//! A reference [`PrimitiveSet`] of indexed triangles.

use cgmath::{InnerSpace as _, Point2, Point3};

use crate::box3::Box3;
use crate::color::Rgb;
use crate::geometry::triangle::{self, Culling};
use crate::geometry::Ray;
use crate::primitive::{Intersection, PrimitiveSet};

pub struct TriangleMeshSet {
    vertices: Vec<Point3<f64>>,
    /// Three vertex indices per triangle.
    indices: Vec<[u32; 3]>,
    uvs: Vec<Point2<f64>>,
}

impl TriangleMeshSet {
    pub fn new(vertices: Vec<Point3<f64>>, indices: Vec<[u32; 3]>, uvs: Vec<Point2<f64>>) -> Self {
        assert_eq!(vertices.len(), uvs.len());
        Self {
            vertices,
            indices,
            uvs,
        }
    }

    fn corners(&self, id: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.indices[id];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }
}

impl PrimitiveSet for TriangleMeshSet {
    fn name(&self) -> &str {
        "triangle_mesh"
    }

    fn count(&self) -> usize {
        self.indices.len()
    }

    fn bounds(&self) -> Box3 {
        let mut b = Box3::empty();
        for &p in &self.vertices {
            b.add_point(p);
        }
        b
    }

    fn primitive_bounds(&self, id: usize) -> Box3 {
        let [a, b, c] = self.corners(id);
        let mut bb = Box3::from_point(a);
        bb.add_point(b);
        bb.add_point(c);
        bb
    }

    fn primitive_intersect(&self, id: usize, _time: f64, ray: &Ray) -> Intersection {
        let [a, b, c] = self.corners(id);
        match triangle::intersect(ray, a, b, c, Culling::None) {
            None => Intersection::miss(),
            Some(hit) => {
                let w = 1.0 - hit.u - hit.v;
                let [ia, ib, ic] = self.indices[id];
                let uv_a = self.uvs[ia as usize];
                let uv_b = self.uvs[ib as usize];
                let uv_c = self.uvs[ic as usize];
                let uv = Point2::new(
                    w * uv_a.x + hit.u * uv_b.x + hit.v * uv_c.x,
                    w * uv_a.y + hit.u * uv_b.y + hit.v * uv_c.y,
                );
                let edge1 = b - a;
                let edge2 = c - a;
                let normal = edge1.cross(edge2).normalize();
                Intersection {
                    t_hit: hit.t,
                    point: ray.at(hit.t),
                    normal,
                    color: Rgb::ONE,
                    uv,
                    dpds: edge1,
                    dpdt: edge2,
                    instance: crate::instance::InstanceId::NONE,
                    primitive_id: id,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn single_triangle_hit_interpolates_uv() {
        let mesh = TriangleMeshSet::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
        );
        let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = mesh.primitive_intersect(0, 0.0, &ray);
        assert!(hit.is_hit());
        assert!((hit.uv.x - 0.2).abs() < 1e-9);
        assert!((hit.uv.y - 0.2).abs() < 1e-9);
    }
}

//! A reference [`PrimitiveSet`] of independent spheres: used by the
//! accelerator tests and as the simplest end-to-end geometry for scene
//! tests.

use cgmath::{Point2, Point3, Vector3};

use crate::box3::Box3;
use crate::color::Rgb;
use crate::geometry::sphere;
use crate::geometry::Ray;
use crate::primitive::{Intersection, PrimitiveSet};

pub struct SphereSet {
    centers: Vec<Point3<f64>>,
    radii: Vec<f64>,
}

impl SphereSet {
    pub fn new(centers: Vec<Point3<f64>>, radii: Vec<f64>) -> Self {
        assert_eq!(centers.len(), radii.len());
        Self { centers, radii }
    }
}

impl PrimitiveSet for SphereSet {
    fn name(&self) -> &str {
        "sphere_set"
    }

    fn count(&self) -> usize {
        self.centers.len()
    }

    fn bounds(&self) -> Box3 {
        let mut b = Box3::empty();
        for i in 0..self.count() {
            b.add_box(self.primitive_bounds(i));
        }
        b
    }

    fn primitive_bounds(&self, id: usize) -> Box3 {
        let c = self.centers[id];
        let r = self.radii[id];
        Box3::new(
            Point3::new(c.x - r, c.y - r, c.z - r),
            Point3::new(c.x + r, c.y + r, c.z + r),
        )
    }

    fn primitive_intersect(&self, id: usize, _time: f64, ray: &Ray) -> Intersection {
        let center = self.centers[id];
        let radius = self.radii[id];
        match sphere::intersect(ray, center, radius) {
            None => Intersection::miss(),
            Some(hit) => {
                let point = ray.at(hit.t);
                let normal = (point - center) / radius;
                let theta = (normal.z).acos();
                let phi = normal.y.atan2(normal.x);
                Intersection {
                    t_hit: hit.t,
                    point,
                    normal,
                    color: Rgb::ONE,
                    uv: Point2::new(
                        phi / (2.0 * std::f64::consts::PI) + 0.5,
                        theta / std::f64::consts::PI,
                    ),
                    dpds: Vector3::new(-normal.y, normal.x, 0.0),
                    dpdt: Vector3::new(0.0, 0.0, 1.0).cross(normal),
                    instance: crate::instance::InstanceId::NONE,
                    primitive_id: id,
                }
            }
        }
    }
}

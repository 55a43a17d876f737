use std::sync::Arc;

use cgmath::{Point3, Vector3};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use distrace::accel::bvh::Bvh;
use distrace::geometry::Ray;
use distrace::primitive::PrimitiveSet;
use distrace::primitives::sphere_set::SphereSet;

fn random_spheres(n: usize) -> Arc<dyn PrimitiveSet> {
    let mut centers = Vec::with_capacity(n);
    let mut radii = Vec::with_capacity(n);
    // Deterministic, dependency-free jitter: a bench fixture doesn't need
    // a real RNG, just spread-out positions.
    for i in 0..n {
        let f = i as f64;
        centers.push(Point3::new(
            (f * 12.9898).sin() * 100.0,
            (f * 78.233).sin() * 100.0,
            (f * 37.719).sin() * 100.0,
        ));
        radii.push(0.5);
    }
    Arc::new(SphereSet::new(centers, radii))
}

fn bvh_build(c: &mut Criterion) {
    let spheres = random_spheres(20_000);
    c.bench_function("bvh_build_20k_spheres", |b| {
        b.iter(|| Bvh::new(black_box(spheres.clone())))
    });
}

fn bvh_intersect(c: &mut Criterion) {
    let spheres = random_spheres(20_000);
    let bvh = Bvh::new(spheres);
    let ray = Ray::new(Point3::new(0.0, 0.0, -500.0), Vector3::new(0.0, 0.0, 1.0));
    c.bench_function("bvh_intersect_20k_spheres", |b| {
        b.iter(|| black_box(bvh.intersect(0.0, black_box(&ray))))
    });
}

criterion_group!(benches, bvh_build, bvh_intersect);
criterion_main!(benches);

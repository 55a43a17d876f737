//! The 3-D DDA grid accelerator: a uniform grid of
//! cells over a primitive set, each cell holding the indices of primitives
//! whose bounds overlap it. Traversal walks the grid along the ray with a
//! 3-D digital differential analyzer, visiting cells in strict distance
//! order and stopping at the first cell whose best possible hit can't beat
//! an already-found one.

use std::sync::Arc;

use crate::box3::{Box3, BOUNDS_EPSILON};
use crate::geometry::Ray;
use crate::primitive::{Intersection, PrimitiveSet};

/// Target average primitive count per occupied cell; the grid resolution
/// is chosen so `cell_count * target_density ~= primitive_count`.
const TARGET_DENSITY: f64 = 2.0;
const MAX_CELLS_PER_AXIS: usize = 128;

pub struct Grid {
    primitives: Arc<dyn PrimitiveSet>,
    bounds: Box3,
    dims: [usize; 3],
    cell_size: Vector3f,
    cells: Vec<Vec<usize>>,
}

#[derive(Clone, Copy)]
struct Vector3f {
    x: f64,
    y: f64,
    z: f64,
}

impl Grid {
    pub fn build(primitives: Arc<dyn PrimitiveSet>) -> Self {
        let bounds = primitives.bounds().padded(BOUNDS_EPSILON);
        let n = primitives.count().max(1);
        let widths = bounds.widths();
        let volume = (widths.x * widths.y * widths.z).max(1e-12);
        let cells_wanted = (n as f64 / TARGET_DENSITY).max(1.0);
        let cell_volume = volume / cells_wanted;
        let cell_edge = cell_volume.cbrt().max(1e-6);

        let dims = [
            ((widths.x / cell_edge).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS),
            ((widths.y / cell_edge).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS),
            ((widths.z / cell_edge).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS),
        ];
        let cell_size = Vector3f {
            x: widths.x / dims[0] as f64,
            y: widths.y / dims[1] as f64,
            z: widths.z / dims[2] as f64,
        };

        let mut cells = vec![Vec::new(); dims[0] * dims[1] * dims[2]];
        for id in 0..primitives.count() {
            let b = primitives.primitive_bounds(id);
            let (lo, hi) = cell_range(&bounds, &cell_size, dims, b);
            for cz in lo[2]..=hi[2] {
                for cy in lo[1]..=hi[1] {
                    for cx in lo[0]..=hi[0] {
                        cells[cell_index(dims, cx, cy, cz)].push(id);
                    }
                }
            }
        }

        Self {
            primitives,
            bounds,
            dims,
            cell_size,
            cells,
        }
    }

    pub fn bounds(&self) -> Box3 {
        self.bounds
    }

    /// Nearest-hit traversal via 3-D DDA: walks cells in ray order, testing
    /// every primitive referenced by a cell, and stops once a hit has been
    /// found that lies before the next cell boundary.
    pub fn intersect(&self, time: f64, ray: &Ray) -> Intersection {
        let Some((t_enter, t_exit)) = self.bounds.intersect_ray(ray) else {
            return Intersection::miss();
        };
        let t_enter = t_enter.max(ray.t_min);
        let t_exit = t_exit.min(ray.t_max);
        if t_enter > t_exit {
            return Intersection::miss();
        }

        let entry = ray.at(t_enter);
        let mut cell = [
            cell_coord(entry.x, self.bounds.min.x, self.cell_size.x, self.dims[0]),
            cell_coord(entry.y, self.bounds.min.y, self.cell_size.y, self.dims[1]),
            cell_coord(entry.z, self.bounds.min.z, self.cell_size.z, self.dims[2]),
        ];

        let step = [
            ray.dir.x.signum() as i64,
            ray.dir.y.signum() as i64,
            ray.dir.z.signum() as i64,
        ];
        let cell_size = [self.cell_size.x, self.cell_size.y, self.cell_size.z];
        let origin = [self.bounds.min.x, self.bounds.min.y, self.bounds.min.z];
        let dir = [ray.dir.x, ray.dir.y, ray.dir.z];

        let mut t_next = [0.0f64; 3];
        let mut t_delta = [f64::INFINITY; 3];
        for axis in 0..3 {
            if dir[axis].abs() < 1e-12 {
                continue;
            }
            let next_boundary_idx = if step[axis] > 0 {
                cell[axis] as i64 + 1
            } else {
                cell[axis] as i64
            };
            let boundary = origin[axis] + next_boundary_idx as f64 * cell_size[axis];
            t_next[axis] = (boundary - ray.origin[axis]) / dir[axis];
            t_delta[axis] = (cell_size[axis] / dir[axis]).abs();
        }

        let mut best = Intersection::miss();
        let mut best_id = usize::MAX;
        let mut t_cell_exit = t_enter;

        loop {
            if !in_bounds(cell, self.dims) {
                break;
            }
            let next_axis = (0..3)
                .min_by(|&a, &b| t_next[a].partial_cmp(&t_next[b]).unwrap())
                .unwrap();
            t_cell_exit = t_next[next_axis].min(t_exit);

            let idx = cell_index(self.dims, cell[0], cell[1], cell[2]);
            for &id in &self.cells[idx] {
                let hit = self.primitives.primitive_intersect(id, time, ray);
                if hit.is_hit() && ray.in_range(hit.t_hit) {
                    let better = hit.t_hit < best.t_hit
                        || ((hit.t_hit - best.t_hit).abs() <= 1e-6 && id < best_id);
                    if better {
                        best = hit;
                        best_id = id;
                    }
                }
            }
            if best.is_hit() && best.t_hit <= t_cell_exit {
                break;
            }
            if t_next[next_axis] > t_exit {
                break;
            }

            cell[next_axis] = (cell[next_axis] as i64 + step[next_axis]) as usize;
            t_next[next_axis] += t_delta[next_axis];
        }
        let _ = t_cell_exit;

        best
    }
}

fn cell_coord(p: f64, origin: f64, cell_size: f64, dim: usize) -> usize {
    (((p - origin) / cell_size) as i64).clamp(0, dim as i64 - 1) as usize
}

fn in_bounds(cell: [usize; 3], dims: [usize; 3]) -> bool {
    cell[0] < dims[0] && cell[1] < dims[1] && cell[2] < dims[2]
}

fn cell_index(dims: [usize; 3], x: usize, y: usize, z: usize) -> usize {
    (z * dims[1] + y) * dims[0] + x
}

fn cell_range(
    grid_bounds: &Box3,
    cell_size: &Vector3f,
    dims: [usize; 3],
    item: Box3,
) -> ([usize; 3], [usize; 3]) {
    let lo = [
        cell_coord(item.min.x, grid_bounds.min.x, cell_size.x, dims[0]),
        cell_coord(item.min.y, grid_bounds.min.y, cell_size.y, dims[1]),
        cell_coord(item.min.z, grid_bounds.min.z, cell_size.z, dims[2]),
    ];
    let hi = [
        cell_coord(item.max.x, grid_bounds.min.x, cell_size.x, dims[0]),
        cell_coord(item.max.y, grid_bounds.min.y, cell_size.y, dims[1]),
        cell_coord(item.max.z, grid_bounds.min.z, cell_size.z, dims[2]),
    ];
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::sphere_set::SphereSet;
    use cgmath::{Point3, Vector3};

    #[test]
    fn grid_finds_a_single_sphere() {
        let set = Arc::new(SphereSet::new(vec![Point3::new(0.0, 0.0, 0.0)], vec![1.0]));
        let grid = Grid::build(set);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = grid.intersect(0.0, &ray);
        assert!(hit.is_hit());
        assert!((hit.t_hit - 4.0).abs() < 1e-6);
    }

    #[test]
    fn grid_matches_brute_force_on_random_spheres() {
        use rand::{Rng, SeedableRng};
        use rand_xoshiro::Xoshiro256StarStar;

        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let mut centers = Vec::new();
        let mut radii = Vec::new();
        for _ in 0..500 {
            centers.push(Point3::new(
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-30.0..30.0),
            ));
            radii.push(0.5);
        }
        let set = Arc::new(SphereSet::new(centers.clone(), radii.clone()));
        let grid = Grid::build(set.clone());

        for _ in 0..100 {
            let origin = Point3::new(
                rng.gen_range(-40.0..40.0),
                rng.gen_range(-40.0..40.0),
                rng.gen_range(-40.0..40.0),
            );
            let dir = Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let ray = Ray::new(origin, dir);
            let grid_hit = grid.intersect(0.0, &ray);

            let mut brute_best: Option<f64> = None;
            for i in 0..centers.len() {
                let hit = set.primitive_intersect(i, 0.0, &ray);
                if hit.is_hit() && ray.in_range(hit.t_hit) {
                    brute_best = Some(brute_best.map_or(hit.t_hit, |t| t.min(hit.t_hit)));
                }
            }
            match brute_best {
                None => assert!(!grid_hit.is_hit()),
                Some(t) => {
                    assert!(grid_hit.is_hit());
                    assert!((grid_hit.t_hit - t).abs() < 1e-4);
                }
            }
        }
    }
}

//! The BVH surface accelerator.

use std::sync::Arc;

use crate::accel::bvh_core::{self, BvhTree, Node, MAX_STACK_DEPTH};
use crate::accel::items::{BvhItems, PrimitiveItems};
use crate::box3::{Box3, BOUNDS_EPSILON};
use crate::geometry::Ray;
use crate::primitive::{Intersection, PrimitiveSet};

/// Two hits within this `t` tolerance are considered tied; the smaller
/// item index wins.
pub const TIE_EPSILON: f64 = 1e-6;

/// A BVH accelerator over any [`BvhItems`] source. Used both as the
/// per-instance surface accelerator (over a [`PrimitiveSet`]) and, via a
/// different `T`, as the object group's top-level instance BVH.
pub struct GenericBvh<T: BvhItems> {
    items: Arc<T>,
    tree: BvhTree,
    padded_bounds: Box3,
}

impl<T: BvhItems> GenericBvh<T> {
    pub fn build(items: Arc<T>) -> Self {
        let tree = bvh_core::build(items.as_ref());
        let padded_bounds = match tree.root {
            Some(r) => tree.nodes[r as usize].bounds().padded(BOUNDS_EPSILON),
            None => Box3::empty(),
        };
        Self {
            items,
            tree,
            padded_bounds,
        }
    }

    pub fn bounds(&self) -> Box3 {
        self.padded_bounds
    }

    pub fn is_empty(&self) -> bool {
        self.tree.root.is_none()
    }

    /// Nearest-hit traversal with an explicit bounded stack: tests both
    /// children when the current best
    /// `t_hit` doesn't let either slab be pruned; ties within
    /// [`TIE_EPSILON`] are broken by the smaller item index.
    pub fn intersect(&self, time: f64, ray: &Ray) -> Intersection {
        let Some(root) = self.tree.root else {
            return Intersection::miss();
        };
        if self.padded_bounds.intersect_ray(ray).is_none() {
            return Intersection::miss();
        }

        let mut best = Intersection::miss();
        let mut best_item_id = usize::MAX;

        let mut stack: [u32; MAX_STACK_DEPTH] = [0; MAX_STACK_DEPTH];
        let mut sp = 0usize;
        stack[sp] = root;
        sp += 1;

        while sp > 0 {
            sp -= 1;
            let node = &self.tree.nodes[stack[sp] as usize];

            // Prune using the current best hit: if the slab's near
            // distance already exceeds it, nothing inside can improve on
            // `best` (the implementation-permitted pruning of §4.4).
            if let Some((t_near, _)) = node.bounds().intersect_ray(ray) {
                if t_near > best.t_hit {
                    continue;
                }
            } else {
                continue;
            }

            match node {
                Node::Leaf { item_id, .. } => {
                    let hit = self.items.item_intersect(*item_id, time, ray);
                    if !hit.is_hit() || !ray.in_range(hit.t_hit) {
                        continue;
                    }
                    let better = hit.t_hit < best.t_hit - TIE_EPSILON
                        || ((hit.t_hit - best.t_hit).abs() <= TIE_EPSILON && *item_id < best_item_id);
                    if better {
                        best = hit;
                        best_item_id = *item_id;
                    }
                }
                Node::Internal { left, right, .. } => {
                    stack[sp] = *left;
                    sp += 1;
                    stack[sp] = *right;
                    sp += 1;
                    debug_assert!(sp <= MAX_STACK_DEPTH, "BVH traversal stack overflow");
                }
            }
        }

        best
    }
}

/// The surface accelerator for a single object instance's own geometry:
/// a BVH over its [`PrimitiveSet`].
pub struct Bvh(GenericBvh<PrimitiveItems>);

impl Bvh {
    pub fn new(primitives: Arc<dyn PrimitiveSet>) -> Self {
        Self(GenericBvh::build(Arc::new(PrimitiveItems(primitives))))
    }

    pub fn bounds(&self) -> Box3 {
        self.0.bounds()
    }

    pub fn intersect(&self, time: f64, ray: &Ray) -> Intersection {
        self.0.intersect(time, ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::sphere_set::SphereSet;
    use cgmath::{Point3, Vector3};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn bvh_matches_brute_force_on_random_spheres() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(42);
        let mut centers = Vec::new();
        let mut radii = Vec::new();
        for _ in 0..2000 {
            centers.push(Point3::new(
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
            ));
            radii.push(0.3);
        }
        let set = Arc::new(SphereSet::new(centers.clone(), radii.clone()));
        let bvh = Bvh::new(set.clone());

        for _ in 0..200 {
            let origin = Point3::new(
                rng.gen_range(-60.0..60.0),
                rng.gen_range(-60.0..60.0),
                rng.gen_range(-60.0..60.0),
            );
            let dir = Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let ray = Ray::new(origin, dir);

            let bvh_hit = bvh.intersect(0.0, &ray);

            let mut brute_best: Option<(usize, f64)> = None;
            for i in 0..centers.len() {
                let hit = set.primitive_intersect(i, 0.0, &ray);
                if hit.is_hit() && ray.in_range(hit.t_hit) {
                    if brute_best.map_or(true, |(_, t)| hit.t_hit < t - TIE_EPSILON) {
                        brute_best = Some((i, hit.t_hit));
                    }
                }
            }

            match brute_best {
                None => assert!(!bvh_hit.is_hit()),
                Some((_, t)) => {
                    assert!(bvh_hit.is_hit());
                    assert!((bvh_hit.t_hit - t).abs() < 1e-6);
                }
            }
        }
    }
}

//! The volume accelerator: given a ray, produce the
//! sorted [`IntervalList`] of `[t_min, t_max]` segments where the ray lies
//! inside some volume instance's world bounds. Tagged choice between a
//! brute-force scan (every instance tested) and a BVH over instance
//! bounding boxes, mirroring the `Grid`/`Bvh` choice at the surface level
//! but over coarser "does the ray's box-interval overlap" leaves rather
//! than a full geometric intersect — a volume instance contributes an
//! interval, not a single hit point.

use crate::accel::bvh_core::{self, BoundedItems, BvhTree, Node, MAX_STACK_DEPTH};
use crate::box3::Box3;
use crate::geometry::Ray;
use crate::instance::InstanceId;
use crate::interval::{Interval, IntervalList};

struct InstanceBoxes(Vec<(InstanceId, Box3)>);

impl BoundedItems for InstanceBoxes {
    fn len(&self) -> usize {
        self.0.len()
    }
    fn item_bounds(&self, id: usize) -> Box3 {
        self.0[id].1
    }
}

pub struct VolumeBvh {
    items: InstanceBoxes,
    tree: BvhTree,
}

impl VolumeBvh {
    pub fn build(instances: Vec<(InstanceId, Box3)>) -> Self {
        let items = InstanceBoxes(instances);
        let tree = bvh_core::build(&items);
        Self { items, tree }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.root.is_none()
    }

    /// Appends every `[t_min, t_max]` interval where `ray` crosses a
    /// volume instance's world bounds.
    pub fn intersect(&self, ray: &Ray, out: &mut IntervalList) {
        let Some(root) = self.tree.root else {
            return;
        };

        let mut stack: [u32; MAX_STACK_DEPTH] = [0; MAX_STACK_DEPTH];
        let mut sp = 0usize;
        stack[sp] = root;
        sp += 1;

        while sp > 0 {
            sp -= 1;
            let node = &self.tree.nodes[stack[sp] as usize];
            let Some((t_min, t_max)) = node.bounds().intersect_ray(ray) else {
                continue;
            };

            match node {
                Node::Leaf { item_id, .. } => {
                    let (instance, _) = self.items.0[*item_id];
                    out.push(Interval {
                        t_min,
                        t_max,
                        instance,
                    });
                }
                Node::Internal { left, right, .. } => {
                    stack[sp] = *left;
                    sp += 1;
                    stack[sp] = *right;
                    sp += 1;
                    debug_assert!(sp <= MAX_STACK_DEPTH, "volume BVH traversal stack overflow");
                }
            }
        }
    }
}

/// Brute-force variant: tests every volume instance's bounds directly, no
/// acceleration structure. Used when a scene has few enough volumes that
/// building a BVH isn't worth it.
pub struct BruteForceVolumes {
    instances: Vec<(InstanceId, Box3)>,
}

impl BruteForceVolumes {
    pub fn build(instances: Vec<(InstanceId, Box3)>) -> Self {
        Self { instances }
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn intersect(&self, ray: &Ray, out: &mut IntervalList) {
        for &(instance, bounds) in &self.instances {
            if let Some((t_min, t_max)) = bounds.intersect_ray(ray) {
                out.push(Interval {
                    t_min,
                    t_max,
                    instance,
                });
            }
        }
    }
}

pub enum VolumeAccelerator {
    BruteForce(BruteForceVolumes),
    Bvh(VolumeBvh),
}

impl VolumeAccelerator {
    pub fn build_bvh(instances: Vec<(InstanceId, Box3)>) -> Self {
        VolumeAccelerator::Bvh(VolumeBvh::build(instances))
    }

    pub fn build_brute_force(instances: Vec<(InstanceId, Box3)>) -> Self {
        VolumeAccelerator::BruteForce(BruteForceVolumes::build(instances))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            VolumeAccelerator::BruteForce(b) => b.is_empty(),
            VolumeAccelerator::Bvh(b) => b.is_empty(),
        }
    }

    pub fn intersect(&self, ray: &Ray, out: &mut IntervalList) {
        match self {
            VolumeAccelerator::BruteForce(b) => b.intersect(ray, out),
            VolumeAccelerator::Bvh(b) => b.intersect(ray, out),
        }
    }
}

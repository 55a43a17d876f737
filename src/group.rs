//! Object groups: a named collection of instances used as a camera's
//! primary scene, or as a reflect/refract/shadow target. Two parallel
//! accelerators cover an instance list — a BVH of surface instances, and a
//! volume accelerator of volume instances — built lazily on first
//! intersect and guarded so concurrent tile workers race harmlessly to
//! build it once.

use std::sync::{Arc, OnceLock};

use crate::accel::bvh_core::{self, BoundedItems, BvhTree, Node, MAX_STACK_DEPTH};
use crate::accel::VolumeAccelerator;
use crate::box3::Box3;
use crate::geometry::Ray;
use crate::instance::{Instance, InstanceGeometry, InstanceId};
use crate::interval::IntervalList;
use crate::primitive::Intersection;

/// Threshold above which the volume accelerator is built as a BVH rather
/// than scanned brute-force.
const VOLUME_BVH_THRESHOLD: usize = 16;

struct InstanceBoxes<'a>(Vec<(usize, &'a Instance)>);

impl BoundedItems for InstanceBoxes<'_> {
    fn len(&self) -> usize {
        self.0.len()
    }
    fn item_bounds(&self, id: usize) -> Box3 {
        self.0[id].1.world_bounds()
    }
}

/// A lazily-built BVH of surface instances: the object-group level always
/// uses BVH-of-instances, never a grid.
struct InstanceBvh {
    order: Vec<usize>,
    tree: BvhTree,
}

impl InstanceBvh {
    fn build(surface_indices: &[usize], instances: &[Instance]) -> Self {
        let boxed: Vec<(usize, &Instance)> = surface_indices
            .iter()
            .map(|&i| (i, &instances[i]))
            .collect();
        let items = InstanceBoxes(boxed);
        let order: Vec<usize> = items.0.iter().map(|(i, _)| *i).collect();
        let tree = bvh_core::build(&items);
        Self { order, tree }
    }

    fn intersect(&self, instances: &[Instance], time: f64, ray: &Ray) -> Intersection {
        let Some(root) = self.tree.root else {
            return Intersection::miss();
        };

        let mut best = Intersection::miss();
        let mut stack: [u32; MAX_STACK_DEPTH] = [0; MAX_STACK_DEPTH];
        let mut sp = 0usize;
        stack[sp] = root;
        sp += 1;

        while sp > 0 {
            sp -= 1;
            let node = &self.tree.nodes[stack[sp] as usize];
            let Some((t_near, _)) = node.bounds().intersect_ray(ray) else {
                continue;
            };
            if t_near > best.t_hit {
                continue;
            }

            match node {
                Node::Leaf { item_id, .. } => {
                    let instance_index = self.order[*item_id];
                    let instance = &instances[instance_index];
                    let time_ray = to_object_space(instance, time, ray);
                    let hit = instance.intersect_surface(time, &time_ray);
                    if hit.is_hit() && ray.in_range(hit.t_hit) && hit.t_hit < best.t_hit {
                        best = to_world_space(instance, time, hit);
                        best.instance = InstanceId::new(instance_index);
                    }
                }
                Node::Internal { left, right, .. } => {
                    stack[sp] = *left;
                    sp += 1;
                    stack[sp] = *right;
                    sp += 1;
                    debug_assert!(sp <= MAX_STACK_DEPTH);
                }
            }
        }

        best
    }
}

fn to_object_space(instance: &Instance, time: f64, ray: &Ray) -> Ray {
    let origin = instance.transform.transform_point_to_object(time, ray.origin);
    let dir = instance.transform.transform_dir_to_object(time, ray.dir);
    Ray::with_range(origin, dir, ray.t_min, ray.t_max)
}

fn to_world_space(instance: &Instance, time: f64, mut hit: Intersection) -> Intersection {
    hit.point = instance.transform.transform_point_to_world(time, hit.point);
    hit.normal = instance.transform.transform_normal_to_world(time, hit.normal);
    hit
}

/// The two lazily-built accelerators behind an [`ObjectGroup`].
struct GroupAccelerators {
    surfaces: Option<InstanceBvh>,
    volumes: Option<VolumeAccelerator>,
}

/// A named collection of instances: the scene's primary object list, or a
/// reflect/refract/shadow target referenced by
/// [`crate::instance::TargetGroupId`].
pub struct ObjectGroup {
    instances: Vec<Instance>,
    accel: OnceLock<GroupAccelerators>,
}

impl ObjectGroup {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self {
            instances,
            accel: OnceLock::new(),
        }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    fn accel(&self) -> &GroupAccelerators {
        self.accel.get_or_init(|| {
            let mut surface_indices = Vec::new();
            let mut volume_boxes = Vec::new();
            for (i, inst) in self.instances.iter().enumerate() {
                match &inst.geometry {
                    InstanceGeometry::Surface(_) => surface_indices.push(i),
                    InstanceGeometry::Volume(_) => {
                        volume_boxes.push((InstanceId::new(i), inst.world_bounds()))
                    }
                }
            }

            let surfaces = if surface_indices.is_empty() {
                None
            } else {
                Some(InstanceBvh::build(&surface_indices, &self.instances))
            };

            let volumes = if volume_boxes.is_empty() {
                None
            } else if volume_boxes.len() > VOLUME_BVH_THRESHOLD {
                Some(VolumeAccelerator::build_bvh(volume_boxes))
            } else {
                Some(VolumeAccelerator::build_brute_force(volume_boxes))
            };

            GroupAccelerators { surfaces, volumes }
        })
    }

    /// Nearest-hit surface query across every surface instance in the
    /// group, building the surface BVH on first call.
    pub fn intersect_surfaces(&self, time: f64, ray: &Ray) -> Intersection {
        match &self.accel().surfaces {
            None => Intersection::miss(),
            Some(bvh) => bvh.intersect(&self.instances, time, ray),
        }
    }

    /// The sorted list of `[t_min, t_max]` volume intervals `ray` crosses,
    /// building the volume accelerator on first call.
    pub fn intersect_volumes(&self, ray: &Ray) -> IntervalList {
        let mut out = IntervalList::new();
        if let Some(vol) = &self.accel().volumes {
            vol.intersect(ray, &mut out);
        }
        out
    }

    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.index()]
    }

    pub fn bounds(&self) -> Box3 {
        let mut b = Box3::empty();
        for inst in &self.instances {
            b.add_box(inst.world_bounds());
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::TargetGroupId;
    use crate::primitives::sphere_set::SphereSet;
    use cgmath::{Point3, Vector3};

    fn sphere_instance(center: Point3<f64>, radius: f64) -> Instance {
        let set = Arc::new(SphereSet::new(vec![Point3::new(0.0, 0.0, 0.0)], vec![radius]));
        let mut inst = Instance::new_surface(set, None, TargetGroupId(0));
        inst.push_keyframe(crate::transform::Keyframe {
            time: 0.0,
            translation: Vector3::new(center.x, center.y, center.z),
            rotation: cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        });
        inst
    }

    #[test]
    fn finds_nearest_of_several_instances() {
        let group = ObjectGroup::new(vec![
            sphere_instance(Point3::new(0.0, 0.0, 10.0), 1.0),
            sphere_instance(Point3::new(0.0, 0.0, 5.0), 1.0),
            sphere_instance(Point3::new(0.0, 0.0, -10.0), 1.0),
        ]);
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = group.intersect_surfaces(0.0, &ray);
        assert!(hit.is_hit());
        assert!((hit.t_hit - 4.0).abs() < 1e-6);
        assert_eq!(hit.instance, InstanceId::new(1));
    }

    #[test]
    fn empty_group_misses_everything() {
        let group = ObjectGroup::new(Vec::new());
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!group.intersect_surfaces(0.0, &ray).is_hit());
        assert!(group.intersect_volumes(&ray).is_empty());
    }
}

//! Object instances: a transformed, time-sampled wrapper around one
//! surface accelerator *or* one voxel volume, carrying a shader, a light
//! list, and reflect/refract/shadow target groups.

use std::sync::Arc;

use crate::accel::{Accelerator, AcceleratorKind};
use crate::box3::{Box3, BOUNDS_EPSILON};
use crate::light::Light;
use crate::primitive::PrimitiveSet;
use crate::shader::Shader;
use crate::transform::{Keyframe, TimeTransform};
use crate::volume::VolumeSource;

/// Typed handle to an [`Instance`] within an [`crate::group::ObjectGroup`].
/// Opaque outside the group that issued it; no arithmetic is performed on
/// it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u32);

impl InstanceId {
    /// Sentinel used by [`crate::primitive::Intersection::miss`] before an
    /// instance is known.
    pub const NONE: InstanceId = InstanceId(u32::MAX);

    pub(crate) fn new(index: usize) -> Self {
        InstanceId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Typed handle to a light within a [`crate::scene::Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightId(pub(crate) u32);

/// Typed handle to a group of instances used as a reflection, refraction,
/// or shadow target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetGroupId(pub(crate) u32);

/// Either a surface accelerator or a voxel volume; mutually exclusive.
pub enum InstanceGeometry {
    Surface(Accelerator),
    Volume(Arc<dyn VolumeSource>),
}

/// Primitive count above which [`Instance::new_surface`] picks a [`Grid`]
/// over a [`Bvh`] by default: the grid's uniform-cell cost amortizes
/// better than a BVH's `O(log n)` traversal once a primitive set is large
/// enough that build time dominates.
///
/// [`Grid`]: crate::accel::grid::Grid
/// [`Bvh`]: crate::accel::bvh::Bvh
const GRID_PRIMITIVE_THRESHOLD: usize = 4096;

/// A transformed, shaded wrapper over one accelerator or one voxel volume.
pub struct Instance {
    pub transform: TimeTransform,
    pub geometry: InstanceGeometry,
    pub shader: Option<Arc<dyn Shader>>,
    pub lights: Vec<LightId>,
    pub reflect_target: TargetGroupId,
    pub refract_target: TargetGroupId,
    pub shadow_target: TargetGroupId,
    cached_bounds: Box3,
}

impl Instance {
    /// Builds a surface instance from any [`PrimitiveSet`], picking `Grid`
    /// or `Bvh` by [`GRID_PRIMITIVE_THRESHOLD`] and defaulting all target
    /// groups to `default_target` (the scene's implicit "all objects"
    /// group).
    pub fn new_surface(
        primitives: Arc<dyn PrimitiveSet>,
        shader: Option<Arc<dyn Shader>>,
        default_target: TargetGroupId,
    ) -> Self {
        let kind = if primitives.count() > GRID_PRIMITIVE_THRESHOLD {
            AcceleratorKind::Grid
        } else {
            AcceleratorKind::Bvh
        };
        Self::new_surface_with_accelerator(primitives, kind, shader, default_target)
    }

    /// As [`Self::new_surface`], but with an explicit accelerator choice.
    pub fn new_surface_with_accelerator(
        primitives: Arc<dyn PrimitiveSet>,
        kind: AcceleratorKind,
        shader: Option<Arc<dyn Shader>>,
        default_target: TargetGroupId,
    ) -> Self {
        let mut inst = Self {
            transform: TimeTransform::new(),
            geometry: InstanceGeometry::Surface(Accelerator::build(kind, primitives)),
            shader,
            lights: Vec::new(),
            reflect_target: default_target,
            refract_target: default_target,
            shadow_target: default_target,
            cached_bounds: Box3::empty(),
        };
        inst.recompute_bounds();
        inst
    }

    /// Builds a volumetric instance.
    pub fn new_volume(
        volume: Arc<dyn VolumeSource>,
        shader: Option<Arc<dyn Shader>>,
        default_target: TargetGroupId,
    ) -> Self {
        let mut inst = Self {
            transform: TimeTransform::new(),
            geometry: InstanceGeometry::Volume(volume),
            shader,
            lights: Vec::new(),
            reflect_target: default_target,
            refract_target: default_target,
            shadow_target: default_target,
            cached_bounds: Box3::empty(),
        };
        inst.recompute_bounds();
        inst
    }

    pub fn push_keyframe(&mut self, keyframe: Keyframe) {
        self.transform.push_keyframe(keyframe);
        self.recompute_bounds();
    }

    pub fn add_light(&mut self, light: LightId) {
        self.lights.push(light);
    }

    /// Cached padded world-space bounds, recomputed after any keyframe push.
    pub fn world_bounds(&self) -> Box3 {
        self.cached_bounds
    }

    fn local_bounds(&self) -> Box3 {
        match &self.geometry {
            InstanceGeometry::Surface(accel) => accel.bounds(),
            InstanceGeometry::Volume(vol) => vol.bounds(),
        }
    }

    /// Intersects `ray` (in object space) against this instance's own
    /// surface geometry. Panics if this instance is volumetric; callers
    /// dispatch on [`InstanceGeometry`] before calling.
    pub fn intersect_surface(&self, time: f64, ray: &crate::geometry::Ray) -> crate::primitive::Intersection {
        match &self.geometry {
            InstanceGeometry::Surface(accel) => accel.intersect(time, ray),
            InstanceGeometry::Volume(_) => crate::primitive::Intersection::miss(),
        }
    }

    fn recompute_bounds(&mut self) {
        let local = self.local_bounds();
        if local.is_empty() {
            self.cached_bounds = local;
            return;
        }
        // Sweep every keyframe's transform over the 8 local-space corners
        // so the cached bounds cover the instance across its full motion.
        let corners = [
            (local.min.x, local.min.y, local.min.z),
            (local.min.x, local.min.y, local.max.z),
            (local.min.x, local.max.y, local.min.z),
            (local.min.x, local.max.y, local.max.z),
            (local.max.x, local.min.y, local.min.z),
            (local.max.x, local.min.y, local.max.z),
            (local.max.x, local.max.y, local.min.z),
            (local.max.x, local.max.y, local.max.z),
        ];
        let mut world = Box3::empty();
        for &t in &self.transform.sample_times() {
            for &(x, y, z) in &corners {
                let p = cgmath::Point3::new(x, y, z);
                world.add_point(self.transform.transform_point_to_world(t, p));
            }
        }
        self.cached_bounds = world.padded(BOUNDS_EPSILON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::sphere_set::SphereSet;
    use crate::transform::Keyframe;
    use cgmath::{Point3, Vector3};

    #[test]
    fn world_bounds_widen_to_cover_translation_keyframes() {
        let sphere = Arc::new(SphereSet::new(vec![Point3::new(0.0, 0.0, 0.0)], vec![1.0]));
        let mut inst = Instance::new_surface(sphere, None, TargetGroupId(0));
        let still = inst.world_bounds();

        inst.push_keyframe(Keyframe {
            time: 0.0,
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        });
        inst.push_keyframe(Keyframe {
            time: 1.0,
            translation: Vector3::new(10.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        });
        let moving = inst.world_bounds();
        assert!(moving.max.x > still.max.x);
    }

    #[test]
    fn large_primitive_count_picks_grid_accelerator() {
        let centers: Vec<_> = (0..GRID_PRIMITIVE_THRESHOLD + 1)
            .map(|i| Point3::new(i as f64, 0.0, 0.0))
            .collect();
        let radii = vec![0.1; centers.len()];
        let sphere = Arc::new(SphereSet::new(centers, radii));
        let inst = Instance::new_surface(sphere, None, TargetGroupId(0));
        assert!(matches!(
            inst.geometry,
            InstanceGeometry::Surface(Accelerator::Grid(_))
        ));
    }
}

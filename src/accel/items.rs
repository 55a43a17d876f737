//! Adapters from concrete data (a primitive set, a list of instances) to
//! the narrow interface the BVH traversal needs: a count, per-item bounds,
//! and a per-item intersect — one generic BVH parameterised by a leaf-query
//! type; these adapters are that parameterisation for the surface case.

use std::sync::Arc;

use crate::accel::bvh_core::BoundedItems;
use crate::box3::Box3;
use crate::geometry::Ray;
use crate::primitive::{Intersection, PrimitiveSet};

/// Items a surface BVH can be built over and queried against: a count, a
/// per-item bounding box, and a per-item intersect producing a single
/// [`Intersection`] (or a miss).
pub trait BvhItems: Send + Sync {
    fn len(&self) -> usize;
    fn item_bounds(&self, id: usize) -> Box3;
    fn item_intersect(&self, id: usize, time: f64, ray: &Ray) -> Intersection;
}

/// Adapts an `Arc<dyn PrimitiveSet>` to [`BvhItems`]: the per-instance
/// surface accelerator's view of its own geometry.
pub struct PrimitiveItems(pub Arc<dyn PrimitiveSet>);

impl BvhItems for PrimitiveItems {
    fn len(&self) -> usize {
        self.0.count()
    }
    fn item_bounds(&self, id: usize) -> Box3 {
        self.0.primitive_bounds(id)
    }
    fn item_intersect(&self, id: usize, time: f64, ray: &Ray) -> Intersection {
        self.0.primitive_intersect(id, time, ray)
    }
}

/// Blanket bridge so any [`BvhItems`] also satisfies [`BoundedItems`]
/// (the minimal interface `bvh_core::build` needs).
impl<T: BvhItems + ?Sized> BoundedItems for T {
    fn len(&self) -> usize {
        BvhItems::len(self)
    }
    fn item_bounds(&self, id: usize) -> Box3 {
        BvhItems::item_bounds(self, id)
    }
}

//! The per-instance surface accelerator: a tagged choice between a
//! [`Grid`] and a [`Bvh`], in place of a void-pointer-plus-function-table
//! dispatch. Chosen once, at instance construction, and built eagerly —
//! there is no per-instance policy to switch between them at runtime, so
//! the "fully built before any trace begins" invariant is trivially
//! satisfied for this level.

use std::sync::Arc;

use crate::accel::bvh::Bvh;
use crate::accel::grid::Grid;
use crate::box3::Box3;
use crate::geometry::Ray;
use crate::primitive::{Intersection, PrimitiveSet};

/// Which spatial structure backs a given instance's surface geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AcceleratorKind {
    Grid,
    Bvh,
}

pub enum Accelerator {
    Grid(Grid),
    Bvh(Bvh),
}

impl Accelerator {
    pub fn build(kind: AcceleratorKind, primitives: Arc<dyn PrimitiveSet>) -> Self {
        match kind {
            AcceleratorKind::Grid => Accelerator::Grid(Grid::build(primitives)),
            AcceleratorKind::Bvh => Accelerator::Bvh(Bvh::new(primitives)),
        }
    }

    pub fn bounds(&self) -> Box3 {
        match self {
            Accelerator::Grid(g) => g.bounds(),
            Accelerator::Bvh(b) => b.bounds(),
        }
    }

    pub fn intersect(&self, time: f64, ray: &Ray) -> Intersection {
        match self {
            Accelerator::Grid(g) => g.intersect(time, ray),
            Accelerator::Bvh(b) => b.intersect(time, ray),
        }
    }
}

//! Spatial acceleration: the 3-D DDA grid, the generic BVH core shared by
//! the surface and volume layers, and the tagged
//! `Accelerator`/`VolumeAccelerator` enums instances and object groups
//! build on top of it.

pub mod accelerator;
pub mod bvh;
pub mod bvh_core;
pub mod grid;
pub mod items;
pub mod volume_bvh;

pub use accelerator::{Accelerator, AcceleratorKind};
pub use volume_bvh::VolumeAccelerator;

//! Reference implementations of [`crate::primitive::PrimitiveSet`],
//! [`crate::shader::Shader`], [`crate::light::Light`], and
//! [`crate::volume::VolumeSource`]. These exist for testing the rendering
//! engine end to end; a real scene supplies its own geometry, shaders, and
//! lights against the same contracts.

pub mod constant_shader;
pub mod dense_volume;
pub mod diffuse_shader;
pub mod distant_light;
pub mod point_light;
pub mod sphere_set;
pub mod triangle_mesh;

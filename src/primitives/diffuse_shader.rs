//! A reference Lambertian [`Shader`]: reports its albedo as `color`; the
//! `N.L` direct-lighting sum over the instance's light list is done
//! uniformly by [`crate::trace`], not here.

use crate::color::Rgb;
use crate::context::TraceContext;
use crate::shader::{Shader, SurfaceInput, SurfaceOutput};

pub struct DiffuseShader {
    pub albedo: Rgb,
}

impl Shader for DiffuseShader {
    fn name(&self) -> &str {
        "diffuse"
    }

    fn evaluate(&self, _input: &SurfaceInput, _ctx: &TraceContext) -> SurfaceOutput {
        SurfaceOutput {
            color: self.albedo,
            ..Default::default()
        }
    }
}

//! The simplest reference [`Shader`]: a fixed, unlit color. Reported as
//! `emission` rather than `color` so the direct-lighting sum in
//! [`crate::trace`] leaves it untouched — useful for visualizing emitters
//! or debugging geometry independent of the light rig.

use crate::color::Rgb;
use crate::context::TraceContext;
use crate::shader::{Shader, SurfaceInput, SurfaceOutput};

pub struct ConstantShader {
    pub color: Rgb,
}

impl Shader for ConstantShader {
    fn name(&self) -> &str {
        "constant"
    }

    fn evaluate(&self, _input: &SurfaceInput, _ctx: &TraceContext) -> SurfaceOutput {
        SurfaceOutput {
            emission: self.color,
            ..Default::default()
        }
    }
}

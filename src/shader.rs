//! The shader contract: given a surface hit and the context the tracing
//! kernel built for it, produce an outgoing radiance and optionally
//! request reflection/refraction continuation rays.

use cgmath::{Point2, Point3, Vector3};

use crate::color::Rgb;
use crate::context::TraceContext;

/// Everything a shader needs to know about the point it is shading.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceInput {
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
    pub incoming_dir: Vector3<f64>,
    pub uv: Point2<f64>,
    pub dpds: Vector3<f64>,
    pub dpdt: Vector3<f64>,
    pub time: f64,
}

/// A shader's verdict for one surface hit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceOutput {
    pub color: Rgb,
    /// Self-emitted radiance, added on top of `color` without attenuation.
    pub emission: Rgb,
    /// Reflectivity in `[0, 1]`; `0` skips the reflection ray entirely.
    pub reflectivity: f32,
    /// Transmissivity in `[0, 1]`; `0` skips the refraction ray entirely.
    pub transmissivity: f32,
    /// Index of refraction, used when `transmissivity > 0`.
    pub ior: f32,
}

/// A pluggable surface shader. Implementations must be safe to call
/// concurrently from multiple tile worker threads.
pub trait Shader: Send + Sync {
    fn name(&self) -> &str;

    /// Evaluates the shader at one surface hit, given the trace context
    /// that produced it (depth, ray kind, time).
    fn evaluate(&self, input: &SurfaceInput, ctx: &TraceContext) -> SurfaceOutput;
}

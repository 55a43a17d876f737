//! The per-ray trace context: everything the recursive kernel threads down
//! into a child ray besides the ray itself —
//! what kind of ray it is, how deep the recursion already is, and the
//! render settings that bound it.

use crate::instance::TargetGroupId;

/// What role a ray plays in the recursive trace, used to decide which
/// depth counter gates it and which target group it is cast against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RayKind {
    Camera,
    Shadow,
    Reflect,
    Refract,
}

/// Render-wide recursion limits; shared immutably across every ray in a
/// render.
#[derive(Clone, Copy, Debug)]
pub struct TraceLimits {
    pub max_reflect_depth: u32,
    pub max_refract_depth: u32,
    /// Alpha accumulated during volume marching above which the
    /// compositing loop stops early (default `0.995`).
    pub opacity_threshold: f32,
    /// Raymarch step size in object space, clamped to `>= 1e-3`.
    pub raymarch_step: f64,
}

impl Default for TraceLimits {
    fn default() -> Self {
        Self {
            max_reflect_depth: 3,
            max_refract_depth: 3,
            opacity_threshold: 0.995,
            raymarch_step: 0.05,
        }
    }
}

impl TraceLimits {
    /// Clamps `raymarch_step` to the minimum the kernel will accept.
    pub fn clamped(mut self) -> Self {
        self.raymarch_step = self.raymarch_step.max(1e-3);
        self
    }
}

/// Context threaded through one trace call.
#[derive(Clone, Copy, Debug)]
pub struct TraceContext<'a> {
    pub kind: RayKind,
    pub reflect_depth: u32,
    pub refract_depth: u32,
    pub cast_shadow: bool,
    pub time: f64,
    pub trace_target: TargetGroupId,
    pub limits: &'a TraceLimits,
}

impl<'a> TraceContext<'a> {
    pub fn camera(time: f64, trace_target: TargetGroupId, limits: &'a TraceLimits) -> Self {
        Self {
            kind: RayKind::Camera,
            reflect_depth: 0,
            refract_depth: 0,
            cast_shadow: true,
            time,
            trace_target,
            limits,
        }
    }

    pub fn is_reflect_depth_exhausted(&self) -> bool {
        self.reflect_depth >= self.limits.max_reflect_depth
    }

    pub fn is_refract_depth_exhausted(&self) -> bool {
        self.refract_depth >= self.limits.max_refract_depth
    }

    pub fn child_reflect(&self, trace_target: TargetGroupId) -> Self {
        Self {
            kind: RayKind::Reflect,
            reflect_depth: self.reflect_depth + 1,
            refract_depth: self.refract_depth,
            cast_shadow: self.cast_shadow,
            time: self.time,
            trace_target,
            limits: self.limits,
        }
    }

    pub fn child_refract(&self, trace_target: TargetGroupId) -> Self {
        Self {
            kind: RayKind::Refract,
            reflect_depth: self.reflect_depth,
            refract_depth: self.refract_depth + 1,
            cast_shadow: self.cast_shadow,
            time: self.time,
            trace_target,
            limits: self.limits,
        }
    }

    pub fn child_shadow(&self, trace_target: TargetGroupId) -> Self {
        Self {
            kind: RayKind::Shadow,
            reflect_depth: self.reflect_depth,
            refract_depth: self.refract_depth,
            cast_shadow: false,
            time: self.time,
            trace_target,
            limits: self.limits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_clamp_tiny_raymarch_step() {
        let limits = TraceLimits {
            raymarch_step: 1e-6,
            ..Default::default()
        }
        .clamped();
        assert!(limits.raymarch_step >= 1e-3);
    }

    #[test]
    fn child_contexts_increment_only_their_own_depth() {
        let limits = TraceLimits::default();
        let root = TraceContext::camera(0.0, TargetGroupId(0), &limits);
        let r = root.child_reflect(TargetGroupId(0));
        assert_eq!(r.reflect_depth, 1);
        assert_eq!(r.refract_depth, 0);
        let t = root.child_refract(TargetGroupId(0));
        assert_eq!(t.refract_depth, 1);
        assert_eq!(t.reflect_depth, 0);
    }
}

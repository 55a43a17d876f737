//! The recursive shading/tracing kernel: for one ray,
//! finds the nearest surface hit and every volume interval in front of it,
//! composites volume samples front-to-back over the shaded surface (or
//! the transparent background), and recurses into reflection, refraction,
//! and shadow rays as the surface's shader requests.

use cgmath::{InnerSpace as _, Point3, Vector3};

use crate::color::{Rgb, Rgba};
use crate::context::TraceContext;
use crate::geometry::Ray;
use crate::instance::{Instance, InstanceGeometry};
use crate::scene::Scene;
use crate::shader::SurfaceInput;

/// Small offset along the surface normal used to push reflect/refract/
/// shadow ray origins off the surface they started from, avoiding
/// self-intersection from floating-point roundoff.
const SELF_INTERSECTION_EPSILON: f64 = 1e-5;

/// Traces one ray through `scene`'s `ctx.trace_target` group, returning its
/// composited color and accumulated opacity.
pub fn trace(scene: &Scene, ray: &Ray, ctx: &TraceContext) -> Rgba {
    let group = scene.group(ctx.trace_target);
    let surface_hit = group.intersect_surfaces(ctx.time, ray);
    let far = if surface_hit.is_hit() {
        surface_hit.t_hit
    } else {
        ray.t_max
    };

    let behind = if surface_hit.is_hit() {
        let instance = group.instance(surface_hit.instance);
        shade_surface(scene, instance, &surface_hit, ray, ctx).with_alpha_one()
    } else {
        Rgba::TRANSPARENT
    };

    let volume_intervals = group.intersect_volumes(ray);
    if volume_intervals.is_empty() {
        return behind;
    }

    let mut accum = Rgba::TRANSPARENT;
    for interval in volume_intervals.iter() {
        let t_min = interval.t_min.max(ray.t_min);
        let t_max = interval.t_max.min(far);
        if t_min >= t_max {
            continue;
        }
        let instance = group.instance(interval.instance);
        let InstanceGeometry::Volume(volume) = &instance.geometry else {
            continue;
        };
        let sample = raymarch(
            volume.as_ref(),
            instance,
            ray,
            t_min,
            t_max,
            ctx.time,
            ctx.limits.raymarch_step,
        );
        accum = accum.over(sample);
        if accum.alpha() >= ctx.limits.opacity_threshold {
            return accum;
        }
    }

    accum.over(behind)
}

/// Marches `ray` through `[t_min, t_max]` inside one volume instance,
/// accumulating emission-absorption samples front-to-back. Stops early
/// once accumulated opacity
/// reaches the instance shader's output, or the interval is exhausted.
fn raymarch(
    volume: &dyn crate::volume::VolumeSource,
    instance: &Instance,
    ray: &Ray,
    t_min: f64,
    t_max: f64,
    time: f64,
    step: f64,
) -> Rgba {
    let mut accum = Rgba::TRANSPARENT;
    let base_color = instance
        .shader
        .as_ref()
        .map(|s| {
            s.evaluate(
                &SurfaceInput {
                    point: Point3::new(0.0, 0.0, 0.0),
                    normal: Vector3::new(0.0, 0.0, 1.0),
                    incoming_dir: ray.dir,
                    uv: cgmath::Point2::new(0.0, 0.0),
                    dpds: Vector3::new(0.0, 0.0, 0.0),
                    dpdt: Vector3::new(0.0, 0.0, 0.0),
                    time,
                },
                &TraceContext::camera(time, crate::instance::TargetGroupId(0), &DEFAULT_LIMITS),
            )
            .color
        })
        .unwrap_or(Rgb::ONE);

    let mut t = t_min;
    while t < t_max {
        let world_p = ray.at(t);
        let object_p = instance.transform.transform_point_to_object(time, world_p);
        let density = volume.sample(object_p, time);
        if density > 0.0 {
            let alpha = 1.0 - (-density * step).exp();
            let sample = base_color.with_alpha(alpha as f32);
            accum = accum.over(sample);
            if accum.fully_opaque() {
                break;
            }
        }
        t += step;
    }
    accum
}

/// A context used only to evaluate a volume's shader for its base color;
/// volumes don't recurse, so the limits here are never consulted.
static DEFAULT_LIMITS: crate::context::TraceLimits = crate::context::TraceLimits {
    max_reflect_depth: 0,
    max_refract_depth: 0,
    opacity_threshold: 0.995,
    raymarch_step: 1e-3,
};

fn shade_surface(
    scene: &Scene,
    instance: &Instance,
    hit: &crate::primitive::Intersection,
    ray: &Ray,
    ctx: &TraceContext,
) -> Rgb {
    let normal = if hit.normal.dot(ray.dir) > 0.0 {
        -hit.normal
    } else {
        hit.normal
    };

    let Some(shader) = instance.shader.as_ref() else {
        return Rgb::ZERO;
    };

    let input = SurfaceInput {
        point: hit.point,
        normal,
        incoming_dir: ray.dir.normalize(),
        uv: hit.uv,
        dpds: hit.dpds,
        dpdt: hit.dpdt,
        time: ctx.time,
    };
    let output = shader.evaluate(&input, ctx);

    let mut color = output.emission;
    color += direct_lighting(scene, instance, &input, ctx) * output.color;

    if output.reflectivity > 0.0 && !ctx.is_reflect_depth_exhausted() {
        let reflect_dir = reflect(input.incoming_dir, normal);
        let origin = hit.point + normal * SELF_INTERSECTION_EPSILON;
        let child_ray = Ray::new(origin, reflect_dir);
        let child_ctx = ctx.child_reflect(instance.reflect_target);
        let reflected = trace(scene, &child_ray, &child_ctx);
        color += reflected.to_rgb() * output.reflectivity;
    }

    if output.transmissivity > 0.0 && !ctx.is_refract_depth_exhausted() {
        if let Some(refract_dir) = refract(input.incoming_dir, normal, output.ior as f64) {
            let origin = hit.point - normal * SELF_INTERSECTION_EPSILON;
            let child_ray = Ray::new(origin, refract_dir);
            let child_ctx = ctx.child_refract(instance.refract_target);
            let refracted = trace(scene, &child_ray, &child_ctx);
            color += refracted.to_rgb() * output.transmissivity;
        }
    }

    color
}

/// Sums each light's `N.L`-weighted, shadow-tested contribution: a
/// shadow ray is itself traced through
/// `instance.shadow_target`, so occlusion from fog-like volumes partially
/// attenuates rather than binary-blocking light.
fn direct_lighting(scene: &Scene, instance: &Instance, input: &SurfaceInput, ctx: &TraceContext) -> Rgb {
    if !ctx.cast_shadow && instance.lights.is_empty() {
        return Rgb::ZERO;
    }
    let mut total = Rgb::ZERO;
    let mut samples = Vec::new();
    for &light_id in &instance.lights {
        let light = scene.light(light_id);
        samples.clear();
        light.generate_samples(input.point, input.time, &mut samples);
        for sample in &samples {
            let n_dot_l = input.normal.dot(sample.direction);
            if n_dot_l <= 0.0 {
                continue;
            }
            let visibility = if ctx.cast_shadow {
                let origin = input.point + input.normal * SELF_INTERSECTION_EPSILON;
                let t_max = if sample.distance.is_finite() {
                    sample.distance - 2.0 * SELF_INTERSECTION_EPSILON
                } else {
                    f64::INFINITY
                };
                let shadow_ray = Ray::with_range(origin, sample.direction, 0.0, t_max.max(0.0));
                let shadow_ctx = ctx.child_shadow(instance.shadow_target);
                let shadow_hit = trace(scene, &shadow_ray, &shadow_ctx);
                1.0 - shadow_hit.alpha()
            } else {
                1.0
            };
            if visibility <= 0.0 {
                continue;
            }
            total += sample.radiance * (n_dot_l * visibility) as f32;
        }
    }
    total
}

/// Reflects `incoming` (pointing toward the surface) about `normal`
/// (pointing away from the surface, on the incoming side).
pub fn reflect(incoming: Vector3<f64>, normal: Vector3<f64>) -> Vector3<f64> {
    incoming - normal * (2.0 * incoming.dot(normal))
}

/// Refracts `incoming` through a surface with relative index of
/// refraction `eta` (incident-side IOR over transmitted-side IOR),
/// returning `None` under total internal reflection.
pub fn refract(incoming: Vector3<f64>, normal: Vector3<f64>, eta: f64) -> Option<Vector3<f64>> {
    let cos_i = (-incoming.dot(normal)).clamp(-1.0, 1.0);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some(incoming * eta + normal * (eta * cos_i - cos_t))
}

/// Schlick's approximation to the Fresnel reflectance at normal incidence
/// `f0`, given the cosine of the angle between the incident direction and
/// the normal.
pub fn fresnel_schlick(cos_theta: f64, f0: f64) -> f64 {
    f0 + (1.0 - f0) * (1.0 - cos_theta).clamp(0.0, 1.0).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_off_a_flat_surface_flips_the_normal_component() {
        let incoming = Vector3::new(1.0, -1.0, 0.0).normalize();
        let normal = Vector3::new(0.0, 1.0, 0.0);
        let r = reflect(incoming, normal);
        assert!((r.y + incoming.y).abs() < 1e-9);
        assert!((r.x - incoming.x).abs() < 1e-9);
    }

    #[test]
    fn refract_straight_through_is_unchanged_at_matching_ior() {
        let incoming = Vector3::new(0.0, 0.0, 1.0);
        let normal = Vector3::new(0.0, 0.0, -1.0);
        let r = refract(incoming, normal, 1.0).unwrap();
        assert!((r - incoming).magnitude() < 1e-9);
    }

    #[test]
    fn refract_detects_total_internal_reflection() {
        let incoming = Vector3::new(1.0, 0.0, 0.01).normalize();
        let normal = Vector3::new(0.0, 0.0, -1.0);
        assert!(refract(incoming, normal, 2.0).is_none());
    }

    #[test]
    fn fresnel_is_f0_at_normal_incidence() {
        assert!((fresnel_schlick(1.0, 0.04) - 0.04).abs() < 1e-9);
    }
}

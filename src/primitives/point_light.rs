//! A reference point [`Light`]: uniform radiance in all directions,
//! falling off as `1 / distance^2`, one sample per query.

use cgmath::{InnerSpace as _, Point3};

use crate::color::Rgb;
use crate::light::{Light, LightSample};

pub struct PointLight {
    pub position: Point3<f64>,
    pub intensity: Rgb,
}

impl Light for PointLight {
    fn name(&self) -> &str {
        "point"
    }

    fn sample_count(&self) -> usize {
        1
    }

    fn generate_samples(&self, point: Point3<f64>, _time: f64, out: &mut Vec<LightSample>) {
        let to_light = self.position - point;
        let distance = to_light.magnitude();
        if distance <= 0.0 {
            return;
        }
        let direction = to_light / distance;
        let falloff = 1.0 / (distance * distance).max(1e-6);
        out.push(LightSample {
            direction,
            distance,
            radiance: self.intensity * falloff as f32,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_falls_off_with_squared_distance() {
        let light = PointLight {
            position: Point3::new(0.0, 0.0, 10.0),
            intensity: Rgb::ONE,
        };
        let mut near = Vec::new();
        let mut far = Vec::new();
        light.generate_samples(Point3::new(0.0, 0.0, 0.0), 0.0, &mut near);
        light.generate_samples(Point3::new(0.0, 0.0, -10.0), 0.0, &mut far);
        assert!(near[0].radiance.r() > far[0].radiance.r());
    }
}

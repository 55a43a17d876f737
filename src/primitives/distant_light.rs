//! A reference directional [`Light`]: parallel rays from infinitely far
//! away (the sun), no distance falloff.

use cgmath::{InnerSpace as _, Point3, Vector3};

use crate::color::Rgb;
use crate::light::{Light, LightSample};

pub struct DistantLight {
    /// Direction the light travels *from* the light *toward* the scene.
    pub direction: Vector3<f64>,
    pub intensity: Rgb,
}

impl DistantLight {
    pub fn new(direction: Vector3<f64>, intensity: Rgb) -> Self {
        Self {
            direction: direction.normalize(),
            intensity,
        }
    }
}

impl Light for DistantLight {
    fn name(&self) -> &str {
        "distant"
    }

    fn sample_count(&self) -> usize {
        1
    }

    fn generate_samples(&self, _point: Point3<f64>, _time: f64, out: &mut Vec<LightSample>) {
        out.push(LightSample {
            direction: -self.direction,
            distance: f64::INFINITY,
            radiance: self.intensity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_points_back_toward_the_light() {
        let light = DistantLight::new(Vector3::new(0.0, -1.0, 0.0), Rgb::ONE);
        let mut samples = Vec::new();
        light.generate_samples(Point3::new(0.0, 0.0, 0.0), 0.0, &mut samples);
        assert_eq!(samples.len(), 1);
        assert!((samples[0].direction - Vector3::new(0.0, 1.0, 0.0)).magnitude() < 1e-9);
        assert!(samples[0].distance.is_infinite());
    }
}

//! The camera: eye position, look-at orientation, vertical field of view,
//! and a shutter interval used to pick a ray's `time` for motion blur.

use cgmath::{InnerSpace as _, Matrix3, Point3, Rad, Vector3};

use crate::geometry::Ray;

#[derive(Clone, Debug)]
pub struct Camera {
    eye: Point3<f64>,
    basis: Matrix3<f64>,
    tan_half_fov: f64,
    aspect: f64,
    shutter_open: f64,
    shutter_close: f64,
}

impl Camera {
    /// `fov_y` is the vertical field of view in radians; `aspect` is
    /// `width / height`. `up` need not be orthogonal to `eye - target`.
    pub fn look_at(
        eye: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        fov_y: Rad<f64>,
        aspect: f64,
        shutter_open: f64,
        shutter_close: f64,
    ) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let true_up = right.cross(forward);
        let basis = Matrix3::from_cols(right, true_up, forward);
        Self {
            eye,
            basis,
            tan_half_fov: (fov_y.0 * 0.5).tan(),
            aspect,
            shutter_open,
            shutter_close,
        }
    }

    /// Projects normalized device coordinates `(ndc_x, ndc_y)` (each in
    /// `[-1, 1]`, `+y` up) into a world-space camera ray. The ray's shutter
    /// time is sampled separately via [`Self::sample_time`] and threaded
    /// through the [`crate::context::TraceContext`], not stored on the ray.
    pub fn ray(&self, ndc_x: f64, ndc_y: f64) -> Ray {
        let x = ndc_x * self.tan_half_fov * self.aspect;
        let y = ndc_y * self.tan_half_fov;
        let dir_camera = Vector3::new(x, y, 1.0);
        let dir = self.basis * dir_camera;
        Ray::new(self.eye, dir)
    }

    /// Samples a shutter time for a ray, `fraction` in `[0, 1]`.
    pub fn sample_time(&self, fraction: f64) -> f64 {
        self.shutter_open + (self.shutter_close - self.shutter_open) * fraction
    }
}

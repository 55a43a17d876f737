//! A reference [`VolumeSource`]: a dense `nx * ny * nz` grid of density
//! samples over a box, trilinearly interpolated.

use cgmath::Point3;

use crate::box3::Box3;
use crate::volume::VolumeSource;

pub struct DenseVolume {
    bounds: Box3,
    dims: [usize; 3],
    densities: Vec<f64>,
}

impl DenseVolume {
    pub fn new(bounds: Box3, dims: [usize; 3], densities: Vec<f64>) -> Self {
        assert_eq!(densities.len(), dims[0] * dims[1] * dims[2]);
        Self {
            bounds,
            dims,
            densities,
        }
    }

    fn sample_at(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        let ix = ix.min(self.dims[0] - 1);
        let iy = iy.min(self.dims[1] - 1);
        let iz = iz.min(self.dims[2] - 1);
        self.densities[(iz * self.dims[1] + iy) * self.dims[0] + ix]
    }
}

impl VolumeSource for DenseVolume {
    fn name(&self) -> &str {
        "dense_volume"
    }

    fn bounds(&self) -> Box3 {
        self.bounds
    }

    fn sample(&self, point: Point3<f64>, _time: f64) -> f64 {
        if !self.bounds.contains_point(point) {
            return 0.0;
        }
        let widths = self.bounds.widths();
        let fx = (point.x - self.bounds.min.x) / widths.x * self.dims[0] as f64 - 0.5;
        let fy = (point.y - self.bounds.min.y) / widths.y * self.dims[1] as f64 - 0.5;
        let fz = (point.z - self.bounds.min.z) / widths.z * self.dims[2] as f64 - 0.5;

        let x0 = fx.floor().max(0.0) as usize;
        let y0 = fy.floor().max(0.0) as usize;
        let z0 = fz.floor().max(0.0) as usize;
        let tx = (fx - fx.floor()).clamp(0.0, 1.0);
        let ty = (fy - fy.floor()).clamp(0.0, 1.0);
        let tz = (fz - fz.floor()).clamp(0.0, 1.0);

        let c000 = self.sample_at(x0, y0, z0);
        let c100 = self.sample_at(x0 + 1, y0, z0);
        let c010 = self.sample_at(x0, y0 + 1, z0);
        let c110 = self.sample_at(x0 + 1, y0 + 1, z0);
        let c001 = self.sample_at(x0, y0, z0 + 1);
        let c101 = self.sample_at(x0 + 1, y0, z0 + 1);
        let c011 = self.sample_at(x0, y0 + 1, z0 + 1);
        let c111 = self.sample_at(x0 + 1, y0 + 1, z0 + 1);

        let c00 = c000 * (1.0 - tx) + c100 * tx;
        let c10 = c010 * (1.0 - tx) + c110 * tx;
        let c01 = c001 * (1.0 - tx) + c101 * tx;
        let c11 = c011 * (1.0 - tx) + c111 * tx;
        let c0 = c00 * (1.0 - ty) + c10 * ty;
        let c1 = c01 * (1.0 - ty) + c11 * ty;
        c0 * (1.0 - tz) + c1 * tz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn outside_bounds_is_zero_density() {
        let vol = DenseVolume::new(
            Box3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
            [2, 2, 2],
            vec![1.0; 8],
        );
        assert_eq!(vol.sample(Point3::new(5.0, 5.0, 5.0), 0.0), 0.0);
    }

    #[test]
    fn uniform_grid_samples_uniformly_inside_bounds() {
        let vol = DenseVolume::new(
            Box3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
            [2, 2, 2],
            vec![3.0; 8],
        );
        let d = vol.sample(Point3::new(0.5, 0.5, 0.5), 0.0);
        assert!((d - 3.0).abs() < 1e-9);
    }
}

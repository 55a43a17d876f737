//! Stratified sampling: for each pixel, an `n x n` jittered grid of
//! sub-pixel samples, each carrying its own shutter-time fraction for
//! motion blur.

use rand::Rng;

/// One sample within a pixel: offset from pixel center in `[-0.5, 0.5]`
/// pixels on each axis, and a shutter-time fraction in `[0, 1)`.
#[derive(Clone, Copy, Debug)]
pub struct PixelSample {
    pub dx: f64,
    pub dy: f64,
    pub shutter_fraction: f64,
}

/// Generates an `samples_per_axis^2` stratified grid of jittered samples
/// for one pixel: divide the pixel into an `n x n` grid of cells and
/// jitter one sample per cell.
pub fn stratified_samples(
    samples_per_axis: u32,
    rng: &mut impl Rng,
    out: &mut Vec<PixelSample>,
) {
    let n = samples_per_axis.max(1) as f64;
    let cell = 1.0 / n;
    out.clear();
    out.reserve((samples_per_axis * samples_per_axis) as usize);
    for j in 0..samples_per_axis {
        for i in 0..samples_per_axis {
            let jitter_x: f64 = rng.gen();
            let jitter_y: f64 = rng.gen();
            let shutter_fraction: f64 = rng.gen();
            let dx = (i as f64 + jitter_x) * cell - 0.5;
            let dy = (j as f64 + jitter_y) * cell - 0.5;
            out.push(PixelSample {
                dx,
                dy,
                shutter_fraction,
            });
        }
    }
}

/// How many whole pixels of margin a filter needs on every side of a
/// pixel so neighbouring pixels' samples can fall within its support:
/// a filter with `radius <= 0.5` only ever needs its own pixel's strata.
pub fn margin_pixels(filter_radius: f64) -> u32 {
    (filter_radius - 0.5).max(0.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn produces_n_squared_samples_within_pixel_bounds() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut samples = Vec::new();
        stratified_samples(3, &mut rng, &mut samples);
        assert_eq!(samples.len(), 9);
        for s in &samples {
            assert!(s.dx >= -0.5 && s.dx <= 0.5);
            assert!(s.dy >= -0.5 && s.dy <= 0.5);
            assert!(s.shutter_fraction >= 0.0 && s.shutter_fraction < 1.0);
        }
    }

    #[test]
    fn each_cell_contributes_exactly_one_sample() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let mut samples = Vec::new();
        stratified_samples(4, &mut rng, &mut samples);
        let cell = 1.0 / 4.0;
        let mut cells_seen = std::collections::HashSet::new();
        for s in &samples {
            let cx = ((s.dx + 0.5) / cell).floor() as i64;
            let cy = ((s.dy + 0.5) / cell).floor() as i64;
            cells_seen.insert((cx, cy));
        }
        assert_eq!(cells_seen.len(), 16);
    }

    #[test]
    fn box_filter_radius_needs_no_margin() {
        assert_eq!(margin_pixels(0.5), 0);
    }

    #[test]
    fn wide_gaussian_radius_needs_a_multi_pixel_margin() {
        assert_eq!(margin_pixels(2.0), 2);
    }
}

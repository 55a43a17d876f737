//! Render orchestration: decomposes the output image into tiles, traces a
//! stratified, filter-reconstructed set of camera rays per pixel, and
//! writes the composited result into a [`FrameBuffer`].
//!
//! Parallel implementation note: tiles are independent units of work,
//! iterated with `rayon` when the `rayon` feature is enabled and
//! sequentially otherwise. Per-pixel sampling is seeded from the pixel's
//! own coordinates rather than a shared RNG stream, so the two code paths
//! produce bit-identical images — parallelism changes only the order
//! tiles complete in, never which random numbers a given pixel draws.
//!
//! A filter whose radius exceeds half a pixel needs samples from
//! neighbouring pixels to reconstruct correctly. Each tile traces a
//! margin of extra pixels around its own border wide enough to cover the
//! filter's support, so a tile's output never depends on another tile's
//! work — the margin pixels are simply retraced redundantly by whichever
//! tile needs them.

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator as _, ParallelIterator as _};

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::camera::Camera;
use crate::color::Rgba;
use crate::context::TraceContext;
use crate::error::RenderError;
use crate::filter::{BoxFilter, Filter};
use crate::framebuffer::FrameBuffer;
use crate::instance::TargetGroupId;
use crate::sampler::{self, PixelSample};
use crate::scene::Scene;
use crate::tiler::{self, Tile, DEFAULT_TILE_SIZE};
use crate::trace::trace;

pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_axis: u32,
    pub tile_size: u32,
    pub filter: Box<dyn Filter>,
}

impl RenderSettings {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            samples_per_axis: 2,
            tile_size: DEFAULT_TILE_SIZE,
            filter: Box::new(BoxFilter::default()),
        }
    }
}

/// Renders `scene` into a fresh [`FrameBuffer`], per `settings`.
pub fn render(scene: &Scene, settings: &RenderSettings) -> Result<FrameBuffer, RenderError> {
    scene.finalize()?;
    let camera = scene.camera()?;
    let target = scene.default_target();

    let tiles = tiler::tiles(settings.width, settings.height, settings.tile_size);

    let tile_pixels = trace_tiles(&tiles, scene, camera, target, settings);

    let mut fb = FrameBuffer::new(settings.width, settings.height, 4);
    for (tile, pixels) in tiles.iter().zip(tile_pixels) {
        let w = tile.width() as usize;
        for (i, rgba) in pixels.into_iter().enumerate() {
            let x = tile.x_min + (i % w) as u32;
            let y = tile.y_min + (i / w) as u32;
            let c: [f32; 4] = rgba.clamped().into();
            fb.set_pixel(x, y, &c);
        }
    }
    Ok(fb)
}

#[cfg(feature = "rayon")]
fn trace_tiles(
    tiles: &[Tile],
    scene: &Scene,
    camera: &Camera,
    target: TargetGroupId,
    settings: &RenderSettings,
) -> Vec<Vec<Rgba>> {
    tiles
        .into_par_iter()
        .map(|tile| trace_tile(tile, scene, camera, target, settings))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn trace_tiles(
    tiles: &[Tile],
    scene: &Scene,
    camera: &Camera,
    target: TargetGroupId,
    settings: &RenderSettings,
) -> Vec<Vec<Rgba>> {
    tiles
        .iter()
        .map(|tile| trace_tile(tile, scene, camera, target, settings))
        .collect()
}

/// One margin-widened tile's traced samples: for every pixel in
/// `[ext_x_min, ext_x_max) x [ext_y_min, ext_y_max)`, the stratified
/// samples drawn for that pixel together with their traced color.
struct TracedMargin {
    ext_x_min: u32,
    ext_y_min: u32,
    ext_width: u32,
    cells: Vec<Vec<(PixelSample, Rgba)>>,
}

impl TracedMargin {
    fn cell(&self, x: u32, y: u32) -> &[(PixelSample, Rgba)] {
        let idx = (y - self.ext_y_min) as usize * self.ext_width as usize + (x - self.ext_x_min) as usize;
        &self.cells[idx]
    }
}

fn trace_tile(
    tile: &Tile,
    scene: &Scene,
    camera: &Camera,
    target: TargetGroupId,
    settings: &RenderSettings,
) -> Vec<Rgba> {
    let margin = sampler::margin_pixels(settings.filter.radius());
    let ext_x_min = tile.x_min.saturating_sub(margin);
    let ext_y_min = tile.y_min.saturating_sub(margin);
    let ext_x_max = (tile.x_max + margin).min(settings.width);
    let ext_y_max = (tile.y_max + margin).min(settings.height);
    let ext_width = ext_x_max - ext_x_min;
    let ext_height = ext_y_max - ext_y_min;

    let limits = scene.limits();
    let mut cells = vec![Vec::new(); (ext_width * ext_height) as usize];
    let mut samples = Vec::new();

    for py in ext_y_min..ext_y_max {
        for px in ext_x_min..ext_x_max {
            // Seed deterministically from pixel coordinates: the same
            // pixel draws the same samples whichever tile (or thread)
            // retraces it as someone else's margin.
            let seed = (px as u64) << 32 | py as u64;
            let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
            sampler::stratified_samples(settings.samples_per_axis, &mut rng, &mut samples);

            let idx = (py - ext_y_min) as usize * ext_width as usize + (px - ext_x_min) as usize;
            cells[idx].reserve(samples.len());
            for sample in &samples {
                let sx = px as f64 + 0.5 + sample.dx;
                let sy = py as f64 + 0.5 + sample.dy;
                let ndc_x = (sx / settings.width as f64) * 2.0 - 1.0;
                let ndc_y = 1.0 - (sy / settings.height as f64) * 2.0;

                let ray = camera.ray(ndc_x, ndc_y);
                let time = camera.sample_time(sample.shutter_fraction);
                let ctx = TraceContext::camera(time, target, limits);
                let color = trace(scene, &ray, &ctx);

                cells[idx].push((*sample, color));
            }
        }
    }

    let traced = TracedMargin {
        ext_x_min,
        ext_y_min,
        ext_width,
        cells,
    };

    let mut out = Vec::with_capacity((tile.width() * tile.height()) as usize);
    for y in tile.y_min..tile.y_max {
        for x in tile.x_min..tile.x_max {
            out.push(gather_pixel(x, y, margin, ext_x_min, ext_y_min, ext_x_max, ext_y_max, &traced, settings));
        }
    }
    out
}

/// Reconstructs output pixel `(x, y)` from every traced sample within the
/// filter's support, in `(x, y)`'s own pixel and its margin neighbours.
#[allow(clippy::too_many_arguments)]
fn gather_pixel(
    x: u32,
    y: u32,
    margin: u32,
    ext_x_min: u32,
    ext_y_min: u32,
    ext_x_max: u32,
    ext_y_max: u32,
    traced: &TracedMargin,
    settings: &RenderSettings,
) -> Rgba {
    let nb_x_min = x.saturating_sub(margin).max(ext_x_min);
    let nb_y_min = y.saturating_sub(margin).max(ext_y_min);
    let nb_x_max = (x + margin + 1).min(ext_x_max);
    let nb_y_max = (y + margin + 1).min(ext_y_max);

    let mut weighted = Rgba::TRANSPARENT;
    let mut weight_sum = 0.0f64;

    for py in nb_y_min..nb_y_max {
        for px in nb_x_min..nb_x_max {
            for (sample, color) in traced.cell(px, py) {
                let dx = px as f64 - x as f64 + sample.dx;
                let dy = py as f64 - y as f64 + sample.dy;
                let w = settings.filter.weight(dx, dy);
                if w <= 0.0 {
                    continue;
                }
                weighted += *color * w as f32;
                weight_sum += w;
            }
        }
    }

    if weight_sum <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    weighted * (1.0 / weight_sum) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::GaussianFilter;
    use crate::group::ObjectGroup;
    use crate::instance::Instance;
    use crate::primitives::constant_shader::ConstantShader;
    use crate::primitives::sphere_set::SphereSet;
    use cgmath::{Point3, Rad, Vector3};
    use std::sync::Arc;

    fn single_sphere_scene() -> Scene {
        let mut scene = Scene::new();
        scene.set_camera(Camera::look_at(
            Point3::new(0.0, 0.0, -5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Rad(1.0),
            1.0,
            0.0,
            1.0,
        ));
        let set = Arc::new(SphereSet::new(vec![Point3::new(0.0, 0.0, 0.0)], vec![1.0]));
        let shader = Arc::new(ConstantShader {
            color: crate::color::Rgb::new(1.0, 0.0, 0.0),
        });
        let instance = Instance::new_surface(set, Some(shader), TargetGroupId(0));
        scene.push_group(ObjectGroup::new(vec![instance]));
        scene
    }

    #[test]
    fn center_pixel_sees_the_sphere() {
        let scene = single_sphere_scene();
        let mut settings = RenderSettings::new(16, 16);
        settings.samples_per_axis = 1;
        let fb = render(&scene, &settings).unwrap();
        let center = fb.pixel(8, 8);
        assert!(center[3] > 0.0, "center pixel should be covered by the sphere");
    }

    #[test]
    fn corner_pixel_misses_the_sphere() {
        let scene = single_sphere_scene();
        let mut settings = RenderSettings::new(16, 16);
        settings.samples_per_axis = 1;
        let fb = render(&scene, &settings).unwrap();
        let corner = fb.pixel(0, 0);
        assert_eq!(corner[3], 0.0);
    }

    #[test]
    fn rendering_without_a_camera_fails() {
        let mut scene = Scene::new();
        scene.push_group(ObjectGroup::new(Vec::new()));
        let settings = RenderSettings::new(4, 4);
        assert!(matches!(render(&scene, &settings), Err(RenderError::NoCamera)));
    }

    #[test]
    fn wide_filter_still_renders_a_full_image() {
        // A Gaussian filter with radius well above half a pixel forces a
        // multi-pixel margin; this only checks the margin/gather plumbing
        // doesn't panic or leave the image empty, not exact pixel values.
        let scene = single_sphere_scene();
        let mut settings = RenderSettings::new(16, 16);
        settings.samples_per_axis = 2;
        settings.filter = Box::new(GaussianFilter { radius: 2.0 });
        let fb = render(&scene, &settings).unwrap();
        let center = fb.pixel(8, 8);
        assert!(center[3] > 0.0);
    }
}

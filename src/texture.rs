//! Textures: a mipmapped 2-D color field sampled by uv coordinate, falling
//! back to [`Rgba::MISSING_TEXTURE`] (magenta) for any lookup against a
//! texture that failed to load, rather than propagating an error through
//! the shading hot path.

use crate::color::Rgba;

/// One mip level: a `width x height` grid of [`Rgba`] texels.
#[derive(Clone, Debug)]
struct MipLevel {
    width: u32,
    height: u32,
    texels: Vec<Rgba>,
}

impl MipLevel {
    fn texel(&self, x: u32, y: u32) -> Rgba {
        self.texels[(y * self.width + x) as usize]
    }
}

/// A mipmapped texture, or the sentinel "failed to load" state.
#[derive(Clone, Debug)]
pub enum Texture {
    Loaded { levels: Vec<MipLevel> },
    Missing,
}

impl Texture {
    /// Builds a texture from its base (level 0) image, generating
    /// successive half-resolution levels by 2x2 box downsampling until a
    /// `1x1` level is reached.
    pub fn from_base_level(width: u32, height: u32, texels: Vec<Rgba>) -> Self {
        assert_eq!(texels.len(), (width * height) as usize);
        let mut levels = vec![MipLevel {
            width,
            height,
            texels,
        }];
        loop {
            let prev = levels.last().unwrap();
            if prev.width <= 1 && prev.height <= 1 {
                break;
            }
            let w = (prev.width / 2).max(1);
            let h = (prev.height / 2).max(1);
            let mut next = vec![Rgba::TRANSPARENT; (w * h) as usize];
            for y in 0..h {
                for x in 0..w {
                    let mut sum = Rgba(cgmath::Vector4::new(0.0, 0.0, 0.0, 0.0));
                    let mut count = 0.0f32;
                    for dy in 0..2 {
                        for dx in 0..2 {
                            let sx = (x * 2 + dx).min(prev.width - 1);
                            let sy = (y * 2 + dy).min(prev.height - 1);
                            sum = sum + prev.texel(sx, sy);
                            count += 1.0;
                        }
                    }
                    next[(y * w + x) as usize] = sum * (1.0 / count);
                }
            }
            levels.push(MipLevel {
                width: w,
                height: h,
                texels: next,
            });
        }
        Texture::Loaded { levels }
    }

    /// The sentinel value for a texture that failed to load.
    pub fn missing() -> Self {
        Texture::Missing
    }

    /// Bilinearly samples `level` (clamped to the last level present) at
    /// `(u, v)`, wrapping both coordinates into `[0, 1)`. Returns
    /// [`Rgba::MISSING_TEXTURE`] for [`Texture::Missing`].
    pub fn sample(&self, u: f64, v: f64, level: u32) -> Rgba {
        let levels = match self {
            Texture::Missing => return Rgba::MISSING_TEXTURE,
            Texture::Loaded { levels } => levels,
        };
        let level = &levels[(level as usize).min(levels.len() - 1)];
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        let fx = u * level.width as f64 - 0.5;
        let fy = v * level.height as f64 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = (fx - x0) as f32;
        let ty = (fy - y0) as f32;

        let wrap = |v: f64, dim: u32| -> u32 {
            let v = v.rem_euclid(dim as f64);
            (v as u32).min(dim - 1)
        };
        let x0 = wrap(x0, level.width);
        let x1 = wrap(x0 as f64 + 1.0, level.width);
        let y0 = wrap(y0, level.height);
        let y1 = wrap(y0 as f64 + 1.0, level.height);

        let c00 = level.texel(x0, y0);
        let c10 = level.texel(x1, y0);
        let c01 = level.texel(x0, y1);
        let c11 = level.texel(x1, y1);

        let top = c00 * (1.0 - tx) + c10 * tx;
        let bottom = c01 * (1.0 - tx) + c11 * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

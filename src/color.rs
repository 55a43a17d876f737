//! Linear RGB(A) color storage.
//!
//! Geometric computation in this crate is fixed at 64-bit floats, but color
//! and opacity are stored as `f32`. Unlike the
//! shading math that produces them, the stored values here are never
//! NaN-checked: a hot shading loop performs divisions and reciprocals that
//! can transiently pass through non-finite intermediates, and panicking on
//! every pixel would be worse than clamping once at the edges (output,
//! framebuffer write).

use cgmath::{ElementWise as _, Vector3, Vector4};

/// A linear RGB color value. Components are nominally in `[0, 1]` but larger
/// values are permitted (bright light sources).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rgb(pub Vector3<f32>);

/// A linear RGBA color value with non-premultiplied alpha.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rgba(pub Vector4<f32>);

impl Rgb {
    /// Black.
    pub const ZERO: Rgb = Rgb(Vector3::new(0.0, 0.0, 0.0));
    /// White (unity brightness).
    pub const ONE: Rgb = Rgb(Vector3::new(1.0, 1.0, 1.0));

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self(Vector3::new(r, g, b))
    }

    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba(self.0.extend(alpha))
    }

    #[inline]
    pub fn with_alpha_one(self) -> Rgba {
        self.with_alpha(1.0)
    }

    #[inline]
    pub fn r(self) -> f32 {
        self.0.x
    }
    #[inline]
    pub fn g(self) -> f32 {
        self.0.y
    }
    #[inline]
    pub fn b(self) -> f32 {
        self.0.z
    }

    /// Clamps each component to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self(self.0.map(|c| c.clamp(0.0, 1.0)))
    }
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba(Vector4::new(0.0, 0.0, 0.0, 0.0));
    pub const BLACK: Rgba = Rgba(Vector4::new(0.0, 0.0, 0.0, 1.0));
    pub const WHITE: Rgba = Rgba(Vector4::new(1.0, 1.0, 1.0, 1.0));
    /// Sentinel color returned for texture lookups against an unloaded
    /// texture.
    pub const MISSING_TEXTURE: Rgba = Rgba(Vector4::new(1.0, 0.0, 1.0, 1.0));

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self(Vector4::new(r, g, b, a))
    }

    #[inline]
    pub fn to_rgb(self) -> Rgb {
        Rgb(self.0.truncate())
    }

    #[inline]
    pub fn alpha(self) -> f32 {
        self.0.w
    }

    #[inline]
    pub fn fully_transparent(self) -> bool {
        self.alpha() <= 0.0
    }

    #[inline]
    pub fn fully_opaque(self) -> bool {
        self.alpha() >= 1.0
    }

    /// Clamps color and alpha components to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self(self.0.map(|c| c.clamp(0.0, 1.0)))
    }

    /// Composites `self` as the nearer ("front") sample over `behind`, using
    /// the front-to-back operator used throughout the tracing kernel:
    /// `out.rgb = self.rgb*self.a + behind.rgb*(1-self.a)`,
    /// `out.a = self.a + behind.a*(1-self.a)`.
    #[inline]
    pub fn over(self, behind: Rgba) -> Rgba {
        let sa = self.alpha();
        let rgb = self.to_rgb().0 * sa + behind.to_rgb().0 * (1.0 - sa);
        let a = sa + behind.alpha() * (1.0 - sa);
        Rgba(rgb.extend(a))
    }
}

impl std::ops::Add for Rgb {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}
impl std::ops::AddAssign for Rgb {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}
impl std::ops::Mul for Rgb {
    type Output = Self;
    /// Componentwise multiplication.
    #[inline]
    fn mul(self, other: Self) -> Self {
        Self(self.0.mul_element_wise(other.0))
    }
}
impl std::ops::Mul<f32> for Rgb {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self(self.0 * scalar)
    }
}

impl std::ops::Add for Rgba {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}
impl std::ops::AddAssign for Rgba {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}
impl std::ops::Mul<f32> for Rgba {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self(self.0 * scalar)
    }
}

impl From<Rgb> for [f32; 3] {
    fn from(c: Rgb) -> Self {
        c.0.into()
    }
}
impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        c.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opaque_front_ignores_behind() {
        let front = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let behind = Rgba::new(0.0, 1.0, 0.0, 1.0);
        let result = front.over(behind);
        assert_eq!(result.to_rgb(), Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(result.alpha(), 1.0);
    }

    #[test]
    fn over_transparent_front_is_behind() {
        let front = Rgba::TRANSPARENT;
        let behind = Rgba::new(0.2, 0.3, 0.4, 0.5);
        assert_eq!(front.over(behind), behind);
    }

    #[test]
    fn over_idempotent_under_zero_alpha() {
        let behind = Rgba::new(0.2, 0.3, 0.4, 0.5);
        assert_eq!(Rgba::TRANSPARENT.over(behind), behind);
    }
}

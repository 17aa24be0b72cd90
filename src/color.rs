//! Sample types and pixel colors
//!
//! Textures store either 8-bit unsigned normalized samples (`u8`) or HDR
//! floating-point samples (`f32`). Both backends share the [`Sample`] trait so
//! buffers, samplers and the painter are written once.

use std::fmt::Debug;

/// Numeric interface shared by the 8-bit and HDR texture backends
pub trait Sample: Copy + Default + PartialEq + PartialOrd + Debug + 'static {
    /// Sample value representing full intensity (255 or 1.0)
    const MAX: Self;

    fn to_f32(self) -> f32;

    /// Convert from the sample domain. 8-bit samples clamp into [0, 255] and
    /// truncate toward zero.
    fn from_f32(v: f32) -> Self;

    /// Convert from an 8-bit value (identity for `u8`, `v / 255` for `f32`)
    fn from_u8(v: u8) -> Self;

    /// Sample normalized to [0, 1] (used for alpha)
    #[inline]
    fn unit(self) -> f32 {
        self.to_f32() / Self::MAX.to_f32()
    }

    /// Map a [0, 1] value into the sample domain
    #[inline]
    fn from_unit(v: f32) -> Self {
        Self::from_f32(v * Self::MAX.to_f32())
    }
}

impl Sample for u8 {
    const MAX: Self = 255;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        // `as` saturates and truncates
        v as u8
    }

    #[inline]
    fn from_u8(v: u8) -> Self {
        v
    }
}

impl Sample for f32 {
    const MAX: Self = 1.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }

    #[inline]
    fn from_u8(v: u8) -> Self {
        v as f32 / 255.0
    }
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// RGB pixel (8-bit or HDR depending on `T`)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb<T = u8> {
    pub r: T,
    pub g: T,
    pub b: T,
}

/// RGBA pixel (8-bit or HDR depending on `T`)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba<T = u8> {
    pub r: T,
    pub g: T,
    pub b: T,
    pub a: T,
}

impl<T: Sample> Rgb<T> {
    pub fn new(r: T, g: T, b: T) -> Self {
        Self { r, g, b }
    }

    /// Grayscale color (same value for R, G, B)
    pub fn gray(v: T) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Per-channel lerp; 8-bit results truncate
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let mix = |a: T, b: T| T::from_f32(lerp(a.to_f32(), b.to_f32(), t));
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    pub fn with_alpha(self, a: T) -> Rgba<T> {
        Rgba::new(self.r, self.g, self.b, a)
    }
}

impl<T: Sample> Rgba<T> {
    pub fn new(r: T, g: T, b: T, a: T) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(self) -> Rgb<T> {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Source-over compositing of `self` onto `dst`.
    ///
    /// `alpha = src.a / MAX` is computed in floating point and every channel,
    /// alpha included, becomes `src * alpha + dst * (1 - alpha)`.
    pub fn over(self, dst: Self) -> Self {
        let alpha = self.a.unit();
        let inv = 1.0 - alpha;
        let mix = |s: T, d: T| T::from_f32(s.to_f32() * alpha + d.to_f32() * inv);
        Self {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: mix(self.a, dst.a),
        }
    }
}

impl From<(u8, u8, u8)> for Rgb<u8> {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8, u8)> for Rgba<u8> {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self { r, g, b, a }
    }
}

/// A color the painter can write into one pixel.
///
/// Channels are written in `r, g, b, a` order up to the pixel's channel
/// count; a 1-channel target takes only `r`. `Rgb` overwrites, `Rgba`
/// composites source-over with the source alpha.
pub trait Color<T: Sample>: Copy {
    /// Write into `dst`, the samples of a single pixel
    fn paint(self, dst: &mut [T]);
}

impl<T: Sample> Color<T> for Rgb<T> {
    #[inline]
    fn paint(self, dst: &mut [T]) {
        for (d, s) in dst.iter_mut().zip([self.r, self.g, self.b]) {
            *d = s;
        }
    }
}

impl<T: Sample> Color<T> for Rgba<T> {
    #[inline]
    fn paint(self, dst: &mut [T]) {
        let alpha = self.a.unit();
        let inv = 1.0 - alpha;
        for (d, s) in dst.iter_mut().zip([self.r, self.g, self.b, self.a]) {
            *d = T::from_f32(s.to_f32() * alpha + d.to_f32() * inv);
        }
    }
}

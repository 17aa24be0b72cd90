//! Texture storage
//!
//! A [`Texture`] is a [`PixelBuffer`] whose consecutive samples are read and
//! written as RGB / RGBA pixels. `Texture<u8>` holds 8-bit normalized samples,
//! [`HdrTexture`] holds `f32` samples.

use std::ops::{Deref, DerefMut};

use crate::buffer::PixelBuffer;
use crate::color::{Rgb, Rgba, Sample};
use crate::error::Result;

/// A pixel buffer with semantic pixel accessors
#[derive(Debug, Clone, PartialEq)]
pub struct Texture<T = u8> {
    buffer: PixelBuffer<T>,
}

/// Floating-point texture
pub type HdrTexture = Texture<f32>;

impl<T: Sample> Texture<T> {
    /// Create a zero-filled texture
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        Ok(Self {
            buffer: PixelBuffer::new(width, height, channels)?,
        })
    }

    /// Create a texture from raw interleaved samples
    pub fn from_vec(width: usize, height: usize, channels: usize, data: Vec<T>) -> Result<Self> {
        Ok(Self {
            buffer: PixelBuffer::from_vec(width, height, channels, data)?,
        })
    }

    /// Read three samples at pixel `(x, y)`. Unchecked.
    #[inline]
    pub fn get_rgb(&self, x: usize, y: usize) -> Rgb<T> {
        self.get_rgb_at(self.index(x, y))
    }

    /// Read three samples starting at a raw sample index. Unchecked.
    #[inline]
    pub fn get_rgb_at(&self, index: usize) -> Rgb<T> {
        let d = self.data();
        Rgb::new(d[index], d[index + 1], d[index + 2])
    }

    /// Read four samples at pixel `(x, y)`. Unchecked.
    #[inline]
    pub fn get_rgba(&self, x: usize, y: usize) -> Rgba<T> {
        self.get_rgba_at(self.index(x, y))
    }

    #[inline]
    pub fn get_rgba_at(&self, index: usize) -> Rgba<T> {
        let d = self.data();
        Rgba::new(d[index], d[index + 1], d[index + 2], d[index + 3])
    }

    /// Overwrite three samples at `(x, y)` without blending
    #[inline]
    pub fn set_rgb(&mut self, x: usize, y: usize, color: Rgb<T>) {
        let index = self.index(x, y);
        let d = &mut self.data_mut()[index..index + 3];
        d[0] = color.r;
        d[1] = color.g;
        d[2] = color.b;
    }

    /// Overwrite four samples at `(x, y)` without blending
    #[inline]
    pub fn set_rgba(&mut self, x: usize, y: usize, color: Rgba<T>) {
        let index = self.index(x, y);
        let d = &mut self.data_mut()[index..index + 4];
        d[0] = color.r;
        d[1] = color.g;
        d[2] = color.b;
        d[3] = color.a;
    }

    /// Color at `(x, y)` for any channel count: 1- and 2-channel textures
    /// read as gray.
    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> Rgb<T> {
        let index = self.index(x, y);
        if self.channels() >= 3 {
            self.get_rgb_at(index)
        } else {
            Rgb::gray(self.data()[index])
        }
    }

    pub fn buffer(&self) -> &PixelBuffer<T> {
        &self.buffer
    }
}

impl<T> Deref for Texture<T> {
    type Target = PixelBuffer<T>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl<T> DerefMut for Texture<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

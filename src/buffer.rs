//! Flat, channel-interleaved, row-major sample storage
//!
//! `index(col, row) = row * width * channels + col * channels`. The inverse
//! mapping is `col = (index / channels) % width`, `row = (index / channels) / width`.

use crate::color::Sample;
use crate::error::{Error, Result};

/// Contiguous store of `width * height * channels` samples
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer<T = u8> {
    data: Vec<T>,
    width: usize,
    height: usize,
    channels: usize,
}

fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize> {
    let invalid = Error::InvalidDimensions {
        width,
        height,
        channels,
    };
    if width == 0 || height == 0 || channels == 0 {
        return Err(invalid);
    }
    width
        .checked_mul(height)
        .and_then(|area| area.checked_mul(channels))
        .ok_or(invalid)
}

impl<T: Sample> PixelBuffer<T> {
    /// Create a zero-filled buffer. Fails on any zero dimension.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        let len = checked_len(width, height, channels)?;
        Ok(Self {
            data: vec![T::default(); len],
            width,
            height,
            channels,
        })
    }

    /// Wrap an existing flat sample vector
    pub fn from_vec(width: usize, height: usize, channels: usize, data: Vec<T>) -> Result<Self> {
        let expected = checked_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Reallocate for new dimensions. Prior contents are discarded and the
    /// buffer is zero-filled.
    pub fn set_size(&mut self, width: usize, height: usize, channels: usize) -> Result<()> {
        let len = checked_len(width, height, channels)?;
        self.data = vec![T::default(); len];
        self.width = width;
        self.height = height;
        self.channels = channels;
        Ok(())
    }

    /// Copy an external flat array into the buffer, sample for sample
    pub fn copy_from(&mut self, src: &[T]) -> Result<()> {
        if src.len() != self.data.len() {
            return Err(Error::SizeMismatch {
                expected: self.data.len(),
                actual: src.len(),
            });
        }
        self.data.copy_from_slice(src);
        Ok(())
    }

    /// Copy the buffer out into an external flat array, sample for sample
    pub fn copy_to(&self, dst: &mut [T]) -> Result<()> {
        if dst.len() != self.data.len() {
            return Err(Error::SizeMismatch {
                expected: self.data.len(),
                actual: dst.len(),
            });
        }
        dst.copy_from_slice(&self.data);
        Ok(())
    }

    /// Reset every sample to zero
    pub fn set_zero(&mut self) {
        self.data.fill(T::default());
    }
}

impl<T> PixelBuffer<T> {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Total sample count (`width * height * channels`)
    #[inline]
    pub fn length(&self) -> usize {
        self.data.len()
    }

    /// Pixel count (`width * height`)
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Row stride in bytes
    #[inline]
    pub fn pitch(&self) -> usize {
        self.width * self.channels * std::mem::size_of::<T>()
    }

    /// Base sample index of pixel `(col, row)`. Unchecked: callers must keep
    /// `col < width` and `row < height`.
    #[inline]
    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.width * self.channels + col * self.channels
    }

    #[inline]
    pub fn col(&self, index: usize) -> usize {
        (index / self.channels) % self.width
    }

    #[inline]
    pub fn row(&self, index: usize) -> usize {
        (index / self.channels) / self.width
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl PixelBuffer<u8> {
    /// Raw bytes for presentation / codec hand-off
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

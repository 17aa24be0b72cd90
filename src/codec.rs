//! Image file decode / encode for 8-bit textures
//!
//! Thin wrapper over the `image` crate. Decoded pixels keep their channel
//! count for gray, gray+alpha, RGB and RGBA sources; anything else is
//! converted to RGBA8.

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder};

use crate::error::{Error, Result};
use crate::texture::Texture;

fn color_type(channels: usize) -> Result<ColorType> {
    match channels {
        1 => Ok(ColorType::L8),
        2 => Ok(ColorType::La8),
        3 => Ok(ColorType::Rgb8),
        4 => Ok(ColorType::Rgba8),
        n => Err(Error::UnsupportedChannels(n)),
    }
}

fn dims_u32(tex: &Texture<u8>) -> Result<(u32, u32)> {
    let invalid = || Error::InvalidDimensions {
        width: tex.width(),
        height: tex.height(),
        channels: tex.channels(),
    };
    let w = u32::try_from(tex.width()).map_err(|_| invalid())?;
    let h = u32::try_from(tex.height()).map_err(|_| invalid())?;
    Ok((w, h))
}

fn from_dynamic(img: DynamicImage) -> Result<Texture<u8>> {
    let (w, h, channels, raw) = match img.color() {
        ColorType::L8 => {
            let b = img.into_luma8();
            (b.width(), b.height(), 1, b.into_raw())
        },
        ColorType::La8 => {
            let b = img.into_luma_alpha8();
            (b.width(), b.height(), 2, b.into_raw())
        },
        ColorType::Rgb8 => {
            let b = img.into_rgb8();
            (b.width(), b.height(), 3, b.into_raw())
        },
        _ => {
            let b = img.into_rgba8();
            (b.width(), b.height(), 4, b.into_raw())
        },
    };
    log::debug!("decoded {}x{} image with {} channels", w, h, channels);
    Texture::from_vec(w as usize, h as usize, channels, raw)
}

impl Texture<u8> {
    /// Decode an encoded image (PNG, BMP) from memory
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        from_dynamic(image::load_from_memory(bytes)?)
    }

    /// Encode as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let (w, h) = dims_u32(self)?;
        let color = color_type(self.channels())?;
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(self.as_bytes(), w, h, color)?;
        Ok(out)
    }

    /// Load a picture from disk
    pub fn load_picture(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes)
    }

    /// Write a picture to disk; the format follows the file extension
    pub fn write_picture(&self, path: impl AsRef<Path>) -> Result<()> {
        let (w, h) = dims_u32(self)?;
        let color = color_type(self.channels())?;
        image::save_buffer(path.as_ref(), self.as_bytes(), w, h, color)?;
        log::info!("wrote {}x{} picture to {}", w, h, path.as_ref().display());
        Ok(())
    }
}

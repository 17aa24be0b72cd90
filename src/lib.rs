//! Software 2D rendering core
//!
//! CPU pixel buffers and textures (8-bit and HDR), image views with lazily
//! rebuilt mip / rip-map data, UV samplers, a painter that rasterizes lines,
//! rectangles, circles, polygons and Perlin noise, and a seeded noise
//! generator.

pub mod buffer;
pub mod codec;
pub mod color;
#[cfg(feature = "window")]
pub mod display;
pub mod error;
pub mod geometry;
pub mod noise;
pub mod painter;
pub mod texture;
pub mod util;
pub mod view;

pub use buffer::PixelBuffer;
pub use color::{Color, Rgb, Rgba, Sample};
pub use error::{Error, Result};
pub use geometry::{Point, Polygon};
pub use noise::NoiseGenerator;
pub use painter::Painter;
pub use texture::{HdrTexture, Texture};
pub use view::{Filter, Frame, ImageView, RipAxis, Sampler, UndersamplingFix, ViewConfig, Wrap};

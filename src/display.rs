//! SDL2 presentation of finished frames

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::error::{Error, Result};
use crate::view::Frame;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
}

/// Streaming window texture matching one frame layout
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
    channels: usize,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

fn pixel_format(channels: usize) -> Result<PixelFormatEnum> {
    match channels {
        3 => Ok(PixelFormatEnum::RGB24),
        // Packed formats are named by word order; pick the one storing R,G,B,A bytes
        4 if cfg!(target_endian = "little") => Ok(PixelFormatEnum::ABGR8888),
        4 => Ok(PixelFormatEnum::RGBA8888),
        n => Err(Error::UnsupportedChannels(n)),
    }
}

impl Display {
    /// Create display with custom resolution and VSync settings
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(Error::display)?;
        let video_subsystem = sdl_context.video().map_err(Error::display)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(Error::display)?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(Error::display)?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(Error::display)?;

        log::info!("opened {}x{} window (vsync: {})", width, height, vsync);
        Ok((
            Self { canvas, event_pump },
            texture_creator,
        ))
    }

    /// Upload a finished frame and flip
    pub fn present(&mut self, target: &mut RenderTarget, frame: &Frame<'_, u8>) -> Result<()> {
        if frame.width as u32 != target.width
            || frame.height as u32 != target.height
            || frame.channels != target.channels
        {
            return Err(Error::display(format!(
                "frame {}x{}x{} does not match render target {}x{}x{}",
                frame.width, frame.height, frame.channels, target.width, target.height, target.channels
            )));
        }

        target
            .texture
            .update(None, frame.samples, frame.pitch)
            .map_err(Error::display)?;

        self.canvas
            .copy(&target.texture, None, None)
            .map_err(Error::display)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create a streaming texture for frames of the given layout
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<Self> {
        let texture = texture_creator
            .create_texture_streaming(pixel_format(channels)?, width, height)
            .map_err(Error::display)?;
        Ok(Self {
            texture,
            width,
            height,
            channels,
        })
    }
}

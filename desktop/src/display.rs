use minifb::{Window, WindowOptions};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use mango8::{FrameView, HEIGHT, WIDTH};

use crate::config::Config;
use crate::error::Error;

/// minifb window painting each CHIP-8 pixel as a scale x scale rect,
/// optionally with a background-colored outline around lit cells.
pub struct Renderer {
    window: Window,
    buffer: Vec<u32>,
    fg: u32,
    bg: u32,
    scale: usize,
    outlines: bool,
}

/// The display contract speaks RGBA8888; minifb wants 0RGB words.
pub(crate) fn rgba_to_0rgb(rgba: u32) -> u32 {
    rgba >> 8
}

impl Renderer {
    pub fn new(title: &str, config: &Config) -> Result<Self, Error> {
        let width = WIDTH * config.scale;
        let height = HEIGHT * config.scale;
        let bg = rgba_to_0rgb(config.bg_color);
        let window = Window::new(title, width, height, WindowOptions::default())?;
        Ok(Self {
            window,
            buffer: vec![bg; width * height],
            fg: rgba_to_0rgb(config.fg_color),
            bg,
            scale: config.scale,
            outlines: config.pixel_outlines,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Repaint the whole grid and flush it to the window. minifb also
    /// drains its event queue here, so this must run every frame even
    /// while the machine is paused.
    pub fn draw(&mut self, frame: FrameView<'_>) {
        let scale = self.scale;
        let pitch = WIDTH * scale;
        for (y, row) in frame.iter_rows_as_bitslices().enumerate() {
            for (x, lit) in row.iter().by_vals().enumerate() {
                let fill = if lit { self.fg } else { self.bg };
                for sy in 0..scale {
                    let base = (y * scale + sy) * pitch + x * scale;
                    for sx in 0..scale {
                        let on_edge = sx == 0 || sx == scale - 1 || sy == 0 || sy == scale - 1;
                        self.buffer[base + sx] = if lit && self.outlines && on_edge {
                            self.bg
                        } else {
                            fill
                        };
                    }
                }
            }
        }
        if let Err(err) = self
            .window
            .update_with_buffer(&self.buffer, pitch, HEIGHT * scale)
        {
            warn!("dropped a frame: {}", err);
        }
    }
}

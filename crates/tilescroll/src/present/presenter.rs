use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::render::{compose, Layer, LayerSink, LayerSource, Rgba, Sprite};

use super::atlas::SpriteAtlas;
use super::raster::{clear, draw_texture_centered_scaled};

const CLEAR_COLOR: Rgba = [0, 0, 0, 255];

/// Owns the window surface and turns composed layers into pixels.
pub struct Presenter {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Presenter {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Draws one frame and returns how many sprites reached the buffer.
    pub fn present(
        &mut self,
        source: &impl LayerSource,
        atlas: &SpriteAtlas,
    ) -> Result<usize, Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(0);
        }
        let mut canvas = FrameCanvas::new(self.pixels.frame_mut(), self.width, self.height, atlas);
        canvas.clear(CLEAR_COLOR);
        compose(source, &mut canvas);
        let drawn = canvas.sprites_drawn();
        self.pixels.render()?;
        Ok(drawn)
    }
}

/// Software rasterizer for one frame buffer.
///
/// Sprite positions arrive with y growing upward from the bottom edge and
/// are flipped into the buffer's top-down rows here.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    atlas: &'a SpriteAtlas,
    drawn: usize,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32, atlas: &'a SpriteAtlas) -> Self {
        Self {
            frame,
            width,
            height,
            atlas,
            drawn: 0,
        }
    }

    pub fn sprites_drawn(&self) -> usize {
        self.drawn
    }

    pub fn clear(&mut self, color: Rgba) {
        clear(self.frame, color);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, scale: f32) {
        if sprite.texture.is_transparent() {
            return;
        }
        let Some(texture) = self.atlas.texture(sprite.texture) else {
            return;
        };
        let center_x = sprite.position.x.round() as i32;
        let center_y = (self.height as f32 - sprite.position.y).round() as i32;
        draw_texture_centered_scaled(
            self.frame,
            self.width,
            self.height,
            center_x,
            center_y,
            texture,
            scale,
            sprite.tint,
        );
        self.drawn += 1;
    }
}

impl LayerSink for FrameCanvas<'_> {
    fn draw_layer(&mut self, _layer: Layer, sprites: &[Sprite], scale: f32) {
        for sprite in sprites {
            self.draw_sprite(sprite, scale);
        }
    }
}

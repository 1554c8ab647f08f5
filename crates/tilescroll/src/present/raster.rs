use crate::render::{Rgba, WHITE_TINT};

/// Decoded RGBA8 pixels, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Texture {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            rgba: Vec::new(),
        }
    }

    pub fn solid(width: u32, height: u32, color: Rgba) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Builds a texture by evaluating `pixel(x, y)` for every cell.
    pub fn from_fn(width: u32, height: u32, pixel: impl Fn(u32, u32) -> Rgba) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&pixel(x, y));
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Copies a sub-rectangle. Cells outside the source come back transparent.
    pub fn crop(&self, left: u32, top: u32, width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |x, y| {
            self.pixel(left + x, top + y).unwrap_or([0, 0, 0, 0])
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn is_drawable(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() >= self.width as usize * self.height as usize * 4
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.rgba.chunks_exact(4).all(|pixel| pixel[3] == 0)
    }
}

pub fn clear(frame: &mut [u8], color: Rgba) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

pub fn normalized_sprite_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

pub fn scaled_sprite_dimensions(texture: &Texture, scale: f32) -> (u32, u32) {
    let scale = normalized_sprite_scale(scale);
    let width = ((texture.width as f32) * scale).round().max(1.0) as u32;
    let height = ((texture.height as f32) * scale).round().max(1.0) as u32;
    (width, height)
}

/// Nearest-neighbor blit centered on `(center_x, center_y)` in buffer
/// coordinates. Fully transparent source pixels are skipped; everything else
/// is multiplied by `tint` and written as is.
pub fn draw_texture_centered_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    center_x: i32,
    center_y: i32,
    texture: &Texture,
    scale: f32,
    tint: Rgba,
) {
    if !texture.is_drawable() || width == 0 || height == 0 {
        return;
    }
    if frame.len() < width as usize * height as usize * 4 {
        return;
    }

    let scale = normalized_sprite_scale(scale);
    let inv_scale = scale.recip();
    let (scaled_w, scaled_h) = scaled_sprite_dimensions(texture, scale);
    let left = center_x - (scaled_w as i32 / 2);
    let top = center_y - (scaled_h as i32 / 2);
    let right = left + scaled_w as i32;
    let bottom = top + scaled_h as i32;

    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = right.min(width as i32);
    let draw_bottom = bottom.min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = width as usize;
    let texture_width = texture.width as usize;

    for out_y in draw_top..draw_bottom {
        let dy = out_y - top;
        let src_y = ((dy as f32) * inv_scale).floor() as u32;
        let src_y = src_y.min(texture.height - 1) as usize;
        let src_row_offset = src_y * texture_width * 4;
        let dst_row_offset = out_y as usize * frame_width * 4;

        for out_x in draw_left..draw_right {
            let dx = out_x - left;
            let src_x = ((dx as f32) * inv_scale).floor() as u32;
            let src_x = src_x.min(texture.width - 1) as usize;
            let src_offset = src_row_offset + src_x * 4;
            let alpha = texture.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = dst_row_offset + out_x as usize * 4;
            let source = [
                texture.rgba[src_offset],
                texture.rgba[src_offset + 1],
                texture.rgba[src_offset + 2],
                alpha,
            ];
            frame[dst_offset..dst_offset + 4].copy_from_slice(&apply_tint(source, tint));
        }
    }
}

pub fn apply_tint(color: Rgba, tint: Rgba) -> Rgba {
    if tint == WHITE_TINT {
        return color;
    }
    let channel = |value: u8, factor: u8| ((value as u16 * factor as u16 + 127) / 255) as u8;
    [
        channel(color[0], tint[0]),
        channel(color[1], tint[1]),
        channel(color[2], tint[2]),
        channel(color[3], tint[3]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];

    fn frame(width: u32, height: u32) -> Vec<u8> {
        vec![0; width as usize * height as usize * 4]
    }

    fn pixel_at(frame: &[u8], width: u32, x: u32, y: u32) -> Rgba {
        let offset = (y as usize * width as usize + x as usize) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn scaled_sprite_dimensions_multiplies_native_size() {
        let texture = Texture::solid(10, 30, RED);
        assert_eq!(scaled_sprite_dimensions(&texture, 3.0), (30, 90));
        assert_eq!(scaled_sprite_dimensions(&texture, f32::NAN), (10, 30));
    }

    #[test]
    fn blit_covers_scaled_square_around_center() {
        let mut buffer = frame(8, 8);
        draw_texture_centered_scaled(
            &mut buffer,
            8,
            8,
            4,
            4,
            &Texture::solid(2, 2, RED),
            2.0,
            WHITE_TINT,
        );

        assert_eq!(pixel_at(&buffer, 8, 2, 2), RED);
        assert_eq!(pixel_at(&buffer, 8, 5, 5), RED);
        assert_eq!(pixel_at(&buffer, 8, 1, 1), [0, 0, 0, 0]);
        assert_eq!(pixel_at(&buffer, 8, 6, 6), [0, 0, 0, 0]);
    }

    #[test]
    fn blit_clips_at_buffer_edges() {
        let mut buffer = frame(4, 4);
        draw_texture_centered_scaled(
            &mut buffer,
            4,
            4,
            0,
            0,
            &Texture::solid(4, 4, RED),
            1.0,
            WHITE_TINT,
        );
        draw_texture_centered_scaled(&mut buffer, 4, 4, 100, -100, &Texture::solid(4, 4, RED), 1.0, WHITE_TINT);

        assert_eq!(pixel_at(&buffer, 4, 0, 0), RED);
        assert_eq!(pixel_at(&buffer, 4, 1, 1), RED);
        assert_eq!(pixel_at(&buffer, 4, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn transparent_pixels_keep_background() {
        let mut buffer = frame(2, 1);
        clear(&mut buffer, [9, 9, 9, 255]);
        let texture = Texture::from_fn(2, 1, |x, _| if x == 0 { RED } else { [0, 0, 0, 0] });
        draw_texture_centered_scaled(&mut buffer, 2, 1, 1, 0, &texture, 1.0, WHITE_TINT);

        assert_eq!(pixel_at(&buffer, 2, 0, 0), RED);
        assert_eq!(pixel_at(&buffer, 2, 1, 0), [9, 9, 9, 255]);
    }

    #[test]
    fn tint_multiplies_channels() {
        assert_eq!(apply_tint([255, 255, 255, 255], [255, 255, 0, 255]), [255, 255, 0, 255]);
        assert_eq!(apply_tint([200, 100, 50, 255], [128, 128, 128, 255]), [100, 50, 25, 255]);
        assert_eq!(apply_tint([1, 2, 3, 4], WHITE_TINT), [1, 2, 3, 4]);
    }

    #[test]
    fn crop_pads_outside_source_with_transparency() {
        let sheet = Texture::from_fn(4, 4, |x, y| [x as u8, y as u8, 0, 255]);
        let cell = sheet.crop(2, 2, 3, 3);

        assert_eq!(cell.pixel(0, 0), Some([2, 2, 0, 255]));
        assert_eq!(cell.pixel(1, 1), Some([3, 3, 0, 255]));
        assert_eq!(cell.pixel(2, 2), Some([0, 0, 0, 0]));
        assert!(!cell.is_fully_transparent());
    }
}

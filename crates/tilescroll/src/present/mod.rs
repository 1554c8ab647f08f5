mod atlas;
mod presenter;
mod raster;

pub use atlas::{
    hatch_texture, validate_sprite_name, SpriteAtlas, SpriteNameError, FONT_SHEET_NAME,
    GLYPHS_PER_ROW, SEPARATOR_SPRITE_NAME,
};
pub use presenter::{FrameCanvas, Presenter};
pub use raster::{
    apply_tint, clear, draw_texture_centered_scaled, normalized_sprite_scale,
    scaled_sprite_dimensions, Texture,
};

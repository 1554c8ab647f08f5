//! Loads sprite sheets into textures addressed by `TextureId`.
//!
//! Every sprite lives at `<sprites_dir>/<name>.png`. Anything that fails to
//! load is replaced by a generated texture so the frame still renders, and
//! the failure is logged once per name.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{info, warn};

use crate::render::{
    GlyphLookup, Rgba, TextureId, TileLookup, TransitionAxis, TransitionKind, GLYPH_SIZE_PX,
};
use crate::world::tiles::{fallback_color, known_tiles};
use crate::world::{EXPLOSION_BLAST, EXPLOSION_SMOKE_1, EXPLOSION_SMOKE_2};

use super::raster::Texture;

pub const FONT_SHEET_NAME: &str = "font";
pub const SEPARATOR_SPRITE_NAME: &str = "icon_separator";
pub const GLYPHS_PER_ROW: u32 = 16;

const HATCH_SIZE_PX: u32 = 30;
const HATCH_COLOR: Rgba = [103, 103, 103, 255];
const SEPARATOR_SIZE_PX: (u32, u32) = (3, 30);
const SEPARATOR_COLOR: Rgba = [60, 60, 60, 255];
const PLACEHOLDER_COLOR: Rgba = [220, 220, 240, 255];
const FALLBACK_GLYPH_COLOR: Rgba = [255, 255, 255, 255];
const EXPLOSION_SPRITES: [(u8, &str, Rgba); 3] = [
    (EXPLOSION_BLAST, "explosion", [250, 170, 40, 255]),
    (EXPLOSION_SMOKE_1, "smoke1", [150, 150, 150, 255]),
    (EXPLOSION_SMOKE_2, "smoke2", [90, 90, 90, 255]),
];
const TRANSITION_KIND_COUNT: usize = TransitionKind::ALL.len();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteNameError {
    #[error("sprite name must not be empty")]
    Empty,
    #[error("sprite name must not contain '..'")]
    ParentTraversal,
    #[error("sprite name contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub fn validate_sprite_name(name: &str) -> Result<(), SpriteNameError> {
    if name.is_empty() {
        return Err(SpriteNameError::Empty);
    }
    if name.contains("..") {
        return Err(SpriteNameError::ParentTraversal);
    }
    for ch in name.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-') {
            continue;
        }
        return Err(SpriteNameError::InvalidCharacter { character: ch });
    }
    Ok(())
}

/// What to generate when a sprite cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Solid { width: u32, height: u32, color: Rgba },
    Transparent,
}

impl Fallback {
    fn texture(self) -> Option<Texture> {
        match self {
            Self::Solid {
                width,
                height,
                color,
            } => Some(Texture::solid(width, height, color)),
            Self::Transparent => None,
        }
    }
}

#[derive(Debug)]
pub struct SpriteAtlas {
    sprites_dir: PathBuf,
    tile_px: u32,
    textures: Vec<Texture>,
    by_name: HashMap<String, TextureId>,
    tiles: [TextureId; 256],
    transitions: [[TextureId; TRANSITION_KIND_COUNT]; 2],
    explosions: [TextureId; 4],
    glyphs: [TextureId; 256],
    hatch: TextureId,
    separator: TextureId,
    warned_names: HashSet<String>,
}

impl SpriteAtlas {
    /// Loads every tile, transition, explosion and UI sprite up front.
    /// Entity sprites are loaded on first `resolve`.
    pub fn load(sprites_dir: &Path, tile_px: u32) -> Self {
        let mut atlas = Self {
            sprites_dir: sprites_dir.to_path_buf(),
            tile_px,
            textures: vec![Texture::empty()],
            by_name: HashMap::new(),
            tiles: [TextureId::TRANSPARENT; 256],
            transitions: [[TextureId::TRANSPARENT; TRANSITION_KIND_COUNT]; 2],
            explosions: [TextureId::TRANSPARENT; 4],
            glyphs: [TextureId::TRANSPARENT; 256],
            hatch: TextureId::TRANSPARENT,
            separator: TextureId::TRANSPARENT,
            warned_names: HashSet::new(),
        };

        for (tile_id, name) in known_tiles() {
            let fallback = atlas.tile_fallback(fallback_color(tile_id));
            atlas.tiles[tile_id as usize] = atlas.resolve_with(name, fallback);
        }
        for axis in [TransitionAxis::Horizontal, TransitionAxis::Vertical] {
            for kind in TransitionKind::ALL {
                let Some(name) = kind.sprite_name(axis) else {
                    continue;
                };
                atlas.transitions[axis_slot(axis)][kind.index() as usize] =
                    atlas.resolve_with(&name, Fallback::Transparent);
            }
        }
        for (state, name, color) in EXPLOSION_SPRITES {
            let fallback = atlas.tile_fallback(color);
            atlas.explosions[state as usize] = atlas.resolve_with(name, fallback);
        }
        atlas.load_font();
        atlas.hatch = atlas.insert("hatch", hatch_texture());
        atlas.separator = atlas.resolve_with(
            SEPARATOR_SPRITE_NAME,
            Fallback::Solid {
                width: SEPARATOR_SIZE_PX.0,
                height: SEPARATOR_SIZE_PX.1,
                color: SEPARATOR_COLOR,
            },
        );

        info!(
            sprites_dir = %atlas.sprites_dir.display(),
            textures = atlas.textures.len() - 1,
            "sprite_atlas_loaded"
        );
        atlas
    }

    /// Returns the texture for `name`, loading it on first use. Missing
    /// sprites resolve to a tile-sized placeholder.
    pub fn resolve(&mut self, name: &str) -> TextureId {
        let fallback = self.tile_fallback(PLACEHOLDER_COLOR);
        self.resolve_with(name, fallback)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        if id.is_transparent() {
            return None;
        }
        self.textures.get(id.0 as usize)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len() - 1
    }

    pub fn sprites_dir(&self) -> &Path {
        &self.sprites_dir
    }

    fn tile_fallback(&self, color: Rgba) -> Fallback {
        Fallback::Solid {
            width: self.tile_px,
            height: self.tile_px,
            color,
        }
    }

    fn resolve_with(&mut self, name: &str, fallback: Fallback) -> TextureId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let texture = match self.sprite_path(name) {
            Ok(path) => match load_texture(&path) {
                Ok(texture) => Some(texture),
                Err(reason) => {
                    self.warn_load_once(name, Some(&path), &reason);
                    fallback.texture()
                }
            },
            Err(reason) => {
                self.warn_load_once(name, None, &reason);
                fallback.texture()
            }
        };
        match texture {
            Some(texture) => self.insert(name, texture),
            None => {
                self.by_name.insert(name.to_string(), TextureId::TRANSPARENT);
                TextureId::TRANSPARENT
            }
        }
    }

    fn insert(&mut self, name: &str, texture: Texture) -> TextureId {
        let Ok(raw) = u16::try_from(self.textures.len()) else {
            self.warn_load_once(name, None, "atlas_full");
            return TextureId::TRANSPARENT;
        };
        let id = TextureId(raw);
        self.textures.push(texture);
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn sprite_path(&self, name: &str) -> Result<PathBuf, String> {
        validate_sprite_name(name).map_err(|error| format!("invalid_name:{error}"))?;
        Ok(self.sprites_dir.join(format!("{name}.png")))
    }

    fn load_font(&mut self) {
        let cell = GLYPH_SIZE_PX as u32;
        let sheet = match self.sprite_path(FONT_SHEET_NAME) {
            Ok(path) => match load_texture(&path) {
                Ok(sheet) => Some(sheet),
                Err(reason) => {
                    self.warn_load_once(FONT_SHEET_NAME, Some(&path), &reason);
                    None
                }
            },
            Err(reason) => {
                self.warn_load_once(FONT_SHEET_NAME, None, &reason);
                None
            }
        };

        for code in 0..=u8::MAX {
            let glyph = match &sheet {
                Some(sheet) => {
                    let left = (code as u32 % GLYPHS_PER_ROW) * cell;
                    let top = (code as u32 / GLYPHS_PER_ROW) * cell;
                    sheet.crop(left, top, cell, cell)
                }
                None => fallback_glyph(code, cell),
            };
            if glyph.is_fully_transparent() {
                continue;
            }
            self.glyphs[code as usize] = self.insert(&format!("{FONT_SHEET_NAME}_{code}"), glyph);
        }
    }

    fn warn_load_once(&mut self, name: &str, path: Option<&Path>, reason: &str) {
        if !self.warned_names.insert(name.to_string()) {
            return;
        }
        let path_display = path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<unresolved>".to_string());
        warn!(
            sprite = name,
            path = %path_display,
            reason = reason,
            "sprite_load_failed_using_fallback"
        );
    }
}

impl TileLookup for SpriteAtlas {
    fn tile_texture(&self, tile_id: u8) -> TextureId {
        self.tiles[tile_id as usize]
    }

    fn transition_texture(&self, axis: TransitionAxis, kind: TransitionKind) -> TextureId {
        self.transitions[axis_slot(axis)][kind.index() as usize]
    }

    fn explosion_texture(&self, state: u8) -> TextureId {
        self.explosions
            .get(state as usize)
            .copied()
            .unwrap_or(TextureId::TRANSPARENT)
    }
}

impl GlyphLookup for SpriteAtlas {
    fn glyph_texture(&self, code: u8) -> TextureId {
        self.glyphs[code as usize]
    }

    fn hatch_texture(&self) -> TextureId {
        self.hatch
    }

    fn separator_texture(&self) -> TextureId {
        self.separator
    }
}

fn axis_slot(axis: TransitionAxis) -> usize {
    match axis {
        TransitionAxis::Horizontal => 0,
        TransitionAxis::Vertical => 1,
    }
}

fn load_texture(path: &Path) -> Result<Texture, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(Texture {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// Diagonal cross-hatch laid over inventory slots that are not selected.
pub fn hatch_texture() -> Texture {
    Texture::from_fn(HATCH_SIZE_PX, HATCH_SIZE_PX, |x, y| {
        if (x + y) % 4 == 0 {
            HATCH_COLOR
        } else {
            [0, 0, 0, 0]
        }
    })
}

// Printable characters become a hollow box so text length stays visible.
fn fallback_glyph(code: u8, cell: u32) -> Texture {
    if !code.is_ascii_graphic() {
        return Texture::from_fn(cell, cell, |_, _| [0, 0, 0, 0]);
    }
    let last = cell.saturating_sub(2);
    Texture::from_fn(cell, cell, |x, y| {
        let inside = (1..=last).contains(&x) && (1..=last).contains(&y);
        let edge = x == 1 || x == last || y == 1 || y == last;
        if inside && edge {
            FALLBACK_GLYPH_COLOR
        } else {
            [0, 0, 0, 0]
        }
    })
}

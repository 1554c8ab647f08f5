//! Coordinate model shared by the viewport, sampler and entity positioner.
//!
//! Map space: tile units, origin at the top-left cell, y grows downward.
//! Presentation space: pixels, origin at the bottom-left of the window,
//! y grows upward. Every sprite position produced by this crate is a
//! sprite center in presentation space.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SPRITE_SIZE_PX: u32 = 10;
pub const SPRITE_CENTER_OFFSET_PX: u32 = SPRITE_SIZE_PX / 2;
pub const VIEWPORT_WIDTH_TILES: u32 = 64;
pub const VIEWPORT_HEIGHT_TILES: u32 = 45;
pub const UI_TOP_MARGIN_PX: u32 = 30;

const ZOOM_REFERENCE_WIDTH_PX: u32 = 640;
const ZOOM_REFERENCE_HEIGHT_PX: u32 = 480;

/// A position in map space. Fractional parts place an entity between cells.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TileCoordinate {
    pub x: f32,
    pub y: f32,
}

impl TileCoordinate {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a cell grid, in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridExtent {
    pub width: u32,
    pub height: u32,
}

impl GridExtent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// True when this extent fits inside `other` on both axes.
    pub fn fits_within(self, other: GridExtent) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

/// Cell counts of the fixed render pools for a given viewport.
///
/// The tile grid carries one extra row and column so a partially scrolled
/// edge is still covered. Transition grids sit between adjacent tiles and
/// are one cell shorter along their axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderGrids {
    pub tiles: GridExtent,
    pub horizontal_transitions: GridExtent,
    pub vertical_transitions: GridExtent,
}

impl RenderGrids {
    pub fn for_viewport(viewport_tiles: GridExtent) -> Self {
        let width = viewport_tiles.width;
        let height = viewport_tiles.height;
        Self {
            tiles: GridExtent::new(width + 1, height + 1),
            horizontal_transitions: GridExtent::new(width, height + 1),
            vertical_transitions: GridExtent::new(width + 1, height),
        }
    }

    pub fn explosions(&self) -> GridExtent {
        self.tiles
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenSettings {
    pub tile_px: u32,
    pub viewport_tiles: GridExtent,
    pub ui_top_margin_px: u32,
    /// Fixed zoom factor. Derived from the window size when unset.
    pub zoom: Option<f32>,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            tile_px: SPRITE_SIZE_PX,
            viewport_tiles: GridExtent::new(VIEWPORT_WIDTH_TILES, VIEWPORT_HEIGHT_TILES),
            ui_top_margin_px: UI_TOP_MARGIN_PX,
            zoom: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("screen size must be non-zero, got {width}x{height}")]
    ZeroScreen { width: u32, height: u32 },
    #[error("zoom must be finite and positive, got {0}")]
    InvalidZoom(f32),
    #[error("tile size must be non-zero, got {0}")]
    InvalidTileSize(u32),
    #[error("viewport must span at least one tile, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },
}

/// Screen-dependent constants for one window size. Rebuilt on resize only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    pub tile_px: u32,
    pub zoom: f32,
    pub ui_offset_px: f32,
    pub viewport_tiles: GridExtent,
}

impl ScreenGeometry {
    pub fn new(width: u32, height: u32, settings: &ScreenSettings) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::ZeroScreen { width, height });
        }
        if settings.tile_px == 0 {
            return Err(GeometryError::InvalidTileSize(settings.tile_px));
        }
        if settings.viewport_tiles.is_empty() {
            return Err(GeometryError::EmptyViewport {
                width: settings.viewport_tiles.width,
                height: settings.viewport_tiles.height,
            });
        }
        let zoom = match settings.zoom {
            Some(zoom) if zoom.is_finite() && zoom > 0.0 => zoom,
            Some(zoom) => return Err(GeometryError::InvalidZoom(zoom)),
            None => derive_zoom(width, height),
        };
        Ok(Self {
            width,
            height,
            tile_px: settings.tile_px,
            zoom,
            ui_offset_px: settings.ui_top_margin_px as f32 * zoom,
            viewport_tiles: settings.viewport_tiles,
        })
    }

    pub fn grids(&self) -> RenderGrids {
        RenderGrids::for_viewport(self.viewport_tiles)
    }

    pub fn center_offset_px(&self) -> u32 {
        self.tile_px / 2
    }

    /// On-screen size of one tile in pixels.
    pub fn tile_span_px(&self) -> f32 {
        self.tile_px as f32 * self.zoom
    }

    pub fn screen_height_px(&self) -> f32 {
        self.height as f32
    }

    pub fn screen_width_px(&self) -> f32 {
        self.width as f32
    }

    /// Whether base positions built for `other` can be reused here.
    pub fn same_layout(&self, other: &ScreenGeometry) -> bool {
        self.height == other.height
            && self.tile_px == other.tile_px
            && self.zoom.to_bits() == other.zoom.to_bits()
            && self.ui_offset_px.to_bits() == other.ui_offset_px.to_bits()
            && self.viewport_tiles == other.viewport_tiles
    }
}

/// Integer pixel zoom from the 640x480 reference resolution, never below 1.
pub fn derive_zoom(width: u32, height: u32) -> f32 {
    let by_width = width / ZOOM_REFERENCE_WIDTH_PX;
    let by_height = height / ZOOM_REFERENCE_HEIGHT_PX;
    by_width.min(by_height).max(1) as f32
}

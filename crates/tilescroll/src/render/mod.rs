mod base_positions;
mod compositor;
mod entities;
mod frame;
mod geometry;
mod header;
mod sampler;
mod sprite;
mod transitions;
mod viewport;

pub use base_positions::{
    build_anchored_positions, build_base_positions, BasePositionCache, BasePositionTable,
    CellAnchor,
};
pub use compositor::{compose, Layer, LayerSink, LayerSource, DRAW_ORDER};
pub use entities::{
    position_entity, EntityCapacities, EntityKind, EntityLayers, EntityProjection, WorldPosition,
};
pub use frame::FrameRenderer;
pub use geometry::{
    derive_zoom, GeometryError, GridExtent, RenderGrids, ScreenGeometry, ScreenPoint,
    ScreenSettings, TileCoordinate, SPRITE_CENTER_OFFSET_PX, SPRITE_SIZE_PX, UI_TOP_MARGIN_PX,
    VIEWPORT_HEIGHT_TILES, VIEWPORT_WIDTH_TILES,
};
pub use header::{
    glyph_code, push_text, ClientStatus, GlyphLookup, HeaderLayers, HeaderModel, InventorySlot,
    DEFAULT_PLAYER_NAME, GLYPH_SIZE_PX,
};
pub use sampler::{
    sample_explosions, sample_horizontal_transitions, sample_tiles, sample_vertical_transitions,
    scrolled_position, TileLookup, TransitionContext,
};
pub use sprite::{Rgba, Sprite, SpritePool, SpriteStack, TextureId, WHITE_TINT};
pub use transitions::{
    effective_tile_id, BurnHistory, TransitionAxis, TransitionKind, TransitionTable,
    BURNT_EMPTY_OFFSET,
};
pub use viewport::{calculate_viewport, Viewport};

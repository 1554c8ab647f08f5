use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::geometry::{ScreenGeometry, ScreenPoint, TileCoordinate};
use super::sprite::{Sprite, SpriteStack, TextureId};
use super::viewport::Viewport;

/// Read-only map-space position of anything drawn on top of the tiles.
/// Implementors report the point the sprite should be centered on.
pub trait WorldPosition {
    fn world_position(&self) -> TileCoordinate;
}

impl WorldPosition for TileCoordinate {
    fn world_position(&self) -> TileCoordinate {
        *self
    }
}

/// Screen constants used to project entity positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityProjection {
    pub tile_px: u32,
    pub zoom: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub y_offset: f32,
}

impl EntityProjection {
    pub fn from_geometry(geometry: &ScreenGeometry) -> Self {
        Self {
            tile_px: geometry.tile_px,
            zoom: geometry.zoom,
            screen_width: geometry.screen_width_px(),
            screen_height: geometry.screen_height_px(),
            y_offset: geometry.ui_offset_px,
        }
    }
}

/// Snaps to whole source pixels after subtracting the viewport and before
/// scaling by zoom, so a sprite never lands between zoomed pixels. Ties
/// round to even.
pub fn position_entity(
    world: TileCoordinate,
    viewport: &Viewport,
    projection: &EntityProjection,
) -> ScreenPoint {
    let tile = projection.tile_px as f32;
    let source_x = ((world.x - viewport.x) * tile).round_ties_even();
    let source_y = ((world.y - viewport.y) * tile).round_ties_even();
    ScreenPoint::new(
        source_x * projection.zoom,
        projection.screen_height - projection.y_offset - source_y * projection.zoom,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Pickup,
    Bomb,
    Monster,
    Player,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Bomb => "bomb",
            Self::Monster => "monster",
            Self::Player => "player",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntityCapacities {
    pub pickups: usize,
    pub bombs: usize,
    pub monsters: usize,
    pub players: usize,
}

impl Default for EntityCapacities {
    fn default() -> Self {
        Self {
            pickups: 2048,
            bombs: 256,
            monsters: 256,
            players: 16,
        }
    }
}

/// One bounded sprite list per entity kind.
#[derive(Debug)]
pub struct EntityLayers {
    pickups: SpriteStack,
    bombs: SpriteStack,
    monsters: SpriteStack,
    players: SpriteStack,
    warned_overflow: HashSet<EntityKind>,
}

impl EntityLayers {
    pub fn new(capacities: EntityCapacities) -> Self {
        Self {
            pickups: SpriteStack::with_capacity(capacities.pickups),
            bombs: SpriteStack::with_capacity(capacities.bombs),
            monsters: SpriteStack::with_capacity(capacities.monsters),
            players: SpriteStack::with_capacity(capacities.players),
            warned_overflow: HashSet::new(),
        }
    }

    pub fn layer(&self, kind: EntityKind) -> &SpriteStack {
        match kind {
            EntityKind::Pickup => &self.pickups,
            EntityKind::Bomb => &self.bombs,
            EntityKind::Monster => &self.monsters,
            EntityKind::Player => &self.players,
        }
    }

    fn layer_mut(&mut self, kind: EntityKind) -> &mut SpriteStack {
        match kind {
            EntityKind::Pickup => &mut self.pickups,
            EntityKind::Bomb => &mut self.bombs,
            EntityKind::Monster => &mut self.monsters,
            EntityKind::Player => &mut self.players,
        }
    }

    /// Replaces the sprites of one kind. Entities more than a tile outside
    /// the window are skipped, and anything past the layer capacity is
    /// dropped with a single warning per kind.
    pub fn sync<T: WorldPosition>(
        &mut self,
        kind: EntityKind,
        entities: &[T],
        texture_of: impl Fn(&T) -> TextureId,
        viewport: &Viewport,
        projection: &EntityProjection,
    ) {
        let margin = projection.tile_px as f32 * projection.zoom;
        let layer = self.layer_mut(kind);
        layer.clear();
        let mut dropped = 0usize;
        for entity in entities {
            let position = position_entity(entity.world_position(), viewport, projection);
            if !is_near_screen(position, projection, margin) {
                continue;
            }
            let texture = texture_of(entity);
            if texture.is_transparent() {
                continue;
            }
            if !layer.push(Sprite::new(texture, position)) {
                dropped += 1;
            }
        }
        if dropped > 0 && self.warned_overflow.insert(kind) {
            warn!(
                kind = kind.as_str(),
                capacity = self.layer(kind).capacity(),
                dropped,
                "entity_pool_overflow"
            );
        }
    }

    pub fn clear(&mut self) {
        self.pickups.clear();
        self.bombs.clear();
        self.monsters.clear();
        self.players.clear();
    }
}

fn is_near_screen(position: ScreenPoint, projection: &EntityProjection, margin: f32) -> bool {
    position.x >= -margin
        && position.x <= projection.screen_width + margin
        && position.y >= -margin
        && position.y <= projection.screen_height + margin
}

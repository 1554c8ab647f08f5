use tracing::info;

use crate::world::MapState;

use super::base_positions::BasePositionCache;
use super::compositor::{Layer, LayerSource};
use super::entities::{EntityCapacities, EntityKind, EntityLayers, EntityProjection, WorldPosition};
use super::geometry::{ScreenGeometry, TileCoordinate};
use super::header::{GlyphLookup, HeaderLayers, HeaderModel};
use super::sampler::{
    sample_explosions, sample_horizontal_transitions, sample_tiles, sample_vertical_transitions,
    TileLookup, TransitionContext,
};
use super::sprite::{Sprite, SpritePool, TextureId};
use super::transitions::{BurnHistory, TransitionTable};
use super::viewport::{calculate_viewport, Viewport};

/// Owns every render pool and refreshes them once per frame.
///
/// Frame sequence: `begin_frame` (viewport plus grid sampling), then
/// `sync_entities` per entity kind and `update_header`, then hand the
/// renderer to a presenter as a `LayerSource`.
#[derive(Debug)]
pub struct FrameRenderer {
    geometry: ScreenGeometry,
    bases: BasePositionCache,
    tiles: SpritePool,
    horizontal_transitions: SpritePool,
    vertical_transitions: SpritePool,
    explosions: SpritePool,
    transitions: TransitionTable,
    burns: BurnHistory,
    entities: EntityLayers,
    header: HeaderLayers,
    viewport: Viewport,
}

impl FrameRenderer {
    pub fn new(geometry: ScreenGeometry, capacities: EntityCapacities) -> Self {
        let grids = geometry.grids();
        Self {
            geometry,
            bases: BasePositionCache::new(geometry),
            tiles: SpritePool::new(grids.tiles),
            horizontal_transitions: SpritePool::new(grids.horizontal_transitions),
            vertical_transitions: SpritePool::new(grids.vertical_transitions),
            explosions: SpritePool::new(grids.explosions()),
            transitions: TransitionTable::standard(),
            burns: BurnHistory::default(),
            entities: EntityLayers::new(capacities),
            header: HeaderLayers::new(),
            viewport: Viewport::ORIGIN,
        }
    }

    /// Applies a new window geometry. Pools are only reallocated when the
    /// viewport's tile count changes; a plain resize rebuilds base positions.
    pub fn set_geometry(&mut self, geometry: ScreenGeometry) {
        if geometry.viewport_tiles != self.geometry.viewport_tiles {
            let grids = geometry.grids();
            self.tiles = SpritePool::new(grids.tiles);
            self.horizontal_transitions = SpritePool::new(grids.horizontal_transitions);
            self.vertical_transitions = SpritePool::new(grids.vertical_transitions);
            self.explosions = SpritePool::new(grids.explosions());
            info!(
                width = geometry.viewport_tiles.width,
                height = geometry.viewport_tiles.height,
                "render_pools_resized"
            );
        }
        self.bases.rebuild_if_changed(geometry);
        self.geometry = geometry;
    }

    pub fn geometry(&self) -> &ScreenGeometry {
        &self.geometry
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> EntityProjection {
        EntityProjection::from_geometry(&self.geometry)
    }

    /// Recomputes the viewport and resamples every scrolling grid.
    pub fn begin_frame(
        &mut self,
        map: &MapState,
        player: Option<TileCoordinate>,
        lookup: &impl TileLookup,
    ) -> Viewport {
        self.burns.accumulate(map);
        self.viewport = calculate_viewport(
            player,
            map.extent(),
            self.geometry.viewport_tiles,
            self.geometry.tile_px,
            self.geometry.zoom,
        );
        let viewport = &self.viewport;
        let transitions = TransitionContext {
            table: &self.transitions,
            burns: &self.burns,
        };

        sample_tiles(&mut self.tiles, self.bases.tiles(), viewport, map, lookup);
        sample_horizontal_transitions(
            &mut self.horizontal_transitions,
            self.bases.horizontal_transitions(),
            viewport,
            map,
            transitions,
            lookup,
        );
        sample_vertical_transitions(
            &mut self.vertical_transitions,
            self.bases.vertical_transitions(),
            viewport,
            map,
            transitions,
            lookup,
        );
        sample_explosions(&mut self.explosions, self.bases.tiles(), viewport, map, lookup);

        self.viewport
    }

    pub fn sync_entities<T: WorldPosition>(
        &mut self,
        kind: EntityKind,
        entities: &[T],
        texture_of: impl Fn(&T) -> TextureId,
    ) {
        let projection = self.projection();
        self.entities
            .sync(kind, entities, texture_of, &self.viewport, &projection);
    }

    pub fn update_header(&mut self, model: &HeaderModel, glyphs: &impl GlyphLookup) -> bool {
        self.header.update(model, &self.geometry, glyphs)
    }

    pub fn pool(&self, layer: Layer) -> Option<&SpritePool> {
        match layer {
            Layer::BackgroundTiles => Some(&self.tiles),
            Layer::VerticalTransitions => Some(&self.vertical_transitions),
            Layer::HorizontalTransitions => Some(&self.horizontal_transitions),
            Layer::Explosions => Some(&self.explosions),
            _ => None,
        }
    }
}

impl LayerSource for FrameRenderer {
    fn layer_sprites(&self, layer: Layer) -> &[Sprite] {
        match layer {
            Layer::BackgroundTiles => self.tiles.sprites(),
            Layer::VerticalTransitions => self.vertical_transitions.sprites(),
            Layer::HorizontalTransitions => self.horizontal_transitions.sprites(),
            Layer::Pickups => self.entities.layer(EntityKind::Pickup).sprites(),
            Layer::Bombs => self.entities.layer(EntityKind::Bomb).sprites(),
            Layer::Monsters => self.entities.layer(EntityKind::Monster).sprites(),
            Layer::Player => self.entities.layer(EntityKind::Player).sprites(),
            Layer::Explosions => self.explosions.sprites(),
            Layer::Header => self.header.header().sprites(),
            Layer::Name => self.header.name().sprites(),
            Layer::Stats => self.header.stats().sprites(),
            Layer::Inventory => self.header.inventory().sprites(),
        }
    }

    fn sprite_scale(&self) -> f32 {
        self.geometry.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::compositor::{compose, LayerSink, DRAW_ORDER};
    use crate::render::header::InventorySlot;
    use crate::render::{ClientStatus, GridExtent, ScreenSettings, TransitionAxis, TransitionKind};
    use crate::world::tiles::EMPTY_TILE_ID;

    struct FlatLookup;

    impl TileLookup for FlatLookup {
        fn tile_texture(&self, tile_id: u8) -> TextureId {
            TextureId(tile_id as u16 + 1)
        }

        fn transition_texture(&self, _axis: TransitionAxis, kind: TransitionKind) -> TextureId {
            TextureId(300 + kind.index() as u16)
        }

        fn explosion_texture(&self, state: u8) -> TextureId {
            if state == 0 {
                TextureId::TRANSPARENT
            } else {
                TextureId(400 + state as u16)
            }
        }
    }

    impl GlyphLookup for FlatLookup {
        fn glyph_texture(&self, code: u8) -> TextureId {
            TextureId(500 + code as u16)
        }

        fn hatch_texture(&self) -> TextureId {
            TextureId(800)
        }

        fn separator_texture(&self) -> TextureId {
            TextureId(801)
        }
    }

    #[derive(Default)]
    struct LayerCounter {
        order: Vec<Layer>,
        counts: Vec<usize>,
    }

    impl LayerSink for LayerCounter {
        fn draw_layer(&mut self, layer: Layer, sprites: &[Sprite], _scale: f32) {
            self.order.push(layer);
            self.counts.push(sprites.len());
        }
    }

    fn renderer() -> FrameRenderer {
        let geometry =
            ScreenGeometry::new(1280, 960, &ScreenSettings::default()).expect("geometry");
        FrameRenderer::new(geometry, EntityCapacities::default())
    }

    #[test]
    fn frame_keeps_pool_sizes_across_maps() {
        let mut renderer = renderer();
        let big = MapState::filled(256, 256, EMPTY_TILE_ID).expect("map");
        let small = MapState::filled(10, 10, EMPTY_TILE_ID).expect("map");

        renderer.begin_frame(&big, Some(TileCoordinate::new(128.0, 128.0)), &FlatLookup);
        let tiles_address = renderer.pool(Layer::BackgroundTiles).expect("pool").as_ptr();
        renderer.begin_frame(&small, Some(TileCoordinate::new(5.0, 5.0)), &FlatLookup);

        let tiles = renderer.pool(Layer::BackgroundTiles).expect("pool");
        assert_eq!(tiles.as_ptr(), tiles_address);
        assert_eq!(tiles.extent(), GridExtent::new(65, 46));
        assert_eq!(
            renderer.pool(Layer::HorizontalTransitions).expect("pool").extent(),
            GridExtent::new(64, 46)
        );
        assert_eq!(
            renderer.pool(Layer::VerticalTransitions).expect("pool").extent(),
            GridExtent::new(65, 45)
        );
        assert_eq!(renderer.viewport(), Viewport::ORIGIN);
    }

    #[test]
    fn full_frame_composes_every_layer_in_order() {
        let mut renderer = renderer();
        let map = MapState::filled(100, 100, EMPTY_TILE_ID).expect("map");
        let player = TileCoordinate::new(50.5, 50.5);

        let viewport = renderer.begin_frame(&map, Some(player), &FlatLookup);
        assert_eq!(viewport.tile_start_x, 18);
        renderer.sync_entities(EntityKind::Player, &[player], |_| TextureId(700));
        renderer.sync_entities(EntityKind::Monster, &[TileCoordinate::new(49.5, 50.5)], |_| {
            TextureId(701)
        });
        renderer.update_header(
            &HeaderModel {
                player_name: "p1".to_string(),
                client: Some(ClientStatus {
                    card: TextureId(600),
                    dig_power: 1,
                    money: 2,
                    inventory: vec![InventorySlot {
                        icon: TextureId(601),
                        count: 5,
                    }],
                    selected: 0,
                }),
            },
            &FlatLookup,
        );

        let mut sink = LayerCounter::default();
        compose(&renderer, &mut sink);

        assert_eq!(sink.order, DRAW_ORDER.to_vec());
        assert_eq!(sink.counts[0], 65 * 46);
        assert_eq!(sink.counts[3], 0);
        assert_eq!(sink.counts[5], 1);
        assert_eq!(sink.counts[6], 1);
        assert_eq!(sink.counts[8], 1);
        assert_eq!(sink.counts[9], 2);
        assert_eq!(sink.counts[10], 2);
        assert_eq!(sink.counts[11], 2);
        assert_eq!(renderer.sprite_scale(), 2.0);
    }

    #[test]
    fn player_stays_centered_while_scrolling() {
        let mut renderer = renderer();
        let map = MapState::filled(200, 200, EMPTY_TILE_ID).expect("map");
        let geometry = *renderer.geometry();
        let projection = renderer.projection();
        let mut first = None;

        for step in 0..40 {
            let player = TileCoordinate::new(80.0 + step as f32 * 0.25, 90.0 + step as f32 * 0.1);
            let viewport = renderer.begin_frame(&map, Some(player), &FlatLookup);
            let point = crate::render::position_entity(player, &viewport, &projection);
            let center = *first.get_or_insert(point);
            assert!((point.x - center.x).abs() <= geometry.zoom);
            assert!((point.y - center.y).abs() <= geometry.zoom);
        }
    }
}

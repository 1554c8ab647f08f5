//! Fills the fixed render pools from map state for the current viewport.
//!
//! Every cell is rewritten each frame: its texture comes from the map cell
//! the viewport currently places under it, and its position is the cell's
//! base anchor shifted by the viewport's sub-tile pixel offset. Nothing is
//! carried over from the previous frame except the pools themselves.
//!
//! Sign convention: presentation y grows upward while map y grows downward,
//! so scrolling the viewport down by `pixel_offset_y` moves sprites *up* on
//! screen. The x offset is subtracted and the y offset is added.

use crate::world::MapState;

use super::base_positions::BasePositionTable;
use super::geometry::ScreenPoint;
use super::sprite::{SpritePool, TextureId};
use super::transitions::{
    effective_tile_id, BurnHistory, TransitionAxis, TransitionKind, TransitionTable,
};
use super::viewport::Viewport;

/// Resolves map content to textures. Implemented by whatever owns the
/// loaded sprites.
pub trait TileLookup {
    fn tile_texture(&self, tile_id: u8) -> TextureId;
    fn transition_texture(&self, axis: TransitionAxis, kind: TransitionKind) -> TextureId;
    fn explosion_texture(&self, state: u8) -> TextureId;
}

/// Transition inputs that persist across frames.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub table: &'a TransitionTable,
    pub burns: &'a BurnHistory,
}

pub fn scrolled_position(base: ScreenPoint, viewport: &Viewport) -> ScreenPoint {
    ScreenPoint::new(
        base.x - viewport.pixel_offset_x,
        base.y + viewport.pixel_offset_y,
    )
}

pub fn sample_tiles(
    pool: &mut SpritePool,
    bases: &BasePositionTable,
    viewport: &Viewport,
    map: &MapState,
    lookup: &impl TileLookup,
) {
    fill_cells(pool, bases, viewport, |tx, ty| match map.tile_at(tx, ty) {
        Some(tile_id) => lookup.tile_texture(tile_id),
        None => TextureId::TRANSPARENT,
    });
}

pub fn sample_explosions(
    pool: &mut SpritePool,
    bases: &BasePositionTable,
    viewport: &Viewport,
    map: &MapState,
    lookup: &impl TileLookup,
) {
    fill_cells(pool, bases, viewport, |tx, ty| match map.explosion_at(tx, ty) {
        Some(state) => lookup.explosion_texture(state),
        None => TextureId::TRANSPARENT,
    });
}

/// Samples the pair `(ty, tx)` and `(ty, tx + 1)` for every cell.
pub fn sample_horizontal_transitions(
    pool: &mut SpritePool,
    bases: &BasePositionTable,
    viewport: &Viewport,
    map: &MapState,
    transitions: TransitionContext<'_>,
    lookup: &impl TileLookup,
) {
    fill_cells(pool, bases, viewport, |tx, ty| {
        pair_texture(
            map,
            transitions,
            lookup,
            TransitionAxis::Horizontal,
            (tx, ty),
            (tx + 1, ty),
        )
    });
}

/// Samples the pair `(ty, tx)` and `(ty + 1, tx)` for every cell.
pub fn sample_vertical_transitions(
    pool: &mut SpritePool,
    bases: &BasePositionTable,
    viewport: &Viewport,
    map: &MapState,
    transitions: TransitionContext<'_>,
    lookup: &impl TileLookup,
) {
    fill_cells(pool, bases, viewport, |tx, ty| {
        pair_texture(
            map,
            transitions,
            lookup,
            TransitionAxis::Vertical,
            (tx, ty),
            (tx, ty + 1),
        )
    });
}

fn pair_texture(
    map: &MapState,
    transitions: TransitionContext<'_>,
    lookup: &impl TileLookup,
    axis: TransitionAxis,
    first: (i64, i64),
    second: (i64, i64),
) -> TextureId {
    let (Some(first_id), Some(second_id)) = (
        map.tile_at(first.0, first.1),
        map.tile_at(second.0, second.1),
    ) else {
        return TextureId::TRANSPARENT;
    };
    let first_effective =
        effective_tile_id(first_id, transitions.burns.is_burnt(first.0, first.1));
    let second_effective =
        effective_tile_id(second_id, transitions.burns.is_burnt(second.0, second.1));
    match transitions
        .table
        .lookup(axis, first_effective, second_effective)
    {
        TransitionKind::None => TextureId::TRANSPARENT,
        kind => lookup.transition_texture(axis, kind),
    }
}

fn fill_cells(
    pool: &mut SpritePool,
    bases: &BasePositionTable,
    viewport: &Viewport,
    mut texture_at: impl FnMut(i64, i64) -> TextureId,
) {
    let extent = pool.extent();
    let width = extent.width as usize;
    for (index, sprite) in pool.sprites_mut().iter_mut().enumerate() {
        let row = (index / width) as u32;
        let col = (index % width) as u32;
        let tx = viewport.tile_start_x as i64 + col as i64;
        let ty = viewport.tile_start_y as i64 + row as i64;
        sprite.texture = texture_at(tx, ty);
        if let Some(base) = bases.get(row, col) {
            sprite.position = scrolled_position(base, viewport);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::base_positions::{build_anchored_positions, build_base_positions, CellAnchor};
    use crate::render::geometry::GridExtent;
    use crate::world::tiles::EMPTY_TILE_ID;
    use crate::world::{EXPLOSION_BLAST, EXPLOSION_NONE};

    struct NumberedLookup;

    impl TileLookup for NumberedLookup {
        fn tile_texture(&self, tile_id: u8) -> TextureId {
            TextureId(1000 + tile_id as u16)
        }

        fn transition_texture(&self, axis: TransitionAxis, kind: TransitionKind) -> TextureId {
            let base = match axis {
                TransitionAxis::Horizontal => 2000,
                TransitionAxis::Vertical => 3000,
            };
            TextureId(base + kind.index() as u16)
        }

        fn explosion_texture(&self, state: u8) -> TextureId {
            if state == EXPLOSION_NONE {
                TextureId::TRANSPARENT
            } else {
                TextureId(4000 + state as u16)
            }
        }
    }

    fn numbered_map(width: u32, height: u32) -> MapState {
        let tiles = (0..width * height).map(|index| (index % 200) as u8).collect();
        MapState::new(width, height, tiles).expect("map")
    }

    fn viewport_at(tile_start_x: i32, tile_start_y: i32, offset_x: f32, offset_y: f32) -> Viewport {
        Viewport {
            x: tile_start_x as f32,
            y: tile_start_y as f32,
            pixel_offset_x: offset_x,
            pixel_offset_y: offset_y,
            tile_start_x,
            tile_start_y,
        }
    }

    #[test]
    fn tiles_follow_viewport_and_offset_signs() {
        let grid = GridExtent::new(5, 4);
        let bases = build_base_positions(grid, 10, 2.0, 480.0, 60.0);
        let mut pool = SpritePool::new(grid);
        let map = numbered_map(20, 20);
        let viewport = viewport_at(3, 7, 6.0, 4.0);

        sample_tiles(&mut pool, &bases, &viewport, &map, &NumberedLookup);

        let sprite = pool.get(1, 2).expect("cell");
        let expected_id = map.tile_at(5, 8).expect("tile");
        assert_eq!(sprite.texture, TextureId(1000 + expected_id as u16));
        let base = bases.get(1, 2).expect("base");
        assert_eq!(sprite.position.x, base.x - 6.0);
        assert_eq!(sprite.position.y, base.y + 4.0);
    }

    #[test]
    fn cells_past_map_edge_are_transparent() {
        let grid = GridExtent::new(5, 4);
        let bases = build_base_positions(grid, 10, 1.0, 480.0, 30.0);
        let mut pool = SpritePool::new(grid);
        let map = numbered_map(3, 2);

        sample_tiles(&mut pool, &bases, &Viewport::ORIGIN, &map, &NumberedLookup);

        assert_ne!(pool.get(1, 2).expect("cell").texture, TextureId::TRANSPARENT);
        assert_eq!(pool.get(1, 3).expect("cell").texture, TextureId::TRANSPARENT);
        assert_eq!(pool.get(2, 0).expect("cell").texture, TextureId::TRANSPARENT);
    }

    #[test]
    fn sampling_never_reallocates_the_pool() {
        let grid = GridExtent::new(65, 46);
        let bases = build_base_positions(grid, 10, 1.0, 480.0, 30.0);
        let mut pool = SpritePool::new(grid);
        let address = pool.as_ptr();

        for (width, height) in [(256, 256), (30, 20), (1, 1)] {
            let map = numbered_map(width, height);
            sample_tiles(&mut pool, &bases, &Viewport::ORIGIN, &map, &NumberedLookup);
            assert_eq!(pool.as_ptr(), address);
            assert_eq!(pool.len(), 65 * 46);
        }
    }

    #[test]
    fn repeated_frames_do_not_drift() {
        let grid = GridExtent::new(4, 3);
        let bases = build_base_positions(grid, 10, 3.0, 720.0, 90.0);
        let mut pool = SpritePool::new(grid);
        let map = numbered_map(50, 50);
        let viewport = viewport_at(10, 10, 7.5, 12.0);

        sample_tiles(&mut pool, &bases, &viewport, &map, &NumberedLookup);
        let first: Vec<_> = pool.sprites().to_vec();
        for _ in 0..50 {
            sample_tiles(&mut pool, &bases, &viewport, &map, &NumberedLookup);
        }
        assert_eq!(pool.sprites(), first.as_slice());
    }

    #[test]
    fn horizontal_pairs_need_both_tiles_in_bounds() {
        let mut map = MapState::filled(3, 1, EMPTY_TILE_ID).expect("map");
        map.set_tile(1, 0, 67);
        let table = TransitionTable::standard();
        let burns = BurnHistory::new(map.extent());
        let grid = GridExtent::new(3, 1);
        let bases = build_anchored_positions(grid, CellAnchor::RightEdge, 10, 1.0, 480.0, 30.0);
        let mut pool = SpritePool::new(grid);

        sample_horizontal_transitions(
            &mut pool,
            &bases,
            &Viewport::ORIGIN,
            &map,
            TransitionContext {
                table: &table,
                burns: &burns,
            },
            &NumberedLookup,
        );

        let empty_bedrock = 2000 + TransitionKind::EmptyBedrock.index() as u16;
        let bedrock_empty = 2000 + TransitionKind::BedrockEmpty.index() as u16;
        assert_eq!(pool.get(0, 0).expect("cell").texture, TextureId(empty_bedrock));
        assert_eq!(pool.get(0, 1).expect("cell").texture, TextureId(bedrock_empty));
        assert_eq!(pool.get(0, 2).expect("cell").texture, TextureId::TRANSPARENT);
    }

    #[test]
    fn vertical_pairs_use_burn_history() {
        let mut map = MapState::filled(1, 3, EMPTY_TILE_ID).expect("map");
        map.set_tile(0, 1, 51);
        map.set_explosion(0, 2, EXPLOSION_BLAST);
        let table = TransitionTable::standard();
        let mut burns = BurnHistory::default();
        burns.accumulate(&map);
        let grid = GridExtent::new(1, 3);
        let bases = build_anchored_positions(grid, CellAnchor::BottomEdge, 10, 1.0, 480.0, 30.0);
        let mut pool = SpritePool::new(grid);

        sample_vertical_transitions(
            &mut pool,
            &bases,
            &Viewport::ORIGIN,
            &map,
            TransitionContext {
                table: &table,
                burns: &burns,
            },
            &NumberedLookup,
        );

        let empty_dirt = 3000 + TransitionKind::EmptyDirt.index() as u16;
        let dirt_burnt = 3000 + TransitionKind::DirtBurntEmpty.index() as u16;
        assert_eq!(pool.get(0, 0).expect("cell").texture, TextureId(empty_dirt));
        assert_eq!(pool.get(1, 0).expect("cell").texture, TextureId(dirt_burnt));
        assert_eq!(pool.get(2, 0).expect("cell").texture, TextureId::TRANSPARENT);
    }

    #[test]
    fn explosions_mirror_tile_grid_but_read_state_channel() {
        let mut map = MapState::filled(4, 4, EMPTY_TILE_ID).expect("map");
        map.set_explosion(2, 1, EXPLOSION_BLAST);
        let grid = GridExtent::new(3, 3);
        let bases = build_base_positions(grid, 10, 1.0, 480.0, 30.0);
        let mut tiles = SpritePool::new(grid);
        let mut explosions = SpritePool::new(grid);
        let viewport = viewport_at(1, 1, 2.0, 3.0);

        sample_tiles(&mut tiles, &bases, &viewport, &map, &NumberedLookup);
        sample_explosions(&mut explosions, &bases, &viewport, &map, &NumberedLookup);

        assert_eq!(
            explosions.get(0, 1).expect("cell").texture,
            TextureId(4000 + EXPLOSION_BLAST as u16)
        );
        assert_eq!(explosions.get(0, 0).expect("cell").texture, TextureId::TRANSPARENT);
        for (tile, explosion) in tiles.sprites().iter().zip(explosions.sprites()) {
            assert_eq!(tile.position, explosion.position);
        }
    }
}

use super::geometry::{GridExtent, TileCoordinate};

/// Top-left corner of the visible window in map space, split into the whole
/// tile the sampler starts from and the sub-tile remainder in screen pixels.
///
/// `x == tile_start_x + pixel_offset_x / (tile_px * zoom)` with the
/// remainder in `[0, 1)`; the same holds for y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub pixel_offset_x: f32,
    pub pixel_offset_y: f32,
    pub tile_start_x: i32,
    pub tile_start_y: i32,
}

impl Viewport {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        pixel_offset_x: 0.0,
        pixel_offset_y: 0.0,
        tile_start_x: 0,
        tile_start_y: 0,
    };
}

impl Default for Viewport {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// Places the viewport so the player sits at its center, clamped so the
/// window never shows space past the map edge.
///
/// Maps that fit entirely inside the viewport, and frames without a player,
/// anchor at the origin. The result depends only on the arguments, so it is
/// recomputed from scratch every frame.
pub fn calculate_viewport(
    player: Option<TileCoordinate>,
    map: GridExtent,
    view: GridExtent,
    tile_px: u32,
    zoom: f32,
) -> Viewport {
    if map.fits_within(view) {
        return Viewport::ORIGIN;
    }
    let Some(player) = player.filter(|player| player.is_finite()) else {
        return Viewport::ORIGIN;
    };

    let tile_span = tile_px as f32 * zoom;
    let (x, tile_start_x, pixel_offset_x) = axis_origin(player.x, map.width, view.width, tile_span);
    let (y, tile_start_y, pixel_offset_y) =
        axis_origin(player.y, map.height, view.height, tile_span);

    Viewport {
        x,
        y,
        pixel_offset_x,
        pixel_offset_y,
        tile_start_x,
        tile_start_y,
    }
}

// An axis shorter than the view pins to 0.
fn axis_origin(player: f32, map_dim: u32, view_dim: u32, tile_span: f32) -> (f32, i32, f32) {
    let max_origin = map_dim.saturating_sub(view_dim) as f32;
    let candidate = (player - view_dim as f32 / 2.0).clamp(0.0, max_origin);
    let tile_start = candidate.floor();
    let pixel_offset = (candidate - tile_start) * tile_span;
    (candidate, tile_start as i32, pixel_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: GridExtent = GridExtent::new(256, 256);
    const VIEW: GridExtent = GridExtent::new(64, 45);

    #[test]
    fn centers_player_inside_large_map() {
        let viewport = calculate_viewport(
            Some(TileCoordinate::new(200.0, 200.0)),
            MAP,
            VIEW,
            16,
            1.0,
        );
        assert_eq!(viewport.x, 168.0);
        assert_eq!(viewport.y, 177.5);
        assert_eq!(viewport.tile_start_x, 168);
        assert_eq!(viewport.tile_start_y, 177);
        assert_eq!(viewport.pixel_offset_x, 0.0);
        assert_eq!(viewport.pixel_offset_y, 8.0);
    }

    #[test]
    fn clamps_to_far_map_edge() {
        let viewport = calculate_viewport(
            Some(TileCoordinate::new(255.0, 255.0)),
            MAP,
            VIEW,
            16,
            1.0,
        );
        assert_eq!(viewport.x, 192.0);
        assert_eq!(viewport.y, 211.0);
        assert_eq!(viewport.tile_start_x, 192);
        assert_eq!(viewport.tile_start_y, 211);
        assert_eq!(viewport.pixel_offset_x, 0.0);
        assert_eq!(viewport.pixel_offset_y, 0.0);
    }

    #[test]
    fn every_position_past_the_far_edge_saturates() {
        let (tile_px, zoom) = (16, 1.0);
        let max_x = (MAP.width - VIEW.width) as f32;
        let max_y = (MAP.height - VIEW.height) as f32;

        let mut px = MAP.width as f32 - VIEW.width as f32 / 2.0;
        while px <= MAP.width as f32 + 50.0 {
            let viewport =
                calculate_viewport(Some(TileCoordinate::new(px, 100.0)), MAP, VIEW, tile_px, zoom);
            assert_eq!(viewport.x, max_x, "player x {px}");
            assert_eq!(viewport.tile_start_x, max_x as i32, "player x {px}");
            assert_eq!(viewport.pixel_offset_x, 0.0, "player x {px}");
            px += 0.25;
        }

        let mut py = MAP.height as f32 - VIEW.height as f32 / 2.0;
        while py <= MAP.height as f32 + 50.0 {
            let viewport =
                calculate_viewport(Some(TileCoordinate::new(100.0, py)), MAP, VIEW, tile_px, zoom);
            assert_eq!(viewport.y, max_y, "player y {py}");
            assert_eq!(viewport.tile_start_y, max_y as i32, "player y {py}");
            assert_eq!(viewport.pixel_offset_y, 0.0, "player y {py}");
            py += 0.25;
        }
    }

    #[test]
    fn maps_within_the_view_anchor_at_origin_for_any_player() {
        let maps = [
            GridExtent::new(1, 1),
            GridExtent::new(30, 20),
            GridExtent::new(64, 1),
            GridExtent::new(1, 45),
            GridExtent::new(10, 44),
            GridExtent::new(64, 45),
        ];
        for map in maps {
            let (w, h) = (map.width as f32, map.height as f32);
            let players = [
                (0.0, 0.0),
                (w / 2.0, h / 2.0),
                (w - 0.01, h - 0.01),
                (w + 50.0, h + 50.0),
                (-10.0, -5.0),
                (1000.0, -1000.0),
            ];
            for (x, y) in players {
                let viewport =
                    calculate_viewport(Some(TileCoordinate::new(x, y)), map, VIEW, 10, 2.0);
                assert_eq!(viewport, Viewport::ORIGIN, "map {map:?} player ({x}, {y})");
            }
        }
    }

    #[test]
    fn clamps_to_near_map_edge() {
        let viewport =
            calculate_viewport(Some(TileCoordinate::new(3.0, 1.5)), MAP, VIEW, 10, 2.0);
        assert_eq!(viewport, Viewport::ORIGIN);
    }

    #[test]
    fn small_map_anchors_at_origin() {
        let viewport = calculate_viewport(
            Some(TileCoordinate::new(15.0, 10.0)),
            GridExtent::new(30, 20),
            VIEW,
            16,
            1.0,
        );
        assert_eq!(viewport, Viewport::ORIGIN);
    }

    #[test]
    fn missing_or_non_finite_player_anchors_at_origin() {
        assert_eq!(
            calculate_viewport(None, MAP, VIEW, 16, 1.0),
            Viewport::ORIGIN
        );
        assert_eq!(
            calculate_viewport(Some(TileCoordinate::new(f32::NAN, 3.0)), MAP, VIEW, 16, 1.0),
            Viewport::ORIGIN
        );
    }

    #[test]
    fn axis_shorter_than_view_pins_to_zero() {
        let viewport = calculate_viewport(
            Some(TileCoordinate::new(100.0, 10.0)),
            GridExtent::new(200, 30),
            VIEW,
            10,
            1.0,
        );
        assert_eq!(viewport.x, 68.0);
        assert_eq!(viewport.y, 0.0);
        assert_eq!(viewport.tile_start_y, 0);
        assert_eq!(viewport.pixel_offset_y, 0.0);
    }

    #[test]
    fn identical_inputs_are_bit_identical() {
        let player = Some(TileCoordinate::new(123.37, 88.91));
        let first = calculate_viewport(player, MAP, VIEW, 10, 3.0);
        for _ in 0..100 {
            let again = calculate_viewport(player, MAP, VIEW, 10, 3.0);
            assert_eq!(first.x.to_bits(), again.x.to_bits());
            assert_eq!(first.y.to_bits(), again.y.to_bits());
            assert_eq!(
                first.pixel_offset_x.to_bits(),
                again.pixel_offset_x.to_bits()
            );
            assert_eq!(
                first.pixel_offset_y.to_bits(),
                again.pixel_offset_y.to_bits()
            );
            assert_eq!(first.tile_start_x, again.tile_start_x);
            assert_eq!(first.tile_start_y, again.tile_start_y);
        }
    }

    #[test]
    fn offsets_stay_below_one_tile_and_window_stays_on_map() {
        let tile_px = 10;
        let zoom = 2.0;
        let span = tile_px as f32 * zoom;
        let mut px = 0.0f32;
        while px < 256.0 {
            let player = Some(TileCoordinate::new(px, 255.9 - px));
            let viewport = calculate_viewport(player, MAP, VIEW, tile_px, zoom);
            assert!(viewport.pixel_offset_x >= 0.0 && viewport.pixel_offset_x < span);
            assert!(viewport.pixel_offset_y >= 0.0 && viewport.pixel_offset_y < span);
            assert!(viewport.tile_start_x >= 0);
            assert!(viewport.tile_start_y >= 0);
            assert!(viewport.tile_start_x as u32 + VIEW.width <= MAP.width);
            assert!(viewport.tile_start_y as u32 + VIEW.height <= MAP.height);
            let frac_x = viewport.x - viewport.tile_start_x as f32;
            assert!((frac_x * span - viewport.pixel_offset_x).abs() < 1e-3);
            px += 0.37;
        }
    }
}

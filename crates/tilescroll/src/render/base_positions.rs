use tracing::info;

use super::geometry::{GridExtent, ScreenGeometry, ScreenPoint};

/// Where inside a cell a grid's sprites are anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAnchor {
    /// Tile and explosion sprites sit on the cell center.
    Center,
    /// Horizontal transitions sit on the edge shared with the next column.
    RightEdge,
    /// Vertical transitions sit on the edge shared with the next row.
    BottomEdge,
}

impl CellAnchor {
    fn offsets_px(self, tile_px: u32) -> (f32, f32) {
        let center = (tile_px / 2) as f32;
        let edge = tile_px as f32;
        match self {
            Self::Center => (center, center),
            Self::RightEdge => (edge, center),
            Self::BottomEdge => (center, edge),
        }
    }
}

/// Screen positions for every cell of a render grid with the viewport at
/// the map origin. Row-major, indexed `[row][col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePositionTable {
    extent: GridExtent,
    anchors: Vec<ScreenPoint>,
}

impl BasePositionTable {
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    pub fn get(&self, row: u32, col: u32) -> Option<ScreenPoint> {
        if row >= self.extent.height || col >= self.extent.width {
            return None;
        }
        self.anchors
            .get(row as usize * self.extent.width as usize + col as usize)
            .copied()
    }

    pub fn anchors(&self) -> &[ScreenPoint] {
        &self.anchors
    }
}

/// Base positions for the tile grid.
///
/// `x = (col * tile_px + center) * zoom`,
/// `y = screen_height - ui_offset - (row * tile_px + center) * zoom`.
pub fn build_base_positions(
    grid: GridExtent,
    tile_px: u32,
    zoom: f32,
    screen_height: f32,
    ui_offset: f32,
) -> BasePositionTable {
    build_anchored_positions(
        grid,
        CellAnchor::Center,
        tile_px,
        zoom,
        screen_height,
        ui_offset,
    )
}

pub fn build_anchored_positions(
    grid: GridExtent,
    anchor: CellAnchor,
    tile_px: u32,
    zoom: f32,
    screen_height: f32,
    ui_offset: f32,
) -> BasePositionTable {
    let (offset_x, offset_y) = anchor.offsets_px(tile_px);
    let tile = tile_px as f32;
    let top = screen_height - ui_offset;
    let mut anchors = Vec::with_capacity(grid.cell_count());
    for row in 0..grid.height {
        let y = top - (row as f32 * tile + offset_y) * zoom;
        for col in 0..grid.width {
            let x = (col as f32 * tile + offset_x) * zoom;
            anchors.push(ScreenPoint::new(x, y));
        }
    }
    BasePositionTable {
        extent: grid,
        anchors,
    }
}

/// Base positions for all three scrolling grids. Explosions share the tile
/// table.
#[derive(Debug, Clone)]
pub struct BasePositionCache {
    geometry: ScreenGeometry,
    tiles: BasePositionTable,
    horizontal_transitions: BasePositionTable,
    vertical_transitions: BasePositionTable,
}

impl BasePositionCache {
    pub fn new(geometry: ScreenGeometry) -> Self {
        let grids = geometry.grids();
        let build = |grid, anchor| {
            build_anchored_positions(
                grid,
                anchor,
                geometry.tile_px,
                geometry.zoom,
                geometry.screen_height_px(),
                geometry.ui_offset_px,
            )
        };
        Self {
            geometry,
            tiles: build(grids.tiles, CellAnchor::Center),
            horizontal_transitions: build(grids.horizontal_transitions, CellAnchor::RightEdge),
            vertical_transitions: build(grids.vertical_transitions, CellAnchor::BottomEdge),
        }
    }

    /// Rebuilds the tables when zoom, tile size, UI margin or screen height
    /// changed. Returns whether a rebuild happened.
    pub fn rebuild_if_changed(&mut self, geometry: ScreenGeometry) -> bool {
        if self.geometry.same_layout(&geometry) {
            self.geometry = geometry;
            return false;
        }
        *self = Self::new(geometry);
        info!(
            width = geometry.width,
            height = geometry.height,
            zoom = geometry.zoom,
            "base_positions_rebuilt"
        );
        true
    }

    pub fn geometry(&self) -> &ScreenGeometry {
        &self.geometry
    }

    pub fn tiles(&self) -> &BasePositionTable {
        &self.tiles
    }

    pub fn horizontal_transitions(&self) -> &BasePositionTable {
        &self.horizontal_transitions
    }

    pub fn vertical_transitions(&self) -> &BasePositionTable {
        &self.vertical_transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ScreenSettings;

    #[test]
    fn tile_anchors_follow_layout_formula() {
        let table = build_base_positions(GridExtent::new(65, 46), 10, 2.0, 960.0, 60.0);
        assert_eq!(table.get(0, 0), Some(ScreenPoint::new(10.0, 890.0)));
        assert_eq!(table.get(0, 1), Some(ScreenPoint::new(30.0, 890.0)));
        assert_eq!(table.get(1, 0), Some(ScreenPoint::new(10.0, 870.0)));
        assert_eq!(table.get(45, 64), Some(ScreenPoint::new(1290.0, -10.0)));
        assert_eq!(table.get(46, 0), None);
        assert_eq!(table.anchors().len(), 65 * 46);
    }

    #[test]
    fn transition_anchors_sit_between_tiles() {
        let horizontal = build_anchored_positions(
            GridExtent::new(64, 46),
            CellAnchor::RightEdge,
            10,
            2.0,
            960.0,
            60.0,
        );
        let vertical = build_anchored_positions(
            GridExtent::new(65, 45),
            CellAnchor::BottomEdge,
            10,
            2.0,
            960.0,
            60.0,
        );
        assert_eq!(horizontal.get(0, 0), Some(ScreenPoint::new(20.0, 890.0)));
        assert_eq!(horizontal.get(2, 3), Some(ScreenPoint::new(80.0, 850.0)));
        assert_eq!(vertical.get(0, 0), Some(ScreenPoint::new(10.0, 880.0)));
        assert_eq!(vertical.get(3, 2), Some(ScreenPoint::new(50.0, 820.0)));
    }

    #[test]
    fn cache_rebuilds_only_on_layout_change() {
        let settings = ScreenSettings::default();
        let geometry = ScreenGeometry::new(1280, 960, &settings).expect("geometry");
        let mut cache = BasePositionCache::new(geometry);
        let before = cache.tiles().anchors().as_ptr();

        assert!(!cache.rebuild_if_changed(geometry));
        assert_eq!(cache.tiles().anchors().as_ptr(), before);

        let wider = ScreenGeometry::new(1300, 960, &settings).expect("geometry");
        assert!(!cache.rebuild_if_changed(wider));

        let taller = ScreenGeometry::new(1280, 1440, &settings).expect("geometry");
        assert!(cache.rebuild_if_changed(taller));
        assert_eq!(cache.geometry().zoom, 2.0);
        assert_eq!(
            cache.tiles().get(0, 0),
            Some(ScreenPoint::new(10.0, 1440.0 - 60.0 - 10.0))
        );
    }

    #[test]
    fn cache_tables_match_render_grids() {
        let geometry =
            ScreenGeometry::new(640, 480, &ScreenSettings::default()).expect("geometry");
        let cache = BasePositionCache::new(geometry);
        assert_eq!(cache.tiles().extent(), GridExtent::new(65, 46));
        assert_eq!(
            cache.horizontal_transitions().extent(),
            GridExtent::new(64, 46)
        );
        assert_eq!(
            cache.vertical_transitions().extent(),
            GridExtent::new(65, 45)
        );
    }
}

//! Edge transitions drawn between neighboring tiles.
//!
//! Open ground next to bedrock or dirt gets an edge sprite on the shared
//! border. Open ground that has ever been hit by an explosion is "burnt" and
//! uses the scorched variant of the same edge.

use crate::world::tiles::{
    is_bedrock, is_dirt, is_empty_like, BEDROCK_NE_TILE_ID, BEDROCK_NW_TILE_ID,
    BEDROCK_SE_TILE_ID, BEDROCK_SW_TILE_ID,
};
use crate::world::{MapState, EXPLOSION_NONE};

use super::geometry::GridExtent;

pub const BURNT_EMPTY_OFFSET: u16 = 256;

const EFFECTIVE_ID_COUNT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionAxis {
    /// Between a tile and its right neighbor.
    Horizontal,
    /// Between a tile and the tile below it.
    Vertical,
}

impl TransitionAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Transition sprite for one tile pair. Names read first tile to second
/// tile along the axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    #[default]
    None,
    EmptyBedrock,
    BedrockEmpty,
    EmptyDirt,
    DirtEmpty,
    BurntEmptyBedrock,
    BedrockBurntEmpty,
    BurntEmptyDirt,
    DirtBurntEmpty,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 9] = [
        Self::None,
        Self::EmptyBedrock,
        Self::BedrockEmpty,
        Self::EmptyDirt,
        Self::DirtEmpty,
        Self::BurntEmptyBedrock,
        Self::BedrockBurntEmpty,
        Self::BurntEmptyDirt,
        Self::DirtBurntEmpty,
    ];

    pub fn index(self) -> u8 {
        match self {
            Self::None => 0,
            Self::EmptyBedrock => 1,
            Self::BedrockEmpty => 2,
            Self::EmptyDirt => 3,
            Self::DirtEmpty => 4,
            Self::BurntEmptyBedrock => 5,
            Self::BedrockBurntEmpty => 6,
            Self::BurntEmptyDirt => 7,
            Self::DirtBurntEmpty => 8,
        }
    }

    pub fn from_index(index: u8) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or(Self::None)
    }

    /// Sprite file suffix, e.g. `transition_horizontal_<suffix>.png`.
    pub fn sprite_suffix(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::EmptyBedrock => Some("empty_bedrock"),
            Self::BedrockEmpty => Some("bedrock_empty"),
            Self::EmptyDirt => Some("empty_dirt"),
            Self::DirtEmpty => Some("dirt_empty"),
            Self::BurntEmptyBedrock => Some("empty_bedrock_burnt"),
            Self::BedrockBurntEmpty => Some("bedrock_empty_burnt"),
            Self::BurntEmptyDirt => Some("empty_dirt_burnt"),
            Self::DirtBurntEmpty => Some("dirt_empty_burnt"),
        }
    }

    pub fn sprite_name(self, axis: TransitionAxis) -> Option<String> {
        self.sprite_suffix()
            .map(|suffix| format!("transition_{}_{suffix}", axis.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Open { burnt: bool },
    Bedrock,
    Dirt,
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Bedrock corner tiles: dirt on the two sides named by the corner, bedrock
/// on the other two.
struct CornerPiece {
    tile_id: u8,
    top: Surface,
    right: Surface,
    bottom: Surface,
    left: Surface,
}

const CORNER_PIECES: [CornerPiece; 4] = [
    CornerPiece {
        tile_id: BEDROCK_NW_TILE_ID,
        top: Surface::Dirt,
        right: Surface::Bedrock,
        bottom: Surface::Bedrock,
        left: Surface::Dirt,
    },
    CornerPiece {
        tile_id: BEDROCK_NE_TILE_ID,
        top: Surface::Dirt,
        right: Surface::Dirt,
        bottom: Surface::Bedrock,
        left: Surface::Bedrock,
    },
    CornerPiece {
        tile_id: BEDROCK_SE_TILE_ID,
        top: Surface::Bedrock,
        right: Surface::Dirt,
        bottom: Surface::Dirt,
        left: Surface::Bedrock,
    },
    CornerPiece {
        tile_id: BEDROCK_SW_TILE_ID,
        top: Surface::Bedrock,
        right: Surface::Bedrock,
        bottom: Surface::Dirt,
        left: Surface::Dirt,
    },
];

impl CornerPiece {
    fn side(&self, side: Side) -> Surface {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }
}

fn exposed_surface(effective_id: u16, side: Side) -> Surface {
    if effective_id >= BURNT_EMPTY_OFFSET {
        return match u8::try_from(effective_id - BURNT_EMPTY_OFFSET) {
            Ok(id) if is_empty_like(id) => Surface::Open { burnt: true },
            _ => Surface::Solid,
        };
    }
    let Ok(id) = u8::try_from(effective_id) else {
        return Surface::Solid;
    };
    if let Some(corner) = CORNER_PIECES.iter().find(|corner| corner.tile_id == id) {
        return corner.side(side);
    }
    if is_empty_like(id) {
        Surface::Open { burnt: false }
    } else if is_bedrock(id) {
        Surface::Bedrock
    } else if is_dirt(id) {
        Surface::Dirt
    } else {
        Surface::Solid
    }
}

fn pair_kind(first: Surface, second: Surface) -> TransitionKind {
    match (first, second) {
        (Surface::Open { burnt: false }, Surface::Bedrock) => TransitionKind::EmptyBedrock,
        (Surface::Bedrock, Surface::Open { burnt: false }) => TransitionKind::BedrockEmpty,
        (Surface::Open { burnt: false }, Surface::Dirt) => TransitionKind::EmptyDirt,
        (Surface::Dirt, Surface::Open { burnt: false }) => TransitionKind::DirtEmpty,
        (Surface::Open { burnt: true }, Surface::Bedrock) => TransitionKind::BurntEmptyBedrock,
        (Surface::Bedrock, Surface::Open { burnt: true }) => TransitionKind::BedrockBurntEmpty,
        (Surface::Open { burnt: true }, Surface::Dirt) => TransitionKind::BurntEmptyDirt,
        (Surface::Dirt, Surface::Open { burnt: true }) => TransitionKind::DirtBurntEmpty,
        _ => TransitionKind::None,
    }
}

/// Precomputed `[first][second]` lookup over effective tile ids, one table
/// per axis.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    horizontal: Box<[u8]>,
    vertical: Box<[u8]>,
}

impl TransitionTable {
    pub fn standard() -> Self {
        Self {
            horizontal: build_axis_table(Side::Right, Side::Left),
            vertical: build_axis_table(Side::Bottom, Side::Top),
        }
    }

    pub fn lookup(&self, axis: TransitionAxis, first: u16, second: u16) -> TransitionKind {
        let (first, second) = (first as usize, second as usize);
        if first >= EFFECTIVE_ID_COUNT || second >= EFFECTIVE_ID_COUNT {
            return TransitionKind::None;
        }
        let table = match axis {
            TransitionAxis::Horizontal => &self.horizontal,
            TransitionAxis::Vertical => &self.vertical,
        };
        TransitionKind::from_index(table[first * EFFECTIVE_ID_COUNT + second])
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn build_axis_table(first_side: Side, second_side: Side) -> Box<[u8]> {
    let mut table = vec![0u8; EFFECTIVE_ID_COUNT * EFFECTIVE_ID_COUNT];
    for first in 0..EFFECTIVE_ID_COUNT {
        let first_surface = exposed_surface(first as u16, first_side);
        if first_surface == Surface::Solid {
            continue;
        }
        for second in 0..EFFECTIVE_ID_COUNT {
            let second_surface = exposed_surface(second as u16, second_side);
            table[first * EFFECTIVE_ID_COUNT + second] =
                pair_kind(first_surface, second_surface).index();
        }
    }
    table.into_boxed_slice()
}

/// Tile id as seen by the transition lookup: empty-like tiles that have
/// burnt are shifted past the byte range.
pub fn effective_tile_id(tile_id: u8, burnt: bool) -> u16 {
    if burnt && is_empty_like(tile_id) {
        tile_id as u16 + BURNT_EMPTY_OFFSET
    } else {
        tile_id as u16
    }
}

/// Cells that have shown an explosion at any point since the map appeared.
#[derive(Debug, Clone, Default)]
pub struct BurnHistory {
    extent: GridExtent,
    burnt: Vec<bool>,
}

impl BurnHistory {
    pub fn new(extent: GridExtent) -> Self {
        Self {
            extent,
            burnt: vec![false; extent.cell_count()],
        }
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Folds the map's current explosion channel into the history. A map of
    /// different dimensions starts a fresh history.
    pub fn accumulate(&mut self, map: &MapState) {
        if self.extent != map.extent() {
            *self = Self::new(map.extent());
        }
        for (burnt, state) in self.burnt.iter_mut().zip(map.explosions()) {
            *burnt |= *state != EXPLOSION_NONE;
        }
    }

    pub fn is_burnt(&self, x: i64, y: i64) -> bool {
        if !self.extent.contains(x, y) {
            return false;
        }
        self.burnt
            .get(y as usize * self.extent.width as usize + x as usize)
            .copied()
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.burnt.fill(false);
    }
}

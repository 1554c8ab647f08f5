//! Tile id table for `.MNE` maps.
//!
//! Map files store one byte per cell; the byte is the tile id. Ids that are
//! not listed here render as transparent.

use crate::render::Rgba;

pub const EMPTY_TILE_ID: u8 = 48;
pub const CONCRETE_TILE_ID: u8 = 49;
pub const BEDROCK_NW_TILE_ID: u8 = 55;
pub const BEDROCK_NE_TILE_ID: u8 = 56;
pub const BEDROCK_SE_TILE_ID: u8 = 57;
pub const BEDROCK_SW_TILE_ID: u8 = 65;

const TILE_SPRITES: &[(u8, &str)] = &[
    (48, "empty"),
    (49, "concrete"),
    (50, "dirt1"),
    (51, "dirt2"),
    (52, "dirt3"),
    (53, "gravel1"),
    (54, "gravel2"),
    (55, "bedrock_nw"),
    (56, "bedrock_ne"),
    (57, "bedrock_se"),
    (65, "bedrock_sw"),
    (66, "boulder"),
    (67, "bedrock1"),
    (68, "bedrock2"),
    (69, "bedrock3"),
    (70, "bedrock4"),
    (101, "landmine"),
    (108, "securitydoor"),
    (109, "medpack"),
    (111, "bioslime"),
    (112, "rock2"),
    (113, "rock1"),
    (121, "crate"),
    (143, "smallpick"),
    (144, "bigpick"),
    (145, "drill"),
    (146, "gold_shield"),
    (147, "gold_egg"),
    (148, "gold_coins"),
    (149, "gold_bracelet"),
    (150, "gold_bar"),
    (151, "gold_cross"),
    (152, "gold_sceptre"),
    (153, "gold_ruby"),
    (154, "gold_crown"),
    (155, "urethane_block"),
    (156, "tunnel"),
    (157, "c4_tile"),
    (164, "crackerbarrel"),
    (172, "brics1"),
    (173, "brics2"),
    (174, "brics3"),
    (180, "doorswitch_red"),
];

/// Tiles that read as open ground for edge transitions.
pub const EMPTY_LIKE_TILE_IDS: &[u8] = &[
    48, 66, 101, 121, 143, 144, 145, 146, 147, 148, 149, 150, 151, 152, 153, 154, 156, 164,
];
pub const BEDROCK_TILE_IDS: &[u8] = &[67, 68, 69, 70];
pub const DIRT_TILE_IDS: &[u8] = &[50, 51, 52];
pub const BEDROCK_CORNER_TILE_IDS: &[u8] = &[
    BEDROCK_NW_TILE_ID,
    BEDROCK_NE_TILE_ID,
    BEDROCK_SE_TILE_ID,
    BEDROCK_SW_TILE_ID,
];

const FALLBACK_EMPTY_COLOR: Rgba = [28, 22, 18, 255];
const FALLBACK_DIRT_COLOR: Rgba = [112, 83, 58, 255];
const FALLBACK_BEDROCK_COLOR: Rgba = [92, 92, 104, 255];
const FALLBACK_TREASURE_COLOR: Rgba = [230, 190, 40, 255];
const FALLBACK_SOLID_COLOR: Rgba = [140, 130, 120, 255];

pub fn sprite_name(tile_id: u8) -> Option<&'static str> {
    TILE_SPRITES
        .iter()
        .find(|(id, _)| *id == tile_id)
        .map(|(_, name)| *name)
}

pub fn known_tiles() -> impl Iterator<Item = (u8, &'static str)> {
    TILE_SPRITES.iter().copied()
}

pub fn is_empty_like(tile_id: u8) -> bool {
    EMPTY_LIKE_TILE_IDS.contains(&tile_id)
}

pub fn is_bedrock(tile_id: u8) -> bool {
    BEDROCK_TILE_IDS.contains(&tile_id)
}

pub fn is_dirt(tile_id: u8) -> bool {
    DIRT_TILE_IDS.contains(&tile_id)
}

pub fn is_bedrock_corner(tile_id: u8) -> bool {
    BEDROCK_CORNER_TILE_IDS.contains(&tile_id)
}

/// Whether an entity may stand on the tile. Pickup tiles count as open
/// ground; everything else blocks.
pub fn is_walkable(tile_id: u8) -> bool {
    matches!(tile_id, 48 | 156) || pickup_kind(tile_id).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickupKind {
    Treasure,
    Tool,
}

pub fn pickup_kind(tile_id: u8) -> Option<PickupKind> {
    match tile_id {
        146..=154 => Some(PickupKind::Treasure),
        109 | 143..=145 => Some(PickupKind::Tool),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonsterKind {
    Furryman,
    GrenadeMonster,
    Slime,
    Alien,
}

impl MonsterKind {
    pub fn sprite_prefix(self) -> &'static str {
        match self {
            Self::Furryman => "furryman",
            Self::GrenadeMonster => "grenademonster",
            Self::Slime => "slime",
            Self::Alien => "alien",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    #[default]
    Right,
    Left,
    Up,
    Down,
}

impl Facing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Right => (1, 0),
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Spawn markers 71..=86 come in groups of four facings per monster kind.
pub fn monster_spawn(tile_id: u8) -> Option<(MonsterKind, Facing)> {
    if !(71..=86).contains(&tile_id) {
        return None;
    }
    let offset = tile_id - 71;
    let kind = match offset / 4 {
        0 => MonsterKind::Furryman,
        1 => MonsterKind::GrenadeMonster,
        2 => MonsterKind::Slime,
        _ => MonsterKind::Alien,
    };
    let facing = match offset % 4 {
        0 => Facing::Right,
        1 => Facing::Left,
        2 => Facing::Up,
        _ => Facing::Down,
    };
    Some((kind, facing))
}

pub fn fallback_color(tile_id: u8) -> Rgba {
    if is_dirt(tile_id) || matches!(tile_id, 53 | 54) {
        FALLBACK_DIRT_COLOR
    } else if is_bedrock(tile_id) || is_bedrock_corner(tile_id) {
        FALLBACK_BEDROCK_COLOR
    } else if pickup_kind(tile_id).is_some() {
        FALLBACK_TREASURE_COLOR
    } else if is_empty_like(tile_id) {
        FALLBACK_EMPTY_COLOR
    } else {
        FALLBACK_SOLID_COLOR
    }
}

use tilescroll::world::tiles::{
    BEDROCK_NE_TILE_ID, BEDROCK_NW_TILE_ID, BEDROCK_SE_TILE_ID, BEDROCK_SW_TILE_ID,
    BEDROCK_TILE_IDS, CONCRETE_TILE_ID, DIRT_TILE_IDS, EMPTY_TILE_ID,
};
use tilescroll::{MapError, MapState};

pub(crate) const DEMO_MAP_WIDTH: u32 = 96;
pub(crate) const DEMO_MAP_HEIGHT: u32 = 72;

const FIRST_TREASURE_TILE_ID: u8 = 146;
const TREASURE_KINDS: u32 = 9;
const FIRST_TOOL_TILE_ID: u8 = 143;
const TOOL_KINDS: u32 = 3;
const FIRST_SPAWN_TILE_ID: u8 = 71;
const SPAWN_TILES_PER_MONSTER: u32 = 4;
const MONSTER_KINDS: u32 = 4;

// Bedrock frame around dirt, cut by tunnels holding treasure, tools and
// monster spawns. Larger than the viewport on both axes.
pub(crate) fn demo_map() -> Result<MapState, MapError> {
    let (width, height) = (DEMO_MAP_WIDTH, DEMO_MAP_HEIGHT);
    let mut tiles = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            tiles.push(demo_tile(x, y, width, height));
        }
    }
    MapState::new(width, height, tiles)
}

fn demo_tile(x: u32, y: u32, width: u32, height: u32) -> u8 {
    let (right, bottom) = (width - 1, height - 1);
    match (x, y) {
        (0, 0) => return BEDROCK_NW_TILE_ID,
        (x, 0) if x == right => return BEDROCK_NE_TILE_ID,
        (x, y) if x == right && y == bottom => return BEDROCK_SE_TILE_ID,
        (0, y) if y == bottom => return BEDROCK_SW_TILE_ID,
        _ => {}
    }
    if x == 0 || y == 0 || x == right || y == bottom {
        return BEDROCK_TILE_IDS[((x + y) % BEDROCK_TILE_IDS.len() as u32) as usize];
    }

    let inner = x >= 2 && y >= 2 && x <= right - 2 && y <= bottom - 2;
    let row_tunnel = inner && y % 8 == 4;
    let column_tunnel = inner && x % 12 == 6;

    if row_tunnel {
        if y % 16 == 4 && x % 24 == 15 {
            let kind = (x / 24) % MONSTER_KINDS;
            return FIRST_SPAWN_TILE_ID + (kind * SPAWN_TILES_PER_MONSTER) as u8;
        }
        if x % 10 == 3 {
            return FIRST_TREASURE_TILE_ID + ((x / 10 + y / 8) % TREASURE_KINDS) as u8;
        }
        return EMPTY_TILE_ID;
    }
    if column_tunnel {
        if y % 16 == 10 {
            return FIRST_TOOL_TILE_ID + ((y / 16) % TOOL_KINDS) as u8;
        }
        return EMPTY_TILE_ID;
    }
    if x % 12 == 0 && y % 8 == 0 {
        return CONCRETE_TILE_ID;
    }
    DIRT_TILE_IDS[((x * 7 + y * 3) % DIRT_TILE_IDS.len() as u32) as usize]
}

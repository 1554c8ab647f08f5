use tilescroll::world::tiles::{self, Facing, PickupKind, CONCRETE_TILE_ID, EMPTY_TILE_ID};
use tilescroll::world::{MapState, EXPLOSION_BLAST, EXPLOSION_NONE, EXPLOSION_SMOKE_2};
use tracing::debug;

use super::types::{
    Bomb, BombKind, Burning, Cell, Monster, Pickup, Player, Walker, EXPLOSION_STEP_SECONDS,
};

const BLAST_DIRECTIONS: [Facing; 4] = [Facing::Right, Facing::Left, Facing::Up, Facing::Down];

pub(super) fn is_open(map: &MapState, cell: Cell) -> bool {
    map.tile_at(cell.x, cell.y).is_some_and(tiles::is_walkable)
}

fn is_indestructible(tile_id: u8) -> bool {
    tile_id == CONCRETE_TILE_ID || tiles::is_bedrock(tile_id) || tiles::is_bedrock_corner(tile_id)
}

pub(super) fn facing_for(movement: (i32, i32)) -> Option<Facing> {
    match movement {
        (1, 0) => Some(Facing::Right),
        (-1, 0) => Some(Facing::Left),
        (0, -1) => Some(Facing::Up),
        (0, 1) => Some(Facing::Down),
        _ => None,
    }
}

// A step in progress always finishes unless `wanted` reverses it.
pub(super) fn advance_walker(
    walker: &mut Walker,
    map: &MapState,
    wanted: Option<Facing>,
    distance: f32,
) {
    if walker.moving && wanted == Some(walker.facing.reversed()) {
        walker.cell = walker.target();
        walker.facing = walker.facing.reversed();
        walker.progress = 1.0 - walker.progress;
    }

    if !walker.moving {
        let Some(facing) = wanted else {
            return;
        };
        walker.facing = facing;
        if !is_open(map, walker.target()) {
            return;
        }
        walker.moving = true;
        walker.progress = 0.0;
    }

    walker.progress += distance;
    while walker.progress >= 1.0 {
        walker.cell = walker.target();
        walker.progress -= 1.0;
        if wanted != Some(walker.facing) || !is_open(map, walker.target()) {
            walker.moving = false;
            walker.progress = 0.0;
            return;
        }
    }
}

pub(super) fn patrol(monster: &mut Monster, map: &MapState, distance: f32) {
    let walker = &mut monster.walker;
    if !walker.moving && !is_open(map, walker.target()) {
        walker.facing = walker.facing.reversed();
    }
    let facing = walker.facing;
    advance_walker(walker, map, Some(facing), distance);
}

fn treasure_value(tile_id: u8) -> u32 {
    match tiles::sprite_name(tile_id) {
        Some("gold_crown") => 100,
        Some("gold_ruby") => 65,
        Some("gold_sceptre") => 50,
        Some("gold_cross") => 35,
        Some("gold_bar") => 30,
        Some("gold_egg") => 25,
        Some("gold_coins") | Some("gold_shield") => 15,
        Some("gold_bracelet") => 10,
        _ => 100,
    }
}

fn tool_dig_power(tile_id: u8) -> u32 {
    match tiles::sprite_name(tile_id) {
        Some("smallpick") => 1,
        Some("bigpick") => 3,
        Some("drill") => 5,
        _ => 0,
    }
}

pub(super) fn collect_pickups(player: &mut Player, pickups: &mut Vec<Pickup>) -> usize {
    let cell = player.walker.occupied();
    let before = pickups.len();
    pickups.retain(|pickup| {
        if pickup.cell != cell {
            return true;
        }
        match tiles::pickup_kind(pickup.tile_id) {
            Some(PickupKind::Treasure) => {
                player.money = player.money.saturating_add(treasure_value(pickup.tile_id));
            }
            Some(PickupKind::Tool) => {
                player.dig_power = player
                    .dig_power
                    .saturating_add(tool_dig_power(pickup.tile_id));
            }
            None => {}
        }
        debug!(
            tile_id = pickup.tile_id,
            money = player.money,
            dig_power = player.dig_power,
            "pickup_collected"
        );
        false
    });
    before - pickups.len()
}

pub(super) fn place_bomb(player: &mut Player, bombs: &mut Vec<Bomb>) -> Option<BombKind> {
    let kind = player.selected_bomb();
    let cell = player.walker.occupied();
    let count = &mut player.inventory[kind.slot()];
    if *count == 0 || bombs.iter().any(|bomb| bomb.cell == cell) {
        return None;
    }
    *count -= 1;
    bombs.push(Bomb {
        kind,
        cell,
        fuse_remaining: kind.fuse_seconds(),
    });
    Some(kind)
}

// Bombs caught in a blast go off in the same tick.
pub(super) fn tick_bombs(
    bombs: &mut Vec<Bomb>,
    map: &mut MapState,
    burning: &mut Vec<Burning>,
    dt: f32,
) -> usize {
    for bomb in bombs.iter_mut() {
        bomb.fuse_remaining -= dt;
    }

    let mut detonated = 0;
    while let Some(index) = bombs.iter().position(|bomb| bomb.fuse_remaining <= 0.0) {
        let bomb = bombs.remove(index);
        detonate(&bomb, map, burning);
        detonated += 1;
        for other in bombs.iter_mut() {
            if map.explosion_at(other.cell.x, other.cell.y) == Some(EXPLOSION_BLAST) {
                other.fuse_remaining = 0.0;
            }
        }
    }
    detonated
}

// Each arm stops at indestructible tiles and at the first solid tile it clears.
fn detonate(bomb: &Bomb, map: &mut MapState, burning: &mut Vec<Burning>) {
    ignite(bomb.cell, map, burning);
    for facing in BLAST_DIRECTIONS {
        let mut cell = bomb.cell;
        for _ in 0..bomb.kind.radius() {
            cell = cell.step(facing);
            let Some(tile_id) = map.tile_at(cell.x, cell.y) else {
                break;
            };
            if is_indestructible(tile_id) {
                break;
            }
            ignite(cell, map, burning);
            if !tiles::is_walkable(tile_id) {
                map.set_tile(cell.x, cell.y, EMPTY_TILE_ID);
                break;
            }
        }
    }
}

fn ignite(cell: Cell, map: &mut MapState, burning: &mut Vec<Burning>) {
    if !map.set_explosion(cell.x, cell.y, EXPLOSION_BLAST) {
        return;
    }
    match burning.iter_mut().find(|entry| entry.cell == cell) {
        Some(entry) => entry.elapsed = 0.0,
        None => burning.push(Burning { cell, elapsed: 0.0 }),
    }
}

pub(super) fn decay_explosions(map: &mut MapState, burning: &mut Vec<Burning>, dt: f32) {
    burning.retain_mut(|entry| {
        entry.elapsed += dt;
        let steps = (entry.elapsed / EXPLOSION_STEP_SECONDS) as u8;
        let state = EXPLOSION_BLAST.saturating_add(steps);
        if state > EXPLOSION_SMOKE_2 {
            map.set_explosion(entry.cell.x, entry.cell.y, EXPLOSION_NONE);
            false
        } else {
            map.set_explosion(entry.cell.x, entry.cell.y, state);
            true
        }
    });
}

pub(super) fn remove_blasted_monsters(monsters: &mut Vec<Monster>, map: &MapState) -> usize {
    let before = monsters.len();
    monsters.retain(|monster| {
        let cell = monster.walker.occupied();
        map.explosion_at(cell.x, cell.y) != Some(EXPLOSION_BLAST)
    });
    before - monsters.len()
}

use tilescroll::render::{ClientStatus, HeaderModel, InventorySlot, TileLookup};
use tilescroll::world::tiles::{self, Facing, EMPTY_TILE_ID};
use tilescroll::{
    EntityKind, FrameRenderer, InputSnapshot, MapState, Session, SessionCommand, SpriteAtlas,
    TextureId, TileCoordinate,
};
use tracing::{debug, info};

mod demo_map;
mod systems;
mod types;


pub(crate) use demo_map::demo_map;

use types::{
    Bomb, BombKind, Burning, Cell, Monster, Pickup, Player, SessionTextures, Walker,
    BOMB_KIND_COUNT, MONSTER_SPEED_TILES_PER_SECOND, PLAYER_SPEED_TILES_PER_SECOND,
};

pub(crate) struct LocalSession {
    map: MapState,
    player: Option<Player>,
    monsters: Vec<Monster>,
    bombs: Vec<Bomb>,
    pickups: Vec<Pickup>,
    burning: Vec<Burning>,
    textures: SessionTextures,
    header: HeaderModel,
}

impl LocalSession {
    // Spawn markers and pickup tiles are lifted out of the tilemap. The
    // player starts on the first empty tile in row-major order.
    pub(crate) fn new(mut map: MapState, player_name: String) -> Self {
        let player = find_player_spawn(&map).map(Player::spawn);
        let (monsters, pickups) = extract_entities(&mut map);
        info!(
            map_width = map.width(),
            map_height = map.height(),
            monsters = monsters.len(),
            pickups = pickups.len(),
            has_player = player.is_some(),
            "session_started"
        );

        let mut session = Self {
            map,
            player,
            monsters,
            bombs: Vec::new(),
            pickups,
            burning: Vec::new(),
            textures: SessionTextures::default(),
            header: HeaderModel {
                player_name,
                client: None,
            },
        };
        session.refresh_header();
        session
    }

    fn refresh_header(&mut self) {
        let Some(player) = self.player.as_ref() else {
            self.header.client = None;
            return;
        };
        let status = self.header.client.get_or_insert_with(|| ClientStatus {
            card: TextureId::TRANSPARENT,
            dig_power: 0,
            money: 0,
            inventory: Vec::with_capacity(BOMB_KIND_COUNT),
            selected: 0,
        });
        status.card = self.textures.card;
        status.dig_power = player.dig_power;
        status.money = player.money;
        status.selected = player.selected;
        status.inventory.clear();
        status
            .inventory
            .extend(BombKind::ALL.iter().map(|kind| InventorySlot {
                icon: self.textures.icons[kind.slot()],
                count: player.inventory[kind.slot()],
            }));
    }

    fn update_player(&mut self, dt: f32, input: &InputSnapshot) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if let Some(slot) = input.selected_slot().filter(|&slot| slot < BOMB_KIND_COUNT) {
            player.selected = slot;
        }

        let wanted = input.movement().and_then(systems::facing_for);
        systems::advance_walker(
            &mut player.walker,
            &self.map,
            wanted,
            PLAYER_SPEED_TILES_PER_SECOND * dt,
        );
        systems::collect_pickups(player, &mut self.pickups);

        if input.bomb_pressed() {
            if let Some(kind) = systems::place_bomb(player, &mut self.bombs) {
                debug!(
                    bomb = kind.sprite_base(),
                    remaining = player.inventory[kind.slot()],
                    "bomb_placed"
                );
            }
        }
    }
}

impl Session for LocalSession {
    fn attach(&mut self, atlas: &mut SpriteAtlas) {
        self.textures = SessionTextures::resolve(|name| atlas.resolve(name));
        self.refresh_header();
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SessionCommand {
        if input.quit_requested() {
            return SessionCommand::Quit;
        }

        // Decay first so fresh blasts stay at full strength for one tick.
        systems::decay_explosions(&mut self.map, &mut self.burning, fixed_dt_seconds);
        self.update_player(fixed_dt_seconds, input);
        for monster in &mut self.monsters {
            systems::patrol(
                monster,
                &self.map,
                MONSTER_SPEED_TILES_PER_SECOND * fixed_dt_seconds,
            );
        }

        let detonated = systems::tick_bombs(
            &mut self.bombs,
            &mut self.map,
            &mut self.burning,
            fixed_dt_seconds,
        );
        let killed = systems::remove_blasted_monsters(&mut self.monsters, &self.map);
        if detonated > 0 || killed > 0 {
            debug!(detonated, killed, "blast_resolved");
        }

        self.refresh_header();
        SessionCommand::Continue
    }

    fn map(&self) -> &MapState {
        &self.map
    }

    fn locate_player(&self) -> Option<TileCoordinate> {
        self.player.as_ref().map(|player| player.walker.position())
    }

    fn submit_frame(&mut self, frame: &mut FrameRenderer, atlas: &mut SpriteAtlas) {
        let atlas = &*atlas;
        let textures = &self.textures;
        frame.sync_entities(EntityKind::Pickup, &self.pickups, |pickup| {
            atlas.tile_texture(pickup.tile_id)
        });
        frame.sync_entities(EntityKind::Bomb, &self.bombs, |bomb| textures.bomb(bomb));
        frame.sync_entities(EntityKind::Monster, &self.monsters, |monster| {
            textures.monster(monster)
        });
        frame.sync_entities(EntityKind::Player, self.player.as_slice(), |player| {
            textures.player(&player.walker)
        });
        frame.update_header(&self.header, atlas);
    }

    fn shutdown(&mut self) {
        let (money, dig_power) = self
            .player
            .as_ref()
            .map_or((0, 0), |player| (player.money, player.dig_power));
        info!(
            money,
            dig_power,
            monsters_left = self.monsters.len(),
            "session_ended"
        );
    }
}

fn find_player_spawn(map: &MapState) -> Option<Cell> {
    map.tiles()
        .iter()
        .position(|&tile_id| tile_id == EMPTY_TILE_ID)
        .map(|index| {
            let width = map.width() as usize;
            Cell::new((index % width) as i64, (index / width) as i64)
        })
}

fn patrol_facing(spawn_facing: Facing) -> Facing {
    match spawn_facing {
        Facing::Right | Facing::Up => Facing::Right,
        Facing::Left | Facing::Down => Facing::Left,
    }
}

fn extract_entities(map: &mut MapState) -> (Vec<Monster>, Vec<Pickup>) {
    let mut monsters = Vec::new();
    let mut pickups = Vec::new();
    for y in 0..i64::from(map.height()) {
        for x in 0..i64::from(map.width()) {
            let Some(tile_id) = map.tile_at(x, y) else {
                continue;
            };
            let cell = Cell::new(x, y);
            if let Some((kind, facing)) = tiles::monster_spawn(tile_id) {
                monsters.push(Monster {
                    kind,
                    walker: Walker::standing(cell, patrol_facing(facing)),
                });
            } else if tiles::pickup_kind(tile_id).is_some() {
                pickups.push(Pickup { tile_id, cell });
            } else {
                continue;
            }
            map.set_tile(x, y, EMPTY_TILE_ID);
        }
    }
    (monsters, pickups)
}

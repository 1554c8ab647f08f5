use tilescroll::render::{TextureId, TileCoordinate, WorldPosition};
use tilescroll::world::tiles::{Facing, MonsterKind};

pub(super) const PLAYER_SPEED_TILES_PER_SECOND: f32 = 5.0;
pub(super) const MONSTER_SPEED_TILES_PER_SECOND: f32 = 2.0;
pub(super) const EXPLOSION_STEP_SECONDS: f32 = 0.1;

pub(super) const BOMB_KIND_COUNT: usize = 3;
pub(super) const WALK_FRAMES: usize = 4;
pub(super) const FUSE_FRAMES: usize = 3;
// The local player always wears the first of the four player skins.
const CLIENT_SPRITE_ID: u32 = 1;

const FACINGS: [Facing; 4] = [Facing::Right, Facing::Left, Facing::Up, Facing::Down];
const MONSTER_KINDS: [MonsterKind; 4] = [
    MonsterKind::Furryman,
    MonsterKind::GrenadeMonster,
    MonsterKind::Slime,
    MonsterKind::Alien,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct Cell {
    pub(super) x: i64,
    pub(super) y: i64,
}

impl Cell {
    pub(super) const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub(super) fn step(self, facing: Facing) -> Self {
        let (dx, dy) = facing.delta();
        Self::new(self.x + i64::from(dx), self.y + i64::from(dy))
    }

    pub(super) fn center(self) -> TileCoordinate {
        TileCoordinate::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

// `progress` is the fraction of the step from `cell` toward `target()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Walker {
    pub(super) cell: Cell,
    pub(super) facing: Facing,
    pub(super) progress: f32,
    pub(super) moving: bool,
}

impl Walker {
    pub(super) fn standing(cell: Cell, facing: Facing) -> Self {
        Self {
            cell,
            facing,
            progress: 0.0,
            moving: false,
        }
    }

    pub(super) fn target(&self) -> Cell {
        self.cell.step(self.facing)
    }

    // Flips to the target halfway through a step.
    pub(super) fn occupied(&self) -> Cell {
        if self.moving && self.progress >= 0.5 {
            self.target()
        } else {
            self.cell
        }
    }

    pub(super) fn position(&self) -> TileCoordinate {
        let center = self.cell.center();
        if !self.moving {
            return center;
        }
        let (dx, dy) = self.facing.delta();
        TileCoordinate::new(
            center.x + dx as f32 * self.progress,
            center.y + dy as f32 * self.progress,
        )
    }

    // One frame per quarter step, the first frame while standing.
    pub(super) fn walk_frame(&self) -> usize {
        if !self.moving {
            return 0;
        }
        ((self.progress.max(0.0) * WALK_FRAMES as f32) as usize).min(WALK_FRAMES - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BombKind {
    Small,
    Big,
    Dynamite,
}

impl BombKind {
    pub(super) const ALL: [BombKind; BOMB_KIND_COUNT] =
        [BombKind::Small, BombKind::Big, BombKind::Dynamite];

    pub(super) fn slot(self) -> usize {
        match self {
            Self::Small => 0,
            Self::Big => 1,
            Self::Dynamite => 2,
        }
    }

    pub(super) fn radius(self) -> i64 {
        match self {
            Self::Small => 2,
            Self::Big => 4,
            Self::Dynamite => 6,
        }
    }

    pub(super) fn fuse_seconds(self) -> f32 {
        match self {
            Self::Small | Self::Big => 3.0,
            Self::Dynamite => 2.0,
        }
    }

    pub(super) fn starting_count(self) -> u32 {
        match self {
            Self::Small => 10,
            Self::Big => 3,
            Self::Dynamite => 2,
        }
    }

    pub(super) fn sprite_base(self) -> &'static str {
        match self {
            Self::Small => "smallbomb",
            Self::Big => "bigbomb",
            Self::Dynamite => "dynamite",
        }
    }

    pub(super) fn icon_name(self) -> &'static str {
        match self {
            Self::Small => "small_bomb_icon",
            Self::Big => "big_bomb_icon",
            Self::Dynamite => "dynamite_icon",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Player {
    pub(super) walker: Walker,
    pub(super) dig_power: u32,
    pub(super) money: u32,
    pub(super) inventory: [u32; BOMB_KIND_COUNT],
    pub(super) selected: usize,
}

impl Player {
    pub(super) fn spawn(cell: Cell) -> Self {
        Self {
            walker: Walker::standing(cell, Facing::Right),
            dig_power: 1,
            money: 0,
            inventory: BombKind::ALL.map(BombKind::starting_count),
            selected: 0,
        }
    }

    pub(super) fn selected_bomb(&self) -> BombKind {
        BombKind::ALL[self.selected.min(BOMB_KIND_COUNT - 1)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Monster {
    pub(super) kind: MonsterKind,
    pub(super) walker: Walker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Bomb {
    pub(super) kind: BombKind,
    pub(super) cell: Cell,
    pub(super) fuse_remaining: f32,
}

impl Bomb {
    // Thirds of the fuse: frame 0 above 67% left, frame 2 below 33%.
    pub(super) fn fuse_frame(&self) -> usize {
        let left = self.fuse_remaining / self.kind.fuse_seconds();
        if left > 0.67 {
            0
        } else if left > 0.33 {
            1
        } else {
            2
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Pickup {
    pub(super) tile_id: u8,
    pub(super) cell: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Burning {
    pub(super) cell: Cell,
    pub(super) elapsed: f32,
}

impl WorldPosition for Player {
    fn world_position(&self) -> TileCoordinate {
        self.walker.position()
    }
}

impl WorldPosition for Monster {
    fn world_position(&self) -> TileCoordinate {
        self.walker.position()
    }
}

impl WorldPosition for Bomb {
    fn world_position(&self) -> TileCoordinate {
        self.cell.center()
    }
}

impl WorldPosition for Pickup {
    fn world_position(&self) -> TileCoordinate {
        self.cell.center()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct SessionTextures {
    pub(super) player: [[TextureId; WALK_FRAMES]; 4],
    pub(super) monsters: [[[TextureId; WALK_FRAMES]; 4]; 4],
    pub(super) bombs: [[TextureId; FUSE_FRAMES]; BOMB_KIND_COUNT],
    pub(super) icons: [TextureId; BOMB_KIND_COUNT],
    pub(super) card: TextureId,
}

impl SessionTextures {
    // Asset names follow the sprite set: `player1_left_3`, `slime_up_1`,
    // `bigbomb2`, `dynamite_icon`, `player_card_1`.
    pub(super) fn resolve(mut resolve: impl FnMut(&str) -> TextureId) -> Self {
        let mut textures = Self::default();
        for facing in FACINGS {
            let slot = facing_slot(facing);
            let dir = facing.as_str();
            for frame in 0..WALK_FRAMES {
                let number = frame + 1;
                textures.player[slot][frame] =
                    resolve(&format!("player{CLIENT_SPRITE_ID}_{dir}_{number}"));
                for kind in MONSTER_KINDS {
                    textures.monsters[monster_slot(kind)][slot][frame] =
                        resolve(&format!("{}_{dir}_{number}", kind.sprite_prefix()));
                }
            }
        }
        for kind in BombKind::ALL {
            for frame in 0..FUSE_FRAMES {
                textures.bombs[kind.slot()][frame] =
                    resolve(&format!("{}{}", kind.sprite_base(), frame + 1));
            }
            textures.icons[kind.slot()] = resolve(kind.icon_name());
        }
        textures.card = resolve(&format!("player_card_{CLIENT_SPRITE_ID}"));
        textures
    }

    pub(super) fn player(&self, walker: &Walker) -> TextureId {
        self.player[facing_slot(walker.facing)][walker.walk_frame()]
    }

    pub(super) fn monster(&self, monster: &Monster) -> TextureId {
        let walker = &monster.walker;
        let frames = &self.monsters[monster_slot(monster.kind)][facing_slot(walker.facing)];
        frames[walker.walk_frame()]
    }

    pub(super) fn bomb(&self, bomb: &Bomb) -> TextureId {
        self.bombs[bomb.kind.slot()][bomb.fuse_frame()]
    }

    #[cfg(test)]
    pub(super) fn all(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.player
            .iter()
            .flatten()
            .chain(self.monsters.iter().flatten().flatten())
            .chain(self.bombs.iter().flatten())
            .chain(self.icons.iter())
            .chain(std::iter::once(&self.card))
            .copied()
    }
}

fn facing_slot(facing: Facing) -> usize {
    match facing {
        Facing::Right => 0,
        Facing::Left => 1,
        Facing::Up => 2,
        Facing::Down => 3,
    }
}

fn monster_slot(kind: MonsterKind) -> usize {
    match kind {
        MonsterKind::Furryman => 0,
        MonsterKind::GrenadeMonster => 1,
        MonsterKind::Slime => 2,
        MonsterKind::Alien => 3,
    }
}

mod map;
pub mod tiles;

pub use map::{
    MapError, MapState, EXPLOSION_BLAST, EXPLOSION_NONE, EXPLOSION_SMOKE_1, EXPLOSION_SMOKE_2,
    MAP_DIMENSION_MAX,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::tiles::EMPTY_TILE_ID;
use crate::render::GridExtent;

pub const MAP_DIMENSION_MAX: u32 = 256;

pub const EXPLOSION_NONE: u8 = 0;
pub const EXPLOSION_BLAST: u8 = 1;
pub const EXPLOSION_SMOKE_1: u8 = 2;
pub const EXPLOSION_SMOKE_2: u8 = 3;

/// Map convention:
/// - cell (0,0) is the top-left corner, y grows downward.
/// - `tilemap` and `explosions` are row-major, `width * height` bytes each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapState {
    width: u32,
    height: u32,
    tilemap: Vec<u8>,
    explosions: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map dimensions {width}x{height} outside 1..={MAP_DIMENSION_MAX}")]
    DimensionOutOfRange { width: u32, height: u32 },
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("explosion count mismatch: expected {expected}, got {actual}")]
    ExplosionCountMismatch { expected: usize, actual: usize },
    #[error("failed to read map file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("map data contains no rows")]
    Empty,
    #[error("map row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl MapState {
    pub fn new(width: u32, height: u32, tilemap: Vec<u8>) -> Result<Self, MapError> {
        let explosions = vec![EXPLOSION_NONE; tilemap.len()];
        Self::with_explosions(width, height, tilemap, explosions)
    }

    pub fn with_explosions(
        width: u32,
        height: u32,
        tilemap: Vec<u8>,
        explosions: Vec<u8>,
    ) -> Result<Self, MapError> {
        if !(1..=MAP_DIMENSION_MAX).contains(&width) || !(1..=MAP_DIMENSION_MAX).contains(&height)
        {
            return Err(MapError::DimensionOutOfRange { width, height });
        }
        let expected = width as usize * height as usize;
        if tilemap.len() != expected {
            return Err(MapError::TileCountMismatch {
                expected,
                actual: tilemap.len(),
            });
        }
        if explosions.len() != expected {
            return Err(MapError::ExplosionCountMismatch {
                expected,
                actual: explosions.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tilemap,
            explosions,
        })
    }

    pub fn filled(width: u32, height: u32, tile_id: u8) -> Result<Self, MapError> {
        let count = width as usize * height as usize;
        Self::new(width, height, vec![tile_id; count])
    }

    /// Parses `.MNE` map bytes: one line per row, one byte per tile. The
    /// first row sets the width. A short final row is padded with empty
    /// tiles; any other row of the wrong length is rejected.
    pub fn parse_mne(bytes: &[u8]) -> Result<Self, MapError> {
        let mut rows: Vec<&[u8]> = bytes
            .split(|byte| *byte == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        let Some(first) = rows.first() else {
            return Err(MapError::Empty);
        };
        let expected = first.len();
        let mut tilemap = Vec::with_capacity(expected * rows.len());
        let last = rows.len() - 1;
        for (row, line) in rows.iter().enumerate() {
            if row == last && line.len() < expected {
                tilemap.extend_from_slice(line);
                tilemap.resize(expected * rows.len(), EMPTY_TILE_ID);
                break;
            }
            if line.len() != expected {
                return Err(MapError::RaggedRow {
                    row,
                    expected,
                    actual: line.len(),
                });
            }
            tilemap.extend_from_slice(line);
        }
        let width = u32::try_from(expected).unwrap_or(u32::MAX);
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        Self::new(width, height, tilemap)
    }

    pub fn load_mne(path: &Path) -> Result<Self, MapError> {
        let bytes = fs::read(path).map_err(|source| MapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_mne(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn extent(&self) -> GridExtent {
        GridExtent::new(self.width, self.height)
    }

    /// Signed coordinates so callers can probe cells left of or above the map.
    pub fn index_of(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: i64, y: i64) -> Option<u8> {
        self.index_of(x, y)
            .and_then(|index| self.tilemap.get(index).copied())
    }

    pub fn explosion_at(&self, x: i64, y: i64) -> Option<u8> {
        self.index_of(x, y)
            .and_then(|index| self.explosions.get(index).copied())
    }

    pub fn set_tile(&mut self, x: i64, y: i64, tile_id: u8) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.tilemap[index] = tile_id;
                true
            }
            None => false,
        }
    }

    pub fn set_explosion(&mut self, x: i64, y: i64, state: u8) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.explosions[index] = state;
                true
            }
            None => false,
        }
    }

    pub fn tiles(&self) -> &[u8] {
        &self.tilemap
    }

    pub fn explosions(&self) -> &[u8] {
        &self.explosions
    }
}

use super::geometry::{GridExtent, ScreenPoint};

pub type Rgba = [u8; 4];

pub const WHITE_TINT: Rgba = [255, 255, 255, 255];

/// Handle into the presenter's texture table. `TRANSPARENT` draws nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u16);

impl TextureId {
    pub const TRANSPARENT: Self = Self(0);

    pub fn is_transparent(self) -> bool {
        self == Self::TRANSPARENT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub texture: TextureId,
    pub position: ScreenPoint,
    pub tint: Rgba,
}

impl Sprite {
    pub const HIDDEN: Self = Self {
        texture: TextureId::TRANSPARENT,
        position: ScreenPoint::ZERO,
        tint: WHITE_TINT,
    };

    pub fn new(texture: TextureId, position: ScreenPoint) -> Self {
        Self {
            texture,
            position,
            tint: WHITE_TINT,
        }
    }

    pub fn tinted(texture: TextureId, position: ScreenPoint, tint: Rgba) -> Self {
        Self {
            texture,
            position,
            tint,
        }
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::HIDDEN
    }
}

/// Grid of sprites allocated once. Cells are rewritten in place every frame;
/// the backing slice never grows or shrinks.
#[derive(Debug, Clone)]
pub struct SpritePool {
    extent: GridExtent,
    sprites: Box<[Sprite]>,
}

impl SpritePool {
    pub fn new(extent: GridExtent) -> Self {
        Self {
            extent,
            sprites: vec![Sprite::HIDDEN; extent.cell_count()].into_boxed_slice(),
        }
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&Sprite> {
        if row >= self.extent.height || col >= self.extent.width {
            return None;
        }
        self.sprites
            .get(row as usize * self.extent.width as usize + col as usize)
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut [Sprite] {
        &mut self.sprites
    }

    /// Storage address, used by tests to prove the pool was not reallocated.
    pub fn as_ptr(&self) -> *const Sprite {
        self.sprites.as_ptr()
    }
}

/// Bounded list of sprites. Capacity is reserved up front and `push` refuses
/// to grow past it.
#[derive(Debug, Clone)]
pub struct SpriteStack {
    sprites: Vec<Sprite>,
    capacity: usize,
}

impl SpriteStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sprites: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sprites.len() >= self.capacity
    }

    /// Returns false when the stack is full and the sprite was dropped.
    pub fn push(&mut self, sprite: Sprite) -> bool {
        if self.is_full() {
            return false;
        }
        self.sprites.push(sprite);
        true
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }
}

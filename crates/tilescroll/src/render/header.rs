//! Status header drawn in the margin above the map: player card, name,
//! dig power and money, and the inventory strip.
//!
//! All offsets are in unzoomed pixels measured from the top-left corner of
//! the window and scaled by zoom when laid out.

use super::geometry::{ScreenGeometry, ScreenPoint};
use super::sprite::{Rgba, Sprite, SpriteStack, TextureId, WHITE_TINT};

pub const DEFAULT_PLAYER_NAME: &str = "Player 1";

pub const GLYPH_SIZE_PX: f32 = 8.0;

const CARD_WIDTH_PX: f32 = 110.0;
const CARD_HEIGHT_PX: f32 = 30.0;
const NAME_ORIGIN_PX: (f32, f32) = (8.0, 1.0);
const DIG_POWER_ORIGIN_PX: (f32, f32) = (26.0, 11.0);
const MONEY_ORIGIN_PX: (f32, f32) = (26.0, 21.0);
const INVENTORY_LEFT_PX: f32 = 110.0;
const ICON_SIZE_PX: f32 = 30.0;
const SEPARATOR_WIDTH_PX: f32 = 3.0;
const COUNT_INSET_PX: f32 = 1.0;

const DIG_POWER_COLOR: Rgba = [255, 0, 0, 255];
const MONEY_COLOR: Rgba = [255, 255, 0, 255];

const NAME_GLYPHS_MAX: usize = 32;
const STATS_GLYPHS_MAX: usize = 48;
const INVENTORY_SPRITES_MAX: usize = 512;

/// Textures the header needs besides those named in the model.
pub trait GlyphLookup {
    fn glyph_texture(&self, code: u8) -> TextureId;
    fn hatch_texture(&self) -> TextureId;
    fn separator_texture(&self) -> TextureId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySlot {
    pub icon: TextureId,
    pub count: u32,
}

/// State of the player this client controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientStatus {
    pub card: TextureId,
    pub dig_power: u32,
    pub money: u32,
    pub inventory: Vec<InventorySlot>,
    pub selected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderModel {
    pub player_name: String,
    /// `None` when the named player is not in the current state.
    pub client: Option<ClientStatus>,
}

impl HeaderModel {
    pub fn display_name(&self) -> &str {
        if self.player_name.is_empty() {
            DEFAULT_PLAYER_NAME
        } else {
            &self.player_name
        }
    }
}

#[derive(Debug)]
pub struct HeaderLayers {
    header: SpriteStack,
    name: SpriteStack,
    stats: SpriteStack,
    inventory: SpriteStack,
    last: Option<(HeaderModel, ScreenGeometry)>,
}

impl Default for HeaderLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderLayers {
    pub fn new() -> Self {
        Self {
            header: SpriteStack::with_capacity(1),
            name: SpriteStack::with_capacity(NAME_GLYPHS_MAX),
            stats: SpriteStack::with_capacity(STATS_GLYPHS_MAX),
            inventory: SpriteStack::with_capacity(INVENTORY_SPRITES_MAX),
            last: None,
        }
    }

    pub fn header(&self) -> &SpriteStack {
        &self.header
    }

    pub fn name(&self) -> &SpriteStack {
        &self.name
    }

    pub fn stats(&self) -> &SpriteStack {
        &self.stats
    }

    pub fn inventory(&self) -> &SpriteStack {
        &self.inventory
    }

    /// Lays the header out again if the model or the screen changed.
    /// Returns whether anything was rebuilt.
    pub fn update(
        &mut self,
        model: &HeaderModel,
        geometry: &ScreenGeometry,
        glyphs: &impl GlyphLookup,
    ) -> bool {
        if let Some((last_model, last_geometry)) = &self.last {
            if last_model == model && last_geometry == geometry {
                return false;
            }
        }
        let layout = HeaderLayout {
            zoom: geometry.zoom,
            top: geometry.screen_height_px(),
        };

        self.header.clear();
        self.name.clear();
        self.stats.clear();
        self.inventory.clear();

        push_text(
            &mut self.name,
            model.display_name(),
            layout.point(NAME_ORIGIN_PX),
            layout.zoom,
            WHITE_TINT,
            glyphs,
        );

        if let Some(client) = &model.client {
            self.layout_client(client, &layout, glyphs);
        }

        self.last = Some((model.clone(), *geometry));
        true
    }

    fn layout_client(
        &mut self,
        client: &ClientStatus,
        layout: &HeaderLayout,
        glyphs: &impl GlyphLookup,
    ) {
        if !client.card.is_transparent() {
            self.header.push(Sprite::new(
                client.card,
                layout.point((CARD_WIDTH_PX / 2.0, CARD_HEIGHT_PX / 2.0)),
            ));
        }

        push_number(
            &mut self.stats,
            client.dig_power,
            layout.point(DIG_POWER_ORIGIN_PX),
            layout.zoom,
            DIG_POWER_COLOR,
            glyphs,
        );
        push_number(
            &mut self.stats,
            client.money,
            layout.point(MONEY_ORIGIN_PX),
            layout.zoom,
            MONEY_COLOR,
            glyphs,
        );

        let slot_count = client.inventory.len();
        let icon_center_offset = (ICON_SIZE_PX / 2.0, ICON_SIZE_PX / 2.0);

        // Icons and separators, then hatches, then counts on top.
        for (index, slot) in client.inventory.iter().enumerate() {
            let left = slot_left_px(index);
            if !slot.icon.is_transparent() {
                self.inventory.push(Sprite::new(
                    slot.icon,
                    layout.point((left + icon_center_offset.0, icon_center_offset.1)),
                ));
            }
            if index + 1 < slot_count {
                self.inventory.push(Sprite::new(
                    glyphs.separator_texture(),
                    layout.point((
                        left + ICON_SIZE_PX + SEPARATOR_WIDTH_PX / 2.0,
                        icon_center_offset.1,
                    )),
                ));
            }
        }
        for index in (0..slot_count).filter(|index| *index != client.selected) {
            self.inventory.push(Sprite::new(
                glyphs.hatch_texture(),
                layout.point((
                    slot_left_px(index) + icon_center_offset.0,
                    icon_center_offset.1,
                )),
            ));
        }
        for (index, slot) in client.inventory.iter().enumerate() {
            push_number(
                &mut self.inventory,
                slot.count,
                layout.point((slot_left_px(index) + COUNT_INSET_PX, COUNT_INSET_PX)),
                layout.zoom,
                WHITE_TINT,
                glyphs,
            );
        }
    }
}

struct HeaderLayout {
    zoom: f32,
    top: f32,
}

impl HeaderLayout {
    /// Converts an unzoomed offset from the window's top-left corner.
    fn point(&self, (right, down): (f32, f32)) -> ScreenPoint {
        ScreenPoint::new(right * self.zoom, self.top - down * self.zoom)
    }
}

fn slot_left_px(index: usize) -> f32 {
    INVENTORY_LEFT_PX + index as f32 * (ICON_SIZE_PX + SEPARATOR_WIDTH_PX)
}

/// Maps a character to its font sheet cell. Characters outside the sheet
/// fall back to `?`.
pub fn glyph_code(ch: char) -> u8 {
    u8::try_from(u32::from(ch)).unwrap_or(b'?')
}

/// Appends one sprite per character, `origin` being the top-left corner of
/// the first glyph. Text that does not fit the stack is truncated.
pub fn push_text(
    stack: &mut SpriteStack,
    text: &str,
    origin: ScreenPoint,
    zoom: f32,
    tint: Rgba,
    glyphs: &impl GlyphLookup,
) {
    let advance = GLYPH_SIZE_PX * zoom;
    let half = advance / 2.0;
    for (index, ch) in text.chars().enumerate() {
        let center = ScreenPoint::new(origin.x + index as f32 * advance + half, origin.y - half);
        let texture = glyphs.glyph_texture(glyph_code(ch));
        if !stack.push(Sprite::tinted(texture, center, tint)) {
            break;
        }
    }
}

fn push_number(
    stack: &mut SpriteStack,
    value: u32,
    origin: ScreenPoint,
    zoom: f32,
    tint: Rgba,
    glyphs: &impl GlyphLookup,
) {
    let mut digits = [0u8; 10];
    let text = format_decimal(value, &mut digits);
    push_text(stack, text, origin, zoom, tint, glyphs);
}

// Formats without allocating; u32::MAX has ten digits.
fn format_decimal(mut value: u32, buffer: &mut [u8; 10]) -> &str {
    let mut start = buffer.len();
    loop {
        start -= 1;
        buffer[start] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    std::str::from_utf8(&buffer[start..]).unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ScreenSettings;

    struct AsciiGlyphs;

    const HATCH: TextureId = TextureId(900);
    const SEPARATOR: TextureId = TextureId(901);

    impl GlyphLookup for AsciiGlyphs {
        fn glyph_texture(&self, code: u8) -> TextureId {
            TextureId(2000 + code as u16)
        }

        fn hatch_texture(&self) -> TextureId {
            HATCH
        }

        fn separator_texture(&self) -> TextureId {
            SEPARATOR
        }
    }

    fn geometry() -> ScreenGeometry {
        ScreenGeometry::new(1280, 960, &ScreenSettings::default()).expect("geometry")
    }

    fn client(inventory: Vec<InventorySlot>, selected: usize) -> ClientStatus {
        ClientStatus {
            card: TextureId(50),
            dig_power: 7,
            money: 1250,
            inventory,
            selected,
        }
    }

    fn glyph_text(stack: &SpriteStack) -> String {
        stack
            .sprites()
            .iter()
            .filter(|sprite| sprite.texture.0 >= 2000)
            .map(|sprite| char::from((sprite.texture.0 - 2000) as u8))
            .collect()
    }

    #[test]
    fn empty_name_falls_back_and_card_hidden_without_client() {
        let mut layers = HeaderLayers::new();
        layers.update(&HeaderModel::default(), &geometry(), &AsciiGlyphs);

        assert_eq!(glyph_text(layers.name()), DEFAULT_PLAYER_NAME);
        assert!(layers.header().is_empty());
        assert!(layers.stats().is_empty());
        assert!(layers.inventory().is_empty());
    }

    #[test]
    fn name_glyphs_start_at_left_margin() {
        let mut layers = HeaderLayers::new();
        let model = HeaderModel {
            player_name: "Ab".to_string(),
            client: None,
        };
        layers.update(&model, &geometry(), &AsciiGlyphs);

        let sprites = layers.name().sprites();
        // zoom 2: x = 8*2 + 4*2, y = 960 - 2 - 4*2
        assert_eq!(sprites[0].position, ScreenPoint::new(24.0, 950.0));
        assert_eq!(sprites[1].position, ScreenPoint::new(40.0, 950.0));
    }

    #[test]
    fn card_and_stats_follow_layout() {
        let mut layers = HeaderLayers::new();
        let model = HeaderModel {
            player_name: "p".to_string(),
            client: Some(client(Vec::new(), 0)),
        };
        layers.update(&model, &geometry(), &AsciiGlyphs);

        let card = layers.header().sprites()[0];
        assert_eq!(card.texture, TextureId(50));
        assert_eq!(card.position, ScreenPoint::new(110.0, 930.0));

        assert_eq!(glyph_text(layers.stats()), "71250");
        let stats = layers.stats().sprites();
        assert_eq!(stats[0].tint, DIG_POWER_COLOR);
        assert_eq!(stats[0].position, ScreenPoint::new(60.0, 960.0 - 22.0 - 8.0));
        assert_eq!(stats[1].tint, MONEY_COLOR);
        assert_eq!(stats[1].position, ScreenPoint::new(60.0, 960.0 - 42.0 - 8.0));
    }

    #[test]
    fn inventory_orders_icons_then_hatches_then_counts() {
        let mut layers = HeaderLayers::new();
        let inventory = vec![
            InventorySlot {
                icon: TextureId(60),
                count: 3,
            },
            InventorySlot {
                icon: TextureId(61),
                count: 12,
            },
            InventorySlot {
                icon: TextureId(62),
                count: 0,
            },
        ];
        let model = HeaderModel {
            player_name: String::new(),
            client: Some(client(inventory, 1)),
        };
        layers.update(&model, &geometry(), &AsciiGlyphs);

        let textures: Vec<TextureId> = layers
            .inventory()
            .sprites()
            .iter()
            .map(|sprite| sprite.texture)
            .collect();
        let digits = |text: &str| {
            text.bytes()
                .map(|b| TextureId(2000 + u16::from(b)))
                .collect::<Vec<_>>()
        };
        let mut expected = vec![
            TextureId(60),
            SEPARATOR,
            TextureId(61),
            SEPARATOR,
            TextureId(62),
            HATCH,
            HATCH,
        ];
        expected.extend(digits("3"));
        expected.extend(digits("12"));
        expected.extend(digits("0"));
        assert_eq!(textures, expected);

        let sprites = layers.inventory().sprites();
        // second icon: left = 110 + 33 = 143, center = 158, zoomed by 2
        assert_eq!(sprites[2].position, ScreenPoint::new(316.0, 930.0));
        assert_eq!(sprites[1].position, ScreenPoint::new(283.0, 930.0));
        // hatches skip the selected slot
        assert_eq!(sprites[5].position.x, 250.0);
        assert_eq!(sprites[6].position.x, 382.0);
        // first count glyph: left = (110 + 1) * 2, center + 8
        assert_eq!(sprites[7].position, ScreenPoint::new(230.0, 950.0));
    }

    #[test]
    fn unchanged_model_skips_relayout() {
        let mut layers = HeaderLayers::new();
        let model = HeaderModel {
            player_name: "x".to_string(),
            client: Some(client(Vec::new(), 0)),
        };
        assert!(layers.update(&model, &geometry(), &AsciiGlyphs));
        assert!(!layers.update(&model, &geometry(), &AsciiGlyphs));

        let mut changed = model.clone();
        if let Some(status) = changed.client.as_mut() {
            status.money += 1;
        }
        assert!(layers.update(&changed, &geometry(), &AsciiGlyphs));
    }

    #[test]
    fn long_text_is_truncated_to_capacity() {
        let mut stack = SpriteStack::with_capacity(4);
        push_text(
            &mut stack,
            "overflowing",
            ScreenPoint::ZERO,
            1.0,
            WHITE_TINT,
            &AsciiGlyphs,
        );
        assert_eq!(glyph_text(&stack), "over");
    }

    #[test]
    fn characters_outside_font_sheet_become_question_marks() {
        assert_eq!(glyph_code('A'), b'A');
        assert_eq!(glyph_code('é'), 0xE9);
        assert_eq!(glyph_code('€'), b'?');
    }

    #[test]
    fn decimal_formatting_handles_extremes() {
        let mut buffer = [0u8; 10];
        assert_eq!(format_decimal(0, &mut buffer), "0");
        let mut buffer = [0u8; 10];
        assert_eq!(format_decimal(u32::MAX, &mut buffer), "4294967295");
    }
}

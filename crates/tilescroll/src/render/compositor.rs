use super::sprite::Sprite;

/// Draw layers, back to front. UI layers come last so they always cover the
/// scrolling world beneath them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    BackgroundTiles,
    VerticalTransitions,
    HorizontalTransitions,
    Pickups,
    Bombs,
    Monsters,
    Player,
    Explosions,
    Header,
    Name,
    Stats,
    Inventory,
}

pub const DRAW_ORDER: [Layer; 12] = [
    Layer::BackgroundTiles,
    Layer::VerticalTransitions,
    Layer::HorizontalTransitions,
    Layer::Pickups,
    Layer::Bombs,
    Layer::Monsters,
    Layer::Player,
    Layer::Explosions,
    Layer::Header,
    Layer::Name,
    Layer::Stats,
    Layer::Inventory,
];

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BackgroundTiles => "background_tiles",
            Self::VerticalTransitions => "vertical_transitions",
            Self::HorizontalTransitions => "horizontal_transitions",
            Self::Pickups => "pickups",
            Self::Bombs => "bombs",
            Self::Monsters => "monsters",
            Self::Player => "player",
            Self::Explosions => "explosions",
            Self::Header => "header",
            Self::Name => "name",
            Self::Stats => "stats",
            Self::Inventory => "inventory",
        }
    }
}

/// Produces the sprites of each layer for the current frame.
pub trait LayerSource {
    fn layer_sprites(&self, layer: Layer) -> &[Sprite];
    /// Scale applied to every sprite's native texture size.
    fn sprite_scale(&self) -> f32;
}

/// Consumes layers in draw order.
pub trait LayerSink {
    fn draw_layer(&mut self, layer: Layer, sprites: &[Sprite], scale: f32);
}

/// Hands every layer to the sink in `DRAW_ORDER`, empty layers included.
pub fn compose(source: &impl LayerSource, sink: &mut impl LayerSink) {
    let scale = source.sprite_scale();
    for layer in DRAW_ORDER {
        sink.draw_layer(layer, source.layer_sprites(layer), scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ScreenPoint, TextureId};

    struct OneSpritePerLayer {
        sprites: Vec<Sprite>,
    }

    impl OneSpritePerLayer {
        fn new() -> Self {
            let sprites = (0..DRAW_ORDER.len())
                .map(|index| Sprite::new(TextureId(index as u16 + 1), ScreenPoint::ZERO))
                .collect();
            Self { sprites }
        }
    }

    impl LayerSource for OneSpritePerLayer {
        fn layer_sprites(&self, layer: Layer) -> &[Sprite] {
            let index = DRAW_ORDER
                .iter()
                .position(|candidate| *candidate == layer)
                .unwrap_or(0);
            std::slice::from_ref(&self.sprites[index])
        }

        fn sprite_scale(&self) -> f32 {
            2.0
        }
    }

    struct EmptySource;

    impl LayerSource for EmptySource {
        fn layer_sprites(&self, _layer: Layer) -> &[Sprite] {
            &[]
        }

        fn sprite_scale(&self) -> f32 {
            1.0
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        layers: Vec<Layer>,
        textures: Vec<TextureId>,
        scales: Vec<f32>,
    }

    impl LayerSink for RecordingSink {
        fn draw_layer(&mut self, layer: Layer, sprites: &[Sprite], scale: f32) {
            self.layers.push(layer);
            self.textures.extend(sprites.iter().map(|sprite| sprite.texture));
            self.scales.push(scale);
        }
    }

    #[test]
    fn layers_are_drawn_in_fixed_order() {
        let mut sink = RecordingSink::default();
        compose(&OneSpritePerLayer::new(), &mut sink);

        assert_eq!(
            sink.layers,
            vec![
                Layer::BackgroundTiles,
                Layer::VerticalTransitions,
                Layer::HorizontalTransitions,
                Layer::Pickups,
                Layer::Bombs,
                Layer::Monsters,
                Layer::Player,
                Layer::Explosions,
                Layer::Header,
                Layer::Name,
                Layer::Stats,
                Layer::Inventory,
            ]
        );
        let expected: Vec<TextureId> = (1..=12).map(TextureId).collect();
        assert_eq!(sink.textures, expected);
        assert!(sink.scales.iter().all(|scale| *scale == 2.0));
    }

    #[test]
    fn order_holds_when_every_layer_is_empty() {
        let mut sink = RecordingSink::default();
        compose(&EmptySource, &mut sink);
        assert_eq!(sink.layers, DRAW_ORDER.to_vec());
        assert!(sink.textures.is_empty());
    }

    #[test]
    fn ui_layers_follow_all_world_layers() {
        let first_ui = DRAW_ORDER
            .iter()
            .position(|layer| *layer == Layer::Header)
            .expect("header layer");
        assert_eq!(
            &DRAW_ORDER[first_ui..],
            &[Layer::Header, Layer::Name, Layer::Stats, Layer::Inventory]
        );
    }
}

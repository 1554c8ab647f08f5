use crate::present::SpriteAtlas;
use crate::render::{FrameRenderer, TileCoordinate, Viewport};
use crate::world::MapState;

use super::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Continue,
    Quit,
}

/// Owner of the simulated world. The window loop ticks it at a fixed rate
/// and asks it for the frame contents once per redraw.
pub trait Session {
    /// Called once, before the first tick, with the loaded atlas.
    fn attach(&mut self, _atlas: &mut SpriteAtlas) {}
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SessionCommand;
    fn map(&self) -> &MapState;
    /// Map-space position of the player the camera follows.
    fn locate_player(&self) -> Option<TileCoordinate>;
    /// Pushes entity and header state into the renderer after the grids
    /// have been sampled for this frame.
    fn submit_frame(&mut self, frame: &mut FrameRenderer, atlas: &mut SpriteAtlas);
    fn shutdown(&mut self) {}
}

/// Runs the render-side half of one frame: viewport and grid sampling
/// first, then the session's entities and header.
pub fn prepare_frame(
    session: &mut dyn Session,
    frame: &mut FrameRenderer,
    atlas: &mut SpriteAtlas,
) -> Viewport {
    let viewport = frame.begin_frame(session.map(), session.locate_player(), &*atlas);
    session.submit_frame(frame, atlas);
    viewport
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{
        EntityCapacities, EntityKind, Layer, LayerSource, ScreenGeometry, ScreenSettings,
    };
    use crate::world::tiles::EMPTY_TILE_ID;
    use tempfile::tempdir;

    struct Walker {
        map: MapState,
        player: TileCoordinate,
        seen_viewport: Option<Viewport>,
    }

    impl Session for Walker {
        fn update(&mut self, _fixed_dt_seconds: f32, input: &InputSnapshot) -> SessionCommand {
            if input.quit_requested() {
                return SessionCommand::Quit;
            }
            self.player.x += 1.0;
            SessionCommand::Continue
        }

        fn map(&self) -> &MapState {
            &self.map
        }

        fn locate_player(&self) -> Option<TileCoordinate> {
            Some(self.player)
        }

        fn submit_frame(&mut self, frame: &mut FrameRenderer, atlas: &mut SpriteAtlas) {
            self.seen_viewport = Some(frame.viewport());
            let texture = atlas.resolve("player_right");
            frame.sync_entities(EntityKind::Player, &[self.player], |_| texture);
        }
    }

    #[test]
    fn entities_are_submitted_against_the_fresh_viewport() {
        let dir = tempdir().expect("tempdir");
        let mut atlas = SpriteAtlas::load(dir.path(), 10);
        let geometry = ScreenGeometry::new(640, 480, &ScreenSettings::default()).expect("geometry");
        let mut frame = FrameRenderer::new(geometry, EntityCapacities::default());
        let mut session = Walker {
            map: MapState::filled(200, 200, EMPTY_TILE_ID).expect("map"),
            player: TileCoordinate::new(100.0, 100.0),
            seen_viewport: None,
        };

        for _ in 0..3 {
            session.update(1.0 / 60.0, &InputSnapshot::empty());
            let viewport = prepare_frame(&mut session, &mut frame, &mut atlas);
            assert_eq!(session.seen_viewport, Some(viewport));
            assert_eq!(viewport.x, session.player.x - 32.0);
        }
        let players = frame.layer_sprites(Layer::Player);
        assert_eq!(players.len(), 1);
        assert!(!players[0].texture.is_transparent());
    }

    #[test]
    fn quit_input_ends_the_session() {
        let mut session = Walker {
            map: MapState::filled(4, 4, EMPTY_TILE_ID).expect("map"),
            player: TileCoordinate::new(1.0, 1.0),
            seen_viewport: None,
        };
        let quit = InputSnapshot::new(true, Default::default(), false, None, 0, 0);
        assert_eq!(session.update(0.016, &quit), SessionCommand::Quit);
    }
}

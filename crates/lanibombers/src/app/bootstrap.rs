use std::ffi::OsString;
use std::path::Path;

use thiserror::Error;
use tilescroll::{LoopConfig, MapError, MapState, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, GameConfig, MAP_ENV_VAR};
use super::gameplay::{demo_map, LocalSession};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build demo map: {0}")]
    DemoMap(#[from] MapError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: Box<dyn Session>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== lanibombers Startup ===");

    let game_config = GameConfig::from_env()?;
    let map = load_map(&game_config, std::env::var_os(MAP_ENV_VAR))?;
    let session = LocalSession::new(map, game_config.player_name.clone());

    Ok(AppWiring {
        config: game_config.loop_config(),
        session: Box::new(session),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

// A missing or unreadable map falls back to the generated demo map.
fn load_map(config: &GameConfig, map_env: Option<OsString>) -> Result<MapState, MapError> {
    if let Some(path) = config.map_path(map_env) {
        match MapState::load_mne(&path) {
            Ok(map) => {
                info!(
                    path = %path.display(),
                    width = map.width(),
                    height = map.height(),
                    "map_loaded"
                );
                return Ok(map);
            }
            Err(err) => warn_map_fallback(&path, &err),
        }
    }
    let map = demo_map()?;
    info!(width = map.width(), height = map.height(), "demo_map_generated");
    Ok(map)
}

fn warn_map_fallback(path: &Path, err: &MapError) {
    warn!(path = %path.display(), error = %err, "map_load_failed_using_demo");
}

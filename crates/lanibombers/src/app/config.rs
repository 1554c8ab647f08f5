use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tilescroll::{EntityCapacities, LoopConfig, ScreenSettings};

pub(crate) const CONFIG_ENV_VAR: &str = "LANI_CONFIG";
pub(crate) const MAP_ENV_VAR: &str = "LANI_MAP";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config {path}: {field} {message}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        message: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        let defaults = LoopConfig::default();
        Self {
            title: defaults.window_title,
            width: defaults.window_width,
            height: defaults.window_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) player_name: String,
    // `LANI_MAP` takes precedence.
    pub(crate) map: Option<PathBuf>,
    pub(crate) sprites_dir: Option<PathBuf>,
    pub(crate) window: WindowConfig,
    pub(crate) target_tps: u32,
    pub(crate) max_render_fps: Option<u32>,
    pub(crate) screen: ScreenSettings,
    pub(crate) entity_capacities: EntityCapacities,
}

impl Default for GameConfig {
    fn default() -> Self {
        let defaults = LoopConfig::default();
        Self {
            player_name: String::new(),
            map: None,
            sprites_dir: None,
            window: WindowConfig::default(),
            target_tps: defaults.target_tps,
            max_render_fps: defaults.max_render_fps,
            screen: defaults.screen,
            entity_capacities: defaults.entity_capacities,
        }
    }
}

impl GameConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&raw).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_value(std::env::var_os(CONFIG_ENV_VAR))
    }

    fn from_env_value(value: Option<OsString>) -> Result<Self, ConfigError> {
        match value {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    fn parse(raw: &str) -> Result<Self, String> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        match serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer) {
            Ok(config) => Ok(config),
            Err(error) => {
                let path = error.path().to_string();
                let source = error.into_inner();
                if path.is_empty() || path == "." {
                    Err(format!("parse config json: {source}"))
                } else {
                    Err(format!("parse config json at {path}: {source}"))
                }
            }
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, message: &'static str| ConfigError::Invalid {
            path: path.to_path_buf(),
            field,
            message,
        };
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "must have a non-zero size"));
        }
        if self.target_tps == 0 {
            return Err(invalid("target_tps", "must be at least 1"));
        }
        if self.screen.tile_px == 0 {
            return Err(invalid("screen.tile_px", "must be at least 1"));
        }
        if self.screen.viewport_tiles.is_empty() {
            return Err(invalid("screen.viewport_tiles", "must not be empty"));
        }
        Ok(())
    }

    pub(crate) fn map_path(&self, env_value: Option<OsString>) -> Option<PathBuf> {
        env_value
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.map.clone())
    }

    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window.title.clone(),
            window_width: self.window.width,
            window_height: self.window.height,
            target_tps: self.target_tps,
            max_render_fps: self.max_render_fps,
            screen: self.screen,
            entity_capacities: self.entity_capacities,
            sprites_dir: self.sprites_dir.clone(),
            ..LoopConfig::default()
        }
    }
}

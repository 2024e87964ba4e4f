use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use view::{ConfigError, HexLayout, ViewConfig};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to read game config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse game config {path} at {field_path}: {message}")]
    ParseConfig {
        path: PathBuf,
        field_path: String,
        message: String,
    },
    #[error("invalid game config value {field}={value}: {reason}")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error(transparent)]
    View(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    pub(crate) world_tps: u32,
    pub(crate) render_fps: u32,
    pub(crate) max_frame_delta_ms: u64,
    pub(crate) max_world_ticks_per_frame: u32,
    pub(crate) run_seconds: f64,
    pub(crate) game_speed: f32,
    pub(crate) metrics_log_interval_ms: u64,
    pub(crate) realtime: bool,
    pub(crate) hex_radius: f32,
    pub(crate) vertical_scale: f32,
    pub(crate) view: ViewConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_tps: 10,
            render_fps: 60,
            max_frame_delta_ms: 250,
            max_world_ticks_per_frame: 5,
            run_seconds: 20.0,
            game_speed: 1.0,
            metrics_log_interval_ms: 1000,
            realtime: false,
            hex_radius: 1.0,
            vertical_scale: 0.75,
            view: ViewConfig::default(),
        }
    }
}

impl GameConfig {
    pub(crate) fn from_json_str(raw: &str, path: &Path) -> Result<Self, AppError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: Self =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let field_path = error.path().to_string();
                AppError::ParseConfig {
                    path: path.to_path_buf(),
                    field_path,
                    message: error.into_inner().to_string(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        let positive = [
            ("world_tps", f64::from(self.world_tps)),
            ("render_fps", f64::from(self.render_fps)),
            ("max_frame_delta_ms", self.max_frame_delta_ms as f64),
            ("max_world_ticks_per_frame", f64::from(self.max_world_ticks_per_frame)),
            ("metrics_log_interval_ms", self.metrics_log_interval_ms as f64),
            ("hex_radius", f64::from(self.hex_radius)),
            ("vertical_scale", f64::from(self.vertical_scale)),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AppError::InvalidConfig {
                    field,
                    value,
                    reason: "must be positive",
                });
            }
        }
        for (field, value) in [
            ("run_seconds", self.run_seconds),
            ("game_speed", f64::from(self.game_speed)),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::InvalidConfig {
                    field,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }
        self.view.validate()?;
        Ok(())
    }

    pub(crate) fn layout(&self) -> HexLayout {
        HexLayout::new(self.hex_radius, self.vertical_scale)
    }

    pub(crate) fn run_duration(&self) -> Duration {
        Duration::from_secs_f64(self.run_seconds)
    }
}

pub(crate) fn load_game_config(path: &Path) -> Result<GameConfig, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    GameConfig::from_json_str(&raw, path)
}

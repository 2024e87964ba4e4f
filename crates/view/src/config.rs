use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shapes::MAX_CIRCLE_SEGMENTS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub army_offset_fraction: f32,
    pub villager_offset_fraction: f32,
    pub resource_offset_fraction: f32,
    pub movement_smoothing_rate: f32,
    pub bar_smoothing_rate: f32,
    pub eta_hide_threshold_seconds: f32,
    pub building_size: f32,
    pub army_radius: f32,
    pub villager_radius: f32,
    pub resource_size: f32,
    pub circle_segments: u32,
    pub bar_width_fraction: f32,
    pub bar_height_fraction: f32,
    pub bar_edge_index: u32,
    pub label_font_size: f32,
    pub timer_font_size: f32,
    pub timer_offset_fraction: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            army_offset_fraction: 0.35,
            villager_offset_fraction: 0.35,
            resource_offset_fraction: 0.4,
            movement_smoothing_rate: 12.0,
            bar_smoothing_rate: 6.0,
            eta_hide_threshold_seconds: 0.5,
            building_size: 0.3,
            army_radius: 0.22,
            villager_radius: 0.14,
            resource_size: 0.22,
            circle_segments: 16,
            bar_width_fraction: 0.6,
            bar_height_fraction: 0.08,
            bar_edge_index: 3,
            label_font_size: 0.28,
            timer_font_size: 0.22,
            timer_offset_fraction: 0.45,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read view config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse view config {path} at {field_path}: {message}")]
    Parse {
        path: PathBuf,
        field_path: String,
        message: String,
    },
    #[error("invalid view config value {field}={value}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },
}

impl ViewConfig {
    pub fn from_json_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: Self =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let field_path = error.path().to_string();
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    field_path,
                    message: error.into_inner().to_string(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("army_offset_fraction", self.army_offset_fraction),
            ("villager_offset_fraction", self.villager_offset_fraction),
            ("resource_offset_fraction", self.resource_offset_fraction),
            ("movement_smoothing_rate", self.movement_smoothing_rate),
            ("bar_smoothing_rate", self.bar_smoothing_rate),
            ("eta_hide_threshold_seconds", self.eta_hide_threshold_seconds),
            ("building_size", self.building_size),
            ("army_radius", self.army_radius),
            ("villager_radius", self.villager_radius),
            ("resource_size", self.resource_size),
            ("bar_width_fraction", self.bar_width_fraction),
            ("bar_height_fraction", self.bar_height_fraction),
            ("label_font_size", self.label_font_size),
            ("timer_font_size", self.timer_font_size),
            ("timer_offset_fraction", self.timer_offset_fraction),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }
        if self.circle_segments < 3 {
            return Err(ConfigError::InvalidValue {
                field: "circle_segments",
                value: self.circle_segments as f32,
                reason: "a circle needs at least 3 segments",
            });
        }
        if self.circle_segments > MAX_CIRCLE_SEGMENTS {
            return Err(ConfigError::InvalidValue {
                field: "circle_segments",
                value: self.circle_segments as f32,
                reason: "circle indices must fit in u16",
            });
        }
        if self.bar_edge_index >= 6 {
            return Err(ConfigError::InvalidValue {
                field: "bar_edge_index",
                value: self.bar_edge_index as f32,
                reason: "a hex has edges 0..=5",
            });
        }
        Ok(())
    }
}

pub fn load_view_config(path: &Path) -> Result<ViewConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ViewConfig::from_json_str(&raw, path)
}

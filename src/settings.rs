use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::rotation::Easing;

pub const SETTINGS_FILE: &str = "carousel.json";

/// Longest accepted rotation, in seconds.
pub const MAX_ANIMATION_SECS: f32 = 3600.0;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselSettings {
    pub item_count: usize,
    pub radius: f32,
    /// Slots moved per rotation request.
    pub step: usize,
    pub animation_secs: f32,
    pub easing: Easing,
    pub panel_width: f32,
    pub panel_height: f32,
    pub texture: String,
    pub camera_distance: f32,
    pub camera_fov_degrees: f32,
    pub camera_near: f32,
    pub camera_far: f32,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            item_count: 12,
            radius: 100.0,
            step: 1,
            animation_secs: 2.0,
            easing: Easing::CubicIn,
            panel_width: 47.1,
            panel_height: 87.0,
            texture: "Ghost_Container_Full.png".to_string(),
            camera_distance: 200.0,
            camera_fov_degrees: 70.0,
            camera_near: 1.0,
            camera_far: 1000.0,
        }
    }
}

impl CarouselSettings {
    pub fn animation_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.animation_secs.clamp(0.0, MAX_ANIMATION_SECS)).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.item_count == 0 {
            return Err(SettingsError::Invalid("item_count must be at least 1".into()));
        }
        if self.step == 0 {
            return Err(SettingsError::Invalid("step must be at least 1".into()));
        }
        if !is_positive(self.radius) {
            return Err(SettingsError::Invalid(format!("radius must be positive, got {}", self.radius)));
        }
        if !(0.0..=MAX_ANIMATION_SECS).contains(&self.animation_secs) {
            return Err(SettingsError::Invalid(format!(
                "animation_secs must be within 0..={MAX_ANIMATION_SECS}, got {}",
                self.animation_secs
            )));
        }
        if !is_positive(self.panel_width) || !is_positive(self.panel_height) {
            return Err(SettingsError::Invalid("panel dimensions must be positive".into()));
        }
        if !is_positive(self.camera_near) || !(self.camera_far > self.camera_near) || !self.camera_far.is_finite() {
            return Err(SettingsError::Invalid("camera planes must satisfy 0 < near < far".into()));
        }
        if !(self.camera_fov_degrees > 0.0 && self.camera_fov_degrees < 180.0) {
            return Err(SettingsError::Invalid(format!(
                "camera_fov_degrees must be within (0, 180), got {}",
                self.camera_fov_degrees
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// A missing file is not an error and yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn load_or_default() -> Self {
        if cfg!(target_arch = "wasm32") {
            return Self::default();
        }

        match Self::load(SETTINGS_FILE) {
            Ok(settings) => settings,
            Err(err) => {
                error!("{err}, falling back to defaults");
                Self::default()
            }
        }
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

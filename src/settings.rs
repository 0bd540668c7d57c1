//! Game settings and preferences
//!
//! Persisted separately from the leaderboard, under their own storage key.

use serde::{Deserialize, Serialize};

use crate::consts::{JUMP_FORCE, SETTINGS_KEY};
use crate::platform::storage::KeyValueStore;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Preset from a dropdown index (0 = Low)
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(QualityPreset::Low),
            1 => Some(QualityPreset::Medium),
            2 => Some(QualityPreset::High),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Audio ===
    /// Music group volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects group volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Controls ===
    /// Invert horizontal menu navigation
    pub invert_x_axis: bool,
    /// Invert vertical menu navigation
    pub invert_y_axis: bool,
    /// Upward impulse applied on tap
    pub jump_force: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            music_volume: 0.7,
            sfx_volume: 1.0,

            invert_x_axis: false,
            invert_y_axis: true,
            jump_force: JUMP_FORCE,
        }
    }
}

impl Settings {
    /// Clamp values a hand-edited file could push out of range
    pub fn sanitized(mut self) -> Self {
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        if !self.jump_force.is_finite() || self.jump_force <= 0.0 {
            log::warn!("Invalid jump force {}, using default", self.jump_force);
            self.jump_force = JUMP_FORCE;
        }
        self
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        if let Some(json) = storage.get_string(SETTINGS_KEY) {
            match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings.sanitized();
                }
                Err(err) => log::warn!("Ignoring unreadable settings: {err}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings. Failures are logged.
    pub fn save(&self, storage: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                storage.set_string(SETTINGS_KEY, &json);
                match storage.save() {
                    Ok(()) => log::info!("Settings saved"),
                    Err(err) => log::error!("Failed to save settings: {err}"),
                }
            }
            Err(err) => log::error!("Failed to encode settings: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;

    #[test]
    fn test_defaults_when_missing_or_corrupt() {
        assert_eq!(Settings::load(&MemoryStore::new()), Settings::default());
        let corrupt = MemoryStore::with_value(SETTINGS_KEY, "{{{");
        assert_eq!(Settings::load(&corrupt), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            quality: QualityPreset::High,
            music_volume: 0.25,
            ..Settings::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_document_fills_defaults_and_clamps() {
        let store = MemoryStore::with_value(SETTINGS_KEY, r#"{"music_volume": 4.0, "jump_force": -1}"#);
        let settings = Settings::load(&store);
        assert_eq!(settings.music_volume, 1.0);
        assert_eq!(settings.jump_force, JUMP_FORCE);
        assert!(settings.invert_y_axis);
    }

    #[test]
    fn test_quality_from_index() {
        assert_eq!(QualityPreset::from_index(2), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_index(9), None);
    }
}

//! Game settings and tuning
//!
//! Loaded from a JSON file next to the binary; any missing field falls back
//! to its default, and an unreadable file falls back to the defaults entirely.

use serde::{Deserialize, Serialize};

use crate::sim::animation::AnimationSet;
use crate::sim::character::CharacterTuning;
use crate::sim::manager::ObstacleTuning;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Wall speed multiplier
    pub fn speed_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    /// Auto-spawn interval multiplier (higher = sparser walls)
    pub fn interval_scale(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.25,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.8,
        }
    }

    /// Hit-zone width multiplier (wider = more forgiving timing)
    pub fn zone_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.85,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub character: CharacterTuning,
    /// Per-state animation frame counts
    pub animations: AnimationSet,
    /// Wall tuning before the difficulty preset is applied
    pub walls: ObstacleTuning,
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Wall tuning with the difficulty preset applied
    pub fn effective_walls(&self) -> ObstacleTuning {
        let d = self.difficulty;
        let mut walls = self.walls.clone();
        walls.base_speed *= d.speed_scale();
        walls.spawn_interval_ms *= d.interval_scale();
        walls.hit_zone_width *= d.zone_scale();

        walls.sanitized()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Bad settings file {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("Using default settings ({}: {e})", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: impl AsRef<std::path::Path>) {
        let path = path.as_ref();
        match self.to_json() {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved to {}", path.display()),
                Err(e) => log::warn!("Failed to save settings to {}: {e}", path.display()),
            },
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }
}

//! Game configuration
//!
//! [`GameConfig`] is the immutable set of constants the simulation runs on.
//! [`Settings`] is the small user-editable subset persisted as JSON, clamped
//! on load and folded into a [`GameConfig`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::wave::{AmmoPolicy, BombCapPolicy};

/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "data/config.json";

/// Smallest playfield the largest formation fits in with room to sweep
pub const MIN_SCREEN_WIDTH: u32 = 640;
pub const MIN_SCREEN_HEIGHT: u32 = 480;
pub const MAX_SCREEN_WIDTH: u32 = 3840;
pub const MAX_SCREEN_HEIGHT: u32 = 2160;

/// Simulation constants. Passed by reference into every core component.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    // === Playfield ===
    pub screen_width: f32,
    pub screen_height: f32,
    /// Inset from each side wall where the formation bounces
    pub edge_margin: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Horizontal speed in pixels per second
    pub player_speed: f32,
    pub starting_lives: u32,
    pub max_lives: u32,
    /// Seconds of invulnerability after losing a life
    pub invulnerability_secs: f32,
    /// Award an extra life every N points (0 disables)
    pub extra_life_score: u32,

    // === Player bullets ===
    pub bullet_width: f32,
    pub bullet_height: f32,
    pub bullet_speed: f32,
    pub max_player_bullets: usize,
    pub bullets_per_wave: u32,

    // === Enemy bombs ===
    pub bomb_width: f32,
    pub bomb_height: f32,
    pub bomb_speed: f32,
    /// Seconds between bomb attempts, drawn uniformly from this range
    pub bomb_interval: (f32, f32),
    /// Points for shooting a bomb out of the air
    pub bomb_bonus: u32,

    // === Formation ===
    pub enemy_width: f32,
    pub enemy_height: f32,
    pub formation_origin: (f32, f32),
    pub formation_spacing: (f32, f32),
    /// Distance every alive enemy drops when the formation reverses
    pub row_drop: f32,
    pub min_step_interval: f32,

    // === Bunkers ===
    pub bunker_count: usize,
    /// Bunkers are grids of square blocks this many pixels wide
    pub bunker_block: f32,
    pub bunker_cols: usize,
    pub bunker_rows: usize,
    /// Gap between the bunker tops and the player row
    pub bunker_clearance: f32,

    // === Saucer ===
    pub saucer_width: f32,
    pub saucer_height: f32,
    /// Top edge of the saucer's flight lane
    pub saucer_y: f32,
    pub saucer_speed: f32,
    /// Seconds between saucer flights, drawn uniformly from this range
    pub saucer_interval: (f32, f32),
    /// Bonus values, one picked at random per flight
    pub saucer_points: [u32; 4],

    /// Seconds an explosion stays on screen
    pub explosion_secs: f32,

    // === Waves ===
    pub max_level: u32,
    pub ammo_policy: AmmoPolicy,
    pub bomb_cap_policy: BombCapPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 600.0,
            edge_margin: 10.0,

            player_width: 40.0,
            player_height: 24.0,
            player_speed: 300.0,
            starting_lives: 3,
            max_lives: 9,
            invulnerability_secs: 2.0,
            extra_life_score: 1500,

            bullet_width: 4.0,
            bullet_height: 12.0,
            bullet_speed: 420.0,
            max_player_bullets: 5,
            bullets_per_wave: 170,

            bomb_width: 6.0,
            bomb_height: 12.0,
            bomb_speed: 180.0,
            bomb_interval: (1.1, 2.3),
            bomb_bonus: 3,

            enemy_width: 32.0,
            enemy_height: 24.0,
            formation_origin: (50.0, 80.0),
            formation_spacing: (50.0, 40.0),
            row_drop: 20.0,
            min_step_interval: 0.05,

            bunker_count: 4,
            bunker_block: 6.0,
            bunker_cols: 11,
            bunker_rows: 8,
            bunker_clearance: 80.0,

            saucer_width: 40.0,
            saucer_height: 20.0,
            saucer_y: 40.0,
            saucer_speed: 120.0,
            saucer_interval: (12.0, 22.0),
            saucer_points: [50, 100, 150, 300],

            explosion_secs: 0.33,

            max_level: 12,
            ammo_policy: AmmoPolicy::GameOver,
            bomb_cap_policy: BombCapPolicy::ScaledByAlive,
        }
    }
}

impl GameConfig {
    /// Build a config from the defaults with the user's settings applied
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        Self {
            screen_width: settings.screen.width as f32,
            screen_height: settings.screen.height as f32,
            starting_lives: settings.gameplay.starting_lives,
            extra_life_score: settings.gameplay.extra_life_score,
            max_player_bullets: settings.gameplay.max_player_bullets as usize,
            bullets_per_wave: settings.gameplay.bullets_per_wave,
            ammo_policy: settings.gameplay.ammo_policy,
            ..defaults
        }
    }

    /// Where the player (re)spawns: horizontally centered, near the bottom
    pub fn player_spawn(&self) -> (f32, f32) {
        (
            (self.screen_width - self.player_width) / 2.0,
            self.player_spawn_y(),
        )
    }

    pub fn player_spawn_y(&self) -> f32 {
        self.screen_height - self.player_height - 20.0
    }

    /// An enemy whose bottom edge reaches this line has invaded the player row
    pub fn descend_limit(&self) -> f32 {
        self.player_spawn_y()
    }

    /// Top edge of the bunker row
    pub fn bunker_y(&self) -> f32 {
        self.player_spawn_y() - self.bunker_clearance
    }
}

/// Screen size section of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Gameplay section of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub starting_lives: u32,
    pub extra_life_score: u32,
    pub max_player_bullets: u32,
    pub bullets_per_wave: u32,
    pub ammo_policy: AmmoPolicy,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            extra_life_score: 1500,
            max_player_bullets: 5,
            bullets_per_wave: 170,
            ammo_policy: AmmoPolicy::GameOver,
        }
    }
}

/// Audio section of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
    pub mute: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 0.7,
            mute: false,
        }
    }
}

/// User settings, persisted as JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub screen: ScreenSettings,
    pub gameplay: GameplaySettings,
    pub audio: AudioSettings,
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable. Out-of-range values are clamped.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::info!("No settings at {} ({err}), using defaults", path.display());
                return Self::default();
            }
        };

        Self::from_json(&text).unwrap_or_else(|err| {
            log::warn!("Ignoring malformed settings {}: {err}", path.display());
            Self::default()
        })
    }

    /// Parse and clamp a settings document
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let settings: Settings = serde_json::from_str(text)?;
        Ok(settings.clamped())
    }

    /// Pull every field into its allowed range
    pub fn clamped(mut self) -> Self {
        self.screen.width = self.screen.width.clamp(MIN_SCREEN_WIDTH, MAX_SCREEN_WIDTH);
        self.screen.height = self.screen.height.clamp(MIN_SCREEN_HEIGHT, MAX_SCREEN_HEIGHT);

        let gameplay = &mut self.gameplay;
        gameplay.starting_lives = gameplay.starting_lives.clamp(1, 9);
        gameplay.extra_life_score = gameplay.extra_life_score.clamp(100, 1_000_000);
        gameplay.max_player_bullets = gameplay.max_player_bullets.clamp(1, 10);
        gameplay.bullets_per_wave = gameplay.bullets_per_wave.max(1);

        // NaN falls back to the default rather than clamping
        if self.audio.volume.is_nan() {
            self.audio.volume = AudioSettings::default().volume;
        }
        self.audio.volume = self.audio.volume.clamp(0.0, 1.0);
        self
    }

    /// Effective output volume after mute
    pub fn effective_volume(&self) -> f32 {
        if self.audio.mute { 0.0 } else { self.audio.volume }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_match_default_config() {
        let config = GameConfig::from_settings(&Settings::default());
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_settings_fill_in_defaults() {
        let settings = Settings::from_json(r#"{"gameplay": {"starting_lives": 5}}"#).unwrap();
        assert_eq!(settings.gameplay.starting_lives, 5);
        assert_eq!(settings.gameplay.max_player_bullets, 5);
        assert_eq!(settings.screen, ScreenSettings::default());
    }

    #[test]
    fn test_settings_are_clamped() {
        let settings = Settings::from_json(
            r#"{
                "screen": {"width": 10, "height": 99999},
                "gameplay": {"starting_lives": 0, "max_player_bullets": 50, "extra_life_score": 1},
                "audio": {"volume": 4.0}
            }"#,
        )
        .unwrap();
        assert_eq!(settings.screen.width, MIN_SCREEN_WIDTH);
        assert_eq!(settings.screen.height, 2160);
        assert_eq!(settings.gameplay.starting_lives, 1);
        assert_eq!(settings.gameplay.max_player_bullets, 10);
        assert_eq!(settings.gameplay.extra_life_score, 100);
        assert_eq!(settings.audio.volume, 1.0);
    }

    #[test]
    fn test_ammo_policy_parses_from_json() {
        let settings =
            Settings::from_json(r#"{"gameplay": {"ammo_policy": "keep_dodging"}}"#).unwrap();
        assert_eq!(settings.gameplay.ammo_policy, AmmoPolicy::KeepDodging);
    }

    #[test]
    fn test_malformed_settings_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load(Path::new("definitely/not/here/config.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_mute_silences_volume() {
        let mut settings = Settings::default();
        settings.audio.mute = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_descend_limit_is_player_row() {
        let config = GameConfig::default();
        let (_, spawn_y) = config.player_spawn();
        assert_eq!(config.descend_limit(), spawn_y);
        assert_eq!(spawn_y, 556.0);
    }

    #[test]
    fn test_bunkers_sit_between_formation_and_player() {
        let config = GameConfig::default();
        let bunker_bottom = config.bunker_y() + config.bunker_rows as f32 * config.bunker_block;
        assert_eq!(config.bunker_y(), 476.0);
        assert!(bunker_bottom < config.player_spawn_y());
    }
}

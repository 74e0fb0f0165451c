//! Wave progression and difficulty scaling
//!
//! The controller owns the level counter and the score, turns a level into
//! [`WaveParams`], and decides what the end of a wave means: advance, win,
//! or a stalemate when the player runs out of bullets.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::entities::{Formation, ProjectileSet};

/// What happens when the per-wave bullet budget runs out before the wave is
/// cleared and no bullet is still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmmoPolicy {
    /// No way to finish the wave: the game ends
    #[default]
    GameOver,
    /// Keep playing without shots until a bomb or the invaders end it
    KeepDodging,
}

/// How many enemy bombs may be in flight at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BombCapPolicy {
    /// The level's cap regardless of losses
    Flat,
    /// The level's cap scaled down by the fraction of enemies still alive
    #[default]
    ScaledByAlive,
}

impl BombCapPolicy {
    pub fn cap(&self, level: u32, alive_ratio: f32) -> usize {
        let level_cap = (2 + level / 2).min(6) as usize;
        match self {
            BombCapPolicy::Flat => level_cap,
            BombCapPolicy::ScaledByAlive => {
                let scaled = (level_cap as f32 * alive_ratio.clamp(0.0, 1.0)).round() as usize;
                scaled.max(1)
            }
        }
    }
}

/// Difficulty derived from the level number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub rows: usize,
    pub cols: usize,
    /// Seconds between formation steps at full strength
    pub base_interval: f32,
    /// Formation sweep speed in pixels per second
    pub horizontal_speed: f32,
}

/// Monotonic in `level`, capped at fixed maxima
pub fn difficulty(level: u32) -> WaveParams {
    let n = level.saturating_sub(1);
    WaveParams {
        rows: (3 + n as usize / 2).min(6),
        cols: (6 + n as usize / 2).min(10),
        base_interval: (0.6 - 0.03 * n as f32).max(0.25),
        horizontal_speed: (40.0 + 8.0 * n as f32).min(120.0),
    }
}

/// Result of checking a wave for its end conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveOutcome {
    Continue,
    /// Formation cleared and the next wave was spawned at this level
    Advanced(u32),
    /// Formation cleared on the last level
    Won,
    /// Out of bullets with enemies left, under [`AmmoPolicy::GameOver`]
    OutOfAmmo,
}

#[derive(Debug, Clone)]
pub struct WaveController {
    level: u32,
    score: u32,
    max_level: u32,
    bullets_per_wave: u32,
    ammo_policy: AmmoPolicy,
    bomb_cap_policy: BombCapPolicy,
    formation_origin: (f32, f32),
    formation_spacing: (f32, f32),
    extra_life_score: u32,
    extra_lives_awarded: u32,
}

impl WaveController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            level: 1,
            score: 0,
            max_level: config.max_level,
            bullets_per_wave: config.bullets_per_wave,
            ammo_policy: config.ammo_policy,
            bomb_cap_policy: config.bomb_cap_policy,
            formation_origin: config.formation_origin,
            formation_spacing: config.formation_spacing,
            extra_life_score: config.extra_life_score,
            extra_lives_awarded: 0,
        }
    }

    /// Back to level 1 with no score, and spawn the first wave
    pub fn start(&mut self, formation: &mut Formation, projectiles: &mut ProjectileSet) {
        self.level = 1;
        self.score = 0;
        self.extra_lives_awarded = 0;
        self.spawn_wave(formation, projectiles);
    }

    /// Spawn a fresh formation for the current level, clear every
    /// projectile and refill the bullet budget
    pub fn spawn_wave(&self, formation: &mut Formation, projectiles: &mut ProjectileSet) {
        self.respawn_formation(formation);
        projectiles.clear();
        projectiles.reset_budget(self.bullets_per_wave);
    }

    /// Rebuild the current level's formation without touching projectiles
    pub fn respawn_formation(&self, formation: &mut Formation) {
        let params = difficulty(self.level);
        formation.spawn(
            params.rows,
            params.cols,
            self.formation_origin,
            self.formation_spacing,
        );
        formation.set_pace(self.level, params.base_interval, params.horizontal_speed);
    }

    /// Check end-of-wave conditions, spawning the next wave when cleared
    pub fn check(
        &mut self,
        formation: &mut Formation,
        projectiles: &mut ProjectileSet,
    ) -> WaveOutcome {
        if formation.is_cleared() {
            if self.level >= self.max_level {
                return WaveOutcome::Won;
            }
            self.level += 1;
            self.spawn_wave(formation, projectiles);
            return WaveOutcome::Advanced(self.level);
        }

        let stalemate =
            projectiles.bullets_remaining() == 0 && projectiles.player_shots().is_empty();
        if stalemate && self.ammo_policy == AmmoPolicy::GameOver {
            return WaveOutcome::OutOfAmmo;
        }

        WaveOutcome::Continue
    }

    /// Add points. Returns how many extra lives the new total earned.
    pub fn add_score(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        if self.extra_life_score == 0 {
            return 0;
        }
        let earned = self.score / self.extra_life_score;
        let new_lives = earned.saturating_sub(self.extra_lives_awarded);
        self.extra_lives_awarded = earned;
        new_lives
    }

    /// Bomb cap for the current level and formation strength
    pub fn bomb_cap(&self, formation: &Formation) -> usize {
        self.bomb_cap_policy.cap(self.level, formation.alive_ratio())
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ammo_policy(&self) -> AmmoPolicy {
        self.ammo_policy
    }
}

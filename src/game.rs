//! Top-level game state machine
//!
//! [`Game`] owns every simulation component and advances them once per
//! fixed tick, but only while [`GameState::Playing`]. Everything the outside
//! world needs to hear about (sounds, wave changes, the end of a game) comes
//! back from [`Game::tick`] as [`GameEvent`]s.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::collision::{self, HitCause};
use crate::config::GameConfig;
use crate::entities::{
    Bunker, Explosion, Formation, Player, ProjectileSet, Saucer, next_saucer_delay,
    spawn_bunkers,
};
use crate::wave::{WaveController, WaveOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Title,
    Playing,
    Paused,
    GameOver,
    /// Every level cleared
    Won,
}

/// Input sampled once per tick. `fire`, `pause` and `confirm` are presses,
/// the moves are held keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub move_left: bool,
    pub move_right: bool,
    pub fire: bool,
    pub pause: bool,
    pub confirm: bool,
}

/// Sounds the audio sink may play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    Shot,
    Hit,
    Explosion,
    Bomb,
}

impl SoundEvent {
    pub const ALL: [SoundEvent; 4] = [
        SoundEvent::Shot,
        SoundEvent::Hit,
        SoundEvent::Explosion,
        SoundEvent::Bomb,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SoundEvent::Shot => "shot",
            SoundEvent::Hit => "hit",
            SoundEvent::Explosion => "explosion",
            SoundEvent::Bomb => "bomb",
        }
    }
}

/// Final numbers of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub score: u32,
    pub level: u32,
    pub won: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Sound(SoundEvent),
    WaveCleared { level: u32 },
    LifeLost { lives_left: u32, cause: HitCause },
    ExtraLife { lives: u32 },
    GameEnded(GameResult),
}

/// HUD numbers for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub max_level: u32,
    pub bullets_remaining: u32,
    pub bullets_per_wave: u32,
}

/// Read-only view of one tick, handed to the renderer
pub struct Snapshot<'a> {
    pub state: GameState,
    pub player: &'a Player,
    pub formation: &'a Formation,
    pub projectiles: &'a ProjectileSet,
    pub bunkers: &'a [Bunker],
    pub saucer: Option<&'a Saucer>,
    pub explosions: &'a [Explosion],
    pub hud: Hud,
    pub frame_count: u64,
    /// Playfield size in simulation pixels
    pub playfield: (f32, f32),
    pub result: Option<GameResult>,
}

pub struct Game {
    config: GameConfig,
    state: GameState,
    player: Player,
    formation: Formation,
    projectiles: ProjectileSet,
    bunkers: Vec<Bunker>,
    saucer: Option<Saucer>,
    /// Seconds until the next saucer flight
    saucer_timer: f32,
    explosions: Vec<Explosion>,
    waves: WaveController,
    rng: StdRng,
    frame_count: u64,
    result: Option<GameResult>,
}

impl Game {
    /// A game on the title screen, seeded from the OS
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// A game whose bomb timing and shooter choice repeat for a given seed
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            state: GameState::Title,
            player: Player::new(&config),
            formation: Formation::new(&config),
            projectiles: ProjectileSet::new(&config),
            bunkers: Vec::new(),
            saucer: None,
            saucer_timer: config.saucer_interval.1,
            explosions: Vec::new(),
            waves: WaveController::new(&config),
            rng,
            frame_count: 0,
            result: None,
            config,
        }
    }

    /// Advance one fixed step
    pub fn tick(&mut self, dt: f32, input: &InputFrame) -> Vec<GameEvent> {
        let mut events = Vec::new();

        match self.state {
            GameState::Title => {
                if input.confirm {
                    self.start();
                }
            }
            GameState::Playing => {
                if input.pause {
                    self.state = GameState::Paused;
                } else {
                    self.update(dt, input, &mut events);
                }
            }
            GameState::Paused => {
                if input.pause {
                    self.state = GameState::Playing;
                }
            }
            GameState::GameOver | GameState::Won => {
                if input.confirm {
                    self.state = GameState::Title;
                }
            }
        }

        events
    }

    /// Fresh score, level and lives, and the first wave
    pub fn start(&mut self) {
        self.player = Player::new(&self.config);
        self.waves.start(&mut self.formation, &mut self.projectiles);
        self.bunkers = spawn_bunkers(&self.config);
        self.saucer = None;
        self.saucer_timer = next_saucer_delay(&self.config, &mut self.rng);
        self.explosions.clear();
        self.frame_count = 0;
        self.result = None;
        self.state = GameState::Playing;
        log::info!("New game started");
    }

    fn update(&mut self, dt: f32, input: &InputFrame, events: &mut Vec<GameEvent>) {
        self.frame_count += 1;

        if input.move_left {
            self.player.move_left(dt);
        }
        if input.move_right {
            self.player.move_right(dt);
        }
        self.player.update(dt);

        if input.fire {
            match self.projectiles.try_fire_player(self.player.muzzle()) {
                Ok(_) => events.push(GameEvent::Sound(SoundEvent::Shot)),
                Err(refusal) => log::debug!("Shot refused: {refusal}"),
            }
        }

        self.formation.update(dt);
        self.update_saucer(dt);
        for explosion in &mut self.explosions {
            explosion.update(dt);
        }
        self.explosions.retain(|e| !e.is_dead());

        if self.projectiles.bomb_due(dt, &mut self.rng) {
            let cap = self.waves.bomb_cap(&self.formation);
            let front_line = self.formation.front_line();
            if self
                .projectiles
                .try_fire_enemy(&front_line, cap, &mut self.rng)
                .is_ok()
            {
                events.push(GameEvent::Sound(SoundEvent::Bomb));
            }
        }

        self.projectiles.update(dt);

        let resolution = collision::resolve(
            &mut self.formation,
            &mut self.bunkers,
            &mut self.saucer,
            &mut self.projectiles,
            &self.player,
            &self.config,
        );

        if !resolution.blasts.is_empty() {
            events.push(GameEvent::Sound(SoundEvent::Hit));
        }
        if let Some(bonus) = resolution.saucer_points {
            log::info!("Saucer shot down for {bonus}");
        }
        for &(x, y) in &resolution.blasts {
            self.add_explosion(x, y);
        }

        let extra_lives = self.waves.add_score(resolution.points);
        if extra_lives > 0 {
            self.player.lives = (self.player.lives + extra_lives).min(self.config.max_lives);
            events.push(GameEvent::ExtraLife {
                lives: self.player.lives,
            });
        }

        if let Some(cause) = resolution.player_hit {
            events.push(GameEvent::Sound(SoundEvent::Explosion));
            let (x, y) = self.player.rect().center();
            self.add_explosion(x, y);
            if !self.player.lose_life() {
                log::info!("Last life lost ({cause:?})");
                self.finish(false, events);
                return;
            }

            self.projectiles.clear_player_shots();
            if cause == HitCause::Invasion {
                // Otherwise the invaders would still be in the player row
                // when invulnerability runs out
                self.waves.respawn_formation(&mut self.formation);
            }
            log::info!("Life lost ({cause:?}), {} left", self.player.lives);
            events.push(GameEvent::LifeLost {
                lives_left: self.player.lives,
                cause,
            });
        }

        match self.waves.check(&mut self.formation, &mut self.projectiles) {
            WaveOutcome::Continue => {}
            WaveOutcome::Advanced(level) => {
                self.player.respawn();
                self.bunkers = spawn_bunkers(&self.config);
                self.saucer = None;
                log::info!("Wave cleared, advancing to level {level}");
                events.push(GameEvent::WaveCleared { level });
            }
            WaveOutcome::Won => {
                log::info!("All {} levels cleared", self.waves.max_level());
                self.finish(true, events);
            }
            WaveOutcome::OutOfAmmo => {
                log::info!("Out of bullets with invaders remaining");
                self.finish(false, events);
            }
        }
    }

    /// Fly the current saucer, or count down to the next one
    fn update_saucer(&mut self, dt: f32) {
        match &mut self.saucer {
            Some(saucer) => {
                saucer.update(dt);
                if saucer.is_gone(self.config.screen_width) {
                    self.saucer = None;
                }
            }
            None => {
                self.saucer_timer -= dt;
                if self.saucer_timer <= 0.0 {
                    let saucer = Saucer::spawn(&self.config, &mut self.rng);
                    log::debug!("Saucer worth {} takes off", saucer.points);
                    self.saucer = Some(saucer);
                    self.saucer_timer = next_saucer_delay(&self.config, &mut self.rng);
                }
            }
        }
    }

    fn add_explosion(&mut self, x: f32, y: f32) {
        self.explosions
            .push(Explosion::new(x, y, self.config.explosion_secs));
    }

    fn finish(&mut self, won: bool, events: &mut Vec<GameEvent>) {
        let result = GameResult {
            score: self.waves.score(),
            level: self.waves.level(),
            won,
        };
        self.projectiles.clear();
        self.saucer = None;
        self.result = Some(result);
        self.state = if won {
            GameState::Won
        } else {
            GameState::GameOver
        };
        events.push(GameEvent::GameEnded(result));
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self.state,
            player: &self.player,
            formation: &self.formation,
            projectiles: &self.projectiles,
            bunkers: &self.bunkers,
            saucer: self.saucer.as_ref(),
            explosions: &self.explosions,
            hud: Hud {
                score: self.waves.score(),
                lives: self.player.lives,
                level: self.waves.level(),
                max_level: self.waves.max_level(),
                bullets_remaining: self.projectiles.bullets_remaining(),
                bullets_per_wave: self.config.bullets_per_wave,
            },
            frame_count: self.frame_count,
            playfield: (self.config.screen_width, self.config.screen_height),
            result: self.result,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.waves.score()
    }

    pub fn level(&self) -> u32 {
        self.waves.level()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn formation_mut(&mut self) -> &mut Formation {
        &mut self.formation
    }

    pub fn projectiles(&self) -> &ProjectileSet {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut ProjectileSet {
        &mut self.projectiles
    }

    pub fn bunkers(&self) -> &[Bunker] {
        &self.bunkers
    }

    pub fn bunkers_mut(&mut self) -> &mut [Bunker] {
        &mut self.bunkers
    }

    pub fn saucer(&self) -> Option<&Saucer> {
        self.saucer.as_ref()
    }

    pub fn saucer_mut(&mut self) -> &mut Option<Saucer> {
        &mut self.saucer
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn waves_mut(&mut self) -> &mut WaveController {
        &mut self.waves
    }
}

use rand::Rng;
use std::fmt;

use super::Rect;
use super::enemy::Enemy;
use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Pixels per second; negative is up
    pub velocity_y: f32,
    pub owner: ProjectileOwner,
    pub alive: bool,
}

impl Projectile {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn update(&mut self, dt: f32) {
        self.y += self.velocity_y * dt;
    }

    /// Fully above or below the playfield
    pub fn is_out_of_bounds(&self, max_y: f32) -> bool {
        self.y + self.height < 0.0 || self.y > max_y
    }
}

/// Why a fire request produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireRefusal {
    /// Already at the simultaneous in-flight cap
    InFlightCap,
    /// The per-wave bullet budget is used up
    BudgetExhausted,
    /// No enemy is left to drop a bomb
    NoShooters,
}

impl fmt::Display for FireRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireRefusal::InFlightCap => write!(f, "too many projectiles in flight"),
            FireRefusal::BudgetExhausted => write!(f, "no bullets left this wave"),
            FireRefusal::NoShooters => write!(f, "no enemy can fire"),
        }
    }
}

/// Owns every player bullet and enemy bomb, enforces the firing limits and
/// culls whatever leaves the playfield.
#[derive(Debug, Clone)]
pub struct ProjectileSet {
    player_shots: Vec<Projectile>,
    bombs: Vec<Projectile>,
    next_id: u64,
    max_player_shots: usize,
    bullets_remaining: u32,
    bullet_size: (f32, f32),
    bullet_speed: f32,
    bomb_size: (f32, f32),
    bomb_speed: f32,
    bomb_interval: (f32, f32),
    bomb_timer: f32,
    playfield_height: f32,
}

impl ProjectileSet {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            player_shots: Vec::new(),
            bombs: Vec::new(),
            next_id: 0,
            max_player_shots: config.max_player_bullets,
            bullets_remaining: config.bullets_per_wave,
            bullet_size: (config.bullet_width, config.bullet_height),
            bullet_speed: config.bullet_speed,
            bomb_size: (config.bomb_width, config.bomb_height),
            bomb_speed: config.bomb_speed,
            bomb_interval: config.bomb_interval,
            bomb_timer: config.bomb_interval.1,
            playfield_height: config.screen_height,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Fire an upward bullet whose bottom-center sits at `origin`
    pub fn try_fire_player(&mut self, origin: (f32, f32)) -> Result<Projectile, FireRefusal> {
        if self.player_shots.len() >= self.max_player_shots {
            return Err(FireRefusal::InFlightCap);
        }
        if self.bullets_remaining == 0 {
            return Err(FireRefusal::BudgetExhausted);
        }

        self.bullets_remaining -= 1;
        let (width, height) = self.bullet_size;
        let shot = Projectile {
            id: self.next_id(),
            x: origin.0 - width / 2.0,
            y: origin.1 - height,
            width,
            height,
            velocity_y: -self.bullet_speed,
            owner: ProjectileOwner::Player,
            alive: true,
        };
        self.player_shots.push(shot);
        Ok(shot)
    }

    /// Drop a bomb from a front-line enemy picked uniformly at random
    pub fn try_fire_enemy<R: Rng>(
        &mut self,
        front_line: &[&Enemy],
        cap: usize,
        rng: &mut R,
    ) -> Result<Projectile, FireRefusal> {
        if self.bombs.len() >= cap {
            return Err(FireRefusal::InFlightCap);
        }
        if front_line.is_empty() {
            return Err(FireRefusal::NoShooters);
        }

        let shooter = front_line[rng.random_range(0..front_line.len())];
        let (muzzle_x, muzzle_y) = shooter.muzzle();
        let (width, height) = self.bomb_size;
        let bomb = Projectile {
            id: self.next_id(),
            x: muzzle_x - width / 2.0,
            y: muzzle_y,
            width,
            height,
            velocity_y: self.bomb_speed,
            owner: ProjectileOwner::Enemy,
            alive: true,
        };
        self.bombs.push(bomb);
        Ok(bomb)
    }

    /// Count down the bomb timer; true when it fired and was re-armed
    pub fn bomb_due<R: Rng>(&mut self, dt: f32, rng: &mut R) -> bool {
        self.bomb_timer -= dt;
        if self.bomb_timer > 0.0 {
            return false;
        }
        let (low, high) = self.bomb_interval;
        self.bomb_timer = if high > low {
            rng.random_range(low..high)
        } else {
            low
        };
        true
    }

    /// Move everything and drop projectiles that left the playfield
    pub fn update(&mut self, dt: f32) {
        let max_y = self.playfield_height;
        for projectile in self.player_shots.iter_mut().chain(self.bombs.iter_mut()) {
            projectile.update(dt);
            if projectile.is_out_of_bounds(max_y) {
                projectile.alive = false;
            }
        }
        self.purge();
    }

    /// Remove every projectile marked dead
    pub fn purge(&mut self) {
        self.player_shots.retain(|p| p.alive);
        self.bombs.retain(|p| p.alive);
    }

    /// Both pools at once, for collision resolution
    pub fn pools_mut(&mut self) -> (&mut [Projectile], &mut [Projectile]) {
        (&mut self.player_shots, &mut self.bombs)
    }

    pub fn clear(&mut self) {
        self.player_shots.clear();
        self.bombs.clear();
    }

    pub fn clear_player_shots(&mut self) {
        self.player_shots.clear();
    }

    /// Start a new wave's bullet budget
    pub fn reset_budget(&mut self, budget: u32) {
        self.bullets_remaining = budget;
    }

    pub fn bullets_remaining(&self) -> u32 {
        self.bullets_remaining
    }

    pub fn player_shots(&self) -> &[Projectile] {
        &self.player_shots
    }

    pub fn bombs(&self) -> &[Projectile] {
        &self.bombs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.player_shots.iter().chain(self.bombs.iter())
    }
}

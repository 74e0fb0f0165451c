mod bunker;
mod enemy;
mod explosion;
mod formation;
mod player;
mod projectile;
mod saucer;

// Re-export all public types
pub use bunker::{Bunker, spawn_bunkers};
pub use enemy::{Enemy, EnemyId, EnemyTier};
pub use explosion::Explosion;
pub use formation::{Formation, speed_multiplier};
pub use player::Player;
pub use projectile::{FireRefusal, Projectile, ProjectileOwner, ProjectileSet};
pub use saucer::{Saucer, next_saucer_delay};

/// Axis-aligned box in playfield pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }
}

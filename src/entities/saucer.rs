use rand::Rng;

use super::Rect;
use crate::config::GameConfig;

/// The mystery ship. Crosses the top of the playfield once and is worth a
/// random bonus if shot down.
#[derive(Debug, Clone, PartialEq)]
pub struct Saucer {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// +1 flies left to right, -1 right to left
    pub direction: f32,
    speed: f32,
    pub points: u32,
}

impl Saucer {
    /// Enter just off screen on a random side, with a random bonus value
    pub fn spawn<R: Rng>(config: &GameConfig, rng: &mut R) -> Self {
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let x = if direction > 0.0 {
            -config.saucer_width
        } else {
            config.screen_width
        };
        let points = config.saucer_points[rng.random_range(0..config.saucer_points.len())];
        Self {
            x,
            y: config.saucer_y,
            width: config.saucer_width,
            height: config.saucer_height,
            direction,
            speed: config.saucer_speed,
            points,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.x += self.direction * self.speed * dt;
    }

    /// Has left the playfield on the far side
    pub fn is_gone(&self, screen_width: f32) -> bool {
        if self.direction > 0.0 {
            self.x > screen_width
        } else {
            self.x + self.width < 0.0
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Next delay before a saucer flight
pub fn next_saucer_delay<R: Rng>(config: &GameConfig, rng: &mut R) -> f32 {
    let (low, high) = config.saucer_interval;
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}

use super::Rect;
use crate::config::GameConfig;

#[derive(Debug, Clone)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lives: u32,
    /// Seconds of invulnerability left; the player blinks while above zero
    pub invulnerable_timer: f32,
    spawn: (f32, f32),
    speed: f32,
    min_x: f32,
    max_x: f32,
    invulnerability_secs: f32,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        let spawn = config.player_spawn();
        Self {
            x: spawn.0,
            y: spawn.1,
            width: config.player_width,
            height: config.player_height,
            lives: config.starting_lives,
            invulnerable_timer: 0.0,
            spawn,
            speed: config.player_speed,
            min_x: 0.0,
            max_x: config.screen_width - config.player_width,
            invulnerability_secs: config.invulnerability_secs,
        }
    }

    pub fn move_left(&mut self, dt: f32) {
        self.x = (self.x - self.speed * dt).max(self.min_x);
    }

    pub fn move_right(&mut self, dt: f32) {
        self.x = (self.x + self.speed * dt).min(self.max_x);
    }

    /// Count down invulnerability
    pub fn update(&mut self, dt: f32) {
        if self.invulnerable_timer > 0.0 {
            self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Take one life. Returns true if the player has lives left, in which case
    /// they are moved back to the spawn point and made invulnerable.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            return false;
        }
        self.respawn();
        self.invulnerable_timer = self.invulnerability_secs;
        true
    }

    /// Back to the spawn point, keeping lives
    pub fn respawn(&mut self) {
        (self.x, self.y) = self.spawn;
    }

    /// Where bullets leave the ship: top center
    pub fn muzzle(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether the ship is drawn this frame while blinking
    pub fn is_visible(&self, frame_count: u64) -> bool {
        !self.is_invulnerable() || frame_count % 10 < 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_new() {
        let config = GameConfig::default();
        let player = Player::new(&config);
        assert_eq!((player.x, player.y), (380.0, 556.0));
        assert_eq!(player.lives, 3);
        assert!(!player.is_invulnerable());
        assert!(player.is_alive());
    }

    #[test]
    fn test_player_movement_is_clamped() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.move_left(0.5);
        assert_eq!(player.x, 230.0);

        player.move_left(10.0);
        assert_eq!(player.x, 0.0);

        player.move_right(10.0);
        assert_eq!(player.x, 760.0);
    }

    #[test]
    fn test_lose_life_respawns_invulnerable() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.x = 10.0;

        assert!(player.lose_life());
        assert_eq!(player.lives, 2);
        assert_eq!(player.x, 380.0);
        assert!(player.is_invulnerable());

        player.update(1.0);
        assert!(player.is_invulnerable());
        player.update(1.0);
        assert!(!player.is_invulnerable());
    }

    #[test]
    fn test_last_life_lost() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.lives = 1;
        player.x = 10.0;
        assert!(!player.lose_life());
        assert!(!player.is_alive());
        assert_eq!(player.x, 10.0);
        assert!(!player.is_invulnerable());
    }

    #[test]
    fn test_player_blinks_while_invulnerable() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        assert!(player.is_visible(7));
        player.lose_life();
        assert!(player.is_visible(2));
        assert!(!player.is_visible(7));
    }

    // Property-based tests
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_player_stays_in_bounds_x(
                moves in prop::collection::vec((prop::bool::ANY, 0.0f32..0.5), 0..100)
            ) {
                let config = GameConfig::default();
                let mut player = Player::new(&config);
                for (move_right, dt) in moves {
                    if move_right {
                        player.move_right(dt);
                    } else {
                        player.move_left(dt);
                    }
                    prop_assert!(player.x >= 0.0);
                    prop_assert!(player.x + player.width <= config.screen_width);
                }
            }
        }
    }
}

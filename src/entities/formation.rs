use super::Rect;
use super::enemy::{Enemy, EnemyId};
use crate::config::GameConfig;
use crate::wave::difficulty;

/// How much faster the formation steps, given the fraction of enemies still
/// alive and the current level. Never below 1.0.
pub fn speed_multiplier(alive_ratio: f32, level: u32) -> f32 {
    let destroyed = 1.0 - alive_ratio.clamp(0.0, 1.0);
    let level_factor = 1.0 + 0.05 * level.saturating_sub(1) as f32;
    (1.0 + destroyed * 2.0) * level_factor
}

/// The enemy grid of one wave. Enemies are stored densely by
/// `row * cols + col` and only flagged dead, so ids stay stable.
#[derive(Debug, Clone)]
pub struct Formation {
    enemies: Vec<Enemy>,
    rows: usize,
    cols: usize,
    alive_count: usize,
    /// Horizontal direction (+1 right, -1 left)
    pub direction: f32,
    level: u32,
    base_interval: f32,
    /// Pixels per second of horizontal sweep
    horizontal_speed: f32,
    step_interval: f32,
    step_timer: f32,
    /// Steps taken so far, drives the two-frame animation
    steps: u64,
    enemy_size: (f32, f32),
    row_drop: f32,
    min_step_interval: f32,
    left_limit: f32,
    right_limit: f32,
}

impl Formation {
    pub fn new(config: &GameConfig) -> Self {
        let first = difficulty(1);
        Self {
            enemies: Vec::new(),
            rows: 0,
            cols: 0,
            alive_count: 0,
            direction: 1.0,
            level: 1,
            base_interval: first.base_interval,
            horizontal_speed: first.horizontal_speed,
            step_interval: first.base_interval,
            step_timer: 0.0,
            steps: 0,
            enemy_size: (config.enemy_width, config.enemy_height),
            row_drop: config.row_drop,
            min_step_interval: config.min_step_interval,
            left_limit: config.edge_margin,
            right_limit: config.screen_width - config.edge_margin,
        }
    }

    /// Replace any existing enemies with a fresh `rows` x `cols` grid
    pub fn spawn(&mut self, rows: usize, cols: usize, origin: (f32, f32), spacing: (f32, f32)) {
        self.enemies.clear();
        for row in 0..rows {
            for col in 0..cols {
                let id = EnemyId(row * cols + col);
                let x = origin.0 + col as f32 * spacing.0;
                let y = origin.1 + row as f32 * spacing.1;
                self.enemies
                    .push(Enemy::new(id, row, col, x, y, self.enemy_size));
            }
        }
        self.rows = rows;
        self.cols = cols;
        self.alive_count = self.enemies.len();
        self.direction = 1.0;
        self.step_timer = 0.0;
        self.steps = 0;
        self.recompute_interval();
    }

    /// Set the level-dependent pacing. Takes effect immediately.
    pub fn set_pace(&mut self, level: u32, base_interval: f32, horizontal_speed: f32) {
        self.level = level;
        self.base_interval = base_interval;
        self.horizontal_speed = horizontal_speed;
        self.recompute_interval();
    }

    /// Advance the step timer; returns true when a step was taken
    pub fn update(&mut self, dt: f32) -> bool {
        if self.is_cleared() {
            return false;
        }

        self.step_timer += dt;
        if self.step_timer < self.step_interval {
            return false;
        }
        self.step_timer = 0.0;
        self.step();
        true
    }

    /// One horizontal advance, or a reverse-and-drop when the advance would
    /// carry the formation past a wall
    fn step(&mut self) {
        let Some(bounds) = self.bounds() else {
            return;
        };

        let dx = self.direction * self.horizontal_speed * self.step_interval;
        let hits_wall = bounds.x + dx < self.left_limit || bounds.right() + dx > self.right_limit;

        if hits_wall {
            self.direction = -self.direction;
            for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
                enemy.y += self.row_drop;
            }
        } else {
            for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
                enemy.x += dx;
            }
        }

        self.steps += 1;
    }

    /// The lowest alive enemy of every column that still has one
    pub fn front_line(&self) -> Vec<&Enemy> {
        (0..self.cols)
            .filter_map(|col| {
                (0..self.rows)
                    .rev()
                    .map(|row| &self.enemies[row * self.cols + col])
                    .find(|enemy| enemy.alive)
            })
            .collect()
    }

    /// Mark an enemy dead. Returns its point value, or None when the id is
    /// unknown or the enemy was already dead.
    pub fn remove(&mut self, id: EnemyId) -> Option<u32> {
        let enemy = self.enemies.get_mut(id.0).filter(|e| e.alive)?;
        enemy.alive = false;
        let points = enemy.points();
        self.alive_count -= 1;
        self.recompute_interval();
        Some(points)
    }

    pub fn is_cleared(&self) -> bool {
        self.alive_count == 0
    }

    fn recompute_interval(&mut self) {
        let multiplier = speed_multiplier(self.alive_ratio(), self.level);
        self.step_interval = (self.base_interval / multiplier).max(self.min_step_interval);
    }

    /// Fraction of the spawned grid still alive; 0.0 for an empty grid
    pub fn alive_ratio(&self) -> f32 {
        if self.enemies.is_empty() {
            0.0
        } else {
            self.alive_count as f32 / self.enemies.len() as f32
        }
    }

    /// Bounding box of every alive enemy
    pub fn bounds(&self) -> Option<Rect> {
        self.alive()
            .map(|e| e.rect())
            .reduce(|acc, rect| acc.union(&rect))
    }

    /// True when any alive enemy's bottom edge is at or below `limit`
    pub fn reached(&self, limit: f32) -> bool {
        self.alive().any(|e| e.rect().bottom() >= limit)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(id.0)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    pub fn initial_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn step_interval(&self) -> f32 {
        self.step_interval
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.horizontal_speed
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Two-frame animation phase, flips on every step
    pub fn animation_phase(&self) -> u8 {
        (self.steps % 2) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formation() -> Formation {
        let config = GameConfig::default();
        let mut formation = Formation::new(&config);
        formation.spawn(3, 4, (100.0, 50.0), (50.0, 40.0));
        formation
    }

    #[test]
    fn test_spawn_builds_grid() {
        let formation = formation();
        assert_eq!(formation.alive_count(), 12);
        assert_eq!(formation.dimensions(), (3, 4));
        let last = formation.get(EnemyId(11)).unwrap();
        assert_eq!((last.row, last.col), (2, 3));
        assert_eq!((last.x, last.y), (250.0, 130.0));
    }

    #[test]
    fn test_spawn_discards_previous_wave() {
        let mut formation = formation();
        formation.remove(EnemyId(0));
        formation.spawn(1, 2, (0.0, 0.0), (50.0, 40.0));
        assert_eq!(formation.alive_count(), 2);
        assert_eq!(formation.initial_count(), 2);
        assert_eq!(formation.direction, 1.0);
    }

    #[test]
    fn test_new_formation_uses_level_one_pace() {
        let formation = Formation::new(&GameConfig::default());
        let first = difficulty(1);
        assert_eq!(formation.step_interval(), first.base_interval);
        assert_eq!(formation.horizontal_speed(), first.horizontal_speed);
    }

    #[test]
    fn test_update_waits_for_interval() {
        let mut formation = formation();
        let x_before = formation.get(EnemyId(0)).unwrap().x;
        assert!(!formation.update(formation.step_interval() / 2.0));
        assert_eq!(formation.get(EnemyId(0)).unwrap().x, x_before);
    }

    #[test]
    fn test_step_moves_horizontally() {
        let mut formation = formation();
        let interval = formation.step_interval();
        let expected_dx = formation.horizontal_speed() * interval;
        assert!(formation.update(interval));
        let enemy = formation.get(EnemyId(0)).unwrap();
        assert!((enemy.x - (100.0 + expected_dx)).abs() < 1e-4);
        assert_eq!(enemy.y, 50.0);
        assert_eq!(formation.animation_phase(), 1);
    }

    #[test]
    fn test_reverses_and_drops_at_right_wall() {
        let config = GameConfig::default();
        let mut formation = Formation::new(&config);
        // Right edge at 780; one more step would cross the 790 limit
        formation.spawn(1, 1, (748.0, 100.0), (50.0, 40.0));

        let interval = formation.step_interval();
        assert!(formation.update(interval));

        let enemy = formation.get(EnemyId(0)).unwrap();
        assert_eq!(enemy.x, 748.0, "no horizontal movement on a drop step");
        assert_eq!(enemy.y, 100.0 + config.row_drop);
        assert_eq!(formation.direction, -1.0);
    }

    #[test]
    fn test_front_line_picks_lowest_per_column() {
        let mut formation = formation();
        // Column 1 loses its bottom enemy, column 3 is wiped out
        formation.remove(EnemyId(2 * 4 + 1));
        for row in 0..3 {
            formation.remove(EnemyId(row * 4 + 3));
        }

        let front: Vec<(usize, usize)> = formation
            .front_line()
            .iter()
            .map(|e| (e.row, e.col))
            .collect();
        assert_eq!(front, vec![(2, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_remove_twice_is_refused() {
        let mut formation = formation();
        assert_eq!(formation.remove(EnemyId(0)), Some(30));
        assert_eq!(formation.remove(EnemyId(0)), None);
        assert_eq!(formation.remove(EnemyId(99)), None);
        assert_eq!(formation.alive_count(), 11);
    }

    #[test]
    fn test_remove_speeds_up_steps() {
        let mut formation = formation();
        let before = formation.step_interval();
        formation.remove(EnemyId(5));
        assert!(formation.step_interval() < before);
    }

    #[test]
    fn test_last_removal_keeps_valid_interval() {
        let config = GameConfig::default();
        let mut formation = Formation::new(&config);
        formation.spawn(1, 1, (100.0, 100.0), (50.0, 40.0));
        formation.remove(EnemyId(0));
        assert!(formation.is_cleared());
        assert!(formation.step_interval().is_finite());
        assert!(formation.step_interval() >= config.min_step_interval);
        assert!(formation.front_line().is_empty());
        assert!(!formation.update(10.0));
    }

    #[test]
    fn test_interval_has_floor() {
        let config = GameConfig::default();
        let mut formation = Formation::new(&config);
        formation.spawn(1, 1, (100.0, 100.0), (50.0, 40.0));
        formation.set_pace(50, 0.01, 40.0);
        assert_eq!(formation.step_interval(), config.min_step_interval);
    }

    #[test]
    fn test_reached_descend_limit() {
        let formation = formation();
        // Bottom row spans 130..154
        assert!(formation.reached(154.0));
        assert!(!formation.reached(154.5));
    }

    #[test]
    fn test_speed_multiplier_increases() {
        assert_eq!(speed_multiplier(1.0, 1), 1.0);
        assert!(speed_multiplier(0.5, 1) > speed_multiplier(1.0, 1));
        assert!(speed_multiplier(1.0, 4) > speed_multiplier(1.0, 1));
        assert_eq!(speed_multiplier(0.0, 1), 3.0);
    }

    // Property-based tests
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_formation_stays_within_walls(
                rows in 1usize..6,
                cols in 1usize..10,
                origin_x in 10f32..200.0,
                level in 1u32..12,
                dts in prop::collection::vec(0.001f32..0.1, 1..600),
                kills in prop::collection::vec(0usize..60, 0..30),
            ) {
                let config = GameConfig::default();
                let mut formation = Formation::new(&config);
                formation.spawn(rows, cols, (origin_x, 60.0), (50.0, 40.0));
                formation.set_pace(level, 0.5, 40.0 + 8.0 * level as f32);
                for id in kills {
                    formation.remove(EnemyId(id));
                }

                let left = config.edge_margin;
                let right = config.screen_width - config.edge_margin;
                for dt in dts {
                    formation.update(dt);
                    if let Some(bounds) = formation.bounds() {
                        prop_assert!(bounds.x >= left - 1e-3);
                        prop_assert!(bounds.right() <= right + 1e-3);
                    }
                }
            }

            #[test]
            fn test_fewer_alive_never_slower(
                rows in 1usize..6,
                cols in 1usize..10,
                level in 1u32..12,
                kills in prop::collection::vec(0usize..60, 1..30),
            ) {
                let config = GameConfig::default();
                let mut a = Formation::new(&config);
                a.spawn(rows, cols, (50.0, 60.0), (50.0, 40.0));
                a.set_pace(level, 0.6, 40.0);
                let mut b = a.clone();

                // `a` loses strictly more enemies than `b`
                let first = kills[0] % (rows * cols);
                a.remove(EnemyId(first));
                for id in &kills[1..] {
                    if *id != first {
                        a.remove(EnemyId(*id));
                        b.remove(EnemyId(*id));
                    }
                }

                prop_assert!(a.alive_count() < b.alive_count());
                prop_assert!(a.step_interval() <= b.step_interval());
            }
        }
    }
}

//! Per-tick collision resolution
//!
//! Every check runs against a single snapshot of the tick: a projectile is
//! matched at most once, and anything destroyed earlier in the pass is
//! skipped by later checks.

use crate::config::GameConfig;
use crate::entities::{Bunker, EnemyId, Formation, Player, ProjectileSet, Saucer};

/// What took a life from the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitCause {
    Bomb,
    /// The formation reached the player's row, or touched the ship
    Invasion,
}

/// Everything one resolution pass destroyed or awarded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub points: u32,
    pub enemies_destroyed: Vec<EnemyId>,
    pub bombs_destroyed: u32,
    /// Bonus paid for the saucer, if it was shot down
    pub saucer_points: Option<u32>,
    /// Projectiles stopped by a bunker, from either side
    pub bunker_hits: u32,
    pub player_hit: Option<HitCause>,
    /// Centers of everything destroyed, for explosions
    pub blasts: Vec<(f32, f32)>,
}

/// Resolve all overlaps for this tick and purge the projectiles that hit
///
/// Order: player shots against enemies, then bombs, then the saucer, then
/// bunkers; bombs against bunkers and then the player; invaders grind
/// through the bunkers they overlap; finally the formation against the
/// descend limit. The player loses at most one life per pass and none while
/// invulnerable.
pub fn resolve(
    formation: &mut Formation,
    bunkers: &mut [Bunker],
    saucer: &mut Option<Saucer>,
    projectiles: &mut ProjectileSet,
    player: &Player,
    config: &GameConfig,
) -> Resolution {
    let mut resolution = Resolution::default();
    let (shots, bombs) = projectiles.pools_mut();

    for shot in shots.iter_mut().filter(|s| s.alive) {
        let rect = shot.rect();

        let target = formation
            .alive()
            .find(|enemy| enemy.rect().overlaps(&rect))
            .map(|enemy| (enemy.id, enemy.rect().center()));
        if let Some((id, center)) = target {
            if let Some(points) = formation.remove(id) {
                resolution.points += points;
                resolution.enemies_destroyed.push(id);
                resolution.blasts.push(center);
            }
            shot.alive = false;
            continue;
        }

        if let Some(bomb) = bombs
            .iter_mut()
            .find(|bomb| bomb.alive && bomb.rect().overlaps(&rect))
        {
            bomb.alive = false;
            shot.alive = false;
            resolution.points += config.bomb_bonus;
            resolution.bombs_destroyed += 1;
            resolution.blasts.push(bomb.rect().center());
            continue;
        }

        if let Some(ship) = saucer.take_if(|ship| ship.rect().overlaps(&rect)) {
            shot.alive = false;
            resolution.points += ship.points;
            resolution.saucer_points = Some(ship.points);
            resolution.blasts.push(ship.rect().center());
            continue;
        }

        if bunkers.iter_mut().any(|bunker| bunker.hit(&rect, true)) {
            shot.alive = false;
            resolution.bunker_hits += 1;
        }
    }

    for bomb in bombs.iter_mut().filter(|b| b.alive) {
        let rect = bomb.rect();
        if bunkers.iter_mut().any(|bunker| bunker.hit(&rect, false)) {
            bomb.alive = false;
            resolution.bunker_hits += 1;
        }
    }

    for enemy in formation.alive() {
        let rect = enemy.rect();
        for bunker in bunkers.iter_mut() {
            bunker.erase(&rect);
        }
    }

    if !player.is_invulnerable() {
        let body = player.rect();
        if let Some(bomb) = bombs
            .iter_mut()
            .find(|bomb| bomb.alive && bomb.rect().overlaps(&body))
        {
            bomb.alive = false;
            resolution.player_hit = Some(HitCause::Bomb);
        } else if formation.reached(config.descend_limit())
            || formation.alive().any(|enemy| enemy.rect().overlaps(&body))
        {
            resolution.player_hit = Some(HitCause::Invasion);
        }
    }

    projectiles.purge();
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::spawn_bunkers;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct World {
        config: GameConfig,
        formation: Formation,
        bunkers: Vec<Bunker>,
        saucer: Option<Saucer>,
        projectiles: ProjectileSet,
        player: Player,
    }

    impl World {
        /// No bunkers and no saucer unless a test adds them
        fn new() -> Self {
            let config = GameConfig::default();
            Self {
                formation: Formation::new(&config),
                bunkers: Vec::new(),
                saucer: None,
                projectiles: ProjectileSet::new(&config),
                player: Player::new(&config),
                config,
            }
        }

        fn resolve(&mut self) -> Resolution {
            resolve(
                &mut self.formation,
                &mut self.bunkers,
                &mut self.saucer,
                &mut self.projectiles,
                &self.player,
                &self.config,
            )
        }

        fn saucer_at(&mut self, x: f32) {
            let mut rng = StdRng::seed_from_u64(2);
            let mut saucer = Saucer::spawn(&self.config, &mut rng);
            saucer.x = x;
            self.saucer = Some(saucer);
        }

        /// Drop a bomb from the single front-line enemy
        fn drop_bomb(&mut self) {
            let mut rng = StdRng::seed_from_u64(1);
            let front = self.formation.front_line();
            self.projectiles.try_fire_enemy(&front, 10, &mut rng).unwrap();
        }
    }

    #[test]
    fn test_shot_kills_enemy_and_scores() {
        let mut world = World::new();
        world.formation.spawn(1, 1, (100.0, 100.0), (50.0, 40.0));
        world.projectiles.try_fire_player((116.0, 120.0)).unwrap();

        let resolution = world.resolve();
        assert_eq!(resolution.points, 30);
        assert_eq!(resolution.enemies_destroyed, vec![EnemyId(0)]);
        assert_eq!(resolution.blasts, vec![(116.0, 112.0)]);
        assert!(world.formation.is_cleared());
        assert!(world.projectiles.player_shots().is_empty());
    }

    #[test]
    fn test_one_shot_kills_one_enemy() {
        let mut world = World::new();
        // Two enemies stacked so the bullet overlaps both
        world.formation.spawn(2, 1, (100.0, 100.0), (50.0, 10.0));
        world.projectiles.try_fire_player((116.0, 125.0)).unwrap();

        let resolution = world.resolve();
        assert_eq!(resolution.enemies_destroyed.len(), 1);
        assert_eq!(world.formation.alive_count(), 1);
    }

    #[test]
    fn test_shot_hitting_enemy_spares_overlapping_bomb() {
        let mut world = World::new();
        world.formation.spawn(1, 1, (100.0, 100.0), (50.0, 40.0));
        world.drop_bomb();
        // Bomb sits at (113, 124); a shot at y 112..124 touches the enemy first
        world.projectiles.try_fire_player((116.0, 124.0)).unwrap();

        let resolution = world.resolve();
        assert_eq!(resolution.enemies_destroyed.len(), 1);
        assert_eq!(resolution.bombs_destroyed, 0);
        assert_eq!(world.projectiles.bombs().len(), 1);
    }

    #[test]
    fn test_shot_destroys_bomb_for_bonus() {
        let mut world = World::new();
        world.formation.spawn(1, 1, (100.0, 100.0), (50.0, 40.0));
        world.drop_bomb();
        // Below the enemy, overlapping only the bomb at y 124..136
        world.projectiles.try_fire_player((116.0, 140.0)).unwrap();

        let resolution = world.resolve();
        assert_eq!(resolution.points, 3);
        assert_eq!(resolution.bombs_destroyed, 1);
        assert!(world.projectiles.bombs().is_empty());
        assert!(world.projectiles.player_shots().is_empty());
        assert_eq!(world.formation.alive_count(), 1);
    }

    #[test]
    fn test_bomb_hits_player() {
        let mut world = World::new();
        // Enemy right above the ship, bomb lands inside the player box
        world.formation.spawn(1, 1, (384.0, 540.0), (50.0, 40.0));
        world.drop_bomb();

        let resolution = world.resolve();
        assert_eq!(resolution.player_hit, Some(HitCause::Bomb));
        assert!(world.projectiles.bombs().is_empty());
    }

    #[test]
    fn test_invulnerable_player_ignores_hits() {
        let mut world = World::new();
        world.formation.spawn(1, 1, (384.0, 540.0), (50.0, 40.0));
        world.drop_bomb();
        world.player.invulnerable_timer = 1.0;

        let resolution = world.resolve();
        assert_eq!(resolution.player_hit, None);
        assert_eq!(world.projectiles.bombs().len(), 1);
    }

    #[test]
    fn test_formation_reaching_player_row() {
        let mut world = World::new();
        // Bottom edge at 556, far from the ship horizontally
        world.formation.spawn(1, 1, (20.0, 532.0), (50.0, 40.0));

        let resolution = world.resolve();
        assert_eq!(resolution.player_hit, Some(HitCause::Invasion));
    }

    #[test]
    fn test_shot_downs_saucer_for_its_bonus() {
        let mut world = World::new();
        world.formation.spawn(1, 1, (100.0, 100.0), (50.0, 40.0));
        world.saucer_at(300.0);
        let bonus = world.saucer.as_ref().unwrap().points;
        // Saucer spans 300..340 x 40..60
        world.projectiles.try_fire_player((320.0, 55.0)).unwrap();

        let resolution = world.resolve();
        assert_eq!(resolution.saucer_points, Some(bonus));
        assert_eq!(resolution.points, bonus);
        assert!(world.saucer.is_none());
        assert!(world.projectiles.player_shots().is_empty());
        assert_eq!(resolution.blasts, vec![(320.0, 50.0)]);
    }

    #[test]
    fn test_shot_missing_saucer_leaves_it_flying() {
        let mut world = World::new();
        world.saucer_at(300.0);
        world.projectiles.try_fire_player((500.0, 55.0)).unwrap();

        let resolution = world.resolve();
        assert_eq!(resolution.saucer_points, None);
        assert!(world.saucer.is_some());
    }

    #[test]
    fn test_bunker_stops_shot() {
        let mut world = World::new();
        world.formation.spawn(1, 1, (100.0, 100.0), (50.0, 40.0));
        world.bunkers = spawn_bunkers(&world.config);
        let bunker = world.bunkers[0].bounds();
        let intact = world.bunkers[0].intact_count();
        // Left part of the first bunker, bottom edge
        world
            .projectiles
            .try_fire_player((bunker.x + 9.0, bunker.bottom() - 4.0))
            .unwrap();

        let resolution = world.resolve();
        assert_eq!(resolution.bunker_hits, 1);
        assert_eq!(resolution.points, 0);
        assert!(world.projectiles.player_shots().is_empty());
        assert!(world.bunkers[0].intact_count() < intact);
    }

    #[test]
    fn test_bunker_shields_player_from_bomb() {
        let mut world = World::new();
        world.bunkers = spawn_bunkers(&world.config);
        let bunker = world.bunkers[1].bounds();
        // Move the ship under the bunker and drop a bomb onto the bunker top
        world.player.x = bunker.x;
        world.formation.spawn(1, 1, (bunker.x, bunker.y - 28.0), (50.0, 40.0));
        world.drop_bomb();

        let resolution = world.resolve();
        assert_eq!(resolution.bunker_hits, 1);
        assert_eq!(resolution.player_hit, None);
        assert!(world.projectiles.bombs().is_empty());
    }

    #[test]
    fn test_invaders_grind_through_bunkers() {
        let mut world = World::new();
        world.bunkers = spawn_bunkers(&world.config);
        let bunker = world.bunkers[0].bounds();
        let intact = world.bunkers[0].intact_count();
        world.formation.spawn(1, 1, (bunker.x, bunker.y), (50.0, 40.0));

        world.resolve();
        assert!(world.bunkers[0].intact_count() < intact);
        assert_eq!(world.bunkers[1].intact_count(), intact);
    }

    #[test]
    fn test_no_hit_when_apart() {
        let mut world = World::new();
        world.formation.spawn(2, 3, (100.0, 100.0), (50.0, 40.0));
        world.projectiles.try_fire_player((400.0, 500.0)).unwrap();

        let resolution = world.resolve();
        assert_eq!(resolution, Resolution::default());
        assert_eq!(world.projectiles.player_shots().len(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_each_shot_scores_at_most_once(
                shots in prop::collection::vec((80f32..300.0, 100f32..260.0), 1..5),
                bombs in 0usize..4,
            ) {
                let mut world = World::new();
                world.formation.spawn(4, 5, (80.0, 100.0), (40.0, 30.0));
                let mut rng = StdRng::seed_from_u64(9);
                for _ in 0..bombs {
                    let front = world.formation.front_line();
                    let _ = world.projectiles.try_fire_enemy(&front, 10, &mut rng);
                }
                let alive_before = world.formation.alive_count();
                let bombs_before = world.projectiles.bombs().len();
                let fired = shots
                    .iter()
                    .filter(|origin| world.projectiles.try_fire_player(**origin).is_ok())
                    .count();

                let resolution = world.resolve();
                let hits = resolution.enemies_destroyed.len() + resolution.bombs_destroyed as usize;
                let spent = fired - world.projectiles.player_shots().len();

                // Every spent shot paid for exactly one kill
                prop_assert_eq!(hits, spent);
                prop_assert_eq!(
                    world.formation.alive_count(),
                    alive_before - resolution.enemies_destroyed.len()
                );
                prop_assert_eq!(
                    world.projectiles.bombs().len(),
                    bombs_before - resolution.bombs_destroyed as usize
                );
                prop_assert!(world.projectiles.player_shots().iter().all(|s| s.alive));
            }
        }
    }
}

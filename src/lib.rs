// Library exports for the binary and the integration tests
pub use collision::{HitCause, Resolution};
pub use config::{GameConfig, Settings};
pub use entities::{
    Bunker, Enemy, EnemyId, EnemyTier, Explosion, FireRefusal, Formation, Player, Projectile,
    ProjectileOwner, ProjectileSet, Rect, Saucer,
};
pub use game::{Game, GameEvent, GameResult, GameState, InputFrame, SoundEvent};
pub use wave::{AmmoPolicy, BombCapPolicy, WaveController, WaveOutcome, WaveParams};

pub mod app;
pub mod audio;
pub mod clock;
pub mod collision;
pub mod config;
pub mod entities;
pub mod game;
pub mod highscores;
pub mod input;
pub mod renderer;
pub mod wave;

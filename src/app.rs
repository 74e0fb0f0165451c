use color_eyre::Result;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::audio::AudioManager;
use crate::clock::FixedStepper;
use crate::game::{Game, GameEvent};
use crate::highscores::HighScores;
use crate::input::InputManager;
use crate::renderer::{GameRenderer, RenderView};

/// Target wall time of one rendered frame
const FRAME_BUDGET: Duration = Duration::from_millis(16);

/// The main application: owns the game and wires it to the terminal,
/// the audio worker and the leaderboard.
pub struct App {
    running: bool,
    game: Game,
    stepper: FixedStepper,
    last_frame_time: Instant,
    /// Rank earned by the most recently finished game
    last_rank: Option<usize>,
    high_scores: HighScores,
    high_scores_path: PathBuf,
    /// internal components
    input_manager: InputManager,
    renderer: GameRenderer,
    audio_manager: AudioManager,
}

impl App {
    pub fn new(
        game: Game,
        input_manager: InputManager,
        audio_manager: AudioManager,
        high_scores: HighScores,
        high_scores_path: PathBuf,
    ) -> Self {
        Self {
            running: true,
            game,
            stepper: FixedStepper::sixty_hz(),
            last_frame_time: Instant::now(),
            last_rank: None,
            high_scores,
            high_scores_path,
            input_manager,
            renderer: GameRenderer::new(),
            audio_manager,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while self.running {
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_frame_time);
            self.last_frame_time = now;

            self.input_manager.poll_events()?;
            if self.input_manager.quit_requested() {
                log::info!("Quit requested");
                self.running = false;
                break;
            }

            let steps = self.stepper.advance(elapsed);
            for _ in 0..steps {
                let input = self.input_manager.take_frame(now);
                let events = self.game.tick(self.stepper.dt(), &input);
                self.handle_events(&events);
            }

            terminal.draw(|frame| {
                let view = RenderView {
                    snapshot: self.game.snapshot(),
                    high_score: self.high_scores.top_score(),
                    rank: self.last_rank,
                };
                self.renderer.render(frame, &view);
            })?;

            // Sleep off the rest of the frame to keep CPU usage down
            if let Some(rest) = FRAME_BUDGET.checked_sub(now.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        Ok(())
    }

    /// Route tick events to audio and the leaderboard
    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::Sound(sound) => self.audio_manager.play(*sound),
                GameEvent::ExtraLife { lives } => log::info!("Extra life, now {lives}"),
                GameEvent::GameEnded(result) => {
                    log::info!(
                        "Game ended: score {} at level {} ({})",
                        result.score,
                        result.level,
                        if result.won { "won" } else { "lost" }
                    );
                    self.last_rank = self.high_scores.submit(result.score);
                    if self.last_rank.is_some() {
                        if let Err(err) = self.high_scores.save(&self.high_scores_path) {
                            log::warn!("Failed to save high scores: {err:#}");
                        }
                    }
                }
                GameEvent::WaveCleared { .. } | GameEvent::LifeLost { .. } => {}
            }
        }
    }
}

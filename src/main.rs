use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::OpenOptions;
use std::io::stdout;
use std::path::{Path, PathBuf};

use invaders::app::App;
use invaders::audio::AudioManager;
use invaders::config::{DEFAULT_SETTINGS_PATH, GameConfig, Settings};
use invaders::game::Game;
use invaders::highscores::{DEFAULT_HIGH_SCORES_PATH, HighScores};
use invaders::input::InputManager;

/// Diagnostics go to a file because stdout belongs to the TUI
const LOG_PATH: &str = "invaders.log";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(LOG_PATH)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let settings = Settings::load(Path::new(DEFAULT_SETTINGS_PATH));
    let config = GameConfig::from_settings(&settings);
    let high_scores_path = PathBuf::from(DEFAULT_HIGH_SCORES_PATH);
    let high_scores = HighScores::load(&high_scores_path);
    let audio_manager = if settings.audio.mute {
        AudioManager::muted()
    } else {
        AudioManager::new(settings.effective_volume())
    };

    let supports_keyboard_enhancement = matches!(
        crossterm::terminal::supports_keyboard_enhancement(),
        Ok(true)
    );
    log::info!("Keyboard enhancement supported: {supports_keyboard_enhancement}");

    // Setup terminal manually for full control
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Enable keyboard enhancement AFTER entering alternate screen
    if supports_keyboard_enhancement {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(
        Game::new(config),
        InputManager::new(supports_keyboard_enhancement),
        audio_manager,
        high_scores,
        high_scores_path,
    );
    let result = app.run(&mut terminal);

    // Cleanup
    if supports_keyboard_enhancement {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("Exiting");
    result
}

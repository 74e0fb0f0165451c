use rand::Rng;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::entities::{EnemyTier, ProjectileOwner};
use crate::game::{GameState, Snapshot};

/// View struct that holds all game state needed for rendering
pub struct RenderView<'a> {
    pub snapshot: Snapshot<'a>,
    /// Best persisted score
    pub high_score: Option<u32>,
    /// Leaderboard rank earned by the game that just ended
    pub rank: Option<usize>,
}

/// Maps playfield pixels onto terminal cells
#[derive(Debug, Clone, Copy)]
struct Projection {
    area: Rect,
    scale_x: f32,
    scale_y: f32,
}

impl Projection {
    fn new(area: Rect, playfield: (f32, f32)) -> Self {
        Self {
            area,
            scale_x: area.width as f32 / playfield.0.max(1.0),
            scale_y: area.height as f32 / playfield.1.max(1.0),
        }
    }

    /// Cell holding a playfield point, or None outside the area
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let cx = (x * self.scale_x) as u16;
        let cy = (y * self.scale_y) as u16;
        if cx >= self.area.width || cy >= self.area.height {
            return None;
        }
        Some((self.area.x + cx, self.area.y + cy))
    }
}

fn enemy_glyph(tier: EnemyTier, phase: u8) -> &'static str {
    match (tier, phase % 2) {
        (EnemyTier::Top, 0) => "/O\\",
        (EnemyTier::Top, _) => "\\O/",
        (EnemyTier::Middle, 0) => "{#}",
        (EnemyTier::Middle, _) => "}#{",
        (EnemyTier::Bottom, 0) => "<=>",
        (EnemyTier::Bottom, _) => ">=<",
    }
}

fn enemy_color(tier: EnemyTier) -> Color {
    match tier {
        EnemyTier::Top => Color::Magenta,
        EnemyTier::Middle => Color::Cyan,
        EnemyTier::Bottom => Color::Red,
    }
}

const PLAYER_GLYPH: &str = "/^\\";
const SAUCER_GLYPH: &str = "<@@>";
const BUNKER_GLYPH: &str = "█";

/// Burst that opens up and scatters as it fades
fn explosion_glyph(progress: f32) -> &'static str {
    if progress < 1.0 / 3.0 {
        "\\|/"
    } else if progress < 2.0 / 3.0 {
        "-*-"
    } else {
        "/|\\"
    }
}

/// Handles all rendering responsibilities for the game
#[derive(Debug, Default)]
pub struct GameRenderer;

impl GameRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Main render method that dispatches to state-specific renderers
    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view.snapshot.state {
            GameState::Title => self.render_title(frame, view),
            GameState::Playing => self.render_game(frame, view),
            GameState::Paused => self.render_paused(frame, view),
            GameState::GameOver | GameState::Won => self.render_game_over(frame, view),
        }
    }

    fn render_title(&self, frame: &mut Frame, view: &RenderView) {
        let area = frame.area();
        let high_score = view
            .high_score
            .map_or_else(|| "-".to_string(), |s| s.to_string());

        let mut lines = vec![
            Line::from(""),
            Line::from("S P A C E   I N V A D E R S")
                .centered()
                .green()
                .bold(),
            Line::from(""),
        ];
        for (tier, points) in [
            (EnemyTier::Top, 30),
            (EnemyTier::Middle, 20),
            (EnemyTier::Bottom, 10),
        ] {
            lines.push(
                Line::from(vec![
                    Span::styled(
                        enemy_glyph(tier, 0),
                        Style::default()
                            .fg(enemy_color(tier))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" = {points} points"), Style::default().fg(Color::White)),
                ])
                .centered(),
            );
        }
        lines.extend([
            Line::from(""),
            Line::from(format!("High Score: {high_score}"))
                .centered()
                .yellow()
                .bold(),
            Line::from(""),
            Line::from("Press Enter to start").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ]);

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            area,
        );
    }

    /// Renders the active gameplay screen
    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let area = frame.area();
        let snapshot = &view.snapshot;

        // Row 0 is the HUD, the last row the controls hint
        let field = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2),
        };
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let game_area = block.inner(field);
        frame.render_widget(block, field);

        let projection = Projection::new(game_area, snapshot.playfield);
        let buffer = frame.buffer_mut();

        // Twinkling background
        if snapshot.frame_count % 20 < 10 {
            let mut rng = rand::rng();
            for y in game_area.top()..game_area.bottom() {
                for x in game_area.left()..game_area.right() {
                    if rng.random_bool(0.01) {
                        buffer.set_string(x, y, ".", Style::default().fg(Color::DarkGray));
                    }
                }
            }
        }

        let mut draw = |x: f32, y: f32, text: &str, style: Style| {
            if let Some((cx, cy)) = projection.cell(x, y) {
                let half = (text.chars().count() / 2) as u16;
                let start = cx.saturating_sub(half).max(game_area.left());
                let max_width = game_area.right().saturating_sub(start) as usize;
                buffer.set_stringn(start, cy, text, max_width, style);
            }
        };

        for bunker in snapshot.bunkers {
            for block in bunker.intact() {
                let (x, y) = block.center();
                draw(x, y, BUNKER_GLYPH, Style::default().fg(Color::Green));
            }
        }

        let phase = snapshot.formation.animation_phase();
        for enemy in snapshot.formation.alive() {
            let rect = enemy.rect();
            draw(
                rect.x + rect.w / 2.0,
                rect.y + rect.h / 2.0,
                enemy_glyph(enemy.tier, phase),
                Style::default()
                    .fg(enemy_color(enemy.tier))
                    .add_modifier(Modifier::BOLD),
            );
        }

        if let Some(saucer) = snapshot.saucer {
            let (x, y) = saucer.rect().center();
            draw(
                x,
                y,
                SAUCER_GLYPH,
                Style::default()
                    .fg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD),
            );
        }

        for projectile in snapshot.projectiles.iter() {
            let rect = projectile.rect();
            let (glyph, color) = match projectile.owner {
                ProjectileOwner::Player => ("|", Color::Yellow),
                ProjectileOwner::Enemy => ("!", Color::LightRed),
            };
            draw(
                rect.x + rect.w / 2.0,
                rect.y + rect.h / 2.0,
                glyph,
                Style::default().fg(color),
            );
        }

        for explosion in snapshot.explosions {
            let progress = explosion.progress();
            let color = if progress < 0.5 {
                Color::Yellow
            } else {
                Color::LightRed
            };
            draw(
                explosion.x,
                explosion.y,
                explosion_glyph(progress),
                Style::default().fg(color),
            );
        }

        let player = snapshot.player;
        if player.is_visible(snapshot.frame_count) {
            let rect = player.rect();
            let color = if player.is_invulnerable() {
                Color::White
            } else {
                Color::Green
            };
            draw(
                rect.x + rect.w / 2.0,
                rect.y + rect.h / 2.0,
                PLAYER_GLYPH,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            );
        }

        self.render_hud(frame, view, area);

        // Controls hint at bottom
        let controls = Line::from(vec![Span::styled(
            "[A/D/Arrows: Move] [Space: Fire] [P: Pause] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);
        let controls_area = Rect {
            x: area.x + 1,
            y: area.y + area.height.saturating_sub(1),
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(controls).centered(), controls_area);
    }

    fn render_hud(&self, frame: &mut Frame, view: &RenderView, area: Rect) {
        let hud = view.snapshot.hud;
        let label = Style::default().fg(Color::DarkGray);
        let value = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);

        let bullets_color = if hud.bullets_remaining * 10 < hud.bullets_per_wave {
            Color::Red
        } else {
            Color::White
        };
        let high_score = view.high_score.unwrap_or(0).max(hud.score);

        let stats = Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(hud.score.to_string(), value(Color::Yellow)),
            Span::styled("  Lives: ", label),
            Span::styled(hud.lives.to_string(), value(Color::Green)),
            Span::styled("  Level: ", label),
            Span::styled(
                format!("{}/{}", hud.level, hud.max_level),
                value(Color::Cyan),
            ),
            Span::styled("  Bullets: ", label),
            Span::styled(hud.bullets_remaining.to_string(), value(bullets_color)),
            Span::styled("  Hi: ", label),
            Span::styled(high_score.to_string(), value(Color::Magenta)),
        ]);

        let stats_area = Rect {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(stats), stats_area);
    }

    /// Renders the frozen game dimmed, with the pause box on top
    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);

        let area = frame.area();
        frame
            .buffer_mut()
            .set_style(area, Style::default().add_modifier(Modifier::DIM));
        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        let width = area.width.min(30);
        let height = area.height.min(6);
        let pause_area = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, pause_area);
        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }

    /// Renders the game over and victory screens
    fn render_game_over(&self, frame: &mut Frame, view: &RenderView) {
        let area = frame.area();
        let snapshot = &view.snapshot;
        let (score, level) = snapshot
            .result
            .map_or((snapshot.hud.score, snapshot.hud.level), |r| (r.score, r.level));
        let won = snapshot.state == GameState::Won;

        let (banner, color) = if won {
            ("║      EARTH IS SAVED!      ║", Color::Green)
        } else {
            ("║        GAME OVER!         ║", Color::Red)
        };

        let mut lines = vec![
            Line::from(""),
            Line::from("╔═══════════════════════════╗")
                .centered()
                .fg(color),
            Line::from(banner).centered().fg(color).bold(),
            Line::from("╚═══════════════════════════╝")
                .centered()
                .fg(color),
            Line::from(""),
            Line::from(format!("Final Score: {score}"))
                .centered()
                .yellow()
                .bold(),
            Line::from(format!("Level Reached: {level}/{}", snapshot.hud.max_level))
                .centered()
                .cyan()
                .bold(),
        ];
        if let Some(rank) = view.rank {
            lines.push(
                Line::from(format!("New high score! Rank #{rank}"))
                    .centered()
                    .magenta()
                    .bold(),
            );
        }
        lines.extend([
            Line::from(""),
            Line::from("Press Enter to continue").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ]);

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            area,
        );
    }
}

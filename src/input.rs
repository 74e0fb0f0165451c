use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

use crate::game::InputFrame;

/// Without release events a key counts as held for this long after its last
/// press or auto-repeat
const HOLD_TIMEOUT: Duration = Duration::from_millis(150);

/// Represents semantic game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Fire,
    Pause,
    Confirm,
    /// Quit the program
    Cancel,
}

/// When each movement key was last pressed, if it is still down
#[derive(Debug, Default)]
struct KeyState {
    left: Option<Instant>,
    right: Option<Instant>,
    /// Last fire press, used to spot auto-repeat when there are no release
    /// events
    fire: Option<Instant>,
}

/// Manages input polling and translates raw key events into game actions
pub struct InputManager {
    key_state: KeyState,
    oneshot_actions: Vec<InputAction>,
    /// The terminal reports key releases (keyboard enhancement is active)
    reports_release: bool,
    quit: bool,
}

impl InputManager {
    pub fn new(reports_release: bool) -> Self {
        Self {
            key_state: KeyState::default(),
            oneshot_actions: Vec::new(),
            reports_release,
            quit: false,
        }
    }

    /// Drain all pending terminal events without blocking
    pub fn poll_events(&mut self) -> color_eyre::Result<()> {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_key_event(key_event, Instant::now());
            }
        }
        Ok(())
    }

    /// Processes a key event and updates key state and one-shot actions
    pub fn handle_key_event(&mut self, key_event: KeyEvent, now: Instant) {
        match key_event.kind {
            KeyEventKind::Press => self.handle_key_press(key_event, now),
            KeyEventKind::Repeat => self.handle_key_repeat(key_event.code, now),
            KeyEventKind::Release => self.handle_key_release(key_event.code),
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent, now: Instant) {
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Cancel);
            self.quit = true;
            return;
        }

        match key_event.code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                self.key_state.left = Some(now);
                self.key_state.right = None;
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                self.key_state.right = Some(now);
                self.key_state.left = None;
            }
            // Edge-triggered: holding the key does not auto-fire
            KeyCode::Char(' ') => {
                if !self.is_fire_repeat(now) {
                    self.oneshot_actions.push(InputAction::Fire);
                }
                self.key_state.fire = Some(now);
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.oneshot_actions.push(InputAction::Pause)
            }
            KeyCode::Enter => self.oneshot_actions.push(InputAction::Confirm),
            _ => {}
        }
    }

    /// Repeats keep movement alive but never fire
    fn handle_key_repeat(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                self.key_state.left = Some(now);
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                self.key_state.right = Some(now);
            }
            _ => {}
        }
    }

    fn handle_key_release(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                self.key_state.left = None;
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                self.key_state.right = None;
            }
            _ => {}
        }
    }

    /// Terminals without release events report auto-repeat as presses.
    /// A press that follows the previous one within the hold window is the
    /// key still being held.
    fn is_fire_repeat(&self, now: Instant) -> bool {
        !self.reports_release
            && self
                .key_state
                .fire
                .is_some_and(|at| now.duration_since(at) < HOLD_TIMEOUT)
    }

    fn is_held(&self, pressed: Option<Instant>, now: Instant) -> bool {
        match pressed {
            Some(at) => self.reports_release || now.duration_since(at) < HOLD_TIMEOUT,
            None => false,
        }
    }

    /// Actions active right now, one-shots first then held keys
    pub fn actions(&self, now: Instant) -> Vec<InputAction> {
        let mut actions = self.oneshot_actions.clone();
        if self.is_held(self.key_state.left, now) {
            actions.push(InputAction::MoveLeft);
        }
        if self.is_held(self.key_state.right, now) {
            actions.push(InputAction::MoveRight);
        }
        actions
    }

    /// Input for one simulation step. One-shot actions are consumed, so
    /// a single press reaches exactly one step.
    pub fn take_frame(&mut self, now: Instant) -> InputFrame {
        let actions = self.actions(now);
        self.oneshot_actions.clear();
        InputFrame {
            move_left: actions.contains(&InputAction::MoveLeft),
            move_right: actions.contains(&InputAction::MoveRight),
            fire: actions.contains(&InputAction::Fire),
            pause: actions.contains(&InputAction::Pause),
            confirm: actions.contains(&InputAction::Confirm),
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

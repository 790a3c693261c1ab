//! Discrete input events delivered to the coordinator
//!
//! Raw key codes never reach the game; they are mapped to these first.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A typed character
    Char(char),
    Backspace,
    /// Enter: select a menu entry or submit the input
    Confirm,
    /// Esc: pause, resume or go back one screen
    Back,
    /// Move a menu selection up (-1) or down (+1)
    Navigate(i32),
    Quit,
}

impl Action {
    /// Map a terminal key press to an action.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Up => Some(Action::Navigate(-1)),
            KeyCode::Down => Some(Action::Navigate(1)),
            KeyCode::Char(c) => Some(Action::Char(c)),
            _ => None,
        }
    }
}

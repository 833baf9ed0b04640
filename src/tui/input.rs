// Input interpretation for the viewer
//
// Terminals report single mouse presses only, so double-clicks are detected
// here from press timing. Keys typed while a line is being edited are mapped
// to edit buffer operations before any global shortcut sees them.

use crate::line::EditBuffer;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Position;
use std::time::{Duration, Instant};

/// Maximum gap between the two presses of a double-click
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// Pairs consecutive presses on the same cell into double-clicks
#[derive(Debug)]
pub struct ClickTracker {
    window: Duration,
    last: Option<(Position, Instant)>,
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Record a press; true when it completes a double-click
    ///
    /// A completed double-click resets the tracker, so a third press starts
    /// a new pair.
    pub fn press(&mut self, position: Position, at: Instant) -> bool {
        match self.last.take() {
            Some((previous, when))
                if previous == position && at.saturating_duration_since(when) <= self.window =>
            {
                true
            }
            _ => {
                self.last = Some((position, at));
                false
            }
        }
    }
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_WINDOW)
    }
}

/// Modifier that turns a double-click into a selection toggle
pub fn is_selection_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// A keystroke aimed at the line being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

impl EditKey {
    /// Map a key event; `None` for releases and keys editing ignores
    pub fn from_event(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let chord = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        Some(match key.code {
            KeyCode::Char(c) if !chord => Self::Insert(c),
            KeyCode::Enter => Self::Newline,
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Delete => Self::Delete,
            KeyCode::Left => Self::Left,
            KeyCode::Right => Self::Right,
            KeyCode::Home => Self::Home,
            KeyCode::End => Self::End,
            _ => return None,
        })
    }

    pub fn apply(self, buffer: &mut EditBuffer) {
        match self {
            Self::Insert(c) => buffer.insert_char(c),
            Self::Newline => buffer.insert_newline(),
            Self::Backspace => buffer.backspace(),
            Self::Delete => buffer.delete(),
            Self::Left => buffer.move_left(),
            Self::Right => buffer.move_right(),
            Self::Home => buffer.move_home(),
            Self::End => buffer.move_end(),
        }
    }
}

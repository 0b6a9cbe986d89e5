//! Raw key event to [`Command`] translation.
//!
//! UI adapters normalize their native key events into [`KeyPress`] and call
//! [`translate`]; everything downstream of that is framework-free. A `None`
//! translation means the key has no editing command bound and should keep its
//! default behavior.

use crate::{Axis, Command, Direction};
use bitflags::bitflags;

bitflags! {
    /// Active modifier keys. `META` is the platform command key; bindings
    /// below treat it as interchangeable with `CTRL`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL  = 1 << 1;
        const ALT   = 1 << 2;
        const META  = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Enter,
    Space,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: KeyCode,
    pub mods: Modifiers,
}

impl KeyPress {
    pub fn new(code: KeyCode, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    fn primary(&self) -> bool {
        self.mods.intersects(Modifiers::CTRL | Modifiers::META)
    }
}

/// Map one key press onto an editing command.
///
/// Bindings: Enter and Space bare; Tab and Shift+Tab for table navigation;
/// Ctrl/Cmd+B, I, K for bold, italic and link wrapping; Alt+Arrow moves the
/// table row or column under the caret; Alt+Shift+Down/Right inserts a row or
/// column and Alt+Shift+Up/Left deletes one.
pub fn translate(key: &KeyPress) -> Option<Command> {
    let shift = key.mods.contains(Modifiers::SHIFT);
    let alt = key.mods.contains(Modifiers::ALT);

    match key.code {
        KeyCode::Enter if key.mods.is_empty() => Some(Command::Enter),
        KeyCode::Space if key.mods.is_empty() => Some(Command::Space),
        KeyCode::Tab if (key.mods - Modifiers::SHIFT).is_empty() => {
            Some(Command::Tab { shift })
        }
        KeyCode::Char(c) if key.primary() && !alt => match c.to_ascii_lowercase() {
            'b' => Some(wrap("**", "**")),
            'i' => Some(wrap("*", "*")),
            'k' => Some(wrap("[", "](url)")),
            _ => None,
        },
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right if alt => {
            let (axis, direction) = match key.code {
                KeyCode::Up => (Axis::Row, Direction::Backward),
                KeyCode::Down => (Axis::Row, Direction::Forward),
                KeyCode::Left => (Axis::Column, Direction::Backward),
                _ => (Axis::Column, Direction::Forward),
            };
            if shift {
                match direction {
                    Direction::Forward => Some(Command::TableInsert { axis }),
                    Direction::Backward => Some(Command::TableDelete { axis }),
                }
            } else {
                Some(Command::TableMove { axis, direction })
            }
        }
        _ => None,
    }
}

fn wrap(prefix: &str, suffix: &str) -> Command {
    Command::Wrap {
        prefix: prefix.to_string(),
        suffix: suffix.to_string(),
    }
}

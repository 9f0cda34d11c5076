//! Keyboard shortcuts handled by the editor core.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// Maps a key press to a shortcut.
    ///
    /// `ctrl_or_cmd` is Ctrl on Linux/Windows and Cmd on macOS.
    pub fn from_key(key: &str, ctrl_or_cmd: bool, shift: bool) -> Option<Shortcut> {
        if !ctrl_or_cmd {
            return None;
        }
        match key {
            "z" | "Z" if shift => Some(Shortcut::Redo),
            "Z" => Some(Shortcut::Redo),
            "z" => Some(Shortcut::Undo),
            "y" | "Y" => Some(Shortcut::Redo),
            _ => None,
        }
    }
}

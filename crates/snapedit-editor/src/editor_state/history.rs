//! Undo, redo and their keyboard shortcuts.

use super::EditorState;
use crate::shortcuts::Shortcut;
use snapedit_core::Result;
use tracing::info;

impl EditorState {
    /// Records the current scene as a new history entry.
    pub fn commit_changes(&mut self) -> Result<bool> {
        self.ensure_no_overlay()?;
        self.history.push(&self.scene)
    }

    /// Restores the previous snapshot. Returns `false` at the bottom of the stack.
    pub fn undo(&mut self) -> Result<bool> {
        self.ensure_idle()?;
        if !self.history.can_undo() {
            return Ok(false);
        }
        self.leave_overlay_session();
        let undone = self.history.undo(&mut self.scene)?;
        if undone {
            info!("Undo to entry {:?}", self.history.index());
        }
        Ok(undone)
    }

    /// Restores the next snapshot. Returns `false` at the top of the stack.
    pub fn redo(&mut self) -> Result<bool> {
        self.ensure_idle()?;
        if !self.history.can_redo() {
            return Ok(false);
        }
        self.leave_overlay_session();
        let redone = self.history.redo(&mut self.scene)?;
        if redone {
            info!("Redo to entry {:?}", self.history.index());
        }
        Ok(redone)
    }

    /// Runs the action bound to a key press, if any.
    pub fn handle_shortcut(&mut self, key: &str, ctrl_or_cmd: bool, shift: bool) -> Result<bool> {
        match Shortcut::from_key(key, ctrl_or_cmd, shift) {
            Some(Shortcut::Undo) => self.undo(),
            Some(Shortcut::Redo) => self.redo(),
            None => Ok(false),
        }
    }
}

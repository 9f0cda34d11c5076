//! Undo/redo over whole-scene snapshots.
//!
//! The manager keeps a bounded stack of [`Snapshot`]s and a cursor. The
//! snapshot at the cursor mirrors what is on the canvas; entries after it can
//! be redone. Identical consecutive snapshots are kept as separate entries.
//!
//! Restoration may be asynchronous on some canvases, so it is split into
//! [`UndoRedoManager::begin_undo`]/[`UndoRedoManager::begin_redo`] and
//! [`UndoRedoManager::finish_restore`]. Pushes that arrive in between (a
//! canvas reporting the objects it is re-adding, for example) are dropped.

use crate::scene::CanvasFacade;
use crate::snapshot::Snapshot;
use snapedit_core::{AppEvent, EventBus, HistoryEvent, Result};
use std::sync::Arc;
use tracing::debug;

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Bounded snapshot stack with a cursor.
#[derive(Debug)]
pub struct UndoRedoManager {
    stack: Vec<Snapshot>,
    index: Option<usize>,
    limit: usize,
    restoring: bool,
    events: Option<Arc<EventBus>>,
}

impl UndoRedoManager {
    pub fn new(limit: usize) -> Self {
        Self {
            stack: Vec::new(),
            index: None,
            limit: limit.max(1),
            restoring: false,
            events: None,
        }
    }

    /// Publishes availability changes on `bus`.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Captures `canvas` and pushes it. Returns `false` when the push was
    /// suppressed by an in-flight restore.
    pub fn push<C: CanvasFacade + ?Sized>(&mut self, canvas: &C) -> Result<bool> {
        if self.restoring {
            debug!("History push ignored during restore");
            return Ok(false);
        }
        let snapshot = canvas.snapshot()?;
        Ok(self.push_snapshot(snapshot))
    }

    /// Pushes an already captured snapshot.
    pub fn push_snapshot(&mut self, snapshot: Snapshot) -> bool {
        if self.restoring {
            debug!("History push ignored during restore");
            return false;
        }

        if let Some(index) = self.index {
            self.stack.truncate(index + 1);
        }
        self.stack.push(snapshot);

        if self.stack.len() > self.limit {
            self.stack.remove(0);
            self.index = Some(self.limit - 1);
        } else {
            self.index = Some(self.index.map_or(0, |i| i + 1));
        }

        debug!(
            "History push: {} entries, cursor {:?}",
            self.stack.len(),
            self.index
        );
        self.publish_changed();
        true
    }

    /// Steps back and restores the previous snapshot. No-op at the bottom.
    pub fn undo<C: CanvasFacade + ?Sized>(&mut self, canvas: &mut C) -> Result<bool> {
        match self.begin_undo() {
            Some(snapshot) => self.complete(canvas, &snapshot, 1).map(|_| true),
            None => Ok(false),
        }
    }

    /// Steps forward and restores the next snapshot. No-op at the top.
    pub fn redo<C: CanvasFacade + ?Sized>(&mut self, canvas: &mut C) -> Result<bool> {
        match self.begin_redo() {
            Some(snapshot) => self.complete(canvas, &snapshot, -1).map(|_| true),
            None => Ok(false),
        }
    }

    fn complete<C: CanvasFacade + ?Sized>(
        &mut self,
        canvas: &mut C,
        snapshot: &Snapshot,
        rollback: isize,
    ) -> Result<()> {
        if let Err(e) = canvas.restore(snapshot) {
            // The canvas still shows the old state; move the cursor back to it.
            self.index = self
                .index
                .map(|i| (i as isize + rollback).max(0) as usize);
            self.restoring = false;
            return Err(e.into());
        }
        self.finish_restore();
        Ok(())
    }

    /// First half of an asynchronous undo: moves the cursor, raises the
    /// restoring flag and hands out the snapshot to load.
    pub fn begin_undo(&mut self) -> Option<Snapshot> {
        if self.restoring || !self.can_undo() {
            return None;
        }
        let index = self.index? - 1;
        self.begin_restore(index)
    }

    /// First half of an asynchronous redo.
    pub fn begin_redo(&mut self) -> Option<Snapshot> {
        if self.restoring || !self.can_redo() {
            return None;
        }
        let index = self.index? + 1;
        self.begin_restore(index)
    }

    fn begin_restore(&mut self, index: usize) -> Option<Snapshot> {
        let snapshot = self.stack.get(index)?.clone();
        self.index = Some(index);
        self.restoring = true;
        self.publish(HistoryEvent::RestoreStarted { index });
        Some(snapshot)
    }

    /// Second half of an asynchronous restore: lowers the flag.
    pub fn finish_restore(&mut self) {
        if !self.restoring {
            return;
        }
        self.restoring = false;
        if let Some(index) = self.index {
            self.publish(HistoryEvent::RestoreFinished { index });
        }
        self.publish_changed();
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.index = None;
        self.restoring = false;
        self.publish(HistoryEvent::Cleared);
        self.publish_changed();
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.index {
            Some(i) => i + 1 < self.stack.len(),
            None => false,
        }
    }

    /// Number of steps `undo` can take.
    pub fn undo_depth(&self) -> usize {
        self.index.unwrap_or(0)
    }

    /// Number of steps `redo` can take.
    pub fn redo_depth(&self) -> usize {
        self.index
            .map_or(0, |i| self.stack.len().saturating_sub(i + 1))
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> Option<&Snapshot> {
        self.index.and_then(|i| self.stack.get(i))
    }

    fn publish_changed(&self) {
        self.publish(HistoryEvent::Changed {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            depth: self.stack.len(),
        });
    }

    fn publish(&self, event: HistoryEvent) {
        if let Some(bus) = &self.events {
            bus.publish(AppEvent::History(event));
        }
    }
}

impl Default for UndoRedoManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

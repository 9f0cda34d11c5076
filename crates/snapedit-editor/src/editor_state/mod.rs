//! Editor state: the scene, its history and the active tool, coordinated.
//!
//! All mutations that users can undo go through [`EditorState`]. It owns the
//! tool state machine, decides when snapshots are pushed, and sequences the
//! asynchronous segmentation requests made by the composite tools.

mod annotations;
mod composite;
mod crop;
mod history;
mod io;
mod tools;
mod transforms;

pub use annotations::{MAX_FONT_SIZE, MIN_FONT_SIZE};
pub use composite::CompositeStep;
pub use io::{slice_regions, SliceArchive};

use crate::history::UndoRedoManager;
use crate::raster::RasterImage;
use crate::scene::Scene;
use crate::tools::{AiBackgroundParams, IdPhotoParams, Tool, ToolSession};
use snapedit_core::{AppEvent, EventBus, NoticeLevel, Result, SessionError};
use snapedit_settings::Config;
use std::sync::Arc;

/// Which composite a segmentation result is for.
#[derive(Debug, Clone)]
enum SegmentationRequest {
    AiBackground(AiBackgroundParams),
    IdPhoto(IdPhotoParams),
}

#[derive(Debug)]
struct PendingSegmentation {
    ticket: u64,
    request: SegmentationRequest,
    source: RasterImage,
}

/// Editor state for UI and CLI integration
pub struct EditorState {
    scene: Scene,
    history: UndoRedoManager,
    tool: Tool,
    session: ToolSession,
    config: Config,
    events: Arc<EventBus>,
    pending: Option<PendingSegmentation>,
    next_ticket: u64,
}

impl EditorState {
    /// Creates an editor publishing on a private event bus.
    pub fn new(config: Config) -> Self {
        Self::with_event_bus(config, Arc::new(EventBus::default()))
    }

    pub fn with_event_bus(config: Config, events: Arc<EventBus>) -> Self {
        let history = UndoRedoManager::new(config.history.limit).with_events(events.clone());
        Self {
            scene: Scene::new(),
            history,
            tool: Tool::Select,
            session: ToolSession::Select,
            config,
            events,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &UndoRedoManager {
        &self.history
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn session(&self) -> &ToolSession {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn has_image(&self) -> bool {
        self.scene.base_image().is_some()
    }

    /// True while a segmentation request is awaiting its result.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.events.publish(AppEvent::notice(level, message));
    }

    fn require_image(&self) -> Result<()> {
        if self.has_image() {
            Ok(())
        } else {
            Err(SessionError::precondition("Import an image first").into())
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.pending {
            Some(pending) => Err(SessionError::Busy {
                operation: format!("segmentation #{}", pending.ticket),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Whole-canvas edits are refused while the crop overlay is up.
    fn ensure_no_overlay(&self) -> Result<()> {
        if self.session.owns_scaffolding() {
            return Err(SessionError::precondition("Apply or cancel the crop first").into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorState")
            .field("tool", &self.tool)
            .field("objects", &self.scene.len())
            .field("history", &self.history.len())
            .field("busy", &self.is_busy())
            .finish()
    }
}

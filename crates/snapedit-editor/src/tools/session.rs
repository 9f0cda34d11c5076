//! Transient per-activation tool state.

use super::{AiBackgroundSession, CropSession, FreehandSession, IdPhotoSession, Tool};
use crate::scene::{CanvasFacade, ObjectId, Scene};

/// Interactivity flags of an object before a session changed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractivityRecord {
    pub id: ObjectId,
    pub selectable: bool,
    pub evented: bool,
}

/// Locks every object not listed in `keep` and records the ones that changed.
pub(crate) fn lock_objects(scene: &mut Scene, keep: &[ObjectId]) -> Vec<InteractivityRecord> {
    let mut records = Vec::new();
    let ids: Vec<ObjectId> = scene
        .objects()
        .iter()
        .filter(|o| !keep.contains(&o.id) && !o.is_locked())
        .map(|o| o.id)
        .collect();
    for id in ids {
        if let Some(obj) = scene.get_mut(id) {
            records.push(InteractivityRecord {
                id,
                selectable: obj.selectable,
                evented: obj.evented,
            });
            obj.selectable = false;
            obj.evented = false;
        }
    }
    records
}

/// Puts recorded flags back on the objects that still exist.
pub(crate) fn restore_interactivity(scene: &mut Scene, records: &[InteractivityRecord]) {
    for record in records {
        if let Some(obj) = scene.get_mut(record.id) {
            obj.selectable = record.selectable;
            obj.evented = record.evented;
        }
    }
}

/// State owned by the active tool
#[derive(Debug, Default)]
pub enum ToolSession {
    #[default]
    Select,
    Crop(CropSession),
    Freehand(FreehandSession),
    AiBackground(AiBackgroundSession),
    IdPhoto(IdPhotoSession),
    /// Tools without transient state (grid slice, rotate, text, ...).
    Panel(Tool),
}

impl ToolSession {
    pub fn name(&self) -> &'static str {
        match self {
            ToolSession::Select => "select",
            ToolSession::Crop(_) => "crop",
            ToolSession::Freehand(_) => "freehand",
            ToolSession::AiBackground(_) => "ai-background",
            ToolSession::IdPhoto(_) => "id-photo",
            ToolSession::Panel(tool) => tool.as_str(),
        }
    }

    /// True when the session has objects of its own on the canvas.
    pub fn owns_scaffolding(&self) -> bool {
        matches!(self, ToolSession::Crop(_))
    }

    /// Removes the session's transient objects and undoes its flag changes.
    pub fn teardown(self, scene: &mut Scene) {
        match self {
            ToolSession::Crop(crop) => crop.teardown(scene),
            ToolSession::Freehand(freehand) => {
                if freehand.is_drawing() {
                    tracing::debug!("Discarding unfinished stroke");
                }
            }
            ToolSession::Select
            | ToolSession::AiBackground(_)
            | ToolSession::IdPhoto(_)
            | ToolSession::Panel(_) => {}
        }
    }
}

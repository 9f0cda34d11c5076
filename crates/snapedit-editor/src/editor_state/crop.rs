//! Crop frame editing and commit.

use super::EditorState;
use crate::scene::{CanvasFacade, SceneObject};
use crate::tools::{CropRatio, CropSession, FrameEdit, Tool, ToolSession};
use snapedit_core::{AppEvent, Rect, Result, SessionError, SessionEvent};
use tracing::info;

impl EditorState {
    fn crop_session_mut(&mut self) -> Result<&mut CropSession> {
        match &mut self.session {
            ToolSession::Crop(crop) => Ok(crop),
            _ => Err(SessionError::precondition("The crop tool is not active").into()),
        }
    }

    /// Current crop frame, if the crop tool is active.
    pub fn crop_frame(&self) -> Option<Rect> {
        match &self.session {
            ToolSession::Crop(crop) => Some(crop.frame()),
            _ => None,
        }
    }

    pub fn move_crop_frame(&mut self, left: f64, top: f64) -> Result<Rect> {
        self.edit_crop_frame(FrameEdit::Move { left, top })
    }

    pub fn resize_crop_frame(&mut self, frame: Rect) -> Result<Rect> {
        self.edit_crop_frame(FrameEdit::Resize(frame))
    }

    pub fn edit_crop_frame(&mut self, edit: FrameEdit) -> Result<Rect> {
        let EditorState { scene, session, .. } = self;
        match session {
            ToolSession::Crop(crop) => Ok(crop.edit_frame(scene, edit)),
            _ => Err(SessionError::precondition("The crop tool is not active").into()),
        }
    }

    /// Locks the frame's aspect ratio; the current width is kept.
    pub fn set_crop_ratio(&mut self, ratio: CropRatio) -> Result<Rect> {
        let EditorState { scene, session, .. } = self;
        match session {
            ToolSession::Crop(crop) => Ok(crop.set_ratio(scene, ratio)),
            _ => Err(SessionError::precondition("The crop tool is not active").into()),
        }
    }

    /// Cuts the canvas down to the crop frame and returns to `Select`.
    pub fn apply_crop(&mut self) -> Result<Rect> {
        let frame = self.crop_session_mut()?.frame();

        let previous = self.tool;
        std::mem::take(&mut self.session).teardown(&mut self.scene);
        self.tool = Tool::Select;
        self.publish_activated(previous);

        let cropped = self.scene.rasterize(frame)?;
        let (width, height) = (cropped.width(), cropped.height());
        self.scene.clear();
        self.scene.set_dimensions(width as f64, height as f64);
        let id = self.scene.add(SceneObject::image(cropped).at(0.0, 0.0));
        self.scene.set_active(Some(id));
        self.history.push(&self.scene)?;

        info!("Cropped to {}x{}", width, height);
        self.events
            .publish(AppEvent::Session(SessionEvent::CropCommitted { width, height }));
        Ok(frame)
    }

    /// Leaves the crop tool without changing the image.
    pub fn cancel_crop(&mut self) -> Result<()> {
        self.crop_session_mut()?;
        self.leave_overlay_session();
        Ok(())
    }
}

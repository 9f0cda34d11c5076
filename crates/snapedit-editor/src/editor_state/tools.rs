//! Tool activation and the flatten-on-exit rule.

use super::EditorState;
use crate::tools::flatten::{flatten, LayerLayout};
use crate::tools::{
    AiBackgroundSession, CropSession, FreehandSession, IdPhotoSession, Tool, ToolSession,
};
use snapedit_core::{AppEvent, NoticeLevel, Result, SessionError, SessionEvent, ToolEvent};
use tracing::{debug, info, warn};

impl EditorState {
    /// Switches to `tool`.
    ///
    /// Leaving a composite tool flattens its layers first. The outgoing
    /// session is torn down before the incoming one is built; if building
    /// fails the editor ends up in `Select`.
    pub fn activate(&mut self, tool: Tool) -> Result<()> {
        self.ensure_idle()?;

        if tool.requires_image() && !self.has_image() {
            let reason = "Import an image first";
            warn!("Rejected tool {}: no image loaded", tool);
            self.notify(NoticeLevel::Warning, reason);
            self.events.publish(AppEvent::Tool(ToolEvent::Rejected {
                tool: tool.to_string(),
                reason: reason.to_string(),
            }));
            return Err(SessionError::precondition(reason).into());
        }

        let previous = self.tool;
        if previous.is_layered() {
            self.flatten_layers(previous)?;
        }

        std::mem::take(&mut self.session).teardown(&mut self.scene);
        self.tool = tool;

        match self.enter_session(tool) {
            Ok(session) => self.session = session,
            Err(e) => {
                warn!("Failed to enter {}: {}", tool, e);
                self.tool = Tool::Select;
                self.session = ToolSession::Select;
                self.publish_activated(previous);
                return Err(e);
            }
        }

        info!("Activated tool {} (was {})", tool, previous);
        self.publish_activated(previous);
        Ok(())
    }

    pub(super) fn publish_activated(&self, previous: Tool) {
        self.events.publish(AppEvent::Tool(ToolEvent::Activated {
            tool: self.tool.to_string(),
            previous: previous.to_string(),
        }));
    }

    fn enter_session(&mut self, tool: Tool) -> Result<ToolSession> {
        let session = match tool {
            Tool::Select => ToolSession::Select,
            Tool::Crop => ToolSession::Crop(CropSession::enter(&mut self.scene, &self.config.crop)?),
            Tool::Mosaic => ToolSession::Freehand(FreehandSession::new(&self.config.mosaic)),
            Tool::AiBackground => ToolSession::AiBackground(AiBackgroundSession::new()),
            Tool::IdPhoto => ToolSession::IdPhoto(IdPhotoSession::new()),
            Tool::Text => {
                self.add_text()?;
                ToolSession::Panel(tool)
            }
            Tool::Shape(kind) => {
                self.add_shape(kind)?;
                ToolSession::Panel(tool)
            }
            Tool::GridSlice | Tool::Rotate | Tool::Resize | Tool::Filter | Tool::Watermark => {
                ToolSession::Panel(tool)
            }
        };
        Ok(session)
    }

    /// Merges the composite left by `tool` into one image and records it.
    ///
    /// Returns `false` when the canvas no longer has the composite's layout.
    fn flatten_layers(&mut self, tool: Tool) -> Result<bool> {
        let Some(layout) = LayerLayout::for_tool(tool) else {
            return Ok(false);
        };
        if let Err(e) = layout.check(&self.scene) {
            debug!("Skipping flatten for {}: {}", tool, e);
            self.events.publish(AppEvent::Session(SessionEvent::FlattenSkipped {
                tool: tool.to_string(),
                reason: e.to_string(),
            }));
            return Ok(false);
        }

        flatten(&mut self.scene)?;
        self.history.push(&self.scene)?;
        info!("Flattened {} layers", tool);
        self.events.publish(AppEvent::Session(SessionEvent::Flattened {
            tool: tool.to_string(),
        }));
        Ok(true)
    }

    /// Drops a session that has overlay objects and returns to `Select`.
    pub(super) fn leave_overlay_session(&mut self) {
        if !self.session.owns_scaffolding() {
            return;
        }
        let previous = self.tool;
        std::mem::take(&mut self.session).teardown(&mut self.scene);
        self.tool = Tool::Select;
        self.publish_activated(previous);
    }

    /// Leaves any tool without flattening; used when the scene is replaced.
    pub(super) fn drop_session(&mut self) {
        let previous = self.tool;
        std::mem::take(&mut self.session).teardown(&mut self.scene);
        self.tool = Tool::Select;
        if previous != Tool::Select {
            self.publish_activated(previous);
        }
    }
}

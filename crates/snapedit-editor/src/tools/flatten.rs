//! Merging a layered composite back into one raster.

use super::Tool;
use crate::scene::{CanvasFacade, ObjectKind, Scene, SceneObject};
use snapedit_core::{SceneError, SessionError};

/// The two-layer arrangement a composite tool leaves on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerLayout {
    /// Locked background image under an interactive cut-out image.
    AiComposite,
    /// Locked backing rectangle under an interactive cut-out image.
    IdPhotoComposite,
}

impl LayerLayout {
    pub fn for_tool(tool: Tool) -> Option<Self> {
        match tool {
            Tool::AiBackground => Some(LayerLayout::AiComposite),
            Tool::IdPhoto => Some(LayerLayout::IdPhotoComposite),
            _ => None,
        }
    }

    /// Checks that the user content is exactly this layout.
    pub fn check(&self, scene: &Scene) -> Result<(), SessionError> {
        let layers: Vec<&SceneObject> = scene.user_objects().collect();
        let [bottom, top] = layers.as_slice() else {
            return Err(self.mismatch(format!("{} user objects", layers.len())));
        };

        let bottom_ok = match self {
            LayerLayout::AiComposite => bottom.is_image(),
            LayerLayout::IdPhotoComposite => matches!(bottom.kind, ObjectKind::Rect { .. }),
        };
        if !bottom_ok {
            return Err(self.mismatch(format!("bottom layer is a {}", bottom.kind.type_name())));
        }
        if !top.is_image() {
            return Err(self.mismatch(format!("top layer is a {}", top.kind.type_name())));
        }
        if !bottom.is_locked() {
            return Err(self.mismatch("bottom layer is interactive".to_string()));
        }
        if !top.is_interactive() {
            return Err(self.mismatch("top layer is locked".to_string()));
        }
        Ok(())
    }

    fn mismatch(&self, found: String) -> SessionError {
        let expected = match self {
            LayerLayout::AiComposite => "locked background image + interactive foreground image",
            LayerLayout::IdPhotoComposite => "locked backing rect + interactive foreground image",
        };
        SessionError::InvariantMismatch {
            expected: format!("{} (found {})", expected, found),
        }
    }
}

/// Replaces the canvas content with one raster of itself.
///
/// Canvas dimensions are kept; the merged image is placed at the origin.
pub fn flatten(scene: &mut Scene) -> Result<(), SceneError> {
    let merged = scene.rasterize_canvas()?;
    scene.clear();
    let id = scene.add(SceneObject::image(merged).at(0.0, 0.0));
    scene.set_active(Some(id));
    Ok(())
}

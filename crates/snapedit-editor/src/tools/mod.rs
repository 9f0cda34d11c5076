//! Editing tools and their per-activation sessions.
//!
//! Exactly one [`Tool`] is active at a time. Switching is done through
//! `EditorState::activate`, which tears down the outgoing [`ToolSession`]
//! and builds the incoming one.

pub mod ai_background;
pub mod composite;
pub mod crop;
pub mod flatten;
pub mod freehand;
pub mod id_photo;
pub mod session;
pub mod templates;

pub use ai_background::{AiBackgroundParams, AiBackgroundSession, BackgroundFill};
pub use composite::{clamp_user_scale, MAX_USER_SCALE, MIN_USER_SCALE};
pub use crop::{CropRatio, CropSession, FrameEdit};
pub use flatten::LayerLayout;
pub use freehand::FreehandSession;
pub use id_photo::{IdPhotoParams, IdPhotoSession, Placement};
pub use session::{InteractivityRecord, ToolSession};
pub use templates::PhotoTemplate;

use serde::{Deserialize, Serialize};
use snapedit_core::SessionError;
use std::fmt;
use std::str::FromStr;

/// Annotation shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rect,
    Circle,
    Arrow,
}

/// Editor tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Select,
    Crop,
    Mosaic,
    GridSlice,
    Text,
    Rotate,
    Resize,
    Filter,
    Watermark,
    Shape(ShapeKind),
    AiBackground,
    IdPhoto,
}

impl Tool {
    pub const ALL: [Tool; 14] = [
        Tool::Select,
        Tool::Crop,
        Tool::Mosaic,
        Tool::GridSlice,
        Tool::Text,
        Tool::Rotate,
        Tool::Resize,
        Tool::Filter,
        Tool::Watermark,
        Tool::Shape(ShapeKind::Rect),
        Tool::Shape(ShapeKind::Circle),
        Tool::Shape(ShapeKind::Arrow),
        Tool::AiBackground,
        Tool::IdPhoto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Crop => "crop",
            Tool::Mosaic => "mosaic",
            Tool::GridSlice => "grid-slice",
            Tool::Text => "text",
            Tool::Rotate => "rotate",
            Tool::Resize => "resize",
            Tool::Filter => "filter",
            Tool::Watermark => "image-watermark",
            Tool::Shape(ShapeKind::Rect) => "rect",
            Tool::Shape(ShapeKind::Circle) => "circle",
            Tool::Shape(ShapeKind::Arrow) => "arrow",
            Tool::AiBackground => "ai-background",
            Tool::IdPhoto => "id-photo",
        }
    }

    /// Tools whose result is a stack of layers merged when the tool is left.
    pub fn is_layered(&self) -> bool {
        matches!(self, Tool::AiBackground | Tool::IdPhoto)
    }

    /// Every tool but `Select` needs an image on the canvas.
    pub fn requires_image(&self) -> bool {
        !matches!(self, Tool::Select)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Tool::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| SessionError::invalid("tool", format!("unknown tool '{}'", s)))
    }
}

//! Crop overlay: a movable frame over the base image, four dimming bands
//! around it and a live size label.

use super::session::{lock_objects, restore_interactivity, InteractivityRecord};
use crate::scene::{CanvasFacade, ObjectId, ObjectKind, Scene, SceneObject, StrokeStyle, TextAnchor};
use snapedit_core::{Color, Rect, SessionError};
use snapedit_settings::CropSettings;
use std::fmt;
use std::str::FromStr;

const LABEL_FONT_SIZE: f64 = 14.0;
const FRAME_STROKE_WIDTH: f64 = 2.0;
const MIN_FRAME_SIZE: f64 = 1.0;

/// Aspect ratio lock for the crop frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropRatio {
    #[default]
    Free,
    Fixed { width: u32, height: u32 },
}

impl CropRatio {
    pub const SQUARE: CropRatio = CropRatio::Fixed { width: 1, height: 1 };
    pub const STANDARD: CropRatio = CropRatio::Fixed { width: 4, height: 3 };
    pub const WIDE: CropRatio = CropRatio::Fixed { width: 16, height: 9 };

    /// Height matching `width` under this ratio; `None` when unlocked.
    pub fn height_for(&self, width: f64) -> Option<f64> {
        match self {
            CropRatio::Free => None,
            CropRatio::Fixed { width: rw, height: rh } => Some(width * *rh as f64 / *rw as f64),
        }
    }
}

impl FromStr for CropRatio {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("free") {
            return Ok(CropRatio::Free);
        }
        let invalid = || SessionError::invalid("ratio", format!("expected W:H or free, got '{}'", s));
        let (w, h) = s.split_once(':').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(CropRatio::Fixed { width, height })
    }
}

impl fmt::Display for CropRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropRatio::Free => f.write_str("free"),
            CropRatio::Fixed { width, height } => write!(f, "{}:{}", width, height),
        }
    }
}

/// A user manipulation of the crop frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEdit {
    /// Drag: size is kept, position is clamped inside the image.
    Move { left: f64, top: f64 },
    /// Handle drag: the new rectangle is trimmed to the image.
    Resize(Rect),
}

/// Keeps the frame's size and pulls it back inside `bounds`.
pub fn clamp_position(frame: Rect, bounds: Rect) -> Rect {
    let mut left = frame.left.max(bounds.left);
    let mut top = frame.top.max(bounds.top);
    if left + frame.width > bounds.right() {
        left = bounds.right() - frame.width;
    }
    if top + frame.height > bounds.bottom() {
        top = bounds.bottom() - frame.height;
    }
    Rect::new(left, top, frame.width, frame.height)
}

/// Trims the frame to `bounds`: origin first, then the far edges.
pub fn clamp_resize(frame: Rect, bounds: Rect) -> Rect {
    let left = frame.left.max(bounds.left).min(bounds.right() - MIN_FRAME_SIZE);
    let top = frame.top.max(bounds.top).min(bounds.bottom() - MIN_FRAME_SIZE);
    let width = frame.width.min(bounds.right() - left).max(MIN_FRAME_SIZE);
    let height = frame.height.min(bounds.bottom() - top).max(MIN_FRAME_SIZE);
    Rect::new(left, top, width, height)
}

/// The four dimming bands around `frame`: top, bottom, left, right.
///
/// Top and bottom span the image width; left and right span the frame height.
pub fn overlay_bands(image: Rect, frame: Rect) -> [Rect; 4] {
    [
        Rect::new(image.left, image.top, image.width, (frame.top - image.top).max(0.0)),
        Rect::new(
            image.left,
            frame.bottom(),
            image.width,
            (image.bottom() - frame.bottom()).max(0.0),
        ),
        Rect::new(image.left, frame.top, (frame.left - image.left).max(0.0), frame.height),
        Rect::new(
            frame.right(),
            frame.top,
            (image.right() - frame.right()).max(0.0),
            frame.height,
        ),
    ]
}

/// `"W x H"` with both sides rounded to whole pixels.
pub fn size_label(frame: Rect) -> String {
    format!(
        "{} x {}",
        frame.width.round() as i64,
        frame.height.round() as i64
    )
}

/// Live crop state
#[derive(Debug)]
pub struct CropSession {
    image_bounds: Rect,
    frame: Rect,
    frame_id: ObjectId,
    overlay_ids: [ObjectId; 4],
    label_id: ObjectId,
    label_offset: f64,
    locks: Vec<InteractivityRecord>,
}

impl CropSession {
    /// Locks the canvas and lays the overlay over the base image.
    pub fn enter(scene: &mut Scene, settings: &CropSettings) -> Result<Self, SessionError> {
        let image_bounds = scene
            .base_image()
            .map(|img| img.bounds())
            .ok_or_else(|| SessionError::precondition("Import an image first"))?;
        if !image_bounds.is_valid() {
            return Err(SessionError::precondition("The image has no visible area"));
        }

        let locks = lock_objects(scene, &[]);
        let frame = image_bounds.scaled_about_center(settings.initial_fraction);

        let overlay_ids = overlay_bands(image_bounds, frame).map(|band| {
            scene.add(
                SceneObject::new(ObjectKind::Rect {
                    width: band.width,
                    height: band.height,
                    fill: settings.overlay_color,
                    stroke: None,
                })
                .at(band.left, band.top)
                .locked()
                .scaffolding(),
            )
        });

        let frame_id = scene.add(
            SceneObject::new(ObjectKind::Rect {
                width: frame.width,
                height: frame.height,
                fill: Color::TRANSPARENT,
                stroke: Some(StrokeStyle::new(Color::WHITE, FRAME_STROKE_WIDTH)),
            })
            .at(frame.left, frame.top)
            .scaffolding(),
        );

        let label_id = scene.add(
            SceneObject::new(ObjectKind::Text {
                text: size_label(frame),
                font_size: LABEL_FONT_SIZE,
                font_family: "Arial".to_string(),
                fill: Color::WHITE,
                background: Some(Color::BLACK.with_alpha(0.7)),
                anchor: TextAnchor::Middle,
            })
            .at(
                frame.left + frame.width / 2.0,
                frame.bottom() + settings.label_offset,
            )
            .locked()
            .scaffolding(),
        );

        scene.set_active(Some(frame_id));
        tracing::debug!(
            "Crop frame {:.0}x{:.0} at ({:.0}, {:.0})",
            frame.width,
            frame.height,
            frame.left,
            frame.top
        );

        Ok(Self {
            image_bounds,
            frame,
            frame_id,
            overlay_ids,
            label_id,
            label_offset: settings.label_offset,
            locks,
        })
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn image_bounds(&self) -> Rect {
        self.image_bounds
    }

    pub fn frame_id(&self) -> ObjectId {
        self.frame_id
    }

    pub fn overlays(&self) -> [Rect; 4] {
        overlay_bands(self.image_bounds, self.frame)
    }

    pub fn label(&self) -> String {
        size_label(self.frame)
    }

    /// Ids of every object the session placed on the canvas.
    pub fn scaffolding_ids(&self) -> Vec<ObjectId> {
        let mut ids = self.overlay_ids.to_vec();
        ids.push(self.frame_id);
        ids.push(self.label_id);
        ids
    }

    pub fn locks(&self) -> &[InteractivityRecord] {
        &self.locks
    }

    /// Applies a frame edit, clamps it and refreshes the overlay.
    pub fn edit_frame(&mut self, scene: &mut Scene, edit: FrameEdit) -> Rect {
        self.frame = match edit {
            FrameEdit::Move { left, top } => clamp_position(
                Rect::new(left, top, self.frame.width, self.frame.height),
                self.image_bounds,
            ),
            FrameEdit::Resize(rect) => clamp_resize(rect, self.image_bounds),
        };
        self.sync(scene);
        self.frame
    }

    /// Locks the frame to `ratio`, keeping its width where the image allows.
    pub fn set_ratio(&mut self, scene: &mut Scene, ratio: CropRatio) -> Rect {
        let Some(mut height) = ratio.height_for(self.frame.width) else {
            return self.frame;
        };
        let mut width = self.frame.width;
        if height > self.image_bounds.height {
            height = self.image_bounds.height;
            width = match ratio {
                CropRatio::Fixed { width: rw, height: rh } => height * rw as f64 / rh as f64,
                CropRatio::Free => width,
            };
        }
        self.frame = clamp_position(
            Rect::new(self.frame.left, self.frame.top, width, height),
            self.image_bounds,
        );
        self.sync(scene);
        self.frame
    }

    fn sync(&self, scene: &mut Scene) {
        let frame = self.frame;
        if let Some(obj) = scene.get_mut(self.frame_id) {
            obj.left = frame.left;
            obj.top = frame.top;
            obj.scale_x = 1.0;
            obj.scale_y = 1.0;
            if let ObjectKind::Rect { width, height, .. } = &mut obj.kind {
                *width = frame.width;
                *height = frame.height;
            }
        }

        for (id, band) in self.overlay_ids.iter().zip(overlay_bands(self.image_bounds, frame)) {
            if let Some(obj) = scene.get_mut(*id) {
                obj.left = band.left;
                obj.top = band.top;
                if let ObjectKind::Rect { width, height, .. } = &mut obj.kind {
                    *width = band.width;
                    *height = band.height;
                }
            }
        }

        if let Some(obj) = scene.get_mut(self.label_id) {
            obj.left = frame.left + frame.width / 2.0;
            obj.top = frame.bottom() + self.label_offset;
            if let ObjectKind::Text { text, .. } = &mut obj.kind {
                *text = size_label(frame);
            }
        }
    }

    pub(crate) fn teardown(self, scene: &mut Scene) {
        for id in self.scaffolding_ids() {
            scene.remove(id);
        }
        restore_interactivity(scene, &self.locks);
    }
}

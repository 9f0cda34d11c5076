//! Text, shapes, watermarks and mosaic strokes.

use super::EditorState;
use crate::raster::RasterImage;
use crate::scene::{CanvasFacade, ObjectId, ObjectKind, SceneObject, StrokeStyle};
use crate::tools::{FreehandSession, ShapeKind, ToolSession};
use snapedit_core::{Color, Point, Result, SceneError, SessionError};
use tracing::{debug, info};

pub const MIN_FONT_SIZE: f64 = 12.0;
pub const MAX_FONT_SIZE: f64 = 120.0;

const ANNOTATION_ORIGIN: (f64, f64) = (100.0, 100.0);
const SHAPE_STROKE: StrokeStyle = StrokeStyle {
    color: Color::RED,
    width: 4.0,
};
const WATERMARK_SCALE: f64 = 0.2;

impl EditorState {
    fn add_user_object(&mut self, object: SceneObject) -> Result<ObjectId> {
        let kind = object.kind.type_name();
        let id = self.scene.add(object);
        self.scene.set_active(Some(id));
        if let Err(e) = self.history.push(&self.scene) {
            self.scene.remove(id);
            return Err(e);
        }
        info!("Added {} #{}", kind, id);
        Ok(id)
    }

    /// Adds an editable text box at the default position.
    pub fn add_text(&mut self) -> Result<ObjectId> {
        self.require_image()?;
        let text = SceneObject::new(ObjectKind::Text {
            text: "Enter text".to_string(),
            font_size: 40.0,
            font_family: "Arial".to_string(),
            fill: Color::WHITE,
            background: None,
            anchor: Default::default(),
        })
        .at(ANNOTATION_ORIGIN.0, ANNOTATION_ORIGIN.1);
        self.add_user_object(text)
    }

    /// Adds an outlined rectangle, circle or arrow.
    pub fn add_shape(&mut self, kind: ShapeKind) -> Result<ObjectId> {
        self.require_image()?;
        let (x, y) = ANNOTATION_ORIGIN;
        let shape = match kind {
            ShapeKind::Rect => SceneObject::new(ObjectKind::Rect {
                width: 100.0,
                height: 100.0,
                fill: Color::TRANSPARENT,
                stroke: Some(SHAPE_STROKE),
            }),
            ShapeKind::Circle => SceneObject::new(ObjectKind::Circle {
                radius: 50.0,
                fill: Color::TRANSPARENT,
                stroke: Some(SHAPE_STROKE),
            }),
            ShapeKind::Arrow => SceneObject::new(ObjectKind::Arrow {
                stroke: SHAPE_STROKE,
            })
            .scaled(2.0),
        };
        self.add_user_object(shape.at(x, y))
    }

    /// Places `image` at a fifth of its size in the middle of the canvas.
    pub fn add_watermark(&mut self, image: RasterImage) -> Result<ObjectId> {
        self.require_image()?;
        let (width, height) = self.scene.dimensions();
        let w = image.width() as f64 * WATERMARK_SCALE;
        let h = image.height() as f64 * WATERMARK_SCALE;
        let watermark = SceneObject::image(image)
            .scaled(WATERMARK_SCALE)
            .at((width - w) / 2.0, (height - h) / 2.0);
        self.add_user_object(watermark)
    }

    /// Applies `edit` to a user object and records the result.
    pub fn modify_object<F>(&mut self, id: ObjectId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut SceneObject),
    {
        self.edit_object(id, edit)?;
        self.history.push(&self.scene)?;
        Ok(())
    }

    /// Applies `edit` without recording; used for live style previews.
    fn edit_object<F>(&mut self, id: ObjectId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut SceneObject),
    {
        let obj = self
            .scene
            .get_mut(id)
            .filter(|o| !o.is_scaffolding())
            .ok_or(SceneError::ObjectNotFound { id })?;
        edit(obj);
        Ok(())
    }

    /// Updates colour, size and opacity of a text object.
    pub fn update_text_style(
        &mut self,
        id: ObjectId,
        color: Color,
        font_size: f64,
        opacity: f64,
    ) -> Result<()> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&font_size) {
            return Err(SessionError::invalid(
                "font_size",
                format!("{} is outside {}..={}", font_size, MIN_FONT_SIZE, MAX_FONT_SIZE),
            )
            .into());
        }
        let opacity = opacity.clamp(0.0, 1.0);
        let mut matched = false;
        self.edit_object(id, |obj| {
            if let ObjectKind::Text {
                fill, font_size: size, ..
            } = &mut obj.kind
            {
                *fill = color;
                *size = font_size;
                obj.opacity = opacity;
                matched = true;
            }
        })?;
        if !matched {
            return Err(SessionError::invalid("id", format!("object #{} is not text", id)).into());
        }
        Ok(())
    }

    /// Updates the outline of a rect, circle, arrow or stroke.
    pub fn update_stroke_style(&mut self, id: ObjectId, color: Color, width: f64) -> Result<()> {
        if !(width.is_finite() && width > 0.0) {
            return Err(SessionError::invalid("stroke_width", "must be positive").into());
        }
        let style = StrokeStyle::new(color, width);
        let mut matched = false;
        self.edit_object(id, |obj| {
            let stroke = match &mut obj.kind {
                ObjectKind::Rect { stroke, .. } | ObjectKind::Circle { stroke, .. } => {
                    stroke.get_or_insert(style)
                }
                ObjectKind::Arrow { stroke } | ObjectKind::Path { stroke, .. } => stroke,
                _ => return,
            };
            *stroke = style;
            matched = true;
        })?;
        if !matched {
            return Err(SessionError::invalid("id", format!("object #{} has no outline", id)).into());
        }
        Ok(())
    }

    /// Updates opacity and uniform scale of a watermark image.
    pub fn update_watermark(&mut self, id: ObjectId, opacity: f64, scale: f64) -> Result<()> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(SessionError::invalid("scale", "must be positive").into());
        }
        if self.scene.base_image_id() == Some(id) {
            return Err(SessionError::invalid("id", "the base image is not a watermark").into());
        }
        let mut matched = false;
        self.edit_object(id, |obj| {
            if obj.is_image() {
                obj.opacity = opacity.clamp(0.0, 1.0);
                obj.scale_x = scale;
                obj.scale_y = scale;
                matched = true;
            }
        })?;
        if !matched {
            return Err(SessionError::invalid("id", format!("object #{} is not an image", id)).into());
        }
        Ok(())
    }

    fn freehand_mut(&mut self) -> Result<&mut FreehandSession> {
        match &mut self.session {
            ToolSession::Freehand(freehand) => Ok(freehand),
            _ => Err(SessionError::precondition("The mosaic tool is not active").into()),
        }
    }

    pub fn set_brush_width(&mut self, width: f64) -> Result<()> {
        self.freehand_mut()?.set_brush_width(width)?;
        Ok(())
    }

    pub fn set_brush_color(&mut self, color: Color) -> Result<()> {
        self.freehand_mut()?.set_color(color);
        Ok(())
    }

    pub fn begin_stroke(&mut self, point: Point) -> Result<()> {
        self.freehand_mut()?.begin_stroke(point);
        Ok(())
    }

    pub fn extend_stroke(&mut self, point: Point) -> Result<()> {
        self.freehand_mut()?.extend_stroke(point);
        Ok(())
    }

    /// Turns the current stroke into a permanent path object.
    pub fn commit_stroke(&mut self) -> Result<Option<ObjectId>> {
        let Some(path) = self.freehand_mut()?.finish_stroke() else {
            debug!("No stroke to commit");
            return Ok(None);
        };
        self.add_user_object(path).map(Some)
    }
}

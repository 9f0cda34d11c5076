//! Mosaic brush: freehand strokes painted over the image.

use crate::scene::{ObjectKind, SceneObject, StrokeStyle};
use snapedit_core::{Color, Point, SessionError};
use snapedit_settings::MosaicSettings;

#[derive(Debug, Clone)]
pub struct FreehandSession {
    brush_width: f64,
    color: Color,
    stroke: Vec<Point>,
}

impl FreehandSession {
    pub fn new(settings: &MosaicSettings) -> Self {
        Self {
            brush_width: settings
                .brush_width
                .clamp(MosaicSettings::MIN_BRUSH_WIDTH, MosaicSettings::MAX_BRUSH_WIDTH),
            color: settings.color,
            stroke: Vec::new(),
        }
    }

    pub fn brush_width(&self) -> f64 {
        self.brush_width
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_brush_width(&mut self, width: f64) -> Result<(), SessionError> {
        if !(MosaicSettings::MIN_BRUSH_WIDTH..=MosaicSettings::MAX_BRUSH_WIDTH).contains(&width) {
            return Err(SessionError::invalid(
                "brush_width",
                format!(
                    "{} is outside {}..={}",
                    width,
                    MosaicSettings::MIN_BRUSH_WIDTH,
                    MosaicSettings::MAX_BRUSH_WIDTH
                ),
            ));
        }
        self.brush_width = width;
        Ok(())
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn is_drawing(&self) -> bool {
        !self.stroke.is_empty()
    }

    /// Starts a stroke at `point` (canvas coordinates), dropping any unfinished one.
    pub fn begin_stroke(&mut self, point: Point) {
        self.stroke.clear();
        self.stroke.push(point);
    }

    pub fn extend_stroke(&mut self, point: Point) {
        if self.is_drawing() {
            self.stroke.push(point);
        }
    }

    /// Ends the stroke and returns it as a path object, or `None` if no
    /// stroke was started.
    ///
    /// The object is placed at the stroke's top-left corner with points
    /// relative to it.
    pub fn finish_stroke(&mut self) -> Option<SceneObject> {
        if self.stroke.is_empty() {
            return None;
        }
        let points = std::mem::take(&mut self.stroke);
        let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let relative = points
            .iter()
            .map(|p| Point::new(p.x - min_x, p.y - min_y))
            .collect();

        Some(
            SceneObject::new(ObjectKind::Path {
                points: relative,
                stroke: StrokeStyle::new(self.color, self.brush_width),
            })
            .at(min_x, min_y),
        )
    }
}

//! In-memory scene graph: the canvas the editor works on.
//!
//! Objects are kept in z-order (first is bottom-most). Each carries its
//! geometry, an interactivity flag pair and an [`ObjectCategory`]; objects in
//! the `Scaffolding` category are editor overlays that never reach snapshots,
//! exports or user selection.

use crate::raster::RasterImage;
use crate::renderer;
use crate::snapshot::{SceneDocument, Snapshot};
use serde::{Deserialize, Serialize};
use snapedit_core::{Color, Point, Rect, SceneError};

/// Identifier of an object within a scene.
pub type ObjectId = u64;

/// Arrow outline in local coordinates: a 50 unit shaft with a two-stroke head.
pub const ARROW_SEGMENTS: [(Point, Point); 3] = [
    (Point { x: 0.0, y: 10.0 }, Point { x: 50.0, y: 10.0 }),
    (Point { x: 50.0, y: 10.0 }, Point { x: 40.0, y: 0.0 }),
    (Point { x: 50.0, y: 10.0 }, Point { x: 40.0, y: 20.0 }),
];

/// Whether an object is part of the user's work or an editor overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectCategory {
    #[default]
    UserContent,
    Scaffolding,
}

/// Outline colour and width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

impl StrokeStyle {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

/// Brightness, contrast and saturation adjustments, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSettings {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
}

impl FilterSettings {
    pub fn is_identity(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0 && self.saturation == 0.0
    }

    /// Returns the name of the first value outside `[-1, 1]`.
    pub fn out_of_range(&self) -> Option<&'static str> {
        [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ]
        .into_iter()
        .find(|(_, v)| !(-1.0..=1.0).contains(v))
        .map(|(name, _)| name)
    }
}

/// Horizontal anchoring of a text object's `left` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
}

/// What an object draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ObjectKind {
    Image {
        raster: RasterImage,
        #[serde(default, skip_serializing_if = "FilterSettings::is_identity")]
        filters: FilterSettings,
    },
    Rect {
        width: f64,
        height: f64,
        fill: Color,
        stroke: Option<StrokeStyle>,
    },
    Circle {
        radius: f64,
        fill: Color,
        stroke: Option<StrokeStyle>,
    },
    Arrow {
        stroke: StrokeStyle,
    },
    /// Freehand stroke; points are relative to the object's origin.
    Path {
        points: Vec<Point>,
        stroke: StrokeStyle,
    },
    Text {
        text: String,
        font_size: f64,
        font_family: String,
        fill: Color,
        background: Option<Color>,
        #[serde(default)]
        anchor: TextAnchor,
    },
}

impl ObjectKind {
    /// Short type name, used in logs and layout checks.
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Image { .. } => "image",
            ObjectKind::Rect { .. } => "rect",
            ObjectKind::Circle { .. } => "circle",
            ObjectKind::Arrow { .. } => "arrow",
            ObjectKind::Path { .. } => "path",
            ObjectKind::Text { .. } => "text",
        }
    }
}

/// A positioned object on the canvas.
///
/// Geometry applies as translate(left, top) · rotate(angle) · scale, with the
/// local box starting at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees, clockwise.
    pub angle: f64,
    pub opacity: f64,
    pub selectable: bool,
    pub evented: bool,
    #[serde(default)]
    pub category: ObjectCategory,
}

impl SceneObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: 0,
            kind,
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            opacity: 1.0,
            selectable: true,
            evented: true,
            category: ObjectCategory::UserContent,
        }
    }

    pub fn image(raster: RasterImage) -> Self {
        Self::new(ObjectKind::Image {
            raster,
            filters: FilterSettings::default(),
        })
    }

    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale_x = scale;
        self.scale_y = scale;
        self
    }

    /// Not selectable and not evented.
    pub fn locked(mut self) -> Self {
        self.selectable = false;
        self.evented = false;
        self
    }

    pub fn scaffolding(mut self) -> Self {
        self.category = ObjectCategory::Scaffolding;
        self
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ObjectKind::Image { .. })
    }

    pub fn is_scaffolding(&self) -> bool {
        self.category == ObjectCategory::Scaffolding
    }

    pub fn is_locked(&self) -> bool {
        !self.selectable && !self.evented
    }

    pub fn is_interactive(&self) -> bool {
        self.selectable && self.evented
    }

    pub fn raster(&self) -> Option<&RasterImage> {
        match &self.kind {
            ObjectKind::Image { raster, .. } => Some(raster),
            _ => None,
        }
    }

    /// Unscaled size of the object's local box.
    pub fn local_size(&self) -> (f64, f64) {
        match &self.kind {
            ObjectKind::Image { raster, .. } => (raster.width() as f64, raster.height() as f64),
            ObjectKind::Rect { width, height, .. } => (*width, *height),
            ObjectKind::Circle { radius, .. } => (radius * 2.0, radius * 2.0),
            ObjectKind::Arrow { .. } => (50.0, 20.0),
            ObjectKind::Path { points, stroke } => {
                let (w, h) = points.iter().fold((0.0f64, 0.0f64), |(w, h), p| {
                    (w.max(p.x), h.max(p.y))
                });
                (w + stroke.width, h + stroke.width)
            }
            ObjectKind::Text {
                text, font_size, ..
            } => text_box(text, *font_size),
        }
    }

    /// Offset of the local box relative to (left, top).
    pub(crate) fn local_origin(&self) -> Point {
        match &self.kind {
            ObjectKind::Text {
                text,
                font_size,
                anchor: TextAnchor::Middle,
                ..
            } => Point::new(-text_box(text, *font_size).0 / 2.0, 0.0),
            ObjectKind::Path { stroke, .. } => Point::new(-stroke.width / 2.0, -stroke.width / 2.0),
            _ => Point::default(),
        }
    }

    /// Width and height after scaling, ignoring rotation.
    pub fn rendered_size(&self) -> (f64, f64) {
        let (w, h) = self.local_size();
        (w * self.scale_x, h * self.scale_y)
    }

    /// Maps a local point to canvas coordinates.
    pub fn to_canvas(&self, local: Point) -> Point {
        let scaled = Point::new(local.x * self.scale_x, local.y * self.scale_y);
        let origin = Point::new(self.left, self.top);
        Point::new(origin.x + scaled.x, origin.y + scaled.y).rotated_about(origin, self.angle)
    }

    /// Axis-aligned bounding box on the canvas.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.local_size();
        let o = self.local_origin();
        let corners = [
            Point::new(o.x, o.y),
            Point::new(o.x + w, o.y),
            Point::new(o.x, o.y + h),
            Point::new(o.x + w, o.y + h),
        ]
        .map(|c| self.to_canvas(c));
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Approximate text box for layout; glyph metrics are only known at render time.
pub(crate) fn text_box(text: &str, font_size: f64) -> (f64, f64) {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let lines = text.lines().count().max(1);
    (
        longest as f64 * font_size * 0.6,
        lines as f64 * font_size * 1.16,
    )
}

/// The operations the history manager and tool sessions need from a canvas.
pub trait CanvasFacade {
    /// Adds an object on top of the z-order and returns its new id.
    fn add(&mut self, object: SceneObject) -> ObjectId;

    fn remove(&mut self, id: ObjectId) -> Option<SceneObject>;

    /// All objects, bottom-most first.
    fn objects(&self) -> &[SceneObject];

    fn set_active(&mut self, id: Option<ObjectId>);

    fn dimensions(&self) -> (f64, f64);

    fn set_dimensions(&mut self, width: f64, height: f64);

    /// Serializes the user content and canvas size.
    fn snapshot(&self) -> Result<Snapshot, SceneError>;

    /// Replaces the whole scene with the snapshot's content.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SceneError>;

    /// Renders user content inside `region` (canvas coordinates).
    fn rasterize(&self, region: Rect) -> Result<RasterImage, SceneError>;
}

/// Default in-memory canvas.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    width: f64,
    height: f64,
    objects: Vec<SceneObject>,
    active: Option<ObjectId>,
    next_id: ObjectId,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// The full canvas as a rectangle at the origin.
    pub fn canvas_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn user_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| !o.is_scaffolding())
    }

    pub fn user_objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut().filter(|o| !o.is_scaffolding())
    }

    pub fn user_object_count(&self) -> usize {
        self.user_objects().count()
    }

    pub fn scaffolding_ids(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.is_scaffolding())
            .map(|o| o.id)
            .collect()
    }

    /// The bottom-most user image, which the crop, filter and composite tools
    /// operate on.
    pub fn base_image(&self) -> Option<&SceneObject> {
        self.user_objects().find(|o| o.is_image())
    }

    pub fn base_image_id(&self) -> Option<ObjectId> {
        self.base_image().map(|o| o.id)
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn active_object(&self) -> Option<&SceneObject> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_object_mut(&mut self) -> Option<&mut SceneObject> {
        let id = self.active?;
        self.get_mut(id)
    }

    /// Renders the whole canvas without scaffolding.
    pub fn rasterize_canvas(&self) -> Result<RasterImage, SceneError> {
        renderer::render_scene(self)
    }

    /// Removes every object; canvas size is kept.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.active = None;
    }
}

impl CanvasFacade for Scene {
    fn add(&mut self, mut object: SceneObject) -> ObjectId {
        self.next_id += 1;
        object.id = self.next_id;
        self.objects.push(object);
        self.next_id
    }

    fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.objects.remove(index))
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn set_active(&mut self, id: Option<ObjectId>) {
        self.active = id.filter(|id| self.contains(*id));
    }

    fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn set_dimensions(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    fn snapshot(&self) -> Result<Snapshot, SceneError> {
        let document = SceneDocument::new(
            self.width,
            self.height,
            self.user_objects().cloned().collect(),
        );
        Snapshot::encode(&document)
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SceneError> {
        let document = snapshot.decode()?;
        let max_id = document.objects.iter().map(|o| o.id).max().unwrap_or(0);
        self.width = document.width;
        self.height = document.height;
        self.objects = document.objects;
        self.active = None;
        self.next_id = self.next_id.max(max_id);
        Ok(())
    }

    fn rasterize(&self, region: Rect) -> Result<RasterImage, SceneError> {
        renderer::render_region(self, region)
    }
}

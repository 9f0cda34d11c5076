//! Background replacement: the subject is cut out once and re-composited
//! over a colour or image as often as the user changes parameters.

use super::composite::{clamp_user_scale, resolve_source, LayerPair, SourceState};
use crate::raster::{Mask, RasterImage};
use crate::scene::{CanvasFacade, Scene, SceneObject};
use snapedit_core::{Color, SceneError, SessionError};

/// What goes behind the subject
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundFill {
    Color(Color),
    /// Scaled to cover the canvas, overflow cropped evenly.
    Image(RasterImage),
}

impl Default for BackgroundFill {
    fn default() -> Self {
        BackgroundFill::Color(Color::WHITE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiBackgroundParams {
    pub fill: BackgroundFill,
    /// Subject scale relative to the canvas, clamped to `[0.5, 2.0]`.
    pub foreground_scale: f64,
}

impl Default for AiBackgroundParams {
    fn default() -> Self {
        Self {
            fill: BackgroundFill::default(),
            foreground_scale: 1.0,
        }
    }
}

impl AiBackgroundParams {
    pub fn color(color: Color) -> Self {
        Self {
            fill: BackgroundFill::Color(color),
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.foreground_scale = scale;
        self
    }
}

#[derive(Debug, Clone)]
struct Cutout {
    source: RasterImage,
    foreground: RasterImage,
}

/// Layer state kept for the lifetime of one background tool activation.
#[derive(Debug, Default)]
pub struct AiBackgroundSession {
    cache: Option<Cutout>,
    layers: Option<LayerPair>,
    segmentations: u32,
}

impl AiBackgroundSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times this session asked for a segmentation.
    pub fn segmentation_count(&self) -> u32 {
        self.segmentations
    }

    pub fn has_cutout(&self) -> bool {
        self.cache.is_some()
    }

    pub fn foreground(&self) -> Option<&RasterImage> {
        self.cache.as_ref().map(|c| &c.foreground)
    }

    /// Returns the raster that still needs segmenting, or `None` when the
    /// cached cut-out can be reused.
    pub(crate) fn pending_source(&self, scene: &Scene) -> Result<Option<RasterImage>, SceneError> {
        let cached = self.cache.as_ref().map(|c| &c.source);
        match resolve_source(scene, self.layers, cached)? {
            SourceState::Cached => {
                tracing::debug!("Reusing cached foreground cut-out");
                Ok(None)
            }
            SourceState::Fresh(source) => Ok(Some(source)),
        }
    }

    /// Stores the cut-out produced from `source` by `mask`.
    pub(crate) fn store_cutout(&mut self, source: RasterImage, mask: &Mask) {
        let foreground = source.with_mask(mask);
        self.segmentations += 1;
        self.layers = None;
        self.cache = Some(Cutout { source, foreground });
    }

    /// Replaces the user content with background + foreground layers.
    pub fn compose(&mut self, scene: &mut Scene, params: &AiBackgroundParams) -> Result<(), SessionError> {
        let cutout = self
            .cache
            .as_ref()
            .ok_or_else(|| SessionError::precondition("No foreground has been extracted yet"))?;

        let (width, height) = scene.dimensions();
        let (px_w, px_h) = (
            (width.round() as u32).max(1),
            (height.round() as u32).max(1),
        );
        let background = match &params.fill {
            BackgroundFill::Color(color) => RasterImage::filled(px_w, px_h, *color),
            BackgroundFill::Image(image) => image.cover(px_w, px_h),
        };

        let scale = clamp_user_scale(params.foreground_scale);
        let fg_left = width / 2.0 - width * scale / 2.0;
        let fg_top = height / 2.0 - height * scale / 2.0;
        let fg_scale_x = width * scale / cutout.foreground.width().max(1) as f64;
        let fg_scale_y = height * scale / cutout.foreground.height().max(1) as f64;

        let user_ids: Vec<_> = scene.user_objects().map(|o| o.id).collect();
        for id in user_ids {
            scene.remove(id);
        }

        let background = scene.add(SceneObject::image(background).at(0.0, 0.0).locked());
        let mut fg = SceneObject::image(cutout.foreground.clone()).at(fg_left, fg_top);
        fg.scale_x = fg_scale_x;
        fg.scale_y = fg_scale_y;
        let foreground = scene.add(fg);
        scene.set_active(Some(foreground));

        self.layers = Some(LayerPair {
            background,
            foreground,
        });
        tracing::debug!("Composited foreground at scale {:.2}", scale);
        Ok(())
    }
}

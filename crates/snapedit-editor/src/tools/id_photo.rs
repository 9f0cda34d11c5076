//! ID photo composition: the subject is cut out, trimmed to its bounding box
//! and placed on a solid backing sized to a photo template.

use super::composite::{clamp_user_scale, resolve_source, LayerPair, SourceState};
use super::templates::PhotoTemplate;
use crate::raster::{Mask, RasterImage};
use crate::scene::{CanvasFacade, ObjectKind, Scene, SceneObject};
use snapedit_core::{Color, Rect, SceneError, SessionError};
use snapedit_settings::IdPhotoSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct IdPhotoParams {
    pub template: PhotoTemplate,
    pub background: Color,
    /// Subject size multiplier, clamped to `[0.5, 2.0]`.
    pub scale: f64,
}

impl IdPhotoParams {
    pub fn new(template: PhotoTemplate, background: Color) -> Self {
        Self {
            template,
            background,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Where the subject image lands on the template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub left: f64,
    pub top: f64,
}

/// Computes the subject placement for `bbox` (in subject-image pixels).
///
/// The bbox is scaled to `person_height_ratio` of the photo height, its top
/// put at the headroom line and centred horizontally. The position is then
/// clamped so the bbox stays inside the margins; when it cannot fit it is
/// centred on that axis instead. Scale is never changed by the clamp.
pub fn place_subject(
    template: &PhotoTemplate,
    bbox: Rect,
    user_scale: f64,
    settings: &IdPhotoSettings,
) -> Placement {
    let width = template.width as f64;
    let height = template.height as f64;
    let scale = template.person_height_ratio * height * clamp_user_scale(user_scale)
        / bbox.height.max(1.0);

    let box_w = bbox.width * scale;
    let box_h = bbox.height * scale;
    let margin_x = settings.margin_x_ratio * width;
    let margin_top = settings.margin_top_ratio * height;
    let margin_bottom = settings.margin_bottom_ratio * height;

    let mut box_left = (width - box_w) / 2.0;
    let mut box_top = template.headroom_ratio * height;

    if box_w <= width - 2.0 * margin_x {
        box_left = box_left.clamp(margin_x, width - margin_x - box_w);
    } else {
        box_left = (width - box_w) / 2.0;
    }
    if box_h <= height - margin_top - margin_bottom {
        box_top = box_top.clamp(margin_top, height - margin_bottom - box_h);
    } else {
        box_top = (height - box_h) / 2.0;
    }

    Placement {
        scale,
        left: box_left - bbox.left * scale,
        top: box_top - bbox.top * scale,
    }
}

#[derive(Debug, Clone)]
struct Subject {
    source: RasterImage,
    image: RasterImage,
    /// Tight subject box inside `image`.
    bbox: Rect,
}

/// Layer state kept for the lifetime of one ID photo tool activation.
#[derive(Debug, Default)]
pub struct IdPhotoSession {
    cache: Option<Subject>,
    layers: Option<LayerPair>,
    segmentations: u32,
    placement: Option<Placement>,
}

impl IdPhotoSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segmentation_count(&self) -> u32 {
        self.segmentations
    }

    pub fn has_subject(&self) -> bool {
        self.cache.is_some()
    }

    /// Subject box inside the trimmed subject image.
    pub fn subject_bbox(&self) -> Option<Rect> {
        self.cache.as_ref().map(|s| s.bbox)
    }

    /// Placement used by the last composite.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub(crate) fn pending_source(&self, scene: &Scene) -> Result<Option<RasterImage>, SceneError> {
        let cached = self.cache.as_ref().map(|c| &c.source);
        match resolve_source(scene, self.layers, cached)? {
            SourceState::Cached => {
                tracing::debug!("Reusing cached ID photo subject");
                Ok(None)
            }
            SourceState::Fresh(source) => Ok(Some(source)),
        }
    }

    /// Cuts the subject out of `source` and trims it to a padded bounding box.
    pub(crate) fn store_subject(
        &mut self,
        source: RasterImage,
        mask: &Mask,
        threshold: u8,
        sample_step: u32,
        settings: &IdPhotoSettings,
    ) -> Result<(), SessionError> {
        self.segmentations += 1;
        let cutout = source.with_mask(mask);
        let bbox = Mask::from_alpha(&cutout)
            .bounding_box(threshold, sample_step)
            .ok_or_else(|| SessionError::precondition("No subject detected in the image"))?;

        let padding = (settings.padding_ratio * bbox.width.max(bbox.height))
            .max(settings.min_padding_px as f64);
        let x0 = (bbox.left - padding).max(0.0).floor();
        let y0 = (bbox.top - padding).max(0.0).floor();
        let x1 = (bbox.right() + padding).min(cutout.width() as f64).ceil();
        let y1 = (bbox.bottom() + padding).min(cutout.height() as f64).ceil();
        let image = cutout.crop(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32);

        tracing::debug!(
            "Subject box {:.0}x{:.0} trimmed to {}x{}",
            bbox.width,
            bbox.height,
            image.width(),
            image.height()
        );
        self.layers = None;
        self.cache = Some(Subject {
            source,
            image,
            bbox: Rect::new(bbox.left - x0, bbox.top - y0, bbox.width, bbox.height),
        });
        Ok(())
    }

    /// Rebuilds the photo: backing rectangle at template size plus the subject.
    pub fn compose(
        &mut self,
        scene: &mut Scene,
        params: &IdPhotoParams,
        settings: &IdPhotoSettings,
    ) -> Result<Placement, SessionError> {
        let subject = self
            .cache
            .as_ref()
            .ok_or_else(|| SessionError::precondition("No subject has been extracted yet"))?;
        let placement = place_subject(&params.template, subject.bbox, params.scale, settings);
        let (width, height) = (params.template.width as f64, params.template.height as f64);

        scene.clear();
        scene.set_dimensions(width, height);
        let background = scene.add(
            SceneObject::new(ObjectKind::Rect {
                width,
                height,
                fill: params.background,
                stroke: None,
            })
            .at(0.0, 0.0)
            .locked(),
        );
        let foreground = scene.add(
            SceneObject::image(subject.image.clone())
                .at(placement.left, placement.top)
                .scaled(placement.scale),
        );
        scene.set_active(Some(foreground));

        self.layers = Some(LayerPair {
            background,
            foreground,
        });
        self.placement = Some(placement);
        Ok(placement)
    }
}

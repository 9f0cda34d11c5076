//! Pieces shared by the layered composite tools.

use crate::raster::RasterImage;
use crate::scene::{ObjectId, Scene};
use snapedit_core::SceneError;

pub const MIN_USER_SCALE: f64 = 0.5;
pub const MAX_USER_SCALE: f64 = 2.0;

/// Clamps a user-chosen subject scale into `[0.5, 2.0]`.
pub fn clamp_user_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_USER_SCALE, MAX_USER_SCALE)
}

/// Ids of the two layers a composite put on the canvas, bottom first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LayerPair {
    pub background: ObjectId,
    pub foreground: ObjectId,
}

impl LayerPair {
    /// True when the scene's user content is exactly these two layers.
    pub fn on_canvas(&self, scene: &Scene) -> bool {
        let ids: Vec<_> = scene.user_objects().map(|o| o.id).collect();
        ids == [self.background, self.foreground]
    }
}

/// Where the next composite takes its subject from.
#[derive(Debug)]
pub(crate) enum SourceState {
    /// The cached cut-out still matches what is on the canvas.
    Cached,
    /// The canvas changed; this raster needs segmenting.
    Fresh(RasterImage),
}

/// Decides whether a composite can be rebuilt from cache.
///
/// The cache is valid when the canvas still holds the layers built from it,
/// or when the canvas renders to exactly the raster that was segmented.
pub(crate) fn resolve_source(
    scene: &Scene,
    layers: Option<LayerPair>,
    cached_source: Option<&RasterImage>,
) -> Result<SourceState, SceneError> {
    if let (Some(pair), Some(_)) = (layers, cached_source) {
        if pair.on_canvas(scene) {
            return Ok(SourceState::Cached);
        }
    }
    let current = scene.rasterize_canvas()?;
    match cached_source {
        Some(source) if *source == current => Ok(SourceState::Cached),
        _ => Ok(SourceState::Fresh(current)),
    }
}

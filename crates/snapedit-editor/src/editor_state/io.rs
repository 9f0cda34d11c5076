//! Image import, reset and export.

use super::EditorState;
use crate::archive::{build_archive, ZipArchiveBuilder};
use crate::raster::RasterImage;
use crate::scene::{CanvasFacade, SceneObject};
use snapedit_core::{ArchiveError, Rect, Result, SessionError};
use tracing::info;

/// A grid-slice export ready to be saved.
#[derive(Debug, Clone)]
pub struct SliceArchive {
    /// Suggested download name, `sliced_images_{rows}x{cols}.zip`.
    pub file_name: String,
    pub entries: Vec<String>,
    pub bytes: Vec<u8>,
}

/// Canvas regions of a `rows` x `cols` grid, row-major, with 1-based entry names.
pub fn slice_regions(width: f64, height: f64, rows: u32, cols: u32) -> Vec<(String, Rect)> {
    let slice_w = width / cols as f64;
    let slice_h = height / rows as f64;
    (0..rows)
        .flat_map(|r| {
            (0..cols).map(move |c| {
                (
                    format!("sliced_images/slice_{}_{}.png", r + 1, c + 1),
                    Rect::new(c as f64 * slice_w, r as f64 * slice_h, slice_w, slice_h),
                )
            })
        })
        .collect()
}

impl EditorState {
    /// Replaces the scene with `image`, scaled down to fit the workspace.
    ///
    /// Any tool session and pending request is dropped and history restarts
    /// from this image.
    pub fn load_image(&mut self, image: RasterImage) -> Result<()> {
        let (width, height) = (image.width() as f64, image.height() as f64);
        if width == 0.0 || height == 0.0 {
            return Err(SessionError::invalid("image", "image has no pixels").into());
        }

        self.cancel_pending();
        self.drop_session();

        let (max_w, max_h) = self.config.workspace.fit_area();
        let scale = if width > max_w || height > max_h {
            (max_w / width).min(max_h / height)
        } else {
            1.0
        };

        self.scene.clear();
        self.scene.set_dimensions(width * scale, height * scale);
        let id = self.scene.add(SceneObject::image(image).scaled(scale).at(0.0, 0.0));
        self.scene.set_active(Some(id));

        self.history.clear();
        self.history.push(&self.scene)?;
        info!(
            "Loaded {}x{} image (scale {:.3})",
            width as u32, height as u32, scale
        );
        Ok(())
    }

    /// Decodes `bytes` (any format `image` supports) and loads the result.
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let image = RasterImage::decode(bytes)?;
        self.load_image(image)
    }

    /// Empties the canvas and the history.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.drop_session();
        self.scene.clear();
        self.scene.set_dimensions(0.0, 0.0);
        self.history.clear();
        info!("Editor reset");
    }

    /// Renders the canvas without editor overlays.
    pub fn export_raster(&self) -> Result<RasterImage> {
        self.require_image()?;
        Ok(self.scene.rasterize_canvas()?)
    }

    pub fn export_png(&self) -> Result<Vec<u8>> {
        Ok(self.export_raster()?.encode_png()?)
    }

    /// Cuts the canvas into a `rows` x `cols` grid of PNGs packed in a ZIP.
    ///
    /// Slices are rendered here; encoding and packaging run on the blocking pool.
    pub async fn grid_slice(&self, rows: u32, cols: u32) -> Result<SliceArchive> {
        if rows == 0 {
            return Err(SessionError::invalid("rows", "must be greater than 0").into());
        }
        if cols == 0 {
            return Err(SessionError::invalid("cols", "must be greater than 0").into());
        }
        self.require_image()?;
        self.ensure_no_overlay()?;

        let (width, height) = self.scene.dimensions();
        if cols as f64 > width.floor() {
            return Err(SessionError::invalid("cols", "more columns than canvas pixels").into());
        }
        if rows as f64 > height.floor() {
            return Err(SessionError::invalid("rows", "more rows than canvas pixels").into());
        }
        let count = (rows as usize)
            .checked_mul(cols as usize)
            .ok_or_else(|| SessionError::invalid("rows", "grid is too large"))?;
        let mut slices = Vec::with_capacity(count);
        for (name, region) in slice_regions(width, height, rows, cols) {
            slices.push((name, self.scene.rasterize(region)?));
        }
        let entries: Vec<String> = slices.iter().map(|(name, _)| name.clone()).collect();

        let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let mut encoded = Vec::with_capacity(slices.len());
            for (name, raster) in slices {
                encoded.push((name, raster.encode_png()?));
            }
            Ok(build_archive(ZipArchiveBuilder::new(), encoded)?)
        })
        .await
        .map_err(|e| ArchiveError::TaskAborted {
            reason: e.to_string(),
        })??;

        info!("Sliced canvas into {}x{} ({} bytes)", rows, cols, bytes.len());
        Ok(SliceArchive {
            file_name: format!("sliced_images_{}x{}.zip", rows, cols),
            entries,
            bytes,
        })
    }
}

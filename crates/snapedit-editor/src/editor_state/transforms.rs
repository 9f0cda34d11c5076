//! Whole-canvas transforms and image filters.

use super::EditorState;
use crate::scene::{CanvasFacade, FilterSettings, ObjectKind};
use snapedit_core::{Point, Result, SessionError};
use tracing::info;

/// True for ±90 and ±270 degrees (and their equivalents).
fn is_quarter_turn(angle: f64) -> bool {
    (angle.rem_euclid(180.0) - 90.0).abs() < 1e-9
}

impl EditorState {
    /// Rotates every object about the canvas centre by `angle` degrees
    /// (clockwise). Quarter turns swap the canvas width and height.
    pub fn rotate(&mut self, angle: f64) -> Result<()> {
        self.require_image()?;
        self.ensure_no_overlay()?;
        if !angle.is_finite() {
            return Err(SessionError::invalid("angle", "must be a finite number").into());
        }

        let (width, height) = self.scene.dimensions();
        let (new_width, new_height) = if is_quarter_turn(angle) {
            (height, width)
        } else {
            (width, height)
        };
        let old_center = Point::new(width / 2.0, height / 2.0);
        let new_center = Point::new(new_width / 2.0, new_height / 2.0);

        for obj in self.scene.user_objects_mut() {
            let offset = Point::new(obj.left - old_center.x, obj.top - old_center.y)
                .rotated_about(Point::default(), angle);
            obj.left = new_center.x + offset.x;
            obj.top = new_center.y + offset.y;
            obj.angle = (obj.angle + angle).rem_euclid(360.0);
        }
        self.scene.set_dimensions(new_width, new_height);
        self.history.push(&self.scene)?;

        info!("Rotated canvas by {} degrees", angle);
        Ok(())
    }

    /// Scales the canvas to `width` x `height`, stretching every object by
    /// the per-axis factors.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        self.require_image()?;
        self.ensure_no_overlay()?;
        for (field, value) in [("width", width), ("height", height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SessionError::invalid(field, format!("{} is not a positive size", value)).into());
            }
        }
        let (old_width, old_height) = self.scene.dimensions();
        if old_width <= 0.0 || old_height <= 0.0 {
            return Err(SessionError::precondition("The canvas has no size").into());
        }

        let fx = width / old_width;
        let fy = height / old_height;
        for obj in self.scene.user_objects_mut() {
            obj.left *= fx;
            obj.top *= fy;
            obj.scale_x *= fx;
            obj.scale_y *= fy;
        }
        self.scene.set_dimensions(width, height);
        self.history.push(&self.scene)?;

        info!(
            "Resized canvas {:.0}x{:.0} -> {:.0}x{:.0}",
            old_width, old_height, width, height
        );
        Ok(())
    }

    /// Current filter values of the base image.
    pub fn filters(&self) -> Option<FilterSettings> {
        match &self.scene.base_image()?.kind {
            ObjectKind::Image { filters, .. } => Some(*filters),
            _ => None,
        }
    }

    /// Sets brightness/contrast/saturation on the base image for preview.
    ///
    /// Nothing is recorded; call [`EditorState::commit_filters`] to keep them.
    pub fn apply_filters(&mut self, settings: FilterSettings) -> Result<()> {
        if let Some(field) = settings.out_of_range() {
            return Err(SessionError::invalid(field, "must be within -1..=1").into());
        }
        let id = self
            .scene
            .base_image_id()
            .ok_or_else(|| SessionError::precondition("Import an image first"))?;
        if let Some(ObjectKind::Image { filters, .. }) = self.scene.get_mut(id).map(|o| &mut o.kind) {
            *filters = settings;
        }
        Ok(())
    }

    pub fn reset_filters(&mut self) -> Result<()> {
        self.apply_filters(FilterSettings::default())
    }

    /// Records the filtered image in history.
    pub fn commit_filters(&mut self) -> Result<bool> {
        self.require_image()?;
        let pushed = self.history.push(&self.scene)?;
        if pushed {
            info!("Filters committed");
        }
        Ok(pushed)
    }
}

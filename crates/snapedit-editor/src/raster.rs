//! Raster buffers and foreground masks.
//!
//! [`RasterImage`] is a shared, immutable RGBA buffer. Cloning is cheap, so
//! layer caches and snapshots can hold the same pixels without copying.
//! In serialized form a raster is a `data:image/png;base64,...` URL.

use base64::Engine;
use image::{imageops, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snapedit_core::{Color, Rect, SceneError};
use std::io::Cursor;
use std::sync::Arc;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Shared RGBA pixel buffer (non-premultiplied).
#[derive(Clone)]
pub struct RasterImage(Arc<RgbaImage>);

impl RasterImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self(Arc::new(pixels))
    }

    /// A buffer of `width` x `height` filled with one colour.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self::new(RgbaImage::from_pixel(
            width,
            height,
            Rgba([color.r, color.g, color.b, color.a]),
        ))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }

    /// Decodes any format the `image` crate recognises.
    pub fn decode(bytes: &[u8]) -> Result<Self, SceneError> {
        let decoded = image::load_from_memory(bytes).map_err(|e| SceneError::Decode {
            reason: e.to_string(),
        })?;
        Ok(Self::new(decoded.to_rgba8()))
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, SceneError> {
        let mut out = Cursor::new(Vec::new());
        self.0
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| SceneError::Encode {
                reason: e.to_string(),
            })?;
        Ok(out.into_inner())
    }

    pub fn to_data_url(&self) -> Result<String, SceneError> {
        let png = self.encode_png()?;
        Ok(format!(
            "{}{}",
            PNG_DATA_URL_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }

    pub fn from_data_url(url: &str) -> Result<Self, SceneError> {
        let payload = url
            .split_once(";base64,")
            .filter(|(head, _)| head.starts_with("data:image/"))
            .map(|(_, data)| data)
            .ok_or_else(|| SceneError::Decode {
                reason: "expected a base64 image data URL".to_string(),
            })?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| SceneError::Decode {
                reason: e.to_string(),
            })?;
        Self::decode(&bytes)
    }

    /// Copies out a sub-rectangle, clamped to the buffer.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> RasterImage {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);
        Self::new(imageops::crop_imm(self.pixels(), x, y, width, height).to_image())
    }

    /// Returns a copy whose alpha is limited by `mask`.
    ///
    /// The mask is resampled when its size differs from the image.
    pub fn with_mask(&self, mask: &Mask) -> RasterImage {
        let mask = mask.resized(self.width(), self.height());
        let mut out = (*self.0).clone();
        for (x, y, px) in out.enumerate_pixels_mut() {
            px[3] = px[3].min(mask.value(x, y));
        }
        Self::new(out)
    }

    /// Scales to fill `width` x `height` completely, cropping the overflow
    /// evenly from both sides.
    pub fn cover(&self, width: u32, height: u32) -> RasterImage {
        if width == 0 || height == 0 || self.width() == 0 || self.height() == 0 {
            return Self::new(RgbaImage::new(width, height));
        }
        let scale = (width as f64 / self.width() as f64).max(height as f64 / self.height() as f64);
        let scaled_w = ((self.width() as f64 * scale).ceil() as u32).max(width);
        let scaled_h = ((self.height() as f64 * scale).ceil() as u32).max(height);
        let resized = imageops::resize(
            self.pixels(),
            scaled_w,
            scaled_h,
            imageops::FilterType::Triangle,
        );
        let x = (scaled_w - width) / 2;
        let y = (scaled_h - height) / 2;
        Self::new(imageops::crop_imm(&resized, x, y, width, height).to_image())
    }

    /// True when at least one pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.0.pixels().any(|p| p[3] < 255)
    }
}

impl PartialEq for RasterImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.dimensions() == other.0.dimensions() && self.0.as_raw() == other.0.as_raw())
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RasterImage({}x{})", self.width(), self.height())
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

impl Serialize for RasterImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let url = self.to_data_url().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&url)
    }
}

impl<'de> Deserialize<'de> for RasterImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        RasterImage::from_data_url(&url).map_err(serde::de::Error::custom)
    }
}

/// Grayscale foreground mask; 255 is subject, 0 is background.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask(GrayImage);

impl Mask {
    pub fn new(gray: GrayImage) -> Self {
        Self(gray)
    }

    /// Uses the alpha channel of `image` as the mask.
    pub fn from_alpha(image: &RasterImage) -> Self {
        let src = image.pixels();
        Self(GrayImage::from_fn(src.width(), src.height(), |x, y| {
            Luma([src.get_pixel(x, y)[3]])
        }))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.0.get_pixel(x, y)[0]
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    fn resized(&self, width: u32, height: u32) -> Mask {
        if self.0.dimensions() == (width, height) {
            return self.clone();
        }
        Mask(imageops::resize(
            &self.0,
            width,
            height,
            imageops::FilterType::Nearest,
        ))
    }

    /// Tight bounding box of the pixels at or above `threshold`.
    ///
    /// Only every `step`-th row and column is inspected; the far edges are
    /// widened by one step so the sampled box never cuts into the subject.
    /// Returns `None` when no sampled pixel qualifies.
    pub fn bounding_box(&self, threshold: u8, step: u32) -> Option<Rect> {
        let step = step.max(1);
        let (w, h) = self.0.dimensions();
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;

        for y in (0..h).step_by(step as usize) {
            for x in (0..w).step_by(step as usize) {
                if self.value(x, y) >= threshold {
                    found = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }

        if !found {
            return None;
        }
        let right = (max_x + step).min(w);
        let bottom = (max_y + step).min(h);
        Some(Rect::new(
            min_x as f64,
            min_y as f64,
            (right - min_x) as f64,
            (bottom - min_y) as f64,
        ))
    }
}

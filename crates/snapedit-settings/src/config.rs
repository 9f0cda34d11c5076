//! Configuration for SnapEdit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform configuration directory.
//!
//! Configuration is organized into sections:
//! - History (snapshot stack depth)
//! - Segmentation (timeout, mask threshold, bounding box sampling)
//! - Crop (initial frame size, overlay styling)
//! - ID photo (placement margins, subject padding, default template)
//! - Workspace (the view the imported image is fitted into)
//! - Mosaic (brush defaults)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use snapedit_core::Color;
use std::path::{Path, PathBuf};

/// Undo/redo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of snapshots kept
    pub limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { limit: 20 }
    }
}

/// Foreground segmentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Hard timeout for one segmentation request, in milliseconds
    pub timeout_ms: u64,
    /// Mask intensity at or above which a pixel counts as subject
    pub mask_threshold: u8,
    /// Grid step used when scanning the mask for its bounding box
    pub sample_step: u32,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            mask_threshold: 128,
            sample_step: 4,
        }
    }
}

/// Crop overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropSettings {
    /// Initial frame size as a fraction of the base image
    pub initial_fraction: f64,
    /// Gap between the frame's bottom edge and the size label
    pub label_offset: f64,
    /// Fill of the four mask bands
    pub overlay_color: Color,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            initial_fraction: 0.8,
            label_offset: 10.0,
            overlay_color: Color::BLACK.with_alpha(0.6),
        }
    }
}

/// ID photo composition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdPhotoSettings {
    /// Left/right margin as a fraction of the template width
    pub margin_x_ratio: f64,
    /// Top margin as a fraction of the template height
    pub margin_top_ratio: f64,
    /// Bottom margin as a fraction of the template height
    pub margin_bottom_ratio: f64,
    /// Padding around the subject bounding box, relative to its larger side
    pub padding_ratio: f64,
    /// Lower bound for the padding in pixels
    pub min_padding_px: u32,
    /// Template used when none is named
    pub default_template: String,
    /// Backing colour used when none is given
    pub default_background: Color,
}

impl Default for IdPhotoSettings {
    fn default() -> Self {
        Self {
            margin_x_ratio: 0.04,
            margin_top_ratio: 0.02,
            margin_bottom_ratio: 0.0,
            padding_ratio: 0.02,
            min_padding_px: 2,
            default_template: "one-inch".to_string(),
            default_background: Color::rgb(0x43, 0x8e, 0xdb),
        }
    }
}

/// Workspace view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// Width of the view hosting the canvas
    pub view_width: u32,
    /// Height of the view hosting the canvas
    pub view_height: u32,
    /// Space kept free around a freshly imported image
    pub fit_margin: u32,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            view_width: 1280,
            view_height: 900,
            fit_margin: 100,
        }
    }
}

impl WorkspaceSettings {
    /// Largest size an imported image is shown at before it is scaled down.
    pub fn fit_area(&self) -> (f64, f64) {
        (
            self.view_width.saturating_sub(self.fit_margin).max(1) as f64,
            self.view_height.saturating_sub(self.fit_margin).max(1) as f64,
        )
    }
}

/// Mosaic brush settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicSettings {
    /// Default brush width in pixels
    pub brush_width: f64,
    /// Brush colour
    pub color: Color,
}

impl MosaicSettings {
    pub const MIN_BRUSH_WIDTH: f64 = 5.0;
    pub const MAX_BRUSH_WIDTH: f64 = 100.0;
}

impl Default for MosaicSettings {
    fn default() -> Self {
        Self {
            brush_width: 20.0,
            color: Color::rgb(0x33, 0x33, 0x33),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history: HistorySettings,
    pub segmentation: SegmentationSettings,
    pub crop: CropSettings,
    pub id_photo: IdPhotoSettings,
    pub workspace: WorkspaceSettings,
    pub mosaic: MosaicSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform configuration file, `<config dir>/snapedit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })?;
        Ok(dir.join("snapedit").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
            }
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.limit == 0 {
            return Err(ConfigError::out_of_range("history.limit", self.history.limit));
        }

        if self.segmentation.timeout_ms == 0 {
            return Err(ConfigError::out_of_range(
                "segmentation.timeout_ms",
                self.segmentation.timeout_ms,
            ));
        }
        if self.segmentation.sample_step == 0 {
            return Err(ConfigError::out_of_range(
                "segmentation.sample_step",
                self.segmentation.sample_step,
            ));
        }

        let fraction = self.crop.initial_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ConfigError::out_of_range("crop.initial_fraction", fraction));
        }

        let id = &self.id_photo;
        for (key, value) in [
            ("id_photo.margin_x_ratio", id.margin_x_ratio),
            ("id_photo.margin_top_ratio", id.margin_top_ratio),
            ("id_photo.margin_bottom_ratio", id.margin_bottom_ratio),
            ("id_photo.padding_ratio", id.padding_ratio),
        ] {
            if !(0.0..0.5).contains(&value) {
                return Err(ConfigError::out_of_range(key, value));
            }
        }
        if id.margin_top_ratio + id.margin_bottom_ratio >= 1.0 {
            return Err(ConfigError::out_of_range(
                "id_photo.margin_top_ratio",
                id.margin_top_ratio,
            ));
        }

        if self.workspace.view_width == 0 || self.workspace.view_height == 0 {
            return Err(ConfigError::out_of_range(
                "workspace.view_width",
                format!("{}x{}", self.workspace.view_width, self.workspace.view_height),
            ));
        }

        let brush = self.mosaic.brush_width;
        if !(MosaicSettings::MIN_BRUSH_WIDTH..=MosaicSettings::MAX_BRUSH_WIDTH).contains(&brush) {
            return Err(ConfigError::out_of_range("mosaic.brush_width", brush));
        }

        Ok(())
    }
}

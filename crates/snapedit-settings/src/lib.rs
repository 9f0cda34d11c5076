//! SnapEdit Settings Crate
//!
//! Handles editor configuration: history depth, segmentation timeouts, crop
//! and ID photo layout parameters, workspace fit limits and brush defaults.

pub mod config;
pub mod error;

pub use config::{
    Config, CropSettings, HistorySettings, IdPhotoSettings, MosaicSettings,
    SegmentationSettings, WorkspaceSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};

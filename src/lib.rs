//! # SnapEdit
//!
//! Canvas image editor core with:
//! - Whole-scene snapshot undo/redo with a bounded history
//! - Crop with free and fixed aspect ratios
//! - Rotate, resize, brightness/contrast/saturation filters
//! - Text, shapes, watermarks and mosaic strokes
//! - AI background replacement and ID photo generation
//! - Grid slicing into a ZIP archive
//!
//! ## Architecture
//!
//! SnapEdit is organized as a workspace with multiple crates:
//!
//! 1. **snapedit-core** - Errors, geometry, event bus
//! 2. **snapedit-settings** - Configuration loading and validation
//! 3. **snapedit-editor** - Scene, history, tool sessions, segmentation, export
//! 4. **snapedit** - Command line front end that integrates all crates

pub use snapedit_core::{
    event_bus, AppEvent, Color, Error, EventBus, EventCategory, EventFilter, NoticeLevel, Rect,
    Result,
};

pub use snapedit_editor::{
    AiBackgroundParams, AlphaChannelSegmenter, BackgroundFill, CropRatio, EditorState,
    IdPhotoParams, PhotoTemplate, RasterImage, SegmentationService, SliceArchive, Tool,
};

pub use snapedit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr
/// - RUST_LOG environment variable support
/// - `verbose` lowers the default level to DEBUG
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Mirrors editor notices into the log.
///
/// Returns the subscription so callers can detach it.
pub fn log_notices(bus: &EventBus) -> snapedit_core::SubscriptionId {
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Notice]),
        |event| {
            if let AppEvent::Notice { level, message } = event {
                match level {
                    NoticeLevel::Error => tracing::error!("{}", message),
                    NoticeLevel::Warning => tracing::warn!("{}", message),
                    NoticeLevel::Info | NoticeLevel::Success => tracing::info!("{}", message),
                }
            }
        },
    )
}

//! # SnapEdit Editor
//!
//! Scene model, snapshot history and tool sessions for the SnapEdit image
//! editor.
//!
//! ## Core Components
//!
//! ### Canvas
//! - **Scene**: Images, shapes, text and strokes in z-order, with editor
//!   overlays kept apart from user content
//! - **Snapshots**: Whole-scene serialization used by the history
//! - **Renderer**: Headless compositor for export and flattening
//!
//! ### Editing
//! - **History/Undo-Redo**: Bounded snapshot stack with two-phase restore
//! - **Tools**: Crop, mosaic, annotations, transforms, filters
//! - **Composites**: AI background replacement and ID photos, flattened
//!   into a single image when the tool is left
//! - **Export**: PNG export and grid slicing into a ZIP archive
//!
//! ## Architecture
//!
//! ```text
//! EditorState
//!   ├── Scene (CanvasFacade)
//!   ├── UndoRedoManager (Snapshots)
//!   ├── Tool + ToolSession (Crop, Freehand, AiBackground, IdPhoto, ...)
//!   └── SegmentationService (async, with timeout)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use snapedit_editor::{EditorState, RasterImage, Tool};
//!
//! let mut editor = EditorState::new(Default::default());
//! editor.load_image(RasterImage::decode(&bytes)?)?;
//! editor.activate(Tool::Crop)?;
//! editor.set_crop_ratio("1:1".parse()?)?;
//! editor.apply_crop()?;
//! let png = editor.export_png()?;
//! ```

pub mod archive;
pub mod editor_state;
pub mod font_manager;
pub mod history;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod segmentation;
pub mod shortcuts;
pub mod snapshot;
pub mod tools;

pub use archive::{build_archive, ArchiveBuilder, ZipArchiveBuilder};
pub use editor_state::{slice_regions, CompositeStep, EditorState, SliceArchive};
pub use history::{UndoRedoManager, DEFAULT_HISTORY_LIMIT};
pub use raster::{Mask, RasterImage};
pub use scene::{
    CanvasFacade, FilterSettings, ObjectCategory, ObjectId, ObjectKind, Scene, SceneObject,
    StrokeStyle, TextAnchor,
};
pub use segmentation::{
    AlphaChannelSegmenter, SegmentationJob, SegmentationOutcome, SegmentationService,
};
pub use shortcuts::Shortcut;
pub use snapshot::{SceneDocument, Snapshot};
pub use tools::{
    AiBackgroundParams, BackgroundFill, CropRatio, FrameEdit, IdPhotoParams, PhotoTemplate,
    Placement, ShapeKind, Tool, ToolSession,
};

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use snapedit_core::{
    AppEvent, Color, EventBus, EventBusConfig, EventCategory, ServiceError, SessionEvent,
};
use snapedit_editor::{
    AiBackgroundParams, AlphaChannelSegmenter, BackgroundFill, CanvasFacade, CompositeStep,
    EditorState, Mask, RasterImage, SegmentationService, ShapeKind, Tool, ToolSession,
};
use snapedit_settings::Config;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A 100x100 image: transparent, with an opaque red square in the middle.
fn subject_image() -> RasterImage {
    RasterImage::new(RgbaImage::from_fn(100, 100, |x, y| {
        if (30..70).contains(&x) && (20..80).contains(&y) {
            Rgba([200, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    }))
}

fn recording_editor() -> (EditorState, Arc<EventBus>) {
    let bus = Arc::new(EventBus::with_config(EventBusConfig::recording()));
    let mut editor = EditorState::with_event_bus(Config::default(), bus.clone());
    editor.load_image(subject_image()).unwrap();
    (editor, bus)
}

#[derive(Default)]
struct CountingSegmenter {
    calls: AtomicUsize,
}

#[async_trait]
impl SegmentationService for CountingSegmenter {
    fn name(&self) -> &str {
        "counting"
    }

    async fn segment(&self, image: &RasterImage) -> Result<Mask, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        AlphaChannelSegmenter.segment(image).await
    }
}

struct NeverAnswers;

#[async_trait]
impl SegmentationService for NeverAnswers {
    fn name(&self) -> &str {
        "never"
    }

    async fn segment(&self, _image: &RasterImage) -> Result<Mask, ServiceError> {
        std::future::pending().await
    }
}

struct Rejecting;

#[async_trait]
impl SegmentationService for Rejecting {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn segment(&self, _image: &RasterImage) -> Result<Mask, ServiceError> {
        Err(ServiceError::Rejected {
            service: "rejecting".into(),
            reason: "quota exceeded".into(),
        })
    }
}

#[tokio::test]
async fn test_apply_builds_locked_background_and_interactive_foreground() {
    let (mut editor, bus) = recording_editor();
    editor.activate(Tool::AiBackground).unwrap();
    editor
        .apply_ai_background(AiBackgroundParams::color(Color::WHITE), &AlphaChannelSegmenter)
        .await
        .unwrap();

    let layers: Vec<_> = editor.scene().user_objects().collect();
    assert_eq!(layers.len(), 2);
    assert!(layers[0].is_image() && layers[0].is_locked());
    assert!(layers[1].is_image() && layers[1].is_interactive());
    assert_eq!(editor.history().len(), 2);

    let raster = editor.export_raster().unwrap();
    assert_eq!(raster.pixels().get_pixel(5, 5).0, [255, 255, 255, 255]);
    assert_eq!(raster.pixels().get_pixel(50, 50).0, [200, 0, 0, 255]);

    let notices = bus.history_of(EventCategory::Notice);
    assert!(notices
        .iter()
        .any(|e| e.description() == "[success] Background replaced"));
}

#[tokio::test]
async fn test_reapply_reuses_cutout() {
    let (mut editor, _bus) = recording_editor();
    let service = CountingSegmenter::default();
    editor.activate(Tool::AiBackground).unwrap();

    editor
        .apply_ai_background(AiBackgroundParams::color(Color::WHITE), &service)
        .await
        .unwrap();
    editor
        .apply_ai_background(
            AiBackgroundParams::color(Color::rgb(0, 0, 255)).with_scale(1.5),
            &service,
        )
        .await
        .unwrap();
    editor
        .apply_ai_background(
            AiBackgroundParams {
                fill: BackgroundFill::Image(RasterImage::filled(10, 10, Color::BLACK)),
                foreground_scale: 3.0,
            },
            &service,
        )
        .await
        .unwrap();

    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    assert_eq!(editor.history().len(), 4);
    let ToolSession::AiBackground(session) = editor.session() else {
        panic!("expected the AI background session");
    };
    assert_eq!(session.segmentation_count(), 1);

    // Scale 3.0 is clamped to 2.0: the foreground covers twice the canvas.
    let fg = editor.scene().user_objects().nth(1).unwrap();
    assert_eq!(fg.rendered_size(), (200.0, 200.0));
    assert_eq!((fg.left, fg.top), (-50.0, -50.0));
}

#[tokio::test]
async fn test_leaving_tool_flattens_layers() {
    let (mut editor, bus) = recording_editor();
    editor.activate(Tool::AiBackground).unwrap();
    editor
        .apply_ai_background(AiBackgroundParams::color(Color::WHITE), &AlphaChannelSegmenter)
        .await
        .unwrap();
    let before = editor.history().len();

    editor.activate(Tool::Select).unwrap();
    let objects = editor.scene().objects();
    assert_eq!(objects.len(), 1);
    assert!(objects[0].is_image());
    assert!(objects[0].is_interactive());
    assert_eq!(editor.scene().dimensions(), (100.0, 100.0));
    assert_eq!(editor.history().len(), before + 1);

    let flattened = bus
        .history_of(EventCategory::Session)
        .into_iter()
        .any(|e| matches!(e, AppEvent::Session(SessionEvent::Flattened { .. })));
    assert!(flattened);
}

#[tokio::test]
async fn test_unexpected_layout_is_not_flattened() {
    let (mut editor, bus) = recording_editor();
    editor.activate(Tool::AiBackground).unwrap();
    editor
        .apply_ai_background(AiBackgroundParams::color(Color::WHITE), &AlphaChannelSegmenter)
        .await
        .unwrap();
    editor.add_shape(ShapeKind::Rect).unwrap();
    let before = editor.history().len();

    editor.activate(Tool::Select).unwrap();
    assert_eq!(editor.scene().user_object_count(), 3);
    assert_eq!(editor.history().len(), before);
    let skipped = bus
        .history_of(EventCategory::Session)
        .into_iter()
        .any(|e| matches!(e, AppEvent::Session(SessionEvent::FlattenSkipped { .. })));
    assert!(skipped);
}

#[tokio::test]
async fn test_crop_teardown_keeps_background_locked() {
    let (mut editor, _bus) = recording_editor();
    editor.activate(Tool::AiBackground).unwrap();
    editor
        .apply_ai_background(AiBackgroundParams::color(Color::WHITE), &AlphaChannelSegmenter)
        .await
        .unwrap();
    // A third layer keeps the composite from being flattened.
    editor.add_shape(ShapeKind::Rect).unwrap();

    editor.activate(Tool::Crop).unwrap();
    assert!(editor.scene().user_objects().all(|o| o.is_locked()));
    editor.activate(Tool::Select).unwrap();

    assert!(editor.scene().scaffolding_ids().is_empty());
    let layers: Vec<_> = editor.scene().user_objects().collect();
    assert_eq!(layers.len(), 3);
    assert!(layers[0].is_image() && layers[0].is_locked());
    assert!(layers[1].is_image() && layers[1].is_interactive());
    assert!(layers[2].is_interactive());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_leaves_scene_untouched() {
    let (mut editor, bus) = recording_editor();
    editor.activate(Tool::AiBackground).unwrap();
    let before = editor.scene().snapshot().unwrap();

    let err = editor
        .apply_ai_background(AiBackgroundParams::default(), &NeverAnswers)
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert!(err.is_transient());
    assert_eq!(editor.scene().snapshot().unwrap(), before);
    assert_eq!(editor.tool(), Tool::AiBackground);
    assert!(!editor.is_busy());

    let errors = bus.history_of(EventCategory::Notice);
    assert!(errors.iter().any(|e| e.description().starts_with("[error]")));
}

#[tokio::test]
async fn test_service_rejection_is_reported() {
    let (mut editor, _bus) = recording_editor();
    editor.activate(Tool::AiBackground).unwrap();
    let err = editor
        .apply_ai_background(AiBackgroundParams::default(), &Rejecting)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(editor.scene().user_object_count(), 1);
    assert_eq!(editor.history().len(), 1);
}

#[tokio::test]
async fn test_activation_rejected_while_segmenting() {
    let (mut editor, _bus) = recording_editor();
    editor.activate(Tool::AiBackground).unwrap();
    let step = editor
        .prepare_ai_background(AiBackgroundParams::default())
        .unwrap();
    let CompositeStep::Segment(job) = step else {
        panic!("first apply must segment");
    };
    assert!(editor.is_busy());
    assert!(editor.activate(Tool::Select).unwrap_err().is_busy());

    let outcome = job
        .run(&AlphaChannelSegmenter, Duration::from_secs(15))
        .await;
    editor.complete_segmentation(outcome).unwrap();
    assert!(!editor.is_busy());
    editor.activate(Tool::Select).unwrap();
}

#[tokio::test]
async fn test_stale_result_is_discarded() {
    let (mut editor, _bus) = recording_editor();
    editor.activate(Tool::AiBackground).unwrap();
    let CompositeStep::Segment(job) = editor
        .prepare_ai_background(AiBackgroundParams::default())
        .unwrap()
    else {
        panic!("first apply must segment");
    };
    assert_eq!(editor.cancel_pending(), Some(job.ticket));

    let outcome = job
        .run(&AlphaChannelSegmenter, Duration::from_secs(15))
        .await;
    let err = editor.complete_segmentation(outcome).unwrap_err();
    assert!(matches!(
        err,
        snapedit_core::Error::Service(ServiceError::Stale { .. })
    ));
    assert_eq!(editor.scene().user_object_count(), 1);
}

#[tokio::test]
async fn test_prepare_requires_tool() {
    let (mut editor, _bus) = recording_editor();
    let err = editor
        .prepare_ai_background(AiBackgroundParams::default())
        .unwrap_err();
    assert!(err.is_precondition());
}

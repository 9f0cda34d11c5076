use image::{Rgba, RgbaImage};
use snapedit_core::{AppEvent, Color, EventBus, EventBusConfig, EventCategory, SessionEvent};
use snapedit_editor::{
    AlphaChannelSegmenter, CanvasFacade, EditorState, IdPhotoParams, ObjectKind, PhotoTemplate,
    RasterImage, Tool, ToolSession,
};
use snapedit_settings::Config;
use std::sync::Arc;

const BLUE: Color = Color::rgb(0x43, 0x8e, 0xdb);

/// Transparent 100x100 canvas with an opaque square subject.
fn portrait() -> RasterImage {
    RasterImage::new(RgbaImage::from_fn(100, 100, |x, y| {
        if (20..80).contains(&x) && (20..80).contains(&y) {
            Rgba([90, 60, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    }))
}

fn one_inch(background: Color) -> IdPhotoParams {
    IdPhotoParams::new(PhotoTemplate::find("one-inch").unwrap(), background)
}

fn id_photo_editor(image: RasterImage) -> (EditorState, Arc<EventBus>) {
    let bus = Arc::new(EventBus::with_config(EventBusConfig::recording()));
    let mut editor = EditorState::with_event_bus(Config::default(), bus.clone());
    editor.load_image(image).unwrap();
    editor.activate(Tool::IdPhoto).unwrap();
    (editor, bus)
}

#[tokio::test]
async fn test_compose_builds_template_sized_photo() {
    let (mut editor, _bus) = id_photo_editor(portrait());
    editor
        .apply_id_photo(one_inch(BLUE), &AlphaChannelSegmenter)
        .await
        .unwrap();

    assert_eq!(editor.scene().dimensions(), (295.0, 413.0));
    let layers: Vec<_> = editor.scene().user_objects().collect();
    assert_eq!(layers.len(), 2);
    assert!(matches!(layers[0].kind, ObjectKind::Rect { fill, .. } if fill == BLUE));
    assert!(layers[0].is_locked());
    assert!(layers[1].is_image() && layers[1].is_interactive());
    assert_eq!(editor.history().len(), 2);

    let ToolSession::IdPhoto(session) = editor.session() else {
        panic!("expected the ID photo session");
    };
    let bbox = session.subject_bbox().unwrap();
    let placement = session.placement().unwrap();
    assert!((bbox.height * placement.scale - 0.75 * 413.0).abs() < 1e-6);
    // Subject top sits on the headroom line.
    assert!((placement.top + bbox.top * placement.scale - 41.3).abs() < 1e-6);

    let raster = editor.export_raster().unwrap();
    assert_eq!(raster.pixels().get_pixel(2, 2).0, [0x43, 0x8e, 0xdb, 255]);
}

#[tokio::test]
async fn test_scale_is_clamped_and_cache_reused() {
    let (mut editor, _bus) = id_photo_editor(portrait());
    editor
        .apply_id_photo(one_inch(BLUE).with_scale(3.0), &AlphaChannelSegmenter)
        .await
        .unwrap();
    let ToolSession::IdPhoto(session) = editor.session() else {
        panic!("expected the ID photo session");
    };
    let clamped = session.placement().unwrap();

    editor
        .apply_id_photo(one_inch(Color::WHITE).with_scale(2.0), &AlphaChannelSegmenter)
        .await
        .unwrap();
    let ToolSession::IdPhoto(session) = editor.session() else {
        panic!("expected the ID photo session");
    };
    assert_eq!(session.placement().unwrap(), clamped);
    assert_eq!(session.segmentation_count(), 1);
    assert_eq!(editor.history().len(), 3);
}

#[tokio::test]
async fn test_switching_template_keeps_subject() {
    let (mut editor, _bus) = id_photo_editor(portrait());
    editor
        .apply_id_photo(one_inch(BLUE), &AlphaChannelSegmenter)
        .await
        .unwrap();
    let visa = IdPhotoParams::new(PhotoTemplate::find("VISA").unwrap(), Color::WHITE);
    editor
        .apply_id_photo(visa, &AlphaChannelSegmenter)
        .await
        .unwrap();

    assert_eq!(editor.scene().dimensions(), (600.0, 600.0));
    let ToolSession::IdPhoto(session) = editor.session() else {
        panic!("expected the ID photo session");
    };
    assert_eq!(session.segmentation_count(), 1);
}

#[tokio::test]
async fn test_empty_subject_is_rejected() {
    let empty = RasterImage::new(RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 0])));
    let (mut editor, bus) = id_photo_editor(empty);
    let before = editor.scene().snapshot().unwrap();

    let err = editor
        .apply_id_photo(one_inch(BLUE), &AlphaChannelSegmenter)
        .await
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(editor.scene().snapshot().unwrap(), before);
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.is_busy());

    let notices = bus.history_of(EventCategory::Notice);
    assert!(notices
        .iter()
        .any(|e| e.description().ends_with("No subject detected in the image")));
}

#[tokio::test]
async fn test_leaving_tool_flattens_photo() {
    let (mut editor, bus) = id_photo_editor(portrait());
    editor
        .apply_id_photo(one_inch(BLUE), &AlphaChannelSegmenter)
        .await
        .unwrap();
    editor.activate(Tool::Crop).unwrap();

    let base = editor.scene().base_image().unwrap();
    assert_eq!(base.raster().unwrap().width(), 295);
    assert_eq!(base.raster().unwrap().height(), 413);
    assert_eq!(editor.scene().user_object_count(), 1);
    assert_eq!(editor.history().len(), 3);

    let flattened = bus
        .history_of(EventCategory::Session)
        .into_iter()
        .any(|e| matches!(e, AppEvent::Session(SessionEvent::Flattened { ref tool }) if tool == "id-photo"));
    assert!(flattened);
}

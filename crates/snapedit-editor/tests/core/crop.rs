use snapedit_core::{Color, Rect};
use snapedit_editor::tools::crop::{clamp_position, clamp_resize, overlay_bands, size_label};
use snapedit_editor::{CanvasFacade, CropRatio, EditorState, FrameEdit, RasterImage, Tool, ToolSession};
use snapedit_settings::Config;

fn editor_with_image(width: u32, height: u32) -> EditorState {
    let mut editor = EditorState::new(Config::default());
    editor
        .load_image(RasterImage::filled(width, height, Color::rgb(10, 200, 30)))
        .unwrap();
    editor
}

#[test]
fn test_enter_crop_builds_overlay_and_locks_image() {
    let mut editor = editor_with_image(200, 200);
    editor.activate(Tool::Crop).unwrap();

    assert_eq!(editor.crop_frame(), Some(Rect::new(20.0, 20.0, 160.0, 160.0)));
    assert_eq!(editor.scene().scaffolding_ids().len(), 6);
    let base = editor.scene().base_image().unwrap();
    assert!(base.is_locked());
    // Overlays never reach history.
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_move_is_clamped_inside_image() {
    let mut editor = editor_with_image(200, 200);
    editor.activate(Tool::Crop).unwrap();

    let frame = editor.move_crop_frame(-50.0, 30.0).unwrap();
    assert_eq!(frame.left, 0.0);
    assert_eq!(frame.top, 30.0);
    assert_eq!(frame.width, 160.0);

    let frame = editor.move_crop_frame(500.0, 500.0).unwrap();
    assert_eq!(frame.right(), 200.0);
    assert_eq!(frame.bottom(), 200.0);
}

#[test]
fn test_resize_beyond_edge_is_trimmed() {
    let mut editor = editor_with_image(200, 200);
    editor.activate(Tool::Crop).unwrap();

    let frame = editor
        .resize_crop_frame(Rect::new(120.0, 10.0, 300.0, 50.0))
        .unwrap();
    assert!(frame.left + frame.width <= 200.0);
    assert_eq!(frame.width, 80.0);
    assert_eq!(frame.height, 50.0);
}

#[test]
fn test_square_ratio_keeps_width() {
    let mut editor = editor_with_image(200, 200);
    editor.activate(Tool::Crop).unwrap();
    editor
        .resize_crop_frame(Rect::new(10.0, 10.0, 150.0, 90.0))
        .unwrap();

    let frame = editor.set_crop_ratio("1:1".parse().unwrap()).unwrap();
    assert_eq!(frame.width, 150.0);
    assert_eq!(frame.height, 150.0);
}

#[test]
fn test_free_ratio_is_noop() {
    let mut editor = editor_with_image(200, 200);
    editor.activate(Tool::Crop).unwrap();
    let before = editor.crop_frame().unwrap();
    let after = editor.set_crop_ratio(CropRatio::Free).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_ratio_taller_than_image_shrinks_width() {
    let mut editor = editor_with_image(300, 100);
    editor.activate(Tool::Crop).unwrap();
    let frame = editor.set_crop_ratio(CropRatio::SQUARE).unwrap();
    assert_eq!(frame.height, 100.0);
    assert_eq!(frame.width, 100.0);
    assert_eq!(frame.top, 0.0);
}

#[test]
fn test_apply_crop_replaces_canvas() {
    let mut editor = editor_with_image(200, 200);
    editor.activate(Tool::Crop).unwrap();
    editor
        .resize_crop_frame(Rect::new(50.0, 40.0, 100.0, 60.0))
        .unwrap();

    editor.apply_crop().unwrap();
    assert_eq!(editor.tool(), Tool::Select);
    assert!(matches!(editor.session(), ToolSession::Select));
    assert_eq!(editor.scene().dimensions(), (100.0, 60.0));
    assert_eq!(editor.scene().len(), 1);
    assert!(editor.scene().scaffolding_ids().is_empty());
    assert_eq!(editor.history().len(), 2);

    let image = editor.export_raster().unwrap();
    assert_eq!(image.pixels().get_pixel(0, 0).0, [10, 200, 30, 255]);
}

#[test]
fn test_apply_crop_requires_crop_tool() {
    let mut editor = editor_with_image(50, 50);
    let err = editor.apply_crop().unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn test_leaving_crop_restores_interactivity() {
    let mut editor = editor_with_image(200, 200);
    editor.activate(Tool::Crop).unwrap();
    editor.activate(Tool::Select).unwrap();

    assert!(editor.scene().scaffolding_ids().is_empty());
    assert!(editor.scene().base_image().unwrap().is_interactive());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_undo_during_crop_leaves_crop() {
    let mut editor = editor_with_image(200, 200);
    editor.rotate(90.0).unwrap();
    editor.activate(Tool::Crop).unwrap();

    assert!(editor.undo().unwrap());
    assert_eq!(editor.tool(), Tool::Select);
    assert!(editor.scene().scaffolding_ids().is_empty());
}

#[test]
fn test_clamp_helpers() {
    let image = Rect::new(0.0, 0.0, 200.0, 200.0);
    let moved = clamp_position(Rect::new(-50.0, -10.0, 100.0, 100.0), image);
    assert_eq!((moved.left, moved.top), (0.0, 0.0));

    let trimmed = clamp_resize(Rect::new(-20.0, 150.0, 50.0, 100.0), image);
    assert_eq!(trimmed, Rect::new(0.0, 150.0, 50.0, 50.0));

    let frame = Rect::new(20.0, 20.0, 160.0, 160.0);
    let [top, bottom, left, right] = overlay_bands(image, frame);
    assert_eq!(top, Rect::new(0.0, 0.0, 200.0, 20.0));
    assert_eq!(bottom, Rect::new(0.0, 180.0, 200.0, 20.0));
    assert_eq!(left, Rect::new(0.0, 20.0, 20.0, 160.0));
    assert_eq!(right, Rect::new(180.0, 20.0, 20.0, 160.0));
    assert_eq!(size_label(Rect::new(0.0, 0.0, 99.6, 50.4)), "100 x 50");
}

#[test]
fn test_frame_edit_enum_moves() {
    let mut editor = editor_with_image(200, 200);
    editor.activate(Tool::Crop).unwrap();
    let frame = editor
        .edit_crop_frame(FrameEdit::Move { left: 0.0, top: 0.0 })
        .unwrap();
    assert_eq!((frame.left, frame.top), (0.0, 0.0));
}

use image::{Rgba, RgbaImage};
use snapedit_core::Color;
use snapedit_editor::{
    CanvasFacade, EditorState, FilterSettings, ObjectKind, RasterImage, ShapeKind, Tool,
};
use snapedit_settings::Config;

/// 200x100: left half red, right half blue.
fn split_image() -> RasterImage {
    RasterImage::new(RgbaImage::from_fn(200, 100, |x, _| {
        if x < 100 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    }))
}

fn loaded_editor() -> EditorState {
    let mut editor = EditorState::new(Config::default());
    editor.load_image(split_image()).unwrap();
    editor
}

#[test]
fn test_quarter_rotation_swaps_dimensions() {
    let mut editor = loaded_editor();
    editor.rotate(90.0).unwrap();

    assert_eq!(editor.scene().dimensions(), (100.0, 200.0));
    assert_eq!(editor.history().len(), 2);
    let base = editor.scene().base_image().unwrap();
    assert_eq!(base.angle, 90.0);

    // The left half of the source ends up on top.
    let raster = editor.export_raster().unwrap();
    assert_eq!((raster.width(), raster.height()), (100, 200));
    assert_eq!(raster.pixels().get_pixel(50, 40).0, [255, 0, 0, 255]);
    assert_eq!(raster.pixels().get_pixel(50, 160).0, [0, 0, 255, 255]);
}

#[test]
fn test_rotation_wraps_angle() {
    let mut editor = loaded_editor();
    editor.rotate(-90.0).unwrap();
    editor.rotate(-90.0).unwrap();
    assert_eq!(editor.scene().dimensions(), (200.0, 100.0));
    assert_eq!(editor.scene().base_image().unwrap().angle, 180.0);

    editor.undo().unwrap();
    assert_eq!(editor.scene().dimensions(), (100.0, 200.0));
}

#[test]
fn test_rotation_rejects_non_finite_angle() {
    let mut editor = loaded_editor();
    assert!(editor.rotate(f64::NAN).is_err());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_resize_stretches_objects() {
    let mut editor = loaded_editor();
    let shape = editor.add_shape(ShapeKind::Rect).unwrap();
    editor.resize(400.0, 50.0).unwrap();

    assert_eq!(editor.scene().dimensions(), (400.0, 50.0));
    let base = editor.scene().base_image().unwrap();
    assert_eq!((base.scale_x, base.scale_y), (2.0, 0.5));
    let rect = editor.scene().get(shape).unwrap();
    assert_eq!((rect.left, rect.top), (200.0, 50.0));

    let raster = editor.export_raster().unwrap();
    assert_eq!((raster.width(), raster.height()), (400, 50));
}

#[test]
fn test_resize_rejects_non_positive() {
    let mut editor = loaded_editor();
    assert!(editor.resize(0.0, 10.0).is_err());
    assert!(editor.resize(10.0, -1.0).is_err());
    assert_eq!(editor.scene().dimensions(), (200.0, 100.0));
}

#[test]
fn test_filter_preview_is_not_recorded() {
    let mut editor = loaded_editor();
    let settings = FilterSettings {
        brightness: 0.3,
        contrast: -0.2,
        saturation: 0.5,
    };
    editor.apply_filters(settings).unwrap();
    assert_eq!(editor.filters(), Some(settings));
    assert_eq!(editor.history().len(), 1);

    assert!(editor.commit_filters().unwrap());
    assert_eq!(editor.history().len(), 2);
    // Committing again without changes still records a step.
    assert!(editor.commit_filters().unwrap());
    assert_eq!(editor.history().len(), 3);

    editor.reset_filters().unwrap();
    assert!(editor.filters().unwrap().is_identity());
}

#[test]
fn test_filter_out_of_range_rejected() {
    let mut editor = loaded_editor();
    let err = editor
        .apply_filters(FilterSettings {
            brightness: 1.5,
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        snapedit_core::Error::Session(snapedit_core::SessionError::InvalidInput { .. })
    ));
    assert_eq!(editor.filters(), Some(FilterSettings::default()));
}

#[test]
fn test_text_tool_adds_default_text() {
    let mut editor = loaded_editor();
    editor.activate(Tool::Text).unwrap();

    let text = editor.scene().active_object().unwrap();
    let ObjectKind::Text {
        text: content,
        font_size,
        ..
    } = &text.kind
    else {
        panic!("expected a text object");
    };
    assert_eq!(content, "Enter text");
    assert_eq!(*font_size, 40.0);
    assert_eq!((text.left, text.top), (100.0, 100.0));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn test_text_style_is_validated() {
    let mut editor = loaded_editor();
    let id = editor.add_text().unwrap();

    assert!(editor.update_text_style(id, Color::RED, 8.0, 1.0).is_err());
    editor.update_text_style(id, Color::RED, 60.0, 0.5).unwrap();
    let text = editor.scene().get(id).unwrap();
    assert_eq!(text.opacity, 0.5);
    assert!(matches!(text.kind, ObjectKind::Text { font_size, fill, .. } if font_size == 60.0 && fill == Color::RED));
}

#[test]
fn test_shape_tools_add_outlined_shapes() {
    let mut editor = loaded_editor();
    editor.activate(Tool::Shape(ShapeKind::Circle)).unwrap();
    let circle = editor.scene().active_object().unwrap();
    assert!(matches!(
        circle.kind,
        ObjectKind::Circle { radius, fill, stroke: Some(_) } if radius == 50.0 && fill == Color::TRANSPARENT
    ));

    editor.activate(Tool::Shape(ShapeKind::Arrow)).unwrap();
    let arrow = editor.scene().active_object().unwrap();
    assert_eq!(arrow.scale_x, 2.0);
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn test_watermark_is_centred_at_fifth_size() {
    let mut editor = loaded_editor();
    let id = editor
        .add_watermark(RasterImage::filled(100, 50, Color::WHITE))
        .unwrap();
    let mark = editor.scene().get(id).unwrap();
    assert_eq!(mark.rendered_size(), (20.0, 10.0));
    assert_eq!((mark.left, mark.top), (90.0, 45.0));
}

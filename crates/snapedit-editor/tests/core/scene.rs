use image::{Rgba, RgbaImage};
use snapedit_core::{Color, Rect};
use snapedit_editor::{
    CanvasFacade, FilterSettings, ObjectKind, RasterImage, Scene, SceneObject, Snapshot,
    StrokeStyle,
};

fn checker(width: u32, height: u32) -> RasterImage {
    RasterImage::new(RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    }))
}

#[test]
fn test_snapshot_round_trip_preserves_images() {
    let mut scene = Scene::with_dimensions(8.0, 8.0);
    scene.add(SceneObject::image(checker(8, 8)));
    let id = scene.add(
        SceneObject::new(ObjectKind::Circle {
            radius: 2.0,
            fill: Color::TRANSPARENT,
            stroke: Some(StrokeStyle::new(Color::RED, 1.0)),
        })
        .at(2.0, 2.0),
    );
    scene.get_mut(id).unwrap().opacity = 0.5;

    let snapshot = scene.snapshot().unwrap();
    let mut restored = Scene::new();
    restored.restore(&snapshot).unwrap();

    assert_eq!(restored.objects(), scene.objects());
    assert_eq!(restored.base_image().unwrap().raster().unwrap(), &checker(8, 8));
}

#[test]
fn test_snapshot_json_is_self_describing() {
    let mut scene = Scene::with_dimensions(4.0, 4.0);
    scene.add(SceneObject::image(RasterImage::filled(1, 1, Color::RED)));
    let snapshot = scene.snapshot().unwrap();

    let value: serde_json::Value = serde_json::from_str(snapshot.as_json()).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["objects"][0]["kind"]["type"], "image");
    assert!(value["objects"][0]["kind"]["raster"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[test]
fn test_restore_rejects_garbage() {
    let mut scene = Scene::with_dimensions(4.0, 4.0);
    assert!(scene.restore(&Snapshot::from_json("{\"version\": 1}")).is_err());
    assert_eq!(scene.dimensions(), (4.0, 4.0));
}

#[test]
fn test_ids_stay_unique_after_restore() {
    let mut scene = Scene::new();
    let first = scene.add(SceneObject::image(RasterImage::filled(1, 1, Color::RED)));
    let snapshot = scene.snapshot().unwrap();

    let mut other = Scene::new();
    other.restore(&snapshot).unwrap();
    let next = other.add(SceneObject::image(RasterImage::filled(1, 1, Color::RED)));
    assert!(next > first);
}

#[test]
fn test_rasterize_excludes_scaffolding() {
    let mut scene = Scene::with_dimensions(4.0, 4.0);
    scene.add(SceneObject::image(RasterImage::filled(4, 4, Color::WHITE)));
    scene.add(
        SceneObject::new(ObjectKind::Rect {
            width: 4.0,
            height: 4.0,
            fill: Color::BLACK,
            stroke: None,
        })
        .scaffolding(),
    );

    let raster = scene.rasterize_canvas().unwrap();
    assert_eq!(raster.pixels().get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
}

#[test]
fn test_rasterize_region_offsets_content() {
    let mut scene = Scene::with_dimensions(4.0, 2.0);
    let mut img = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 255, 255]));
    img.put_pixel(3, 1, Rgba([255, 0, 0, 255]));
    scene.add(SceneObject::image(RasterImage::new(img)));

    let region = scene.rasterize(Rect::new(2.0, 0.0, 2.0, 2.0)).unwrap();
    assert_eq!((region.width(), region.height()), (2, 2));
    assert_eq!(region.pixels().get_pixel(1, 1)[0], 255);
    assert_eq!(region.pixels().get_pixel(0, 0)[2], 255);
}

#[test]
fn test_rasterize_empty_region_fails() {
    let scene = Scene::with_dimensions(4.0, 4.0);
    assert!(scene.rasterize(Rect::new(0.0, 0.0, 0.0, 4.0)).is_err());
}

#[test]
fn test_filters_change_rendered_pixels() {
    let mut scene = Scene::with_dimensions(2.0, 2.0);
    let id = scene.add(SceneObject::image(RasterImage::filled(
        2,
        2,
        Color::rgb(100, 100, 100),
    )));
    if let ObjectKind::Image { filters, .. } = &mut scene.get_mut(id).unwrap().kind {
        *filters = FilterSettings {
            brightness: 0.2,
            ..Default::default()
        };
    }
    let raster = scene.rasterize_canvas().unwrap();
    assert_eq!(raster.pixels().get_pixel(0, 0)[0], 151);
}

use image::{Rgba, RgbaImage};
use snapedit_core::Color;
use snapedit_editor::{EditorState, RasterImage, Tool};
use snapedit_settings::Config;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// 300x200 image whose six 100x100 cells have distinct red values.
fn grid_image() -> RasterImage {
    RasterImage::new(RgbaImage::from_fn(300, 200, |x, y| {
        let cell = (y / 100) * 3 + x / 100;
        Rgba([(cell * 40) as u8, 0, 0, 255])
    }))
}

fn loaded_editor() -> EditorState {
    let mut editor = EditorState::new(Config::default());
    editor.load_image(grid_image()).unwrap();
    editor
}

#[tokio::test]
async fn test_slices_are_packed_row_major() {
    let editor = loaded_editor();
    let archive = editor.grid_slice(2, 3).await.unwrap();

    assert_eq!(archive.file_name, "sliced_images_2x3.zip");
    assert_eq!(archive.entries.len(), 6);

    let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
    assert_eq!(zip.len(), 6);
    for r in 0..2u32 {
        for c in 0..3u32 {
            let name = format!("sliced_images/slice_{}_{}.png", r + 1, c + 1);
            let mut bytes = Vec::new();
            zip.by_name(&name).unwrap().read_to_end(&mut bytes).unwrap();
            let slice = RasterImage::decode(&bytes).unwrap();
            assert_eq!((slice.width(), slice.height()), (100, 100));
            assert_eq!(slice.pixels().get_pixel(50, 50)[0], ((r * 3 + c) * 40) as u8);
        }
    }
}

#[tokio::test]
async fn test_single_cell_exports_whole_canvas() {
    let editor = loaded_editor();
    let archive = editor.grid_slice(1, 1).await.unwrap();
    assert_eq!(archive.entries, vec!["sliced_images/slice_1_1.png".to_string()]);
}

#[tokio::test]
async fn test_zero_rows_or_columns_rejected() {
    let editor = loaded_editor();
    for (rows, cols) in [(0, 3), (2, 0)] {
        let err = editor.grid_slice(rows, cols).await.unwrap_err();
        assert!(matches!(
            err,
            snapedit_core::Error::Session(snapedit_core::SessionError::InvalidInput { .. })
        ));
    }
}

#[tokio::test]
async fn test_grid_finer_than_canvas_rejected() {
    let editor = loaded_editor();
    for (rows, cols, field) in [(201, 1, "rows"), (1, 301, "cols"), (70_000, 70_000, "cols")] {
        let err = editor.grid_slice(rows, cols).await.unwrap_err();
        match err {
            snapedit_core::Error::Session(snapedit_core::SessionError::InvalidInput {
                field: got,
                ..
            }) => assert_eq!(got, field),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    // One pixel per slice is still allowed.
    let archive = editor.grid_slice(200, 1).await.unwrap();
    assert_eq!(archive.entries.len(), 200);
}

#[tokio::test]
async fn test_slicing_requires_image() {
    let editor = EditorState::new(Config::default());
    assert!(editor.grid_slice(2, 2).await.unwrap_err().is_precondition());
}

#[tokio::test]
async fn test_slicing_rejected_during_crop() {
    let mut editor = EditorState::new(Config::default());
    editor
        .load_image(RasterImage::filled(40, 40, Color::WHITE))
        .unwrap();
    editor.activate(Tool::Crop).unwrap();
    assert!(editor.grid_slice(2, 2).await.unwrap_err().is_precondition());
}

#[tokio::test]
async fn test_archive_reopens_from_disk() {
    let editor = loaded_editor();
    let archive = editor.grid_slice(2, 2).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(&archive.file_name);
    std::fs::write(&path, &archive.bytes).unwrap();

    let zip = ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
    let mut names: Vec<_> = zip.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, archive.entries);
}

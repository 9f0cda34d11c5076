//! Scene rasterizer
//! Composites user content into an RGBA buffer using tiny-skia.
//!
//! Features:
//! - Anti-aliased shapes and strokes
//! - Image layers with opacity and brightness/contrast/saturation filters
//! - Text via rusttype glyph coverage
//! - Arbitrary sub-regions of the canvas (crop, grid slices)
//!
//! Scaffolding objects are never drawn.

use crate::font_manager;
use crate::raster::RasterImage;
use crate::scene::{FilterSettings, ObjectKind, Scene, SceneObject, StrokeStyle, ARROW_SEGMENTS};
use image::RgbaImage;
use rusttype::{point as rt_point, Scale};
use snapedit_core::{Color, Rect, SceneError};
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Stroke, Transform,
};

/// Renders the whole canvas.
pub fn render_scene(scene: &Scene) -> Result<RasterImage, SceneError> {
    render_region(scene, scene.canvas_rect())
}

/// Renders the user content that falls inside `region`.
///
/// The output is `region` rounded to whole pixels; pixels not covered by any
/// object stay transparent.
pub fn render_region(scene: &Scene, region: Rect) -> Result<RasterImage, SceneError> {
    let (_, _, width, height) = region.to_pixels();
    let mut pixmap = match Pixmap::new(width, height) {
        Some(p) => p,
        None => return Err(SceneError::Raster { width, height }),
    };

    let view = Transform::from_translate(-region.left as f32, -region.top as f32);
    for object in scene.user_objects() {
        draw_object(&mut pixmap, object, view);
    }

    Ok(RasterImage::new(pixmap_to_image(&pixmap)))
}

fn object_transform(object: &SceneObject, view: Transform) -> Transform {
    view.pre_translate(object.left as f32, object.top as f32)
        .pre_rotate(object.angle as f32)
        .pre_scale(object.scale_x as f32, object.scale_y as f32)
}

fn paint_for(color: Color, opacity: f64) -> Paint<'static> {
    let mut paint = Paint::default();
    let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
    paint.anti_alias = true;
    paint
}

fn stroke_for(style: &StrokeStyle) -> Stroke {
    Stroke {
        width: style.width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn draw_object(pixmap: &mut Pixmap, object: &SceneObject, view: Transform) {
    let transform = object_transform(object, view);
    let opacity = object.opacity;

    match &object.kind {
        ObjectKind::Image { raster, filters } => {
            let source = if filters.is_identity() {
                image_to_pixmap(raster.pixels())
            } else {
                image_to_pixmap(&apply_filters(raster.pixels(), filters))
            };
            if let Some(layer) = source {
                let paint = PixmapPaint {
                    opacity: opacity.clamp(0.0, 1.0) as f32,
                    quality: tiny_skia::FilterQuality::Bilinear,
                    ..Default::default()
                };
                pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, transform, None);
            }
        }
        ObjectKind::Rect {
            width,
            height,
            fill,
            stroke,
        } => {
            if let Some(r) = tiny_skia::Rect::from_xywh(0.0, 0.0, *width as f32, *height as f32) {
                let path = PathBuilder::from_rect(r);
                if fill.a > 0 {
                    pixmap.fill_path(&path, &paint_for(*fill, opacity), FillRule::Winding, transform, None);
                }
                if let Some(style) = stroke {
                    pixmap.stroke_path(&path, &paint_for(style.color, opacity), &stroke_for(style), transform, None);
                }
            }
        }
        ObjectKind::Circle {
            radius,
            fill,
            stroke,
        } => {
            let r = *radius as f32;
            if let Some(path) = PathBuilder::from_circle(r, r, r) {
                if fill.a > 0 {
                    pixmap.fill_path(&path, &paint_for(*fill, opacity), FillRule::Winding, transform, None);
                }
                if let Some(style) = stroke {
                    pixmap.stroke_path(&path, &paint_for(style.color, opacity), &stroke_for(style), transform, None);
                }
            }
        }
        ObjectKind::Arrow { stroke } => {
            let mut pb = PathBuilder::new();
            for (from, to) in ARROW_SEGMENTS {
                pb.move_to(from.x as f32, from.y as f32);
                pb.line_to(to.x as f32, to.y as f32);
            }
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint_for(stroke.color, opacity), &stroke_for(stroke), transform, None);
            }
        }
        ObjectKind::Path { points, stroke } => {
            let paint = paint_for(stroke.color, opacity);
            match points.as_slice() {
                [] => {}
                [dot] => {
                    // A single click leaves a round dab the size of the brush.
                    if let Some(path) =
                        PathBuilder::from_circle(dot.x as f32, dot.y as f32, (stroke.width / 2.0) as f32)
                    {
                        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                    }
                }
                [first, rest @ ..] => {
                    let mut pb = PathBuilder::new();
                    pb.move_to(first.x as f32, first.y as f32);
                    for p in rest {
                        pb.line_to(p.x as f32, p.y as f32);
                    }
                    if let Some(path) = pb.finish() {
                        pixmap.stroke_path(&path, &paint, &stroke_for(stroke), transform, None);
                    }
                }
            }
        }
        ObjectKind::Text {
            text,
            font_size,
            font_family,
            fill,
            background,
            ..
        } => {
            let (w, h) = object.local_size();
            let Some(mut layer) = Pixmap::new(w.ceil().max(1.0) as u32, h.ceil().max(1.0) as u32)
            else {
                return;
            };
            if let Some(bg) = background {
                layer.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
            }
            draw_text(&mut layer, text, *font_size, font_family, *fill);

            let origin = object.local_origin();
            let paint = PixmapPaint {
                opacity: opacity.clamp(0.0, 1.0) as f32,
                ..Default::default()
            };
            let placed = transform.pre_translate(origin.x as f32, origin.y as f32);
            pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, placed, None);
        }
    }
}

fn draw_text(layer: &mut Pixmap, text: &str, font_size: f64, family: &str, fill: Color) {
    let Some(font) = font_manager::font_for(family) else {
        return;
    };
    let scale = Scale::uniform(font_size as f32);
    let v_metrics = font.v_metrics(scale);
    let line_height = (font_size * 1.16) as f32;
    let width = layer.width() as i32;
    let height = layer.height() as i32;

    for (line_no, line) in text.lines().enumerate() {
        let start = rt_point(0.0, line_no as f32 * line_height + v_metrics.ascent);
        for glyph in font.layout(line, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let idx = (py * width + px) as usize;
                let dst = &mut layer.pixels_mut()[idx];
                *dst = blend_over(*dst, fill, coverage);
            });
        }
    }
}

/// Source-over of `color` at `coverage` onto a premultiplied pixel.
fn blend_over(dst: PremultipliedColorU8, color: Color, coverage: f32) -> PremultipliedColorU8 {
    let sa = color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    let inv = 1.0 - sa;
    let a = sa * 255.0 + dst.alpha() as f32 * inv;
    let channel = |c: u8, d: u8| (c as f32 * sa + d as f32 * inv).min(a).round() as u8;
    let out_a = a.round() as u8;
    PremultipliedColorU8::from_rgba(
        channel(color.r, dst.red()).min(out_a),
        channel(color.g, dst.green()).min(out_a),
        channel(color.b, dst.blue()).min(out_a),
        out_a,
    )
    .unwrap_or(dst)
}

/// Applies brightness, contrast and saturation in that order.
pub fn apply_filters(src: &RgbaImage, filters: &FilterSettings) -> RgbaImage {
    let brightness = (filters.brightness * 255.0).round();
    let contrast = (filters.contrast * 255.0).floor();
    let contrast_factor = 259.0 * (contrast + 255.0) / (255.0 * (259.0 - contrast));
    let adjust = -filters.saturation;

    let mut out = src.clone();
    for px in out.pixels_mut() {
        let mut rgb = [px[0] as f64, px[1] as f64, px[2] as f64];

        if filters.brightness != 0.0 {
            for c in rgb.iter_mut() {
                *c = (*c + brightness).clamp(0.0, 255.0);
            }
        }
        if filters.contrast != 0.0 {
            for c in rgb.iter_mut() {
                *c = (contrast_factor * (*c - 128.0) + 128.0).clamp(0.0, 255.0);
            }
        }
        if filters.saturation != 0.0 {
            let max = rgb[0].max(rgb[1]).max(rgb[2]);
            for c in rgb.iter_mut() {
                if *c != max {
                    *c = (*c + (max - *c) * adjust).clamp(0.0, 255.0);
                }
            }
        }

        px[0] = rgb[0].round() as u8;
        px[1] = rgb[1].round() as u8;
        px[2] = rgb[2].round() as u8;
    }
    out
}

fn image_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    img
}

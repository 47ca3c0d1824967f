use super::*;
use crate::{
    foundation::core::{Canvas, Size},
    geometry::config::{FitMode, GeometryConfig},
};

fn solid(w: u32, h: u32, px: [u8; 4]) -> PremulImage {
    PremulImage::from_straight(RgbaImage::from_pixel(w, h, Rgba(px)))
}

#[test]
fn empty_layout_renders_marked_placeholder() {
    let canvas = Canvas::new(64, 48);
    let layout = FrameLayout::compute(canvas, None, None, &GeometryConfig::default());
    let out = compose(&layout, None, None, Rgb8::BACKDROP);
    assert!(out.placeholder);
    assert_eq!(out.image.dimensions(), (64, 48));
    assert_eq!(out.image.get_pixel(0, 0).0, [0x11, 0x11, 0x11, 255]);
    assert_eq!(out.image.get_pixel(32, 24).0, PLACEHOLDER_MARK);
}

#[test]
fn same_size_fill_copies_photo_exactly() {
    let mut img = RgbaImage::new(4, 3);
    for (x, y, p) in img.enumerate_pixels_mut() {
        *p = Rgba([(x * 60) as u8, (y * 80) as u8, 7, 255]);
    }
    let photo = PremulImage::from_straight(img.clone());
    let canvas = Canvas::new(4, 3);
    let cfg = GeometryConfig {
        fit_mode: FitMode::Fill,
        ..GeometryConfig::default()
    };
    let layout = FrameLayout::compute(canvas, Some(Size::new(4.0, 3.0)), None, &cfg);
    let out = compose(&layout, Some(&photo), None, Rgb8::BACKDROP);
    assert!(!out.placeholder);
    assert_eq!(out.image, img);
}

#[test]
fn contain_leaves_backdrop_bands() {
    let photo = solid(200, 100, [255, 0, 0, 255]);
    let canvas = Canvas::new(100, 100);
    let cfg = GeometryConfig {
        fit_mode: FitMode::Contain,
        ..GeometryConfig::default()
    };
    let layout = FrameLayout::compute(canvas, Some(Size::new(200.0, 100.0)), None, &cfg);
    let out = compose(&layout, Some(&photo), None, Rgb8::BACKDROP);
    assert_eq!(out.image.get_pixel(50, 5).0, [0x11, 0x11, 0x11, 255]);
    assert_eq!(out.image.get_pixel(50, 50).0, [255, 0, 0, 255]);
    assert_eq!(out.image.get_pixel(50, 95).0, [0x11, 0x11, 0x11, 255]);
}

#[test]
fn transparent_overlay_hole_shows_photo() {
    let photo = solid(10, 10, [0, 0, 255, 255]);
    let mut frame = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
    for y in 3..7 {
        for x in 3..7 {
            frame.put_pixel(x, y, Rgba([0, 0, 0, 0]));
        }
    }
    let overlay = PremulImage::from_straight(frame);
    let canvas = Canvas::new(10, 10);
    let layout = FrameLayout::compute(
        canvas,
        Some(Size::new(10.0, 10.0)),
        Some(Size::new(10.0, 10.0)),
        &GeometryConfig::default(),
    );
    let out = compose(&layout, Some(&photo), Some(&overlay), Rgb8::BACKDROP);
    assert_eq!(out.image.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(out.image.get_pixel(5, 5).0, [0, 0, 255, 255]);
}

#[test]
fn overlay_only_renders_without_photo() {
    let overlay = solid(4, 4, [0, 255, 0, 255]);
    let canvas = Canvas::new(8, 8);
    let layout = FrameLayout::compute(
        canvas,
        None,
        Some(Size::new(4.0, 4.0)),
        &GeometryConfig {
            scale: 0.5,
            ..GeometryConfig::default()
        },
    );
    let out = compose(&layout, None, Some(&overlay), Rgb8::BACKDROP);
    assert!(!out.placeholder);
    assert_eq!(out.image.get_pixel(0, 0).0, [0x11, 0x11, 0x11, 255]);
    assert_eq!(out.image.get_pixel(4, 4).0, [0, 255, 0, 255]);
}

#[test]
fn huge_or_offscreen_rects_do_not_panic() {
    let overlay = solid(2, 2, [9, 9, 9, 255]);
    let mut dst = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
    draw_image_rect(&mut dst, &overlay, Rect::new(-1e9, -1e9, 1e9, 1e9));
    assert_eq!(dst.get_pixel(8, 8).0, [9, 9, 9, 255]);

    let mut dst = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
    draw_image_rect(&mut dst, &overlay, Rect::new(100.0, 100.0, 200.0, 200.0));
    draw_image_rect(&mut dst, &overlay, Rect::new(4.0, 4.0, 2.0, 2.0));
    draw_image_rect(&mut dst, &overlay, Rect::new(f64::NAN, 0.0, 4.0, 4.0));
    assert!(dst.pixels().all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn pixel_span_uses_pixel_centers() {
    assert_eq!(pixel_span(0.0, 10.0, 10), Some((0, 10)));
    assert_eq!(pixel_span(-5.0, 2.4, 10), Some((0, 2)));
    assert_eq!(pixel_span(2.6, 2.9, 10), None);
    assert_eq!(pixel_span(9.7, 50.0, 10), None);
}

#[test]
fn render_frame_sizes_original_canvas_by_purpose() {
    let photo = solid(4000, 2000, [10, 20, 30, 255]);
    let cfg = GeometryConfig {
        canvas_mode: crate::geometry::config::CanvasMode::Original,
        ..GeometryConfig::default()
    };
    let preview = render_frame(
        Some(&photo),
        None,
        &cfg,
        SizingPurpose::Preview { max_long_edge: 400 },
        Rgb8::BACKDROP,
    );
    assert_eq!(preview.image.dimensions(), (400, 200));
    assert_eq!(preview.image.get_pixel(200, 100).0, [10, 20, 30, 255]);

    let square = render_frame(None, None, &GeometryConfig::default(), SizingPurpose::Export, Rgb8::BACKDROP);
    assert!(square.placeholder);
    assert_eq!(square.image.dimensions(), (1080, 1080));
}

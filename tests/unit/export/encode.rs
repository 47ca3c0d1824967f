use super::*;

fn gradient(w: u32, h: u32, alpha: u8) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| image::Rgba([(x * 7) as u8, (y * 11) as u8, 90, alpha]))
}

#[test]
fn quality_is_validated() {
    assert!(OutputFormat::Jpeg { quality: 0.0 }.validate().is_err());
    assert!(OutputFormat::Jpeg { quality: 1.5 }.validate().is_err());
    assert!(OutputFormat::Jpeg { quality: f32::NAN }.validate().is_err());
    assert!(OutputFormat::FILTER_JPEG.validate().is_ok());
    assert_eq!(jpeg_quality(0.9), 90);
    assert_eq!(jpeg_quality(0.92), 92);
}

#[test]
fn jpeg_output_decodes_at_same_size() {
    let bytes = encode_image(&gradient(33, 17, 255), OutputFormat::FRAME_JPEG, Rgb8::BACKDROP).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let back = image::load_from_memory(&bytes).unwrap();
    assert_eq!((back.width(), back.height()), (33, 17));
}

#[test]
fn png_output_is_lossless_with_alpha() {
    let src = gradient(8, 8, 77);
    let bytes = encode_image(&src, OutputFormat::Png, Rgb8::BACKDROP).unwrap();
    let back = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(back, src);
}

#[test]
fn empty_surface_is_an_encode_error() {
    let err = encode_image(&RgbaImage::new(0, 4), OutputFormat::Png, Rgb8::BACKDROP).unwrap_err();
    assert!(err.to_string().starts_with("encode error:"));
}

#[test]
fn flatten_blends_straight_alpha_over_background() {
    let src = RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 128]));
    let out = flatten_to_rgb8(&src, Rgb8::new(0, 0, 0));
    assert_eq!(out.get_pixel(0, 0).0, [128, 0, 0]);

    let clear = RgbaImage::from_pixel(1, 1, image::Rgba([200, 200, 200, 0]));
    assert_eq!(flatten_to_rgb8(&clear, Rgb8::BACKDROP).get_pixel(0, 0).0, [0x11; 3]);
}

#[test]
fn format_serializes_with_tag() {
    let json = serde_json::to_string(&OutputFormat::FRAME_JPEG).unwrap();
    assert_eq!(json, r#"{"format":"jpeg","quality":0.9}"#);
    let png: OutputFormat = serde_json::from_str(r#"{"format":"png"}"#).unwrap();
    assert_eq!(png, OutputFormat::Png);
}

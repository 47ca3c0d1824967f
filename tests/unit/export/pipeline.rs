use std::io::Cursor;

use image::RgbaImage;

use super::*;
use crate::{
    assets::store::{AttachedConfig, PhotoAsset},
    export::job::JobEvent,
};

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, image::Rgba(px)))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn entry<C: AssetConfig>(name: &str, bytes: Vec<u8>, config: C) -> StoreEntry<C> {
    StoreEntry {
        asset: PhotoAsset::new(name, bytes),
        config,
        attached: AttachedConfig::Absent,
    }
}

#[test]
fn settings_defaults_and_json() {
    let frame = ExportSettings::default();
    assert_eq!(frame.output, OutputFormat::Jpeg { quality: 0.9 });
    assert_eq!(frame.background, Rgb8::BACKDROP);
    assert_eq!(frame.preview_max_long_edge, 1920);
    assert_eq!(ExportSettings::filter().output, OutputFormat::Jpeg { quality: 0.92 });

    let parsed = ExportSettings::from_json(
        r##"{"output":{"format":"png"},"background":"#000000","previewMaxLongEdge":800}"##,
    )
    .unwrap();
    assert_eq!(parsed.output, OutputFormat::Png);
    assert_eq!(parsed.background, Rgb8::new(0, 0, 0));
    assert_eq!(parsed.preview_purpose(), SizingPurpose::Preview { max_long_edge: 800 });

    assert!(ExportSettings::from_json(r#"{"previewMaxLongEdge":0}"#).is_err());
    assert!(ExportSettings::from_json(r#"{"output":{"format":"jpeg","quality":2}}"#).is_err());
}

#[test]
fn bad_overlay_bytes_fail_the_whole_job() {
    let items = vec![entry("a.png", png(8, 8, [1, 2, 3, 255]), GeometryConfig::default())];
    let overlay = OverlaySource::Encoded {
        name: "frame.png".to_string(),
        bytes: Arc::from(&b"garbage"[..]),
    };
    let events: Vec<_> = spawn_frame_export(items, overlay, ExportSettings::frame())
        .unwrap()
        .collect();
    assert_eq!(events.len(), 1, "no progress before a setup failure");
    match &events[0] {
        JobEvent::Error { reason } => assert!(reason.contains("overlay unusable")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn invalid_settings_fail_before_any_asset() {
    let items = vec![entry("a.png", png(4, 4, [0, 0, 0, 255]), ColorConfig::default())];
    let settings = ExportSettings {
        output: OutputFormat::Jpeg { quality: 0.0 },
        ..ExportSettings::filter()
    };
    let err = spawn_filter_export(items, settings).unwrap().wait(|_, _| {}).unwrap_err();
    assert!(err.to_string().contains("jpeg quality"));
}

#[test]
fn png_filter_export_is_lossless_for_identity_config() {
    let bytes = png(5, 3, [90, 120, 150, 255]);
    let items = vec![entry("shot.png", bytes, ColorConfig::default())];
    let settings = ExportSettings {
        output: OutputFormat::Png,
        ..ExportSettings::filter()
    };
    let archive = spawn_filter_export(items, settings).unwrap().wait(|_, _| {}).unwrap();
    assert_eq!(archive.entries, vec!["001_shot.png".to_string()]);
    assert!(archive.skipped.is_empty());

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
    let mut data = Vec::new();
    std::io::Read::read_to_end(&mut zip.by_index(0).unwrap(), &mut data).unwrap();
    let out = image::load_from_memory(&data).unwrap().to_rgba8();
    assert!(out.pixels().all(|p| p.0 == [90, 120, 150, 255]));
}

#[test]
fn empty_job_completes_with_empty_archive() {
    let archive = spawn_frame_export(Vec::new(), OverlaySource::None, ExportSettings::frame())
        .unwrap()
        .wait(|_, _| panic!("no progress expected"))
        .unwrap();
    assert!(archive.entries.is_empty());
    assert!(!archive.bytes.is_empty());
}

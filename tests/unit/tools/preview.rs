use std::io::Cursor;

use image::RgbaImage;

use super::*;

fn png(px: [u8; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, image::Rgba(px)))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn failed_overlay_decode_keeps_previous() {
    let mut slot = OverlaySlot::new();
    let first = slot.set("a.png", &png([0, 0, 0, 0])).unwrap();
    assert!(slot.set("b.png", b"junk").is_err());
    assert!(Arc::ptr_eq(&slot.get().unwrap(), &first));
}

#[test]
fn swap_does_not_disturb_held_snapshots() {
    let mut slot = OverlaySlot::new();
    slot.set("a.png", &png([255, 0, 0, 128])).unwrap();
    let held = slot.get().unwrap();
    slot.set("b.png", &png([0, 255, 0, 128])).unwrap();
    assert_eq!(held.name(), "a.png");
    assert_eq!(slot.get().unwrap().name(), "b.png");
    assert_eq!(slot.clear().unwrap().name(), "b.png");
    assert!(!slot.is_set());
}

#[test]
fn only_the_newest_ticket_is_shown() {
    let mut latest = LatestRender::new();
    let old = latest.issue();
    let new = latest.issue();
    assert!(old < new);

    assert!(latest.offer(new, "new"));
    assert!(!latest.offer(old, "old"), "late stale result must not replace newer output");
    assert_eq!(latest.shown(), Some(&"new"));

    let newer = latest.issue();
    assert!(!latest.offer(new, "again"));
    assert!(latest.offer(newer, "newer"));
    latest.clear();
    assert_eq!(latest.shown(), None);
}

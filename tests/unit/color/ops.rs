use super::*;

fn params(f: impl FnOnce(&mut ColorParams)) -> ColorParams {
    let mut p = ColorParams::default();
    f(&mut p);
    p
}

#[test]
fn neutral_params_are_exact_identity_per_pixel() {
    let p = ColorParams::default();
    for v in 0..=255u8 {
        let px = [v, 255 - v, v / 2, 200];
        assert_eq!(grade_pixel(px, &p, None), px);
    }
}

#[test]
fn neutral_image_is_copied_verbatim() {
    let src = RgbaImage::from_fn(7, 5, |x, y| image::Rgba([x as u8 * 30, y as u8 * 40, 9, 128]));
    let mut dst = RgbaImage::new(1, 1);
    grade_image(&src, &ColorParams::default(), None, &mut dst);
    assert_eq!(dst, src);
}

#[test]
fn render_order_puts_lut_last_after_clamp() {
    assert_eq!(RENDER_ORDER[0], Stage::Exposure);
    assert_eq!(RENDER_ORDER[6], Stage::Clamp);
    assert_eq!(RENDER_ORDER[7], Stage::Lut);
}

#[test]
fn lut_sees_adjusted_values() {
    // A constant grid discards its input, so nothing before it can leak through.
    let lut = Lut3d::from_table(2, vec![[0.2, 0.4, 0.6]; 8]).unwrap();
    let p = params(|p| {
        p.exposure = 3.0;
        p.contrast = 50.0;
    });
    assert_eq!(grade_pixel([10, 20, 30, 77], &p, Some(&lut)), [51, 102, 153, 77]);

    // Inverting grid: brightening first must darken the result.
    let mut inv = Vec::new();
    for b in 0..2 {
        for g in 0..2 {
            for r in 0..2 {
                inv.push([1.0 - r as f32, 1.0 - g as f32, 1.0 - b as f32]);
            }
        }
    }
    let inv = Lut3d::from_table(2, inv).unwrap();
    let plain = grade_pixel([100, 100, 100, 255], &ColorParams::default(), Some(&inv));
    let bright = grade_pixel([100, 100, 100, 255], &params(|p| p.exposure = 1.0), Some(&inv));
    assert!(bright[0] < plain[0]);
}

#[test]
fn saturation_floor_is_grayscale() {
    let out = grade_pixel([200, 40, 90, 255], &params(|p| p.saturation = -100.0), None);
    assert_eq!(out[0], out[1]);
    assert_eq!(out[1], out[2]);
}

#[test]
fn exposure_and_contrast_move_in_expected_directions() {
    let up = grade_pixel([128, 128, 128, 255], &params(|p| p.exposure = 1.0), None);
    let down = grade_pixel([128, 128, 128, 255], &params(|p| p.exposure = -1.0), None);
    assert!(up[0] > 128 && down[0] < 128);

    let c = params(|p| p.contrast = 50.0);
    assert!(grade_pixel([200, 200, 200, 255], &c, None)[0] > 200);
    assert!(grade_pixel([50, 50, 50, 255], &c, None)[0] < 50);
}

#[test]
fn white_balance_shifts_channels() {
    let warm = grade_pixel([128, 128, 128, 255], &params(|p| p.temperature = 100.0), None);
    assert!(warm[0] > 128 && warm[2] < 128);
    assert_eq!(warm[1], 128);

    let magenta = grade_pixel([128, 128, 128, 255], &params(|p| p.tint = 100.0), None);
    assert!(magenta[1] < 128);
}

#[test]
fn vibrance_favours_muted_pixels() {
    let p = params(|p| p.vibrance = 100.0);
    let spread = |px: [u8; 4]| f32::from(px[0]) - f32::from(px[2]);
    let ratio = |px: [u8; 4]| spread(grade_pixel(px, &p, None)) / spread(px);

    let muted = ratio([140, 128, 120, 255]);
    let vivid = ratio([230, 40, 20, 255]);
    assert!(muted > 1.5, "muted ratio {muted}");
    assert!(vivid < muted, "vivid ratio {vivid} vs muted {muted}");
}

#[test]
fn shadows_lift_dark_pixels_more_than_bright() {
    let p = params(|p| p.shadows = 100.0);
    let lift = |v: u8| i32::from(grade_pixel([v, v, v, 255], &p, None)[0]) - i32::from(v);
    assert!(lift(20) > lift(235));
    assert!(lift(20) > 0);
}

#[test]
fn image_grading_matches_pixel_grading_and_keeps_alpha() {
    let src = RgbaImage::from_fn(9, 4, |x, y| {
        image::Rgba([x as u8 * 25, 200 - y as u8 * 30, 60, 10 + x as u8])
    });
    let p = params(|p| {
        p.exposure = 0.5;
        p.saturation = 20.0;
    });
    let lut = Lut3d::identity(5);
    let mut dst = RgbaImage::new(0, 0);
    grade_image(&src, &p, Some(&lut), &mut dst);
    assert_eq!(dst.dimensions(), src.dimensions());
    for (s, d) in src.pixels().zip(dst.pixels()) {
        assert_eq!(d.0, grade_pixel(s.0, &p, Some(&lut)));
        assert_eq!(d.0[3], s.0[3]);
    }
}

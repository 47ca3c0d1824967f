use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_leaves_opaque_and_zeroes_transparent() {
    let mut px = vec![100, 50, 200, 255, 100, 50, 200, 0, 100, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[100, 50, 200, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(
        &px[8..12],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}

#[test]
fn over_handles_alpha_extremes() {
    let dst = [17, 17, 17, 255];
    assert_eq!(over(dst, [255, 255, 255, 0]), dst);
    assert_eq!(over(dst, [255, 0, 0, 255]), [255, 0, 0, 255]);
    let half = over([0, 0, 0, 255], [128, 0, 0, 128]);
    assert_eq!(half[3], 255);
    assert_eq!(half[0], 128);
}

#[test]
fn srgb_roundtrip_is_stable_on_u8_grid() {
    for v in 0u8..=255 {
        let f = f32::from(v) / 255.0;
        assert_eq!(unit_to_u8(linear_to_srgb(srgb_to_linear(f))), v);
    }
}

#[test]
fn luma_of_white_is_one() {
    assert!((luma([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
}

//! Per-pixel grading math.
//!
//! Values are sRGB-encoded floats in `0..=1`. Exposure round-trips through linear light; every
//! other stage works on the encoded values directly.

use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    color::{lut::Lut3d, params::ColorParams},
    foundation::math::{linear_to_srgb, luma, srgb_to_linear, unit_to_u8},
};

/// White-balance shift at full slider travel.
const WB_SHIFT: f32 = 0.1;
/// Highlight/shadow offset at full slider travel.
const TONE_SHIFT: f32 = 0.5;

/// A grading stage. [`RENDER_ORDER`] is part of the observable output; reordering it changes
/// rendered pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Exposure,
    WhiteBalance,
    Tone,
    Contrast,
    Saturation,
    Vibrance,
    Clamp,
    Lut,
}

/// Fixed stage order shared by preview, export and transfer.
pub const RENDER_ORDER: [Stage; 8] = [
    Stage::Exposure,
    Stage::WhiteBalance,
    Stage::Tone,
    Stage::Contrast,
    Stage::Saturation,
    Stage::Vibrance,
    Stage::Clamp,
    Stage::Lut,
];

/// Resolved coefficients for one render; neutral stages resolve to `None` and are skipped.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Grade {
    exposure_gain: Option<f32>,
    white_balance: Option<(f32, f32)>,
    tone: Option<(f32, f32)>,
    contrast: Option<f32>,
    saturation: Option<f32>,
    vibrance: Option<f32>,
}

impl Grade {
    pub(crate) fn new(p: &ColorParams) -> Self {
        let nonzero = |v: f32| (v != 0.0).then_some(v);
        Self {
            exposure_gain: nonzero(p.exposure).map(|ev| 2f32.powf(ev)),
            white_balance: (p.temperature != 0.0 || p.tint != 0.0).then(|| {
                (
                    p.temperature / 100.0 * WB_SHIFT,
                    p.tint / 100.0 * WB_SHIFT,
                )
            }),
            tone: (p.highlights != 0.0 || p.shadows != 0.0).then(|| {
                (
                    p.highlights / 100.0 * TONE_SHIFT,
                    p.shadows / 100.0 * TONE_SHIFT,
                )
            }),
            contrast: nonzero(p.contrast).map(|c| 1.0 + c / 100.0),
            saturation: nonzero(p.saturation).map(|s| 1.0 + s / 100.0),
            vibrance: nonzero(p.vibrance).map(|v| v / 100.0),
        }
    }

    fn stage(&self, stage: Stage, c: [f32; 3], lut: Option<&Lut3d>) -> [f32; 3] {
        match stage {
            Stage::Exposure => match self.exposure_gain {
                Some(gain) => c.map(|v| linear_to_srgb(srgb_to_linear(v) * gain)),
                None => c,
            },
            Stage::WhiteBalance => match self.white_balance {
                Some((temp, tint)) => [c[0] + temp, c[1] - tint, c[2] - temp],
                None => c,
            },
            Stage::Tone => match self.tone {
                Some((highlights, shadows)) => {
                    let lum = luma(c).clamp(0.0, 1.0);
                    let shadow_w = (1.0 - lum) * (1.0 - lum);
                    let highlight_w = lum * lum;
                    let adj = shadow_w * shadows + highlight_w * highlights;
                    c.map(|v| v + adj)
                }
                None => c,
            },
            Stage::Contrast => match self.contrast {
                Some(f) => c.map(|v| (v - 0.5) * f + 0.5),
                None => c,
            },
            Stage::Saturation => match self.saturation {
                Some(f) => {
                    let lum = luma(c);
                    c.map(|v| lum + (v - lum) * f)
                }
                None => c,
            },
            Stage::Vibrance => match self.vibrance {
                Some(amount) => {
                    let lum = luma(c);
                    let max = c[0].max(c[1]).max(c[2]);
                    let min = c[0].min(c[1]).min(c[2]);
                    let chroma = (max - min).clamp(0.0, 1.0);
                    let f = 1.0 + amount * (1.0 - chroma);
                    c.map(|v| lum + (v - lum) * f)
                }
                None => c,
            },
            Stage::Clamp => c.map(|v| v.clamp(0.0, 1.0)),
            Stage::Lut => match lut {
                Some(lut) => lut.sample(c),
                None => c,
            },
        }
    }

    pub(crate) fn apply(&self, rgb: [f32; 3], lut: Option<&Lut3d>) -> [f32; 3] {
        RENDER_ORDER
            .iter()
            .fold(rgb, |c, &stage| self.stage(stage, c, lut))
    }
}

/// Grade one straight-alpha RGBA8 pixel. Alpha passes through untouched.
pub fn grade_pixel(px: [u8; 4], params: &ColorParams, lut: Option<&Lut3d>) -> [u8; 4] {
    grade_with(&Grade::new(params), px, lut)
}

fn grade_with(grade: &Grade, px: [u8; 4], lut: Option<&Lut3d>) -> [u8; 4] {
    let rgb = [
        f32::from(px[0]) / 255.0,
        f32::from(px[1]) / 255.0,
        f32::from(px[2]) / 255.0,
    ];
    let out = grade.apply(rgb, lut);
    [unit_to_u8(out[0]), unit_to_u8(out[1]), unit_to_u8(out[2]), px[3]]
}

/// Grade `src` into `dst` (resized as needed). All-neutral params without a LUT copy verbatim.
pub fn grade_image(src: &RgbaImage, params: &ColorParams, lut: Option<&Lut3d>, dst: &mut RgbaImage) {
    if dst.dimensions() != src.dimensions() {
        *dst = RgbaImage::new(src.width(), src.height());
    }
    if params.is_neutral() && lut.is_none() {
        dst.copy_from_slice(src.as_raw());
        return;
    }

    let grade = Grade::new(params);
    let out: &mut [u8] = dst;
    out.par_chunks_mut(4)
        .zip(src.as_raw().par_chunks(4))
        .for_each(|(d, s)| {
            let px = grade_with(&grade, [s[0], s[1], s[2], s[3]], lut);
            d.copy_from_slice(&px);
        });
}

#[cfg(test)]
#[path = "../../tests/unit/color/ops.rs"]
mod tests;

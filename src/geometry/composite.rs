use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::{
    assets::decode::PremulImage,
    foundation::{
        core::{Rect, Rgb8, Size},
        math::{lerp, over},
    },
    geometry::{
        config::GeometryConfig,
        layout::{FrameLayout, SizingPurpose, resolve_canvas},
    },
};

/// Marker color used for the empty-canvas placeholder.
const PLACEHOLDER_MARK: [u8; 4] = [0x55, 0x55, 0x55, 255];

/// A rasterized Frame composite. Pixels are opaque, so premultiplied and straight alpha agree.
#[derive(Clone, Debug)]
pub struct Composite {
    pub image: RgbaImage,
    /// Neither a photo nor an overlay was available; `image` is the marked placeholder.
    pub placeholder: bool,
}

/// Paint backdrop, photo, then overlay into a fresh canvas.
///
/// Either layer may be missing. With both missing, a centered marker is drawn on the backdrop
/// and the result is flagged as a placeholder.
#[tracing::instrument(level = "trace", skip_all, fields(w = layout.canvas.width, h = layout.canvas.height))]
pub fn compose(
    layout: &FrameLayout,
    photo: Option<&PremulImage>,
    overlay: Option<&PremulImage>,
    background: Rgb8,
) -> Composite {
    let canvas = layout.canvas;
    let mut image = RgbaImage::from_pixel(canvas.width, canvas.height, Rgba(background.to_rgba()));

    let mut drew = false;
    if let (Some(rect), Some(src)) = (layout.photo, photo) {
        draw_image_rect(&mut image, src, rect);
        drew = true;
    }
    if let (Some(rect), Some(src)) = (layout.overlay, overlay) {
        draw_image_rect(&mut image, src, rect);
        drew = true;
    }

    if !drew {
        paint_placeholder(&mut image);
    }
    Composite {
        image,
        placeholder: !drew,
    }
}

/// Resolve the canvas and layout for one photo, then compose. Preview and export both render
/// through here; only `purpose` differs.
pub fn render_frame(
    photo: Option<&PremulImage>,
    overlay: Option<&PremulImage>,
    cfg: &GeometryConfig,
    purpose: SizingPurpose,
    background: Rgb8,
) -> Composite {
    let natural = photo.map(|p| (p.width(), p.height()));
    let canvas = resolve_canvas(cfg.canvas_mode, natural, purpose);
    let size_of = |img: &PremulImage| Size::new(f64::from(img.width()), f64::from(img.height()));
    let layout = FrameLayout::compute(canvas, photo.map(size_of), overlay.map(size_of), cfg);
    compose(&layout, photo, overlay, background)
}

fn paint_placeholder(image: &mut RgbaImage) {
    let (w, h) = image.dimensions();
    let side = (w.min(h) / 8).max(1);
    let x0 = (w - side.min(w)) / 2;
    let y0 = (h - side.min(h)) / 2;
    for y in y0..(y0 + side).min(h) {
        for x in x0..(x0 + side).min(w) {
            image.put_pixel(x, y, Rgba(PLACEHOLDER_MARK));
        }
    }
}

/// Draw `src` stretched into `rect` with bilinear sampling, source-over onto `dst`.
///
/// Only destination pixels whose centers fall inside both `rect` and `dst` are touched, so the
/// cost is bounded by the canvas size however large `rect` is.
pub(crate) fn draw_image_rect(dst: &mut RgbaImage, src: &PremulImage, rect: Rect) {
    let src = src.as_image();
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return;
    }
    let finite = rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite();
    if !finite || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }

    let (dw, dh) = dst.dimensions();
    let Some((x_lo, x_hi)) = pixel_span(rect.x0, rect.x1, dw) else {
        return;
    };
    let Some((y_lo, y_hi)) = pixel_span(rect.y0, rect.y1, dh) else {
        return;
    };

    let sx = f64::from(sw) / rect.width();
    let sy = f64::from(sh) / rect.height();
    let stride = dw as usize * 4;

    let raw: &mut [u8] = dst;
    raw.par_chunks_mut(stride)
        .enumerate()
        .skip(y_lo as usize)
        .take((y_hi - y_lo) as usize)
        .for_each(|(y, row)| {
            let v = (y as f64 + 0.5 - rect.y0) * sy - 0.5;
            for x in x_lo..x_hi {
                let u = (f64::from(x) + 0.5 - rect.x0) * sx - 0.5;
                let px = sample_bilinear(src, u, v);
                let i = x as usize * 4;
                let out = over([row[i], row[i + 1], row[i + 2], row[i + 3]], px);
                row[i..i + 4].copy_from_slice(&out);
            }
        });
}

/// Half-open range of pixel indices in `0..extent` whose centers lie in `[lo, hi)`.
fn pixel_span(lo: f64, hi: f64, extent: u32) -> Option<(u32, u32)> {
    let first = (lo - 0.5).ceil().max(0.0);
    let end = (hi - 0.5).ceil().min(f64::from(extent));
    if end <= first {
        return None;
    }
    Some((first as u32, end as u32))
}

fn sample_bilinear(src: &RgbaImage, u: f64, v: f64) -> [u8; 4] {
    let (sw, sh) = src.dimensions();
    let u = u.clamp(0.0, f64::from(sw - 1));
    let v = v.clamp(0.0, f64::from(sh - 1));
    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(sw - 1);
    let y1 = (y0 + 1).min(sh - 1);
    let tx = (u - f64::from(x0)) as f32;
    let ty = (v - f64::from(y0)) as f32;

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = lerp(f32::from(p00[c]), f32::from(p10[c]), tx);
        let bottom = lerp(f32::from(p01[c]), f32::from(p11[c]), tx);
        out[c] = lerp(top, bottom, ty).round().clamp(0.0, 255.0) as u8;
    }
    // Premultiplied invariant: color never exceeds alpha.
    for c in 0..3 {
        out[c] = out[c].min(out[3]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/composite.rs"]
mod tests;

//! Pure placement math for Frame composites. No pixels, no IO.
//!
//! All rectangles are in canvas pixel space with the origin at the top-left corner. Rectangles
//! may extend past the canvas (cover fit, scaled-up or panned overlays); clipping is the
//! rasterizer's job.

use crate::{
    foundation::core::{Canvas, Rect, Size},
    geometry::config::{CanvasMode, FitMode, GeometryConfig},
};

pub const SQUARE: Canvas = Canvas::new(1080, 1080);
pub const PORTRAIT: Canvas = Canvas::new(1080, 1350);
pub const LANDSCAPE: Canvas = Canvas::new(1920, 1080);
pub const STORY: Canvas = Canvas::new(1080, 1920);

/// Whether dimensions are resolved for a full-resolution export or for the live preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizingPurpose {
    Export,
    /// Preview renders of `original` are bounded on their long edge.
    Preview { max_long_edge: u32 },
}

/// Resolve the output canvas for a preset. `photo` is the active photo's natural size, if known.
pub fn resolve_canvas(mode: CanvasMode, photo: Option<(u32, u32)>, purpose: SizingPurpose) -> Canvas {
    match mode {
        CanvasMode::Square => SQUARE,
        CanvasMode::Portrait => PORTRAIT,
        CanvasMode::Landscape => LANDSCAPE,
        CanvasMode::Story => STORY,
        CanvasMode::Original => match photo {
            Some((w, h)) if w > 0 && h > 0 => match purpose {
                SizingPurpose::Export => Canvas::new(w, h),
                SizingPurpose::Preview { max_long_edge } => capped(w, h, max_long_edge.max(1)),
            },
            _ => SQUARE,
        },
    }
}

fn capped(w: u32, h: u32, cap: u32) -> Canvas {
    if w.max(h) <= cap {
        return Canvas::new(w, h);
    }
    let ratio = f64::from(w) / f64::from(h);
    if w >= h {
        let ch = (f64::from(cap) / ratio).round().max(1.0) as u32;
        Canvas::new(cap, ch)
    } else {
        let cw = (f64::from(cap) * ratio).round().max(1.0) as u32;
        Canvas::new(cw, cap)
    }
}

/// Destination rectangle for the photo layer.
pub fn photo_rect(canvas: Canvas, photo: Size, fit: FitMode) -> Rect {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    if fit == FitMode::Fill || photo.width <= 0.0 || photo.height <= 0.0 {
        return canvas.rect();
    }

    let p_ratio = photo.width / photo.height;
    let c_ratio = w / h;
    let wider = p_ratio > c_ratio;

    let (dw, dh) = match (fit, wider) {
        (FitMode::Cover, true) | (FitMode::Contain, false) => (h * p_ratio, h),
        (FitMode::Cover, false) | (FitMode::Contain, true) => (w, w / p_ratio),
        (FitMode::Fill, _) => (w, h),
    };
    Rect::from_origin_size(((w - dw) / 2.0, (h - dh) / 2.0), (dw, dh))
}

/// Largest rectangle with the overlay's aspect ratio that fits inside the canvas.
pub fn overlay_base_size(canvas: Canvas, overlay: Size) -> Size {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    if overlay.width <= 0.0 || overlay.height <= 0.0 {
        return Size::new(w, h);
    }
    let o_ratio = overlay.width / overlay.height;
    if o_ratio > w / h {
        Size::new(w, w / o_ratio)
    } else {
        Size::new(h * o_ratio, h)
    }
}

/// Destination rectangle for the overlay layer: contain-fit base, scaled about the canvas
/// center, then translated by the percentage offsets.
pub fn overlay_rect(canvas: Canvas, overlay: Size, cfg: &GeometryConfig) -> Rect {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let base = overlay_base_size(canvas, overlay);
    let fw = base.width * cfg.scale;
    let fh = base.height * cfg.scale;
    let fx = (w - fw) / 2.0 + (cfg.offset_x / 100.0) * w;
    let fy = (h - fh) / 2.0 + (cfg.offset_y / 100.0) * h;
    Rect::new(fx, fy, fx + fw, fy + fh)
}

/// Both layer placements for one composite. Either layer may be absent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLayout {
    pub canvas: Canvas,
    pub photo: Option<Rect>,
    pub overlay: Option<Rect>,
}

impl FrameLayout {
    pub fn compute(
        canvas: Canvas,
        photo: Option<Size>,
        overlay: Option<Size>,
        cfg: &GeometryConfig,
    ) -> Self {
        Self {
            canvas,
            photo: photo.map(|p| photo_rect(canvas, p, cfg.fit_mode)),
            overlay: overlay.map(|o| overlay_rect(canvas, o, cfg)),
        }
    }

    /// Nothing to draw; the rasterizer emits a placeholder.
    pub fn is_empty(&self) -> bool {
        self.photo.is_none() && self.overlay.is_none()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/layout.rs"]
mod tests;

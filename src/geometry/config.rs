use serde::{Deserialize, Serialize};

/// UI bounds for the overlay scale multiplier.
pub const SCALE_RANGE: (f64, f64) = (0.1, 3.0);
/// UI bounds for overlay offsets, in percent of the canvas dimension.
pub const OFFSET_RANGE: (f64, f64) = (-100.0, 100.0);
/// Scale change per unit of mouse-wheel delta.
pub const WHEEL_ZOOM_STEP: f64 = -0.001;

/// How the photo (not the overlay) is mapped into the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fill the canvas, cropping overflow on one axis.
    #[default]
    Cover,
    /// Fit entirely inside the canvas, letterboxing on one axis.
    Contain,
    /// Stretch to the canvas, ignoring aspect ratio.
    Fill,
}

/// Output canvas preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasMode {
    /// 1080x1080.
    #[default]
    Square,
    /// The photo's natural dimensions.
    Original,
    /// 1080x1350 (4:5).
    Portrait,
    /// 1920x1080 (16:9).
    Landscape,
    /// 1080x1920 (9:16).
    Story,
}

/// Per-photo placement for the Frame tool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeometryConfig {
    /// Overlay size multiplier relative to its contain-fit base size.
    pub scale: f64,
    /// Overlay translation from center, percent of canvas width.
    pub offset_x: f64,
    /// Overlay translation from center, percent of canvas height.
    pub offset_y: f64,
    pub fit_mode: FitMode,
    pub canvas_mode: CanvasMode,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            fit_mode: FitMode::Cover,
            canvas_mode: CanvasMode::Square,
        }
    }
}

/// Partial update merged into a [`GeometryConfig`]; `None` fields are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeometryPatch {
    pub scale: Option<f64>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub fit_mode: Option<FitMode>,
    pub canvas_mode: Option<CanvasMode>,
}

impl GeometryConfig {
    pub fn merge(&mut self, patch: &GeometryPatch) {
        if let Some(v) = patch.scale {
            self.scale = v;
        }
        if let Some(v) = patch.offset_x {
            self.offset_x = v;
        }
        if let Some(v) = patch.offset_y {
            self.offset_y = v;
        }
        if let Some(v) = patch.fit_mode {
            self.fit_mode = v;
        }
        if let Some(v) = patch.canvas_mode {
            self.canvas_mode = v;
        }
    }

    /// Restore placement and fit to defaults, keeping the chosen canvas preset.
    pub fn reset_placement(&mut self) {
        *self = Self {
            canvas_mode: self.canvas_mode,
            ..Self::default()
        };
    }

    /// Offsets after dragging `(dx, dy)` preview pixels from `start`, on a preview of
    /// `view_w x view_h` pixels.
    pub fn panned_from(start: &Self, dx: f64, dy: f64, view_w: f64, view_h: f64) -> GeometryPatch {
        let (lo, hi) = OFFSET_RANGE;
        let pct = |d: f64, extent: f64| {
            if extent > 0.0 {
                d / extent * 100.0
            } else {
                0.0
            }
        };
        GeometryPatch {
            offset_x: Some((start.offset_x + pct(dx, view_w)).clamp(lo, hi)),
            offset_y: Some((start.offset_y + pct(dy, view_h)).clamp(lo, hi)),
            ..GeometryPatch::default()
        }
    }

    /// Scale after one mouse-wheel event with vertical delta `delta_y`.
    pub fn zoomed_by_wheel(&self, delta_y: f64) -> GeometryPatch {
        let (lo, hi) = SCALE_RANGE;
        GeometryPatch {
            scale: Some((self.scale + delta_y * WHEEL_ZOOM_STEP).clamp(lo, hi)),
            ..GeometryPatch::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/config.rs"]
mod tests;

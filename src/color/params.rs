use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::lut::Lut3d;

/// Numeric grading adjustments. Every field is neutral at `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    /// Exposure in EV stops (-5..5), applied as linear-light gain.
    pub exposure: f32,
    /// Warm/cool balance (-100..100). Positive adds red and removes blue.
    pub temperature: f32,
    /// Green/magenta balance (-100..100). Positive is magenta.
    pub tint: f32,
    /// Bright-region lift or recovery (-100..100).
    pub highlights: f32,
    /// Dark-region lift or crush (-100..100).
    pub shadows: f32,
    /// Contrast around mid-gray (-100..100).
    pub contrast: f32,
    /// Global saturation (-100..100); -100 is grayscale.
    pub saturation: f32,
    /// Saturation weighted toward muted pixels (-100..100).
    pub vibrance: f32,
}

impl ColorParams {
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Look up a parameter by its serialized name.
    pub fn get(&self, name: &str) -> Option<f32> {
        Some(match name {
            "exposure" => self.exposure,
            "temperature" => self.temperature,
            "tint" => self.tint,
            "highlights" => self.highlights,
            "shadows" => self.shadows,
            "contrast" => self.contrast,
            "saturation" => self.saturation,
            "vibrance" => self.vibrance,
            _ => return None,
        })
    }

    /// Set a parameter by its serialized name; returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        let slot = match name {
            "exposure" => &mut self.exposure,
            "temperature" => &mut self.temperature,
            "tint" => &mut self.tint,
            "highlights" => &mut self.highlights,
            "shadows" => &mut self.shadows,
            "contrast" => &mut self.contrast,
            "saturation" => &mut self.saturation,
            "vibrance" => &mut self.vibrance,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Per-photo Filter tool configuration.
///
/// The LUT is immutable shared data; cloning a config copies the reference, never the table, and
/// no method mutates a table in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub params: ColorParams,
    #[serde(skip)]
    pub lut: Option<Arc<Lut3d>>,
}

impl ColorConfig {
    pub fn is_identity(&self) -> bool {
        self.params.is_neutral() && self.lut.is_none()
    }

    pub fn merge(&mut self, patch: &ColorPatch) {
        for (name, value) in &patch.params {
            if !self.params.set(name, *value) {
                tracing::debug!(param = %name, "ignoring unknown color parameter");
            }
        }
        if let Some(lut) = &patch.lut {
            self.lut = lut.clone();
        }
    }
}

/// Partial update for a [`ColorConfig`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorPatch {
    /// Named parameter values to overwrite.
    pub params: Vec<(String, f32)>,
    /// `Some(None)` clears the LUT, `Some(Some(..))` installs one, `None` leaves it alone.
    pub lut: Option<Option<Arc<Lut3d>>>,
}

impl ColorPatch {
    pub fn param(name: impl Into<String>, value: f32) -> Self {
        Self {
            params: vec![(name.into(), value)],
            lut: None,
        }
    }

    pub fn with_lut(mut self, lut: Option<Arc<Lut3d>>) -> Self {
        self.lut = Some(lut);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/params.rs"]
mod tests;

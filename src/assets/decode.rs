use anyhow::Context;
use image::RgbaImage;

use crate::foundation::{
    error::{DarkroomError, DarkroomResult},
    math::premultiply_rgba8_in_place,
};

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_rgba8(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Decode bytes that belong to a named asset, mapping failures to [`DarkroomError::Decode`].
pub fn decode_named(name: &str, bytes: &[u8]) -> DarkroomResult<RgbaImage> {
    decode_rgba8(bytes).map_err(|e| DarkroomError::decode(name, format!("{e:#}")))
}

/// RGBA8 image whose color channels are already multiplied by alpha.
#[derive(Clone, Debug)]
pub struct PremulImage {
    image: RgbaImage,
}

impl PremulImage {
    pub fn from_straight(mut image: RgbaImage) -> Self {
        premultiply_rgba8_in_place(&mut image);
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}

/// The shared transparent overlay drawn on top of every Frame composite.
///
/// Read-only once decoded; replacing it means building a new value.
#[derive(Clone, Debug)]
pub struct OverlayAsset {
    name: String,
    pixels: PremulImage,
}

impl OverlayAsset {
    /// Decode an overlay. Opaque images are accepted and simply cover what is below them.
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> DarkroomResult<Self> {
        let name = name.into();
        let straight = decode_named(&name, bytes)?;
        if straight.pixels().all(|p| p.0[3] == 255) {
            tracing::debug!(overlay = %name, "overlay has no transparent pixels");
        }
        Ok(Self {
            name,
            pixels: PremulImage::from_straight(straight),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &PremulImage {
        &self.pixels
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

use std::io::Cursor;

use image::{ImageEncoder, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::Rgb8,
    error::{DarkroomError, DarkroomResult},
    math::mul_div255_u16,
};

/// Compressed output codec for rendered surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy, opaque. `quality` is in `(0, 1]`.
    Jpeg { quality: f32 },
    /// Lossless, keeps alpha.
    Png,
}

impl OutputFormat {
    pub const FRAME_JPEG: Self = Self::Jpeg { quality: 0.9 };
    pub const FILTER_JPEG: Self = Self::Jpeg { quality: 0.92 };

    pub fn validate(&self) -> DarkroomResult<()> {
        match *self {
            Self::Jpeg { quality } if !(quality > 0.0 && quality <= 1.0) => Err(
                DarkroomError::validation(format!("jpeg quality must be in (0, 1], got {quality}")),
            ),
            _ => Ok(()),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::FRAME_JPEG
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode a straight-alpha surface. JPEG output is flattened over `background` first.
pub fn encode_image(
    image: &RgbaImage,
    format: OutputFormat,
    background: Rgb8,
) -> DarkroomResult<Vec<u8>> {
    format.validate()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(DarkroomError::encode("cannot encode an empty surface"));
    }

    let mut out = Cursor::new(Vec::new());
    match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = flatten_to_rgb8(image, background);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality))
                .encode_image(&rgb)
                .map_err(|e| DarkroomError::encode(format!("jpeg: {e}")))?;
        }
        OutputFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut out)
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| DarkroomError::encode(format!("png: {e}")))?;
        }
    }
    Ok(out.into_inner())
}

/// Composite straight-alpha RGBA over an opaque color.
pub(crate) fn flatten_to_rgb8(src: &RgbaImage, bg: Rgb8) -> RgbImage {
    let bg = [u16::from(bg.r), u16::from(bg.g), u16::from(bg.b)];
    let mut dst = RgbImage::new(src.width(), src.height());
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        let a = u16::from(s.0[3]);
        if a == 255 {
            d.0 = [s.0[0], s.0[1], s.0[2]];
            continue;
        }
        let inv = 255 - a;
        for i in 0..3 {
            let v = mul_div255_u16(u16::from(s.0[i]), a) + mul_div255_u16(bg[i], inv);
            d.0[i] = v.min(255) as u8;
        }
    }
    dst
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;

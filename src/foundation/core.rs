use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::error::{DarkroomError, DarkroomResult};

pub use kurbo::{Rect, Size};

/// Opaque asset identifier, unique for the lifetime of the process.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct AssetId(pub u64);

impl AssetId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Output pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Like [`Canvas::new`] but rejects empty dimensions.
    pub fn checked(width: u32, height: u32) -> DarkroomResult<Self> {
        if width == 0 || height == 0 {
            return Err(DarkroomError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    pub fn rect(self) -> Rect {
        Rect::from_origin_size((0.0, 0.0), self.size())
    }
}

/// Opaque sRGB color. Serializes as `"#rrggbb"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    /// Backdrop painted under every composite (`#111`).
    pub const BACKDROP: Rgb8 = Rgb8::new(0x11, 0x11, 0x11);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Parse `#rgb` / `#rrggbb` (leading `#` optional).
    pub fn parse_hex(s: &str) -> DarkroomResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || DarkroomError::validation(format!("invalid hex color '{s}'"));
        let nibble = |c: u8| -> DarkroomResult<u8> {
            (c as char).to_digit(16).map(|d| d as u8).ok_or_else(bad)
        };
        let b = hex.as_bytes();
        match b.len() {
            3 => Ok(Self::new(
                nibble(b[0])? * 17,
                nibble(b[1])? * 17,
                nibble(b[2])? * 17,
            )),
            6 => Ok(Self::new(
                nibble(b[0])? * 16 + nibble(b[1])?,
                nibble(b[2])? * 16 + nibble(b[3])?,
                nibble(b[4])? * 16 + nibble(b[5])?,
            )),
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = DarkroomError;

    fn try_from(s: String) -> DarkroomResult<Self> {
        Self::parse_hex(&s)
    }
}

impl From<Rgb8> for String {
    fn from(c: Rgb8) -> Self {
        c.to_string()
    }
}

impl std::fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::BACKDROP
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

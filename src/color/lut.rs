//! 3D lookup tables in the `.cube` text format.

use std::path::Path;

use anyhow::Context;

use crate::foundation::{
    error::{DarkroomError, DarkroomResult},
    math::lerp,
};

pub const MIN_LUT_SIZE: usize = 2;
pub const MAX_LUT_SIZE: usize = 256;

/// A cubic RGB -> RGB grid, red varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Lut3d {
    title: Option<String>,
    size: usize,
    domain_min: [f32; 3],
    domain_max: [f32; 3],
    table: Vec<[f32; 3]>,
}

impl Lut3d {
    /// The identity grid of the given size (clamped to the supported range).
    pub fn identity(size: usize) -> Self {
        let size = size.clamp(MIN_LUT_SIZE, MAX_LUT_SIZE);
        let s = (size - 1) as f32;
        let mut table = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    table.push([r as f32 / s, g as f32 / s, b as f32 / s]);
                }
            }
        }
        Self {
            title: None,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            table,
        }
    }

    /// Build from an explicit table (red fastest). Length must be `size^3`.
    pub fn from_table(size: usize, table: Vec<[f32; 3]>) -> DarkroomResult<Self> {
        if !(MIN_LUT_SIZE..=MAX_LUT_SIZE).contains(&size) {
            return Err(DarkroomError::lut_parse_file(format!(
                "LUT_3D_SIZE must be within {MIN_LUT_SIZE}..={MAX_LUT_SIZE}, got {size}"
            )));
        }
        if table.len() != size * size * size {
            return Err(DarkroomError::lut_parse_file(format!(
                "expected {} table rows for size {size}, found {}",
                size * size * size,
                table.len()
            )));
        }
        Ok(Self {
            title: None,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            table,
        })
    }

    pub fn read(path: &Path) -> DarkroomResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read lut '{}'", path.display()))?;
        Self::parse_cube(&text)
    }

    /// Parse `.cube` text. Every malformed input is an error; nothing falls back to identity.
    pub fn parse_cube(text: &str) -> DarkroomResult<Self> {
        let mut title = None;
        let mut size: Option<usize> = None;
        let mut domain_min = [0.0f32; 3];
        let mut domain_max = [1.0f32; 3];
        let mut table: Vec<[f32; 3]> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(head) = parts.next() else {
                continue;
            };

            match head {
                "TITLE" => {
                    let rest = line["TITLE".len()..].trim().trim_matches('"');
                    title = Some(rest.to_string());
                }
                "LUT_3D_SIZE" => {
                    if size.is_some() {
                        return Err(DarkroomError::lut_parse(line_no, "duplicate LUT_3D_SIZE"));
                    }
                    if !table.is_empty() {
                        return Err(DarkroomError::lut_parse(
                            line_no,
                            "LUT_3D_SIZE must precede table data",
                        ));
                    }
                    let n = single_value::<usize>(line_no, "LUT_3D_SIZE", parts)?;
                    if !(MIN_LUT_SIZE..=MAX_LUT_SIZE).contains(&n) {
                        return Err(DarkroomError::lut_parse(
                            line_no,
                            format!("LUT_3D_SIZE must be within {MIN_LUT_SIZE}..={MAX_LUT_SIZE}, got {n}"),
                        ));
                    }
                    size = Some(n);
                    table.reserve(n * n * n);
                }
                "LUT_1D_SIZE" => {
                    return Err(DarkroomError::lut_parse(
                        line_no,
                        "1D LUTs are not supported; expected LUT_3D_SIZE",
                    ));
                }
                "DOMAIN_MIN" => domain_min = triple(line_no, parts)?,
                "DOMAIN_MAX" => domain_max = triple(line_no, parts)?,
                _ if head.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) => {
                    tracing::debug!(line = line_no, keyword = head, "skipping unknown cube keyword");
                }
                _ => {
                    if size.is_none() {
                        return Err(DarkroomError::lut_parse(
                            line_no,
                            "table data before LUT_3D_SIZE",
                        ));
                    }
                    let row = triple(line_no, line.split_whitespace())?;
                    table.push(row);
                }
            }
        }

        let size = size.ok_or_else(|| DarkroomError::lut_parse_file("missing LUT_3D_SIZE"))?;
        let expected = size * size * size;
        if table.len() != expected {
            return Err(DarkroomError::lut_parse_file(format!(
                "expected {expected} table rows for size {size}, found {}",
                table.len()
            )));
        }
        for axis in 0..3 {
            if !(domain_max[axis] > domain_min[axis]) {
                return Err(DarkroomError::lut_parse_file(format!(
                    "DOMAIN_MAX must exceed DOMAIN_MIN on every axis (axis {axis})"
                )));
            }
        }

        Ok(Self {
            title,
            size,
            domain_min,
            domain_max,
            table,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn at(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        self.table[(b * self.size + g) * self.size + r]
    }

    /// Trilinear lookup. Inputs are normalized against the domain and clamped to the grid.
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        let s = (self.size - 1) as f32;
        let mut i0 = [0usize; 3];
        let mut i1 = [0usize; 3];
        let mut t = [0f32; 3];
        for axis in 0..3 {
            let span = self.domain_max[axis] - self.domain_min[axis];
            let n = ((rgb[axis] - self.domain_min[axis]) / span).clamp(0.0, 1.0) * s;
            let lo = (n.floor() as usize).min(self.size - 1);
            i0[axis] = lo;
            i1[axis] = (lo + 1).min(self.size - 1);
            t[axis] = n - lo as f32;
        }

        let lerp3 = |a: [f32; 3], b: [f32; 3], t: f32| {
            [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
        };

        let c00 = lerp3(self.at(i0[0], i0[1], i0[2]), self.at(i1[0], i0[1], i0[2]), t[0]);
        let c10 = lerp3(self.at(i0[0], i1[1], i0[2]), self.at(i1[0], i1[1], i0[2]), t[0]);
        let c01 = lerp3(self.at(i0[0], i0[1], i1[2]), self.at(i1[0], i0[1], i1[2]), t[0]);
        let c11 = lerp3(self.at(i0[0], i1[1], i1[2]), self.at(i1[0], i1[1], i1[2]), t[0]);
        let c0 = lerp3(c00, c10, t[1]);
        let c1 = lerp3(c01, c11, t[1]);
        lerp3(c0, c1, t[2])
    }
}

fn parse_f32(line_no: usize, tok: &str) -> DarkroomResult<f32> {
    let v: f32 = tok
        .parse()
        .map_err(|_| DarkroomError::lut_parse(line_no, format!("'{tok}' is not a number")))?;
    if !v.is_finite() {
        return Err(DarkroomError::lut_parse(line_no, format!("'{tok}' is not finite")));
    }
    Ok(v)
}

fn triple<'a>(line_no: usize, parts: impl Iterator<Item = &'a str>) -> DarkroomResult<[f32; 3]> {
    let toks: Vec<&str> = parts.collect();
    if toks.len() != 3 {
        return Err(DarkroomError::lut_parse(
            line_no,
            format!("expected 3 values, found {}", toks.len()),
        ));
    }
    Ok([
        parse_f32(line_no, toks[0])?,
        parse_f32(line_no, toks[1])?,
        parse_f32(line_no, toks[2])?,
    ])
}

fn single_value<'a, T: std::str::FromStr>(
    line_no: usize,
    keyword: &str,
    mut parts: impl Iterator<Item = &'a str>,
) -> DarkroomResult<T> {
    let tok = parts
        .next()
        .ok_or_else(|| DarkroomError::lut_parse(line_no, format!("{keyword} needs a value")))?;
    if parts.next().is_some() {
        return Err(DarkroomError::lut_parse(
            line_no,
            format!("{keyword} takes exactly one value"),
        ));
    }
    tok.parse()
        .map_err(|_| DarkroomError::lut_parse(line_no, format!("invalid {keyword} '{tok}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/color/lut.rs"]
mod tests;

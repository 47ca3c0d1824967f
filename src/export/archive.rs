use std::{
    collections::HashSet,
    io::{Cursor, Write},
};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::foundation::error::{DarkroomError, DarkroomResult};

/// In-memory ZIP assembly for one job.
///
/// Entry names are unique within the archive; a clashing name gets a `_2`, `_3`, ... suffix.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

impl std::fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("entries", &self.names.len())
            .finish_non_exhaustive()
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Add one encoded image for the asset at `index` (0-based). Returns the entry name used.
    pub fn add_entry(
        &mut self,
        index: usize,
        base_name: &str,
        extension: &str,
        bytes: &[u8],
    ) -> DarkroomResult<String> {
        let name = self.unique(entry_name(index, base_name, extension));
        // JPEG payloads are already compressed.
        let method = if extension.eq_ignore_ascii_case("jpg") {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        let opts = SimpleFileOptions::default().compression_method(method);
        self.zip
            .start_file(name.as_str(), opts)
            .map_err(|e| DarkroomError::archive(format!("start entry '{name}': {e}")))?;
        self.zip
            .write_all(bytes)
            .map_err(|e| DarkroomError::archive(format!("write entry '{name}': {e}")))?;
        self.names.insert(name.clone());
        Ok(name)
    }

    fn unique(&self, name: String) -> String {
        if !self.names.contains(&name) {
            return name;
        }
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (name.as_str(), String::new()),
        };
        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}{ext}");
            if !self.names.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Serialize the central directory and return the archive bytes.
    pub fn finish(self) -> DarkroomResult<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| DarkroomError::archive(format!("finalize: {e}")))?;
        Ok(cursor.into_inner())
    }
}

/// `{NNN}_{base}.{ext}`: 1-based, zero-padded to three digits, path-unsafe characters replaced.
pub fn entry_name(index: usize, base_name: &str, extension: &str) -> String {
    format!("{:03}_{}.{extension}", index + 1, sanitize(base_name))
}

pub(crate) fn sanitize(base_name: &str) -> String {
    let cleaned: String = base_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "photo".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/archive.rs"]
mod tests;

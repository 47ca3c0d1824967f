//! The batch export loop.
//!
//! Jobs run on their own thread with their own renderer and an owned snapshot of the store, so
//! an export never touches the interactive preview state. Assets are processed strictly one after
//! another to bound peak memory.

use std::{path::Path, sync::Arc};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::{
        decode::{OverlayAsset, PremulImage},
        store::{AssetConfig, StoreEntry},
    },
    color::{engine::GradingEngine, params::ColorConfig},
    export::{
        archive::ArchiveWriter,
        encode::{OutputFormat, encode_image},
        job::{JobHandle, JobReporter, spawn_job},
    },
    foundation::{
        core::{AssetId, Rgb8},
        error::{DarkroomError, DarkroomResult},
    },
    geometry::{composite::render_frame, config::GeometryConfig, layout::SizingPurpose},
};

/// Default long-edge cap for `original` canvas previews.
pub const DEFAULT_PREVIEW_LONG_EDGE: u32 = 1920;

/// Output settings for batch jobs and previews.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub output: OutputFormat,
    /// Canvas backdrop, also used to flatten transparency for JPEG output.
    pub background: Rgb8,
    pub preview_max_long_edge: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::frame()
    }
}

impl ExportSettings {
    pub fn frame() -> Self {
        Self {
            output: OutputFormat::FRAME_JPEG,
            background: Rgb8::BACKDROP,
            preview_max_long_edge: DEFAULT_PREVIEW_LONG_EDGE,
        }
    }

    pub fn filter() -> Self {
        Self {
            output: OutputFormat::FILTER_JPEG,
            ..Self::frame()
        }
    }

    pub fn validate(&self) -> DarkroomResult<()> {
        self.output.validate()?;
        if self.preview_max_long_edge == 0 {
            return Err(DarkroomError::validation("previewMaxLongEdge must be non-zero"));
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> DarkroomResult<Self> {
        let settings: Self = serde_json::from_str(text).context("parse export settings json")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn read(path: &Path) -> DarkroomResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read export settings '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn preview_purpose(&self) -> SizingPurpose {
        SizingPurpose::Preview {
            max_long_edge: self.preview_max_long_edge,
        }
    }
}

/// An asset left out of the archive, with the reason.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedAsset {
    pub id: AssetId,
    pub name: String,
    pub reason: String,
}

/// A finished export.
#[derive(Clone, Debug)]
pub struct ExportArchive {
    pub bytes: Vec<u8>,
    /// Entry names in store order.
    pub entries: Vec<String>,
    pub skipped: Vec<SkippedAsset>,
}

/// Renders and encodes one asset for a batch job.
pub trait BatchRender: Send + 'static {
    type Config: AssetConfig;

    /// One-time setup before the first asset. Failures are job-fatal.
    fn prepare(&mut self) -> DarkroomResult<()> {
        Ok(())
    }

    fn render_encoded(
        &mut self,
        entry: &StoreEntry<Self::Config>,
        settings: &ExportSettings,
    ) -> DarkroomResult<Vec<u8>>;

    /// Release resources after the last asset.
    fn finish(&mut self) {}
}

/// Where a Frame job gets its overlay.
#[derive(Clone, Debug, Default)]
pub enum OverlaySource {
    #[default]
    None,
    /// Already decoded by the interactive session.
    Decoded(Arc<OverlayAsset>),
    /// Raw bytes, decoded once in [`BatchRender::prepare`].
    Encoded { name: String, bytes: Arc<[u8]> },
}

/// Frame tool renderer: photo composited with the shared overlay at export resolution.
#[derive(Debug)]
pub struct FrameRenderer {
    source: OverlaySource,
    overlay: Option<Arc<OverlayAsset>>,
}

impl FrameRenderer {
    pub fn new(source: OverlaySource) -> Self {
        let overlay = match &source {
            OverlaySource::Decoded(o) => Some(o.clone()),
            _ => None,
        };
        Self { source, overlay }
    }
}

impl BatchRender for FrameRenderer {
    type Config = GeometryConfig;

    fn prepare(&mut self) -> DarkroomResult<()> {
        if let OverlaySource::Encoded { name, bytes } = &self.source {
            let overlay = OverlayAsset::decode(name.clone(), bytes)
                .map_err(|e| DarkroomError::job_fatal(format!("overlay unusable: {e}")))?;
            self.overlay = Some(Arc::new(overlay));
        }
        Ok(())
    }

    fn render_encoded(
        &mut self,
        entry: &StoreEntry<GeometryConfig>,
        settings: &ExportSettings,
    ) -> DarkroomResult<Vec<u8>> {
        let photo = PremulImage::from_straight(entry.asset.decode()?);
        let composite = render_frame(
            Some(&photo),
            self.overlay.as_deref().map(OverlayAsset::pixels),
            &entry.config,
            SizingPurpose::Export,
            settings.background,
        );
        encode_image(&composite.image, settings.output, settings.background)
    }
}

/// Filter tool renderer: a private grading engine per job.
#[derive(Debug, Default)]
pub struct FilterRenderer {
    engine: GradingEngine,
}

impl FilterRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BatchRender for FilterRenderer {
    type Config = ColorConfig;

    fn render_encoded(
        &mut self,
        entry: &StoreEntry<ColorConfig>,
        settings: &ExportSettings,
    ) -> DarkroomResult<Vec<u8>> {
        self.engine.load_decoded(entry.asset.decode()?)?;
        self.engine.apply_config(&entry.config)?;
        self.engine.to_encoded_bytes(settings.output, settings.background)
    }

    fn finish(&mut self) {
        self.engine.dispose();
    }
}

/// Render every entry into one archive.
///
/// Per-asset decode and encode failures are logged and skipped; progress still advances past
/// them. Setup, archive and engine failures end the job with no archive.
#[tracing::instrument(skip_all, fields(tool = %<R::Config as AssetConfig>::TOOL, total = items.len()))]
pub fn run_export<R: BatchRender>(
    renderer: &mut R,
    items: &[StoreEntry<R::Config>],
    settings: &ExportSettings,
    reporter: &mut JobReporter<ExportArchive>,
) -> DarkroomResult<ExportArchive> {
    settings.validate()?;
    renderer.prepare()?;

    let extension = settings.output.extension();
    let mut archive = ArchiveWriter::new();
    let mut entries = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();

    for (index, entry) in items.iter().enumerate() {
        if reporter.is_abandoned() {
            renderer.finish();
            return Err(DarkroomError::job_fatal("export abandoned"));
        }
        let asset = &entry.asset;
        match renderer.render_encoded(entry, settings) {
            Ok(bytes) => {
                let name = archive
                    .add_entry(index, asset.base_name(), extension, &bytes)
                    .map_err(|e| DarkroomError::job_fatal(e.to_string()))?;
                tracing::debug!(asset = %asset.id(), entry = %name, bytes = bytes.len(), "exported");
                entries.push(name);
            }
            Err(err) if err.is_per_asset() => {
                tracing::warn!(
                    asset = %asset.id(),
                    name = asset.display_name(),
                    error = %err,
                    "skipping asset"
                );
                skipped.push(SkippedAsset {
                    id: asset.id(),
                    name: asset.display_name().to_string(),
                    reason: err.to_string(),
                });
            }
            Err(err) => {
                renderer.finish();
                return Err(err);
            }
        }
        reporter.progress(index + 1);
    }
    renderer.finish();

    let bytes = archive
        .finish()
        .map_err(|e| DarkroomError::job_fatal(e.to_string()))?;
    tracing::info!(
        requested = items.len(),
        written = entries.len(),
        skipped = skipped.len(),
        bytes = bytes.len(),
        "export finished"
    );
    Ok(ExportArchive {
        bytes,
        entries,
        skipped,
    })
}

/// Start a batch export on a worker thread.
pub fn spawn_export<R: BatchRender>(
    mut renderer: R,
    items: Vec<StoreEntry<R::Config>>,
    settings: ExportSettings,
) -> DarkroomResult<JobHandle<ExportArchive>> {
    let name = format!("{}-export", <R::Config as AssetConfig>::TOOL);
    spawn_job(&name, items.len(), move |reporter| {
        run_export(&mut renderer, &items, &settings, reporter)
    })
}

pub fn spawn_frame_export(
    items: Vec<StoreEntry<GeometryConfig>>,
    overlay: OverlaySource,
    settings: ExportSettings,
) -> DarkroomResult<JobHandle<ExportArchive>> {
    spawn_export(FrameRenderer::new(overlay), items, settings)
}

pub fn spawn_filter_export(
    items: Vec<StoreEntry<ColorConfig>>,
    settings: ExportSettings,
) -> DarkroomResult<JobHandle<ExportArchive>> {
    spawn_export(FilterRenderer::new(), items, settings)
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;

//! Bake one tool's output into assets for the other tool.
//!
//! Each asset is rendered with its own config and re-encoded; the result replaces the original
//! source bytes. The source tool's config is consumed by the bake and never carried, so a round
//! trip cannot apply an adjustment twice. Any config already attached for the receiving tool
//! travels along unchanged.
//!
//! Unlike export, a transfer aborts on the first per-asset failure: the receiving tool gets all
//! assets or none.

use crate::{
    assets::{
        decode::OverlayAsset,
        store::{AssetConfig, AssetStore, AttachedConfig, PhotoAsset, StoreEntry, ToolKind},
    },
    color::params::ColorConfig,
    export::{
        job::{JobHandle, JobReporter, spawn_job},
        pipeline::{BatchRender, ExportSettings, FilterRenderer, FrameRenderer, OverlaySource},
    },
    foundation::error::{DarkroomError, DarkroomResult},
    geometry::config::GeometryConfig,
};

/// A baked asset handed from `origin` to the other tool.
#[derive(Clone, Debug)]
pub struct TransferredAsset {
    /// Same id as the source asset, new baked bytes, named `{base}.{ext}`.
    pub asset: PhotoAsset,
    /// Config for the receiving tool, if one was attached.
    pub carried: AttachedConfig,
    pub origin: ToolKind,
}

/// Bake a single entry.
pub fn bake_entry<R: BatchRender>(
    renderer: &mut R,
    entry: &StoreEntry<R::Config>,
    settings: &ExportSettings,
) -> DarkroomResult<TransferredAsset> {
    let origin = <R::Config as AssetConfig>::TOOL;
    let bytes = renderer.render_encoded(entry, settings)?;
    let name = format!("{}.{}", entry.asset.base_name(), settings.output.extension());
    let carried = match entry.attached.kind() {
        Some(kind) if kind == origin => AttachedConfig::Absent,
        _ => entry.attached.clone(),
    };
    Ok(TransferredAsset {
        asset: PhotoAsset::with_id(entry.asset.id(), name, bytes),
        carried,
        origin,
    })
}

/// Bake every entry in order, failing the whole transfer on the first error.
#[tracing::instrument(skip_all, fields(origin = %<R::Config as AssetConfig>::TOOL, total = items.len()))]
pub fn run_transfer<R: BatchRender>(
    renderer: &mut R,
    items: &[StoreEntry<R::Config>],
    settings: &ExportSettings,
    reporter: &mut JobReporter<Vec<TransferredAsset>>,
) -> DarkroomResult<Vec<TransferredAsset>> {
    settings.validate()?;
    renderer.prepare()?;

    let mut out = Vec::with_capacity(items.len());
    for (index, entry) in items.iter().enumerate() {
        if reporter.is_abandoned() {
            renderer.finish();
            return Err(DarkroomError::job_fatal("transfer abandoned"));
        }
        match bake_entry(renderer, entry, settings) {
            Ok(baked) => out.push(baked),
            Err(err) => {
                renderer.finish();
                tracing::error!(asset = %entry.asset.id(), error = %err, "transfer aborted");
                return Err(DarkroomError::job_fatal(format!(
                    "transfer aborted at '{}': {err}",
                    entry.asset.display_name()
                )));
            }
        }
        reporter.progress(index + 1);
    }
    renderer.finish();
    tracing::info!(count = out.len(), "transfer finished");
    Ok(out)
}

pub fn spawn_transfer<R: BatchRender>(
    mut renderer: R,
    items: Vec<StoreEntry<R::Config>>,
    settings: ExportSettings,
) -> DarkroomResult<JobHandle<Vec<TransferredAsset>>> {
    let name = format!("{}-transfer", <R::Config as AssetConfig>::TOOL);
    spawn_job(&name, items.len(), move |reporter| {
        run_transfer(&mut renderer, &items, &settings, reporter)
    })
}

/// Frame to Filter: bake the composite.
pub fn spawn_frame_transfer(
    items: Vec<StoreEntry<GeometryConfig>>,
    overlay: Option<std::sync::Arc<OverlayAsset>>,
    settings: ExportSettings,
) -> DarkroomResult<JobHandle<Vec<TransferredAsset>>> {
    let source = overlay.map_or(OverlaySource::None, OverlaySource::Decoded);
    spawn_transfer(FrameRenderer::new(source), items, settings)
}

/// Filter to Frame: bake the grade.
pub fn spawn_filter_transfer(
    items: Vec<StoreEntry<ColorConfig>>,
    settings: ExportSettings,
) -> DarkroomResult<JobHandle<Vec<TransferredAsset>>> {
    spawn_transfer(FilterRenderer::new(), items, settings)
}

impl<C: AssetConfig> AssetStore<C> {
    /// Replace this store's contents with another tool's baked output.
    pub fn import_transferred(&mut self, items: Vec<TransferredAsset>) -> DarkroomResult<()> {
        if let Some(own) = items.iter().find(|t| t.origin == C::TOOL) {
            return Err(DarkroomError::validation(format!(
                "asset '{}' came from the {} tool and cannot be imported back into it",
                own.asset.display_name(),
                C::TOOL
            )));
        }
        self.import(items.into_iter().map(|t| (t.asset, t.carried)));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transfer/bridge.rs"]
mod tests;

use std::sync::Arc;

use image::RgbaImage;

use crate::{
    assets::store::{AssetStore, PhotoAsset},
    color::{
        engine::GradingEngine,
        lut::Lut3d,
        params::{ColorConfig, ColorPatch},
    },
    export::{
        job::JobHandle,
        pipeline::{ExportArchive, ExportSettings, spawn_filter_export},
    },
    foundation::{
        core::AssetId,
        error::{DarkroomError, DarkroomResult},
    },
    transfer::bridge::{TransferredAsset, spawn_filter_transfer},
};

/// Interactive Filter tool: photos with per-photo grading and an optional per-photo LUT.
///
/// The session's [`GradingEngine`] is for preview only; export and transfer jobs build their own.
#[derive(Debug)]
pub struct FilterTool {
    store: AssetStore<ColorConfig>,
    engine: GradingEngine,
    settings: ExportSettings,
    loaded: Option<AssetId>,
}

impl Default for FilterTool {
    fn default() -> Self {
        Self::new(ExportSettings::filter())
    }
}

impl FilterTool {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            store: AssetStore::new(),
            engine: GradingEngine::new(),
            settings,
            loaded: None,
        }
    }

    pub fn store(&self) -> &AssetStore<ColorConfig> {
        &self.store
    }

    pub fn add_photos(&mut self, photos: impl IntoIterator<Item = PhotoAsset>) -> Vec<AssetId> {
        self.store.add(photos)
    }

    pub fn remove_photo(&mut self, id: AssetId) -> Option<PhotoAsset> {
        self.store.remove(id)
    }

    pub fn select(&mut self, id: AssetId) -> bool {
        self.store.select(id)
    }

    pub fn active_config(&self) -> Option<&ColorConfig> {
        self.store.active().map(|e| &e.config)
    }

    pub fn set_param(&mut self, name: &str, value: f32) -> bool {
        self.store.update_active_config(&ColorPatch::param(name, value))
    }

    pub fn update(&mut self, patch: &ColorPatch) -> bool {
        self.store.update_active_config(patch)
    }

    /// Parse `.cube` text and attach it to the active photo. A parse error changes nothing.
    pub fn load_lut_for_active(&mut self, cube: &str) -> DarkroomResult<Arc<Lut3d>> {
        if self.store.active().is_none() {
            return Err(DarkroomError::validation("no active photo"));
        }
        let lut = Arc::new(Lut3d::parse_cube(cube)?);
        tracing::info!(title = lut.title().unwrap_or(""), size = lut.size(), "lut loaded");
        self.store
            .update_active_config(&ColorPatch::default().with_lut(Some(lut.clone())));
        Ok(lut)
    }

    pub fn clear_lut_for_active(&mut self) -> bool {
        self.store
            .update_active_config(&ColorPatch::default().with_lut(None))
    }

    /// Neutral params and no LUT for the active photo.
    pub fn reset(&mut self) -> bool {
        self.store.reset_active_config()
    }

    pub fn apply_to_all(&mut self, confirm: impl FnOnce(usize) -> bool) -> bool {
        self.store.apply_active_config_to_all(confirm)
    }

    /// Grade the active photo through the preview engine. `Ok(None)` when nothing is active.
    pub fn render_preview(&mut self) -> DarkroomResult<Option<&RgbaImage>> {
        let Some(entry) = self.store.active() else {
            return Ok(None);
        };
        let id = entry.asset.id();
        if self.loaded != Some(id) || !self.engine.has_image() {
            self.engine.load_decoded(entry.asset.decode()?)?;
            self.loaded = Some(id);
        }
        self.engine.apply_config(&entry.config)?;
        Ok(Some(self.engine.surface()?))
    }

    /// Encode the current preview surface.
    pub fn preview_bytes(&self) -> DarkroomResult<Vec<u8>> {
        self.engine
            .to_encoded_bytes(self.settings.output, self.settings.background)
    }

    pub fn export(&self) -> DarkroomResult<JobHandle<ExportArchive>> {
        spawn_filter_export(self.store.snapshot(), self.settings)
    }

    /// Bake grades for the Frame tool.
    pub fn transfer(&self) -> DarkroomResult<JobHandle<Vec<TransferredAsset>>> {
        spawn_filter_transfer(self.store.snapshot(), self.settings)
    }

    pub fn import(&mut self, items: Vec<TransferredAsset>) -> DarkroomResult<()> {
        self.store.import_transferred(items)?;
        self.loaded = None;
        Ok(())
    }

    /// Release the preview engine. Later previews fail with `EngineDisposed`.
    pub fn close(&mut self) {
        self.engine.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tools/filter.rs"]
mod tests;

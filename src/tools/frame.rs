use std::sync::Arc;

use crate::{
    assets::{
        decode::{OverlayAsset, PremulImage},
        store::{AssetStore, PhotoAsset},
    },
    export::{
        job::JobHandle,
        pipeline::{ExportArchive, ExportSettings, OverlaySource, spawn_frame_export},
    },
    foundation::{core::AssetId, error::DarkroomResult},
    geometry::{
        composite::{Composite, render_frame},
        config::{GeometryConfig, GeometryPatch},
    },
    tools::preview::{LatestRender, OverlaySlot, RenderTicket},
    transfer::bridge::{TransferredAsset, spawn_frame_transfer},
};

/// Everything a Frame preview needs, detached from the session so it can render on any thread.
#[derive(Clone, Debug)]
pub struct FramePreviewRequest {
    pub ticket: RenderTicket,
    photo: Option<Arc<PremulImage>>,
    overlay: Option<Arc<OverlayAsset>>,
    config: GeometryConfig,
    settings: ExportSettings,
}

impl FramePreviewRequest {
    pub fn render(self) -> (RenderTicket, Composite) {
        let composite = render_frame(
            self.photo.as_deref(),
            self.overlay.as_deref().map(OverlayAsset::pixels),
            &self.config,
            self.settings.preview_purpose(),
            self.settings.background,
        );
        (self.ticket, composite)
    }
}

/// Interactive Frame tool: photos with per-photo placement, one shared overlay.
#[derive(Debug)]
pub struct FrameTool {
    store: AssetStore<GeometryConfig>,
    overlay: OverlaySlot,
    settings: ExportSettings,
    decoded: Option<(AssetId, Arc<PremulImage>)>,
    preview: LatestRender<Composite>,
    drag_start: Option<GeometryConfig>,
}

impl Default for FrameTool {
    fn default() -> Self {
        Self::new(ExportSettings::frame())
    }
}

impl FrameTool {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            store: AssetStore::new(),
            overlay: OverlaySlot::new(),
            settings,
            decoded: None,
            preview: LatestRender::new(),
            drag_start: None,
        }
    }

    pub fn store(&self) -> &AssetStore<GeometryConfig> {
        &self.store
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn add_photos(&mut self, photos: impl IntoIterator<Item = PhotoAsset>) -> Vec<AssetId> {
        self.store.add(photos)
    }

    pub fn remove_photo(&mut self, id: AssetId) -> Option<PhotoAsset> {
        if self.decoded.as_ref().is_some_and(|(d, _)| *d == id) {
            self.decoded = None;
        }
        self.store.remove(id)
    }

    pub fn select(&mut self, id: AssetId) -> bool {
        self.drag_start = None;
        self.store.select(id)
    }

    pub fn set_overlay(&mut self, name: &str, bytes: &[u8]) -> DarkroomResult<()> {
        self.overlay.set(name, bytes).map(|_| ())
    }

    pub fn clear_overlay(&mut self) {
        self.overlay.clear();
    }

    pub fn overlay(&self) -> Option<Arc<OverlayAsset>> {
        self.overlay.get()
    }

    pub fn active_config(&self) -> Option<GeometryConfig> {
        self.store.active().map(|e| e.config)
    }

    pub fn update(&mut self, patch: &GeometryPatch) -> bool {
        self.store.update_active_config(patch)
    }

    /// Start a drag: later [`FrameTool::drag_to`] calls are relative to the current offsets.
    pub fn begin_drag(&mut self) {
        self.drag_start = self.active_config();
    }

    /// Move the overlay to `(dx, dy)` preview pixels from where the drag began.
    pub fn drag_to(&mut self, dx: f64, dy: f64, view_w: f64, view_h: f64) -> bool {
        let Some(start) = self.drag_start else {
            return false;
        };
        self.update(&GeometryConfig::panned_from(&start, dx, dy, view_w, view_h))
    }

    pub fn end_drag(&mut self) {
        self.drag_start = None;
    }

    pub fn zoom_by_wheel(&mut self, delta_y: f64) -> bool {
        match self.active_config() {
            Some(cfg) => self.update(&cfg.zoomed_by_wheel(delta_y)),
            None => false,
        }
    }

    /// Reset placement and fit of the active photo; the canvas preset is kept.
    pub fn reset(&mut self) -> bool {
        self.store.reset_active_config()
    }

    pub fn apply_to_all(&mut self, confirm: impl FnOnce(usize) -> bool) -> bool {
        self.store.apply_active_config_to_all(confirm)
    }

    fn active_photo(&mut self) -> Option<Arc<PremulImage>> {
        let entry = self.store.active()?;
        let id = entry.asset.id();
        if let Some((cached, img)) = &self.decoded
            && *cached == id
        {
            return Some(img.clone());
        }
        match entry.asset.decode() {
            Ok(straight) => {
                let img = Arc::new(PremulImage::from_straight(straight));
                self.decoded = Some((id, img.clone()));
                Some(img)
            }
            Err(err) => {
                tracing::warn!(asset = %id, error = %err, "preview without photo");
                None
            }
        }
    }

    /// Snapshot the active photo, overlay and config for an off-session preview render.
    pub fn preview_request(&mut self) -> FramePreviewRequest {
        let photo = self.active_photo();
        FramePreviewRequest {
            ticket: self.preview.issue(),
            photo,
            overlay: self.overlay.get(),
            config: self.active_config().unwrap_or_default(),
            settings: self.settings,
        }
    }

    /// Show a finished preview unless a newer request has been issued since.
    pub fn present(&mut self, ticket: RenderTicket, composite: Composite) -> bool {
        self.preview.offer(ticket, composite)
    }

    /// Render the active photo synchronously and show it.
    pub fn render_preview(&mut self) -> Option<&Composite> {
        let (ticket, composite) = self.preview_request().render();
        self.present(ticket, composite);
        self.preview.shown()
    }

    pub fn shown_preview(&self) -> Option<&Composite> {
        self.preview.shown()
    }

    pub fn export(&self) -> DarkroomResult<JobHandle<ExportArchive>> {
        let overlay = self
            .overlay
            .get()
            .map_or(OverlaySource::None, OverlaySource::Decoded);
        spawn_frame_export(self.store.snapshot(), overlay, self.settings)
    }

    /// Bake composites for the Filter tool.
    pub fn transfer(&self) -> DarkroomResult<JobHandle<Vec<TransferredAsset>>> {
        spawn_frame_transfer(self.store.snapshot(), self.overlay.get(), self.settings)
    }

    pub fn import(&mut self, items: Vec<TransferredAsset>) -> DarkroomResult<()> {
        self.store.import_transferred(items)?;
        self.decoded = None;
        self.preview.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tools/frame.rs"]
mod tests;

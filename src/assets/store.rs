use std::{path::Path, sync::Arc};

use anyhow::Context;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::{
    assets::decode::decode_named,
    color::params::{ColorConfig, ColorPatch},
    foundation::{
        core::AssetId,
        error::{DarkroomError, DarkroomResult},
    },
    geometry::config::{GeometryConfig, GeometryPatch},
};

/// A user-supplied photo. Source bytes are immutable and shared between clones.
#[derive(Clone, Debug)]
pub struct PhotoAsset {
    id: AssetId,
    display_name: String,
    source: Arc<[u8]>,
}

impl PhotoAsset {
    pub fn new(display_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::with_id(AssetId::next(), display_name, bytes)
    }

    pub(crate) fn with_id(
        id: AssetId,
        display_name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            source: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> DarkroomResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read photo '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Display name without its final extension.
    pub fn base_name(&self) -> &str {
        match self.display_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.display_name,
        }
    }

    /// Decode to straight-alpha RGBA8. Errors name this asset.
    pub fn decode(&self) -> DarkroomResult<RgbaImage> {
        decode_named(&format!("{} {}", self.id, self.display_name), &self.source)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Frame,
    Filter,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Frame => "frame",
            Self::Filter => "filter",
        })
    }
}

/// A config that travels with an asset outside its own tool.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AttachedConfig {
    Frame(GeometryConfig),
    Filter(ColorConfig),
    #[default]
    Absent,
}

impl AttachedConfig {
    pub fn kind(&self) -> Option<ToolKind> {
        match self {
            Self::Frame(_) => Some(ToolKind::Frame),
            Self::Filter(_) => Some(ToolKind::Filter),
            Self::Absent => None,
        }
    }
}

/// Per-photo configuration owned by one tool's store.
pub trait AssetConfig: Clone + Default + Send + Sync + 'static {
    type Patch;
    const TOOL: ToolKind;

    fn apply_patch(&mut self, patch: &Self::Patch);
    /// Restore the tool's reset state, which need not be `Default`.
    fn reset(&mut self);
    fn into_attached(self) -> AttachedConfig;
    fn from_attached(attached: &AttachedConfig) -> Option<Self>;
}

impl AssetConfig for GeometryConfig {
    type Patch = GeometryPatch;
    const TOOL: ToolKind = ToolKind::Frame;

    fn apply_patch(&mut self, patch: &GeometryPatch) {
        self.merge(patch);
    }

    fn reset(&mut self) {
        self.reset_placement();
    }

    fn into_attached(self) -> AttachedConfig {
        AttachedConfig::Frame(self)
    }

    fn from_attached(attached: &AttachedConfig) -> Option<Self> {
        match attached {
            AttachedConfig::Frame(cfg) => Some(*cfg),
            _ => None,
        }
    }
}

impl AssetConfig for ColorConfig {
    type Patch = ColorPatch;
    const TOOL: ToolKind = ToolKind::Filter;

    fn apply_patch(&mut self, patch: &ColorPatch) {
        self.merge(patch);
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn into_attached(self) -> AttachedConfig {
        AttachedConfig::Filter(self)
    }

    fn from_attached(attached: &AttachedConfig) -> Option<Self> {
        match attached {
            AttachedConfig::Filter(cfg) => Some(cfg.clone()),
            _ => None,
        }
    }
}

/// One asset with its own config, plus whatever foreign-tool config it arrived with.
#[derive(Clone, Debug)]
pub struct StoreEntry<C> {
    pub asset: PhotoAsset,
    pub config: C,
    pub attached: AttachedConfig,
}

/// Ordered `(asset, config)` pairs with an active pointer.
///
/// Configs are plain values; no two entries ever share one.
#[derive(Debug)]
pub struct AssetStore<C: AssetConfig> {
    entries: Vec<StoreEntry<C>>,
    active: Option<AssetId>,
}

impl<C: AssetConfig> Default for AssetStore<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            active: None,
        }
    }
}

impl<C: AssetConfig> AssetStore<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StoreEntry<C>] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<AssetId> {
        self.entries.iter().map(|e| e.asset.id()).collect()
    }

    fn position(&self, id: AssetId) -> Option<usize> {
        self.entries.iter().position(|e| e.asset.id() == id)
    }

    /// Append assets with default configs. The first asset added to an empty store becomes active.
    pub fn add(&mut self, assets: impl IntoIterator<Item = PhotoAsset>) -> Vec<AssetId> {
        let was_empty = self.entries.is_empty();
        let mut added = Vec::new();
        for asset in assets {
            added.push(asset.id());
            self.entries.push(StoreEntry {
                asset,
                config: C::default(),
                attached: AttachedConfig::Absent,
            });
        }
        if was_empty && let Some(first) = added.first() {
            self.active = Some(*first);
        }
        tracing::debug!(tool = %C::TOOL, added = added.len(), total = self.entries.len(), "assets added");
        added
    }

    /// Remove an asset. If it was active, the entry after it (else before it) becomes active.
    pub fn remove(&mut self, id: AssetId) -> Option<PhotoAsset> {
        let idx = self.position(id)?;
        let entry = self.entries.remove(idx);
        if self.active == Some(id) {
            self.active = self
                .entries
                .get(idx)
                .or_else(|| idx.checked_sub(1).and_then(|i| self.entries.get(i)))
                .map(|e| e.asset.id());
        }
        Some(entry.asset)
    }

    /// Make `id` active. Unknown ids are ignored and return `false`.
    pub fn select(&mut self, id: AssetId) -> bool {
        if self.position(id).is_none() {
            tracing::debug!(asset = %id, "select ignored: asset not in store");
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn active_id(&self) -> Option<AssetId> {
        self.active
    }

    pub fn active(&self) -> Option<&StoreEntry<C>> {
        let id = self.active?;
        self.entries.iter().find(|e| e.asset.id() == id)
    }

    pub fn get(&self, id: AssetId) -> DarkroomResult<&StoreEntry<C>> {
        self.position(id)
            .map(|i| &self.entries[i])
            .ok_or(DarkroomError::ConfigNotFound(id))
    }

    pub fn config(&self, id: AssetId) -> DarkroomResult<&C> {
        Ok(&self.get(id)?.config)
    }

    /// Merge `patch` into one asset's config.
    pub fn update_config(&mut self, id: AssetId, patch: &C::Patch) -> DarkroomResult<()> {
        let idx = self.position(id).ok_or(DarkroomError::ConfigNotFound(id))?;
        self.entries[idx].config.apply_patch(patch);
        Ok(())
    }

    /// Merge `patch` into the active asset's config only. No-op without an active asset.
    pub fn update_active_config(&mut self, patch: &C::Patch) -> bool {
        match self.active {
            Some(id) => self.update_config(id, patch).is_ok(),
            None => false,
        }
    }

    pub fn reset_active_config(&mut self) -> bool {
        let Some(idx) = self.active.and_then(|id| self.position(id)) else {
            return false;
        };
        self.entries[idx].config.reset();
        true
    }

    /// Copy the active config onto every entry, the active one included.
    ///
    /// Destructive; `confirm` receives the number of entries that will be overwritten and must
    /// return `true` for anything to change.
    pub fn apply_active_config_to_all(&mut self, confirm: impl FnOnce(usize) -> bool) -> bool {
        let Some(template) = self.active().map(|e| e.config.clone()) else {
            return false;
        };
        if !confirm(self.entries.len()) {
            return false;
        }
        for entry in &mut self.entries {
            entry.config = template.clone();
        }
        tracing::info!(tool = %C::TOOL, count = self.entries.len(), "applied active config to all");
        true
    }

    /// Owned copy of every entry, for handing to a batch job.
    pub fn snapshot(&self) -> Vec<StoreEntry<C>> {
        self.entries.clone()
    }

    /// Replace the contents with assets handed over from the other tool.
    ///
    /// Each asset gets this tool's config from `carried` when present, defaults otherwise; a
    /// foreign-tool config is kept unchanged in `attached`. The active asset survives if its id is
    /// still present; otherwise the first asset is activated.
    pub fn import(&mut self, items: impl IntoIterator<Item = (PhotoAsset, AttachedConfig)>) {
        self.entries = items
            .into_iter()
            .map(|(asset, carried)| match C::from_attached(&carried) {
                Some(config) => StoreEntry {
                    asset,
                    config,
                    attached: AttachedConfig::Absent,
                },
                None => StoreEntry {
                    asset,
                    config: C::default(),
                    attached: carried,
                },
            })
            .collect();
        let keep = self.active.is_some_and(|id| self.position(id).is_some());
        if !keep {
            self.active = self.entries.first().map(|e| e.asset.id());
        }
        tracing::info!(tool = %C::TOOL, count = self.entries.len(), "imported transferred assets");
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [StoreEntry<C>] {
        &mut self.entries
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;

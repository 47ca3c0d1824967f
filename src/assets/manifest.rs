//! JSON persistence of per-photo configs, keyed by display name.
//!
//! LUT tables are not persisted; a restored color config keeps whatever LUT the entry already
//! has.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    assets::store::{AssetConfig, AssetStore, ToolKind},
    color::params::ColorConfig,
    foundation::error::{DarkroomError, DarkroomResult},
    geometry::config::GeometryConfig,
};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigManifest<C> {
    pub version: u32,
    pub tool: ToolKind,
    pub entries: Vec<ManifestEntry<C>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry<C> {
    pub name: String,
    pub config: C,
}

/// Configs that can round-trip through a manifest.
pub trait PersistedConfig: AssetConfig + Serialize + DeserializeOwned {
    /// Overwrite `self` with a restored value.
    fn restore_from(&mut self, restored: Self) {
        *self = restored;
    }
}

impl PersistedConfig for GeometryConfig {}

impl PersistedConfig for ColorConfig {
    fn restore_from(&mut self, restored: Self) {
        self.params = restored.params;
    }
}

impl<C: PersistedConfig> ConfigManifest<C> {
    pub fn from_json(text: &str) -> DarkroomResult<Self> {
        let manifest: Self = serde_json::from_str(text).context("parse config manifest json")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn read(path: &Path) -> DarkroomResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config manifest '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> DarkroomResult<String> {
        Ok(serde_json::to_string_pretty(self).context("serialize config manifest")?)
    }

    pub fn validate(&self) -> DarkroomResult<()> {
        if self.version != MANIFEST_VERSION {
            return Err(DarkroomError::validation(format!(
                "unsupported manifest version {} (expected {MANIFEST_VERSION})",
                self.version
            )));
        }
        if self.tool != C::TOOL {
            return Err(DarkroomError::validation(format!(
                "manifest is for the {} tool, not {}",
                self.tool,
                C::TOOL
            )));
        }
        Ok(())
    }
}

impl<C: PersistedConfig> AssetStore<C> {
    pub fn to_manifest(&self) -> ConfigManifest<C> {
        ConfigManifest {
            version: MANIFEST_VERSION,
            tool: C::TOOL,
            entries: self
                .entries()
                .iter()
                .map(|e| ManifestEntry {
                    name: e.asset.display_name().to_string(),
                    config: e.config.clone(),
                })
                .collect(),
        }
    }

    /// Restore configs onto entries whose display name matches. Returns how many were applied.
    ///
    /// With duplicate names, manifest entries pair with store entries in order.
    pub fn apply_manifest(&mut self, manifest: &ConfigManifest<C>) -> DarkroomResult<usize> {
        manifest.validate()?;
        let mut used = vec![false; manifest.entries.len()];
        let mut applied = 0;
        for entry in self.entries_mut() {
            let hit = manifest
                .entries
                .iter()
                .enumerate()
                .find(|(i, m)| !used[*i] && m.name == entry.asset.display_name());
            if let Some((i, m)) = hit {
                used[i] = true;
                entry.config.restore_from(m.config.clone());
                applied += 1;
            }
        }
        let unmatched = used.iter().filter(|u| !**u).count();
        if unmatched > 0 {
            tracing::debug!(unmatched, "manifest entries without a matching asset");
        }
        Ok(applied)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/manifest.rs"]
mod tests;

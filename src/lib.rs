//! Darkroom is a batch photo workbench with two tools over one shared asset model.
//!
//! - **Frame**: composite each photo onto a preset or natural-size canvas with a shared overlay,
//!   placed per photo.
//! - **Filter**: grade each photo with fixed-order numeric adjustments and an optional `.cube`
//!   3D LUT.
//!
//! Both tools keep a per-photo config in an [`AssetStore`], export every photo into a ZIP on a
//! worker thread ([`JobHandle`]), and can hand baked pixels to the other tool
//! ([`TransferredAsset`]).
#![forbid(unsafe_code)]

pub mod assets;
pub mod color;
pub mod export;
pub mod foundation;
pub mod geometry;
pub mod tools;
pub mod transfer;

pub use crate::assets::decode::{OverlayAsset, PremulImage};
pub use crate::assets::manifest::{ConfigManifest, ManifestEntry};
pub use crate::assets::store::{AssetStore, AttachedConfig, PhotoAsset, StoreEntry, ToolKind};
pub use crate::color::engine::GradingEngine;
pub use crate::color::lut::Lut3d;
pub use crate::color::params::{ColorConfig, ColorParams, ColorPatch};
pub use crate::export::encode::OutputFormat;
pub use crate::export::job::{JobEvent, JobHandle};
pub use crate::export::pipeline::{ExportArchive, ExportSettings, OverlaySource, SkippedAsset};
pub use crate::foundation::core::{AssetId, Canvas, Rgb8};
pub use crate::foundation::error::{DarkroomError, DarkroomResult};
pub use crate::geometry::composite::Composite;
pub use crate::geometry::config::{CanvasMode, FitMode, GeometryConfig, GeometryPatch};
pub use crate::geometry::layout::SizingPurpose;
pub use crate::tools::filter::FilterTool;
pub use crate::tools::frame::FrameTool;
pub use crate::transfer::bridge::TransferredAsset;

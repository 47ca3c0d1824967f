//! Frame tool geometry: per-photo placement config, canvas/fit/overlay math, and the CPU
//! compositor that rasterizes a layout.

/// Per-photo placement config and interactive pan/zoom helpers.
pub mod config;
/// Pure rectangle math for canvases, photo fit and overlay placement.
pub mod layout;
/// Rasterize a [`layout::FrameLayout`] into an RGBA surface.
pub mod composite;

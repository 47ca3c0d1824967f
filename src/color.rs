//! Filter tool color grading.
//!
//! [`engine::GradingEngine`] is the stateful surface used by both preview and batch paths; the
//! pixel math in [`ops`] defines the fixed stage order they share.

/// Stateful grading surface.
pub mod engine;
/// `.cube` 3D LUT parsing and trilinear sampling.
pub mod lut;
/// Per-pixel adjustment stages.
pub mod ops;
/// Adjustment parameters and the per-photo color config.
pub mod params;

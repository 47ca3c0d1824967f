//! Cross-tool handoff of baked pixels.

pub mod bridge;

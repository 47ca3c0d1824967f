//! Interactive sessions for the Frame and Filter tools.
//!
//! A session owns the asset store and preview engines for one tool. Batch jobs receive an
//! immutable snapshot and never touch session state.

pub mod filter;
pub mod frame;
/// Overlay slot and preview render sequencing.
pub mod preview;

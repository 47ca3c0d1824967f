//! Shared value types, the error taxonomy and pixel math.

pub mod core;
pub mod error;
pub(crate) mod math;

//! Photo and overlay assets, the per-asset config store, and config persistence.

/// Image decoding and the premultiplied overlay asset.
pub mod decode;
/// JSON config manifests keyed by display name.
pub mod manifest;
/// `PhotoAsset` and the ordered per-asset config store.
pub mod store;

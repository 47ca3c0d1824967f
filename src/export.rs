//! Batch export: codecs, the archive writer, job events and the worker pipeline.

/// ZIP archive assembly with collision-free entry names.
pub mod archive;
/// Compressed image output.
pub mod encode;
/// Job messages, the single-terminal reporter and worker handles.
pub mod job;
/// The per-asset export loop and tool renderers.
pub mod pipeline;

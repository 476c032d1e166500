//! Folder and batch video assembly.

/// Batch processing of every subfolder of an execution folder.
pub mod batch;
/// Single-folder assembly pipeline.
pub mod folder;
/// Per-image timing and the concatenated visual sequence.
pub mod timeline;

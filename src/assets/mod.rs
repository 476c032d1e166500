//! Input-side helpers: the execution folder convention and image fitting.

/// Image fitting (fill-crop / letterbox) onto the output canvas.
pub mod fit;
/// Execution folder layout and discovery.
pub mod layout;

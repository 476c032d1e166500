//! Narration and background-music handling.

/// Decoding audio files into PCM.
pub mod decode;
/// Gain, trimming and additive mixing.
pub mod mix;

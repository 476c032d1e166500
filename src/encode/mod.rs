//! Video encoding.
//!
//! Encoders consume a finished [`VisualSequence`](crate::assemble::timeline::VisualSequence) plus
//! its [`MixedAudio`](crate::audio::mix::MixedAudio) and write one container file.

/// `ffmpeg`-based encoder (system binary driven over stdin).
pub mod ffmpeg;
/// Encoder trait, job description and the recording test encoder.
pub mod sink;

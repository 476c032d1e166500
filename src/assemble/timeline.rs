use std::path::PathBuf;
use std::sync::Arc;

use image::RgbImage;

use crate::foundation::core::{Fps, Resolution};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Display time of each image when `image_count` images share `total_secs` evenly.
pub fn per_image_duration(total_secs: f64, image_count: usize) -> SlidecastResult<f64> {
    if image_count == 0 {
        return Err(SlidecastError::missing_input("no images to display"));
    }
    if !total_secs.is_finite() || total_secs <= 0.0 {
        return Err(SlidecastError::audio(format!(
            "narration duration must be positive, got {total_secs}"
        )));
    }
    Ok(total_secs / image_count as f64)
}

/// One still image held on screen for `duration_secs`.
#[derive(Clone, Debug)]
pub struct Clip {
    /// Image file the frame was produced from.
    pub source: PathBuf,
    /// Fitted RGB8 pixels at the output resolution.
    pub frame: Arc<RgbImage>,
    /// Seconds on screen.
    pub duration_secs: f64,
}

/// Ordered, concatenated clips that make up the video track.
#[derive(Clone, Debug)]
pub struct VisualSequence {
    resolution: Resolution,
    clips: Vec<Clip>,
}

impl VisualSequence {
    /// Concatenate `clips` in order.
    ///
    /// Fails when empty or when a clip's frame size differs from the first one.
    pub fn concat(clips: Vec<Clip>) -> SlidecastResult<Self> {
        let first = clips
            .first()
            .ok_or_else(|| SlidecastError::composition("no image clips to concatenate"))?;
        let (width, height) = first.frame.dimensions();
        let resolution = Resolution::new(width, height)?;

        for clip in &clips {
            if clip.frame.dimensions() != (width, height) {
                return Err(SlidecastError::composition(format!(
                    "clip '{}' is {}x{}, expected {resolution}",
                    clip.source.display(),
                    clip.frame.width(),
                    clip.frame.height()
                )));
            }
            if !clip.duration_secs.is_finite() || clip.duration_secs <= 0.0 {
                return Err(SlidecastError::composition(format!(
                    "clip '{}' has invalid duration {}",
                    clip.source.display(),
                    clip.duration_secs
                )));
            }
        }
        Ok(Self { resolution, clips })
    }

    /// Frame size shared by every clip.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Clips in display order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Always `false`; construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Sum of clip durations.
    pub fn total_secs(&self) -> f64 {
        self.clips.iter().map(|c| c.duration_secs).sum()
    }

    /// Frames emitted for each clip at `fps`.
    ///
    /// Clip `i` covers `[round(start_i * fps), round(end_i * fps))`, so per-clip rounding never
    /// accumulates into drift against the audio.
    pub fn frame_counts(&self, fps: Fps) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.clips.len());
        let mut start_secs = 0.0f64;
        let mut start_frame = 0u64;
        for clip in &self.clips {
            let end_secs = start_secs + clip.duration_secs;
            let end_frame = fps.secs_to_frames_round(end_secs);
            out.push(end_frame.saturating_sub(start_frame));
            start_secs = end_secs;
            start_frame = end_frame;
        }
        out
    }

    /// Total frames at `fps`.
    pub fn total_frames(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_round(self.total_secs())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/timeline.rs"]
mod tests;

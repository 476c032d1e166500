use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::assemble::timeline::VisualSequence;
use crate::audio::mix::MixedAudio;
use crate::foundation::core::{Fps, Resolution};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Container format of the produced video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// MPEG-4 (`.mp4`).
    #[default]
    Mp4,
    /// QuickTime (`.mov`).
    Mov,
    /// Matroska (`.mkv`).
    Mkv,
}

impl OutputFormat {
    /// Every supported format.
    pub const ALL: [OutputFormat; 3] = [Self::Mp4, Self::Mov, Self::Mkv];

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Mkv => "mkv",
        }
    }

    /// Whether the container understands `-movflags +faststart`.
    pub fn supports_faststart(self) -> bool {
        matches!(self, Self::Mp4 | Self::Mov)
    }

    /// Guess the format from `path`'s extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl FromStr for OutputFormat {
    type Err = SlidecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == lower)
            .ok_or_else(|| {
                SlidecastError::configuration(format!(
                    "unsupported output format '{s}' (expected mp4, mov or mkv)"
                ))
            })
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything an encoder needs to write one video file.
#[derive(Clone, Copy, Debug)]
pub struct EncodeJob<'a> {
    /// Ordered clips making up the video track.
    pub visuals: &'a VisualSequence,
    /// Soundtrack; its duration matches the visuals.
    pub audio: &'a MixedAudio,
    /// Output frame rate.
    pub fps: Fps,
    /// Destination file.
    pub out_path: &'a Path,
    /// Replace `out_path` if it already exists.
    pub overwrite: bool,
}

impl EncodeJob<'_> {
    /// Fail when `out_path` exists and overwriting is disabled.
    pub fn check_overwrite(&self) -> SlidecastResult<()> {
        if !self.overwrite && self.out_path.exists() {
            return Err(SlidecastError::encode(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }
        Ok(())
    }
}

/// Writes an encoded video for an [`EncodeJob`].
pub trait VideoEncoder: Send {
    /// Encode `job` and write `job.out_path`.
    fn encode(&self, job: &EncodeJob<'_>) -> SlidecastResult<()>;
}

/// What a [`RecordingEncoder`] saw for one job.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeRecord {
    /// Destination file.
    pub out_path: PathBuf,
    /// Frame size.
    pub resolution: Resolution,
    /// Frame rate.
    pub fps: Fps,
    /// Source image of each clip, in order.
    pub sources: Vec<PathBuf>,
    /// Duration of each clip, in order.
    pub clip_secs: Vec<f64>,
    /// Frames emitted per clip.
    pub frame_counts: Vec<u64>,
    /// Soundtrack duration.
    pub audio_secs: f64,
    /// Background duration after trimming.
    pub background_secs: f64,
}

/// Encoder that records jobs and writes a small placeholder file instead of video.
///
/// Clones share the same record list.
#[derive(Clone, Debug, Default)]
pub struct RecordingEncoder {
    records: Arc<Mutex<Vec<EncodeRecord>>>,
}

impl RecordingEncoder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded jobs in call order.
    pub fn records(&self) -> Vec<EncodeRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl VideoEncoder for RecordingEncoder {
    fn encode(&self, job: &EncodeJob<'_>) -> SlidecastResult<()> {
        job.check_overwrite()?;
        crate::encode::ffmpeg::ensure_parent_dir(job.out_path)?;

        let clips = job.visuals.clips();
        let record = EncodeRecord {
            out_path: job.out_path.to_path_buf(),
            resolution: job.visuals.resolution(),
            fps: job.fps,
            sources: clips.iter().map(|c| c.source.clone()).collect(),
            clip_secs: clips.iter().map(|c| c.duration_secs).collect(),
            frame_counts: job.visuals.frame_counts(job.fps),
            audio_secs: job.audio.duration_secs(),
            background_secs: job.audio.background_secs,
        };

        std::fs::write(
            job.out_path,
            format!(
                "slidecast placeholder {} clips {:.3}s\n",
                record.sources.len(),
                record.audio_secs
            ),
        )
        .map_err(|e| {
            SlidecastError::encode(format!(
                "failed to write '{}': {e}",
                job.out_path.display()
            ))
        })?;

        match self.records.lock() {
            Ok(mut r) => r.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::audio::mix::write_f32le_file;
use crate::encode::sink::{EncodeJob, OutputFormat, VideoEncoder};
use crate::foundation::error::{SlidecastError, SlidecastResult};

const VIDEO_CODEC: &str = "libx264";
const AUDIO_CODEC: &str = "aac";

/// Encoder that spawns the system `ffmpeg`, streams raw RGB frames to stdin and muxes the
/// mixed soundtrack from a temporary `f32le` file as H.264 + AAC.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn command(&self, job: &EncodeJob<'_>, audio_path: &Path) -> Command {
        let resolution = job.visuals.resolution();
        let fps = job.fps;
        let track = &job.audio.track;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if job.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &resolution.to_string(),
            // For rawvideo input `-r` must precede `-i`.
            "-r",
            &format!("{}/{}", fps.num, fps.den),
            "-i",
            "pipe:0",
            "-f",
            "f32le",
            "-ar",
            &track.sample_rate.to_string(),
            "-ac",
            &track.channels.to_string(),
            "-i",
        ])
        .arg(audio_path)
        .args([
            "-c:v",
            VIDEO_CODEC,
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            AUDIO_CODEC,
            "-shortest",
        ]);

        let faststart = OutputFormat::from_path(job.out_path)
            .map(OutputFormat::supports_faststart)
            .unwrap_or(false);
        if faststart {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.arg(job.out_path);
        cmd
    }

    fn run(&self, job: &EncodeJob<'_>, audio_path: &Path) -> SlidecastResult<()> {
        let mut child = self
            .command(job, audio_path)
            .spawn()
            .map_err(|e| {
                SlidecastError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SlidecastError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SlidecastError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok::<_, std::io::Error>(stderr_bytes)
        });

        let mut write_result = Ok(());
        'clips: for (clip, frames) in job
            .visuals
            .clips()
            .iter()
            .zip(job.visuals.frame_counts(job.fps))
        {
            let raw = clip.frame.as_raw();
            for _ in 0..frames {
                if let Err(e) = stdin.write_all(raw) {
                    write_result = Err(e);
                    break 'clips;
                }
            }
        }
        drop(stdin);

        let status = child.wait().map_err(|e| {
            SlidecastError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| SlidecastError::encode("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| SlidecastError::encode(format!("ffmpeg stderr read failed: {e}")))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SlidecastError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        write_result.map_err(|e| {
            SlidecastError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode(&self, job: &EncodeJob<'_>) -> SlidecastResult<()> {
        let resolution = job.visuals.resolution();
        if !resolution.width.is_multiple_of(2) || !resolution.height.is_multiple_of(2) {
            return Err(SlidecastError::encode(format!(
                "frame size {resolution} must be even (required for yuv420p output)"
            )));
        }
        if job.fps.num == 0 || job.fps.den == 0 {
            return Err(SlidecastError::encode("fps must be non-zero"));
        }

        ensure_parent_dir(job.out_path)?;
        job.check_overwrite()?;

        if !is_ffmpeg_on_path() {
            return Err(SlidecastError::encode(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let audio_path = scratch_audio_path(job.out_path);
        write_f32le_file(&job.audio.track.samples, &audio_path)?;
        let result = self.run(job, &audio_path);
        if let Err(e) = std::fs::remove_file(&audio_path) {
            tracing::debug!(path = %audio_path.display(), "failed to remove scratch audio: {e}");
        }
        result
    }
}

/// Path of the temporary raw-audio file written next to `out_path`.
pub fn scratch_audio_path(out_path: &Path) -> PathBuf {
    let stem = out_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_owned());
    out_path.with_file_name(format!(".{stem}.mix.f32le"))
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

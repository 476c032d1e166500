use std::path::Path;

use crate::audio::decode::{AudioDecoder, AudioTrack};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Sample rate of the mixed output handed to the encoder.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Channel count of the mixed output.
pub const MIX_CHANNELS: u16 = 2;

/// Default background attenuation: roughly a fifth of the original amplitude.
pub const BACKGROUND_GAIN_DB: f32 = -14.0;

/// Convert a gain in decibels to a linear amplitude factor.
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

impl AudioTrack {
    /// Return a copy scaled by `db` decibels.
    pub fn gain_db(&self, db: f32) -> AudioTrack {
        let k = db_to_amplitude(db);
        AudioTrack {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples: self.samples.iter().map(|s| s * k).collect(),
        }
    }

    /// Return the `[start_secs, end_secs)` window, clamped to the available audio.
    pub fn slice(&self, start_secs: f64, end_secs: f64) -> AudioTrack {
        let frames = self.frames();
        let rate = f64::from(self.sample_rate);
        let start = ((start_secs.max(0.0) * rate).floor() as usize).min(frames);
        let end = ((end_secs.max(0.0) * rate).round() as usize).clamp(start, frames);
        let ch = usize::from(self.channels);
        AudioTrack {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples: self.samples[start * ch..end * ch].to_vec(),
        }
    }
}

/// Additively mix `tracks` into one `duration_secs` long track at `sample_rate`/`channels`.
///
/// Each source is resampled by linear interpolation; mono sources feed every output channel.
/// Sources shorter than the output leave silence behind them. The sum is clamped to `[-1, 1]`
/// and otherwise left unnormalized.
pub fn mix_tracks(
    tracks: &[&AudioTrack],
    duration_secs: f64,
    sample_rate: u32,
    channels: u16,
) -> SlidecastResult<AudioTrack> {
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(SlidecastError::composition(format!(
            "mix duration must be finite and >= 0, got {duration_secs}"
        )));
    }
    let out_frames = (duration_secs * f64::from(sample_rate)).round() as usize;
    let out_ch = usize::from(channels);
    let mut out = vec![0.0f32; out_frames * out_ch];

    for track in tracks {
        mix_into(&mut out, out_frames, sample_rate, channels, track);
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    AudioTrack::new(sample_rate, channels, out)
}

fn mix_into(
    out: &mut [f32],
    out_frames: usize,
    out_rate: u32,
    out_channels: u16,
    src: &AudioTrack,
) {
    let src_frames = src.frames();
    if src_frames == 0 {
        return;
    }
    let src_ch = usize::from(src.channels);
    let out_ch = usize::from(out_channels);
    let step = f64::from(src.sample_rate) / f64::from(out_rate);

    for dst_frame in 0..out_frames {
        let src_pos = dst_frame as f64 * step;
        let src_frame0 = src_pos.floor() as usize;
        if src_frame0 >= src_frames {
            break;
        }
        let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
        let frac = (src_pos - src_frame0 as f64) as f32;

        for c in 0..out_ch {
            let sc = if src_ch == 1 { 0 } else { c.min(src_ch - 1) };
            let v0 = src.samples[src_frame0 * src_ch + sc];
            let v1 = src.samples[src_frame1 * src_ch + sc];
            out[dst_frame * out_ch + c] += v0 + (v1 - v0) * frac;
        }
    }
}

/// Narration plus attenuated background, decoded and ready to composite.
#[derive(Clone, Debug)]
pub struct LoadedAudio {
    /// Primary track; its duration is authoritative.
    pub narration: AudioTrack,
    /// Background track with gain already applied, not yet trimmed.
    pub background: AudioTrack,
}

impl LoadedAudio {
    /// Narration duration in seconds.
    pub fn narration_secs(&self) -> f64 {
        self.narration.duration_secs()
    }

    /// Trim the background to `[0, narration)` and composite both tracks.
    pub fn mix(&self) -> SlidecastResult<MixedAudio> {
        let total = self.narration_secs();
        let background = self.background.slice(0.0, total);
        let track = mix_tracks(
            &[&self.narration, &background],
            total,
            MIX_SAMPLE_RATE,
            MIX_CHANNELS,
        )?;
        Ok(MixedAudio {
            track,
            narration_secs: total,
            background_secs: background.duration_secs(),
        })
    }
}

/// Final composited soundtrack.
#[derive(Clone, Debug)]
pub struct MixedAudio {
    /// Interleaved PCM at [`MIX_SAMPLE_RATE`] with [`MIX_CHANNELS`] channels.
    pub track: AudioTrack,
    /// Narration duration the mix was sized to.
    pub narration_secs: f64,
    /// Background duration after trimming.
    pub background_secs: f64,
}

impl MixedAudio {
    /// Duration of the composited track.
    pub fn duration_secs(&self) -> f64 {
        self.track.duration_secs()
    }
}

/// Loads narration and background music and applies the background level.
pub struct AudioMixer {
    decoder: Box<dyn AudioDecoder>,
    background_gain_db: f32,
}

impl AudioMixer {
    /// Mixer using `decoder` and the given background gain.
    pub fn new(decoder: Box<dyn AudioDecoder>, background_gain_db: f32) -> Self {
        Self {
            decoder,
            background_gain_db,
        }
    }

    /// Background gain in decibels.
    pub fn background_gain_db(&self) -> f32 {
        self.background_gain_db
    }

    /// Decode the narration.
    pub fn load_narration(&self, path: &Path) -> SlidecastResult<AudioTrack> {
        self.decoder.decode(path).map_err(|e| {
            SlidecastError::audio(format!(
                "failed to load narration '{}': {}",
                path.display(),
                strip_prefix(&e)
            ))
        })
    }

    /// Decode the background music and attenuate it.
    pub fn load_background(&self, path: &Path) -> SlidecastResult<AudioTrack> {
        let track = self.decoder.decode(path).map_err(|e| {
            SlidecastError::audio(format!(
                "failed to load background music '{}': {}",
                path.display(),
                strip_prefix(&e)
            ))
        })?;
        Ok(track.gain_db(self.background_gain_db))
    }

    /// Decode both tracks. Either failure aborts without a partial result.
    pub fn load(&self, narration: &Path, background: &Path) -> SlidecastResult<LoadedAudio> {
        Ok(LoadedAudio {
            narration: self.load_narration(narration)?,
            background: self.load_background(background)?,
        })
    }

    /// Load both tracks and composite them.
    pub fn mix(&self, narration: &Path, background: &Path) -> SlidecastResult<MixedAudio> {
        self.load(narration, background)?.mix()
    }
}

fn strip_prefix(e: &SlidecastError) -> String {
    match e {
        SlidecastError::Audio(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            SlidecastError::encode(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        SlidecastError::encode(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub samples: Vec<f32>,
}

impl AudioTrack {
    /// Build a track, validating that `samples` holds whole frames.
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> SlidecastResult<Self> {
        if sample_rate == 0 {
            return Err(SlidecastError::audio("sample rate must be non-zero"));
        }
        if channels == 0 {
            return Err(SlidecastError::audio("channel count must be non-zero"));
        }
        if !samples.len().is_multiple_of(usize::from(channels)) {
            return Err(SlidecastError::audio(
                "sample count is not a multiple of the channel count",
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
            samples,
        })
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Turns an audio file into PCM.
pub trait AudioDecoder: Send {
    /// Decode the whole file at `path`.
    fn decode(&self, path: &Path) -> SlidecastResult<AudioTrack>;
}

/// [`AudioDecoder`] backed by `symphonia` (WAV, MP3, FLAC, AAC, Vorbis, ...).
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> SlidecastResult<AudioTrack> {
        let file = File::open(path).map_err(|e| {
            SlidecastError::audio(format!("failed to open '{}': {e}", path.display()))
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension() {
            hint.with_extension(&ext.to_string_lossy());
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                SlidecastError::audio(format!(
                    "failed to probe audio format of '{}': {e}",
                    path.display()
                ))
            })?;
        let mut format = probed.format;

        let track = format.default_track().ok_or_else(|| {
            SlidecastError::audio(format!("no audio track in '{}'", path.display()))
        })?;
        let mut track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);

        let mut decoder = make_decoder(track, path)?;

        let mut samples = Vec::<f32>::new();
        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(e) => match classify_read_error(e) {
                    ReadOutcome::End => break,
                    ReadOutcome::Reset => {
                        let track = format.default_track().ok_or_else(|| {
                            SlidecastError::audio(format!(
                                "no audio track after stream reset in '{}'",
                                path.display()
                            ))
                        })?;
                        tracing::debug!(
                            path = %path.display(),
                            track = track.id,
                            "stream reset, continuing with the new default track"
                        );
                        track_id = track.id;
                        decoder = make_decoder(track, path)?;
                        continue;
                    }
                    ReadOutcome::Fail(e) => {
                        return Err(SlidecastError::audio(format!(
                            "failed to read packet from '{}': {e}",
                            path.display()
                        )));
                    }
                },
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(buf) => {
                    let spec = *buf.spec();
                    let buf_channels = spec.channels.count() as u16;
                    if !samples.is_empty()
                        && (spec.rate != sample_rate || buf_channels != channels)
                    {
                        return Err(SlidecastError::audio(format!(
                            "'{}' changes format mid-stream ({sample_rate} Hz/{channels} ch \
                             then {} Hz/{buf_channels} ch)",
                            path.display(),
                            spec.rate
                        )));
                    }
                    sample_rate = spec.rate;
                    channels = buf_channels;
                    let mut interleaved = SampleBuffer::<f32>::new(buf.capacity() as u64, spec);
                    interleaved.copy_interleaved_ref(buf);
                    samples.extend_from_slice(interleaved.samples());
                }
                // Corrupt frames are dropped; the rest of the stream is still usable.
                Err(SymphoniaError::DecodeError(msg)) => {
                    tracing::debug!(path = %path.display(), "skipping undecodable packet: {msg}");
                }
                Err(e) => {
                    return Err(SlidecastError::audio(format!(
                        "failed to decode '{}': {e}",
                        path.display()
                    )));
                }
            }
        }

        if sample_rate == 0 || channels == 0 {
            return Err(SlidecastError::audio(format!(
                "'{}' does not declare a sample rate and channel layout",
                path.display()
            )));
        }
        AudioTrack::new(sample_rate, channels, samples)
    }
}

/// How the packet loop reacts to a demuxer error.
#[derive(Debug)]
enum ReadOutcome {
    /// Clean end of stream.
    End,
    /// A chained stream began; the track list has to be read again.
    Reset,
    Fail(SymphoniaError),
}

fn classify_read_error(err: SymphoniaError) -> ReadOutcome {
    match err {
        SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            ReadOutcome::End
        }
        SymphoniaError::ResetRequired => ReadOutcome::Reset,
        other => ReadOutcome::Fail(other),
    }
}

fn make_decoder(track: &Track, path: &Path) -> SlidecastResult<Box<dyn Decoder>> {
    symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| {
            SlidecastError::audio(format!(
                "unsupported codec in '{}': {e}",
                path.display()
            ))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/decode.rs"]
mod tests;

//! Slidecast assembles slideshow videos from folders of still images plus a narration track and
//! background music.
//!
//! Each execution folder `<name>/` holds `imagenes/*.{png,jpg,jpeg}`, `<name>.wav` and
//! `music_<name>.mp3`. The images share the narration's duration evenly, are fitted to the chosen
//! resolution, and are encoded together with the narration mixed over the attenuated background
//! into `video_<name>.mp4`.
//!
//! - Configure a run with [`SlideshowConfig`] or [`PipelineOpts`]
//! - Build a [`Pipeline`] (optionally injecting collaborators and a [`Relay`])
//! - Call [`Pipeline::assemble`] for one folder or [`Pipeline::process_all`] for a batch, or run
//!   either in the background with [`session::spawn_folder`] / [`session::spawn_batch`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Folder and batch assembly.
pub mod assemble;
/// Input folder layout and image fitting.
pub mod assets;
/// Audio decoding and mixing.
pub mod audio;
/// Run configuration and resolution selection.
pub mod config;
/// Video encoders.
pub mod encode;
/// Progress/log relay.
pub mod relay;
/// Background job runner.
pub mod session;

pub use crate::foundation::core::{Fps, Resolution};
pub use crate::foundation::error::{SlidecastError, SlidecastResult};

pub use crate::assemble::batch::BatchResult;
pub use crate::assemble::folder::{Pipeline, PipelineOpts, failure_message};
pub use crate::assemble::timeline::{Clip, VisualSequence, per_image_duration};
pub use crate::assets::fit::{FitMode, FitPlan, ImageFit, ImageFitter};
pub use crate::assets::layout::{ExecutionFolder, list_subfolders};
pub use crate::audio::decode::{AudioDecoder, AudioTrack, SymphoniaDecoder};
pub use crate::audio::mix::{AudioMixer, MixedAudio, mix_tracks};
pub use crate::config::SlideshowConfig;
pub use crate::config::resolution::ResolutionSelector;
pub use crate::encode::ffmpeg::{FfmpegEncoder, is_ffmpeg_on_path};
pub use crate::encode::sink::{
    EncodeJob, EncodeRecord, OutputFormat, RecordingEncoder, VideoEncoder,
};
pub use crate::relay::{ChannelSink, EventSink, LogEvent, LogLevel, MemorySink, NullSink, Relay};
pub use crate::session::JobHandle;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assemble::timeline::{Clip, VisualSequence, per_image_duration};
use crate::assets::fit::{FitMode, ImageFit, ImageFitter};
use crate::assets::layout::ExecutionFolder;
use crate::audio::decode::{AudioDecoder, SymphoniaDecoder};
use crate::audio::mix::{AudioMixer, BACKGROUND_GAIN_DB, LoadedAudio};
use crate::config::SlideshowConfig;
use crate::encode::ffmpeg::FfmpegEncoder;
use crate::encode::sink::{EncodeJob, OutputFormat, VideoEncoder};
use crate::foundation::core::{Fps, Resolution};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::relay::Relay;

/// Message shown to operators when a folder's video could not be generated.
pub fn failure_message(err: &SlidecastError) -> String {
    format!("video generation failed: {err}")
}

/// Per-run settings applied to every folder.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOpts {
    /// Output frame size.
    pub resolution: Resolution,
    /// Image-to-canvas mapping.
    pub fit: FitMode,
    /// Output frame rate.
    pub fps: Fps,
    /// Output container; also picks the file extension.
    pub format: OutputFormat,
    /// Replace an existing output video.
    pub overwrite: bool,
    /// Background music level in dB.
    pub background_gain_db: f32,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            fit: FitMode::default(),
            fps: Fps::default(),
            format: OutputFormat::default(),
            overwrite: true,
            background_gain_db: BACKGROUND_GAIN_DB,
        }
    }
}

impl PipelineOpts {
    /// Validate `cfg` and turn it into pipeline options.
    pub fn from_config(cfg: &SlideshowConfig) -> SlidecastResult<Self> {
        cfg.validate()?;
        Ok(Self {
            resolution: cfg.resolution()?,
            fit: cfg.fit,
            fps: cfg.fps()?,
            format: cfg.format,
            overwrite: cfg.overwrite,
            background_gain_db: cfg.background_gain_db,
        })
    }
}

/// Folder and batch video assembler.
///
/// Collaborators (image fitting, audio decoding, encoding) are injected; [`Pipeline::new`] wires
/// the default `image`/`symphonia`/`ffmpeg` backed ones.
pub struct Pipeline {
    pub(crate) opts: PipelineOpts,
    fitter: Box<dyn ImageFitter>,
    mixer: AudioMixer,
    encoder: Box<dyn VideoEncoder>,
    pub(crate) relay: Relay,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("opts", &self.opts)
            .field("relay", &self.relay)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline with the default collaborators and a relay that discards events.
    pub fn new(opts: PipelineOpts) -> Self {
        Self {
            fitter: Box::new(ImageFit::new(opts.fit)),
            mixer: AudioMixer::new(Box::new(SymphoniaDecoder), opts.background_gain_db),
            encoder: Box::new(FfmpegEncoder::new()),
            relay: Relay::default(),
            opts,
        }
    }

    /// Replace the image fitter.
    pub fn with_fitter(mut self, fitter: impl ImageFitter + 'static) -> Self {
        self.fitter = Box::new(fitter);
        self
    }

    /// Replace the audio decoder, keeping the configured background gain.
    pub fn with_decoder(mut self, decoder: impl AudioDecoder + 'static) -> Self {
        self.mixer = AudioMixer::new(Box::new(decoder), self.opts.background_gain_db);
        self
    }

    /// Replace the video encoder.
    pub fn with_encoder(mut self, encoder: impl VideoEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    /// Send progress events through `relay`.
    pub fn with_relay(mut self, relay: Relay) -> Self {
        self.relay = relay;
        self
    }

    /// Options this pipeline runs with.
    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Build `video_<name>.<ext>` inside `folder` and return its path.
    ///
    /// Every failure is reported through the relay before it is returned.
    pub fn assemble(&self, folder: &Path) -> SlidecastResult<PathBuf> {
        let relay = match folder.file_name() {
            Some(name) => self.relay.scoped(name.to_string_lossy()),
            None => self.relay.clone(),
        };
        relay.info(format!("processing folder: {}", folder.display()));

        let result = self.assemble_folder(folder, &relay);
        match &result {
            Ok(out) => relay.info(format!("video created: {}", out.display())),
            Err(e) => relay.error(format!("folder '{}' failed: {e}", folder.display())),
        }
        result
    }

    /// [`Pipeline::assemble`] with the failure rendered by [`failure_message`].
    pub fn generate(&self, folder: &Path) -> Result<PathBuf, String> {
        self.assemble(folder).map_err(|e| failure_message(&e))
    }

    fn assemble_folder(&self, folder: &Path, relay: &Relay) -> SlidecastResult<PathBuf> {
        let folder = ExecutionFolder::new(folder)?;

        let images = folder.list_images()?;
        relay.info(format!(
            "found {} images in {}",
            images.len(),
            folder.images_dir().display()
        ));

        let narration_path = folder.narration_path();
        if !narration_path.is_file() {
            return Err(SlidecastError::missing_input(format!(
                "narration not found: {}",
                narration_path.display()
            )));
        }
        let background_path = folder.background_path();
        if !background_path.is_file() {
            return Err(SlidecastError::missing_input(format!(
                "background music not found: {}",
                background_path.display()
            )));
        }

        relay.info("loading narration");
        let narration = self.mixer.load_narration(&narration_path)?;
        relay.info(format!(
            "processing background music ({:+.1} dB)",
            self.mixer.background_gain_db()
        ));
        let background = self.mixer.load_background(&background_path)?;
        let audio = LoadedAudio {
            narration,
            background,
        };
        let total_secs = audio.narration_secs();
        relay.info(format!("narration duration: {total_secs:.3} s"));

        if images.is_empty() {
            return Err(SlidecastError::missing_input(format!(
                "no images to process in {}",
                folder.images_dir().display()
            )));
        }

        // Skipped images still count: survivors keep the share computed from the full list.
        let image_count = images.len();
        let per_image = per_image_duration(total_secs, image_count)?;
        relay.info(format!("each image is shown for {per_image:.3} s"));

        let mut clips = Vec::with_capacity(image_count);
        for (idx, path) in images.iter().enumerate() {
            relay.info(format!(
                "processing image {}/{image_count}: {}",
                idx + 1,
                path.display()
            ));
            match self.fitter.fit(path, self.opts.resolution) {
                Ok(frame) => clips.push(Clip {
                    source: path.clone(),
                    frame: Arc::new(frame),
                    duration_secs: per_image,
                }),
                Err(e) => relay.warn(format!("skipping image {}: {e}", path.display())),
            }
        }
        if clips.is_empty() {
            return Err(SlidecastError::composition(
                "none of the images could be processed",
            ));
        }

        relay.info(format!("concatenating {} image clips", clips.len()));
        let visuals = VisualSequence::concat(clips)?;

        relay.info("mixing narration and background music");
        let mixed = audio.mix()?;

        let out_path = folder.output_path(self.opts.format.extension());
        relay.info(format!("writing video: {}", out_path.display()));
        self.encoder
            .encode(&EncodeJob {
                visuals: &visuals,
                audio: &mixed,
                fps: self.opts.fps,
                out_path: &out_path,
                overwrite: self.opts.overwrite,
            })
            .map_err(|e| match e {
                SlidecastError::Encode(_) => e,
                other => SlidecastError::encode(other.to_string()),
            })?;

        Ok(out_path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/folder.rs"]
mod tests;

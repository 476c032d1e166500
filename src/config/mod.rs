//! Run configuration: resolution selection, fit mode, timing and output options.
//!
//! A [`SlideshowConfig`] can be loaded from a JSON file; every field is optional and falls back to
//! the defaults below.

use std::path::Path;

use anyhow::Context as _;

use crate::assets::fit::FitMode;
use crate::audio::mix::BACKGROUND_GAIN_DB;
use crate::encode::sink::OutputFormat;
use crate::foundation::core::{Fps, Resolution};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Resolution selectors and their resolution to pixel sizes.
pub mod resolution;

use self::resolution::ResolutionSelector;

/// Settings shared by every folder of a run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlideshowConfig {
    /// Resolution selector string (`"1920x1080"`, `"786x480"`, `"Vertical"`, `"Personalizado"`).
    pub resolution: String,
    /// Width used with `"Personalizado"`.
    pub custom_width: Option<u32>,
    /// Height used with `"Personalizado"`.
    pub custom_height: Option<u32>,
    /// How images are mapped onto the canvas.
    pub fit: FitMode,
    /// Output frame rate (whole frames per second).
    pub fps: u32,
    /// Background music level relative to the narration, in dB.
    pub background_gain_db: f32,
    /// Output container.
    pub format: OutputFormat,
    /// Replace an existing output video.
    pub overwrite: bool,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            resolution: ResolutionSelector::FullHd.as_str().to_owned(),
            custom_width: None,
            custom_height: None,
            fit: FitMode::default(),
            fps: 24,
            background_gain_db: BACKGROUND_GAIN_DB,
            format: OutputFormat::default(),
            overwrite: true,
        }
    }
}

impl SlideshowConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> SlidecastResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json(&text).map_err(|e| match e {
            SlidecastError::Configuration(msg) => {
                SlidecastError::configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse a JSON config document.
    pub fn from_json(text: &str) -> SlidecastResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| SlidecastError::configuration(format!("invalid config: {e}")))
    }

    /// Check every field without touching the filesystem.
    pub fn validate(&self) -> SlidecastResult<()> {
        self.resolution()?;
        self.fps()?;
        if !self.background_gain_db.is_finite() {
            return Err(SlidecastError::configuration(
                "background_gain_db must be finite",
            ));
        }
        Ok(())
    }

    /// Parsed resolution selector.
    pub fn selector(&self) -> SlidecastResult<ResolutionSelector> {
        self.resolution.parse()
    }

    /// Output resolution.
    pub fn resolution(&self) -> SlidecastResult<Resolution> {
        self.selector()?
            .resolve_dims(self.custom_width, self.custom_height)
    }

    /// Output frame rate.
    pub fn fps(&self) -> SlidecastResult<Fps> {
        Fps::new(self.fps, 1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/mod.rs"]
mod tests;

use std::path::Path;

use image::{DynamicImage, ImageReader, RgbImage, imageops};

use crate::foundation::core::Resolution;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// How a source image is mapped onto the output canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMode {
    /// Scale to cover the whole canvas, then center-crop the overflow. No borders.
    #[default]
    FillCrop,
    /// Scale to fit inside the canvas and center it on black. No cropping.
    Letterbox,
}

impl FitMode {
    /// Stable kebab-case name used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            FitMode::FillCrop => "fill-crop",
            FitMode::Letterbox => "letterbox",
        }
    }
}

impl std::str::FromStr for FitMode {
    type Err = SlidecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fill-crop" => Ok(FitMode::FillCrop),
            "letterbox" => Ok(FitMode::Letterbox),
            other => Err(SlidecastError::configuration(format!(
                "unknown fit mode '{other}' (expected 'fill-crop' or 'letterbox')"
            ))),
        }
    }
}

/// Pure geometry of a fit: the resize target plus the crop or padding offsets.
///
/// Exactly one of `crop_*` / `pad_*` pairs is non-zero for a given mode; both are zero when the
/// scaled image already matches the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitPlan {
    /// Width after resampling.
    pub scaled_width: u32,
    /// Height after resampling.
    pub scaled_height: u32,
    /// Left edge of the crop window inside the scaled image.
    pub crop_x: u32,
    /// Top edge of the crop window inside the scaled image.
    pub crop_y: u32,
    /// Left edge of the scaled image on the canvas.
    pub pad_x: u32,
    /// Top edge of the scaled image on the canvas.
    pub pad_y: u32,
}

// Absorbs float error so that e.g. 1919.9999997 does not truncate to 1919.
const SCALE_EPS: f64 = 1e-6;

impl FitPlan {
    /// Compute the plan for a `src_width`x`src_height` image on `target`.
    pub fn compute(
        mode: FitMode,
        src_width: u32,
        src_height: u32,
        target: Resolution,
    ) -> SlidecastResult<Self> {
        if src_width == 0 || src_height == 0 {
            return Err(SlidecastError::decode("source image has zero dimensions"));
        }
        let (tw, th) = (target.width, target.height);
        let scale_w = f64::from(tw) / f64::from(src_width);
        let scale_h = f64::from(th) / f64::from(src_height);

        match mode {
            FitMode::FillCrop => {
                let scale = scale_w.max(scale_h);
                let nw = scaled_dim(src_width, scale).max(tw);
                let nh = scaled_dim(src_height, scale).max(th);
                Ok(Self {
                    scaled_width: nw,
                    scaled_height: nh,
                    crop_x: (nw - tw) / 2,
                    crop_y: (nh - th) / 2,
                    pad_x: 0,
                    pad_y: 0,
                })
            }
            FitMode::Letterbox => {
                let scale = scale_w.min(scale_h);
                let nw = scaled_dim(src_width, scale).clamp(1, tw);
                let nh = scaled_dim(src_height, scale).clamp(1, th);
                Ok(Self {
                    scaled_width: nw,
                    scaled_height: nh,
                    crop_x: 0,
                    crop_y: 0,
                    pad_x: (tw - nw) / 2,
                    pad_y: (th - nh) / 2,
                })
            }
        }
    }
}

fn scaled_dim(src: u32, scale: f64) -> u32 {
    (f64::from(src) * scale + SCALE_EPS).floor() as u32
}

/// Produces a pixel buffer of exactly the target size from an image file.
pub trait ImageFitter: Send {
    /// Decode `path` and fit it to `target`.
    fn fit(&self, path: &Path, target: Resolution) -> SlidecastResult<RgbImage>;
}

/// [`ImageFitter`] backed by the `image` crate.
#[derive(Clone, Copy, Debug)]
pub struct ImageFit {
    /// Fit policy.
    pub mode: FitMode,
    /// Resampling kernel used for the resize step.
    pub filter: imageops::FilterType,
}

impl ImageFit {
    /// Fitter using `mode` and a Lanczos3 kernel.
    pub fn new(mode: FitMode) -> Self {
        Self {
            mode,
            filter: imageops::FilterType::Lanczos3,
        }
    }

    /// Replace the resampling kernel.
    pub fn with_filter(mut self, filter: imageops::FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Fit an already-decoded image.
    pub fn fit_image(&self, img: &DynamicImage, target: Resolution) -> SlidecastResult<RgbImage> {
        let rgb = img.to_rgb8();
        let plan = FitPlan::compute(self.mode, rgb.width(), rgb.height(), target)?;

        let scaled = if (plan.scaled_width, plan.scaled_height) == rgb.dimensions() {
            rgb
        } else {
            imageops::resize(&rgb, plan.scaled_width, plan.scaled_height, self.filter)
        };

        let out = match self.mode {
            FitMode::FillCrop => imageops::crop_imm(
                &scaled,
                plan.crop_x,
                plan.crop_y,
                target.width,
                target.height,
            )
            .to_image(),
            FitMode::Letterbox => {
                let mut canvas = RgbImage::new(target.width, target.height);
                imageops::replace(
                    &mut canvas,
                    &scaled,
                    i64::from(plan.pad_x),
                    i64::from(plan.pad_y),
                );
                canvas
            }
        };
        debug_assert_eq!(out.dimensions(), (target.width, target.height));
        Ok(out)
    }
}

impl Default for ImageFit {
    fn default() -> Self {
        Self::new(FitMode::default())
    }
}

impl ImageFitter for ImageFit {
    fn fit(&self, path: &Path, target: Resolution) -> SlidecastResult<RgbImage> {
        let img = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| {
                SlidecastError::decode(format!("failed to open image '{}': {e}", path.display()))
            })?
            .decode()
            .map_err(|e| {
                SlidecastError::decode(format!(
                    "failed to decode image '{}': {e}",
                    path.display()
                ))
            })?;
        self.fit_image(&img, target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fit.rs"]
mod tests;

use std::str::FromStr;

use crate::foundation::core::Resolution;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Resolution choices offered to operators, keyed by their exact selector strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionSelector {
    /// `"1920x1080"`.
    FullHd,
    /// `"786x480"`.
    Small,
    /// `"Vertical"` (720x1280).
    Vertical,
    /// `"Personalizado"`: operator-supplied width and height.
    Custom,
}

impl ResolutionSelector {
    /// Every selector, in the order they are presented.
    pub const ALL: [ResolutionSelector; 4] = [
        ResolutionSelector::FullHd,
        ResolutionSelector::Small,
        ResolutionSelector::Vertical,
        ResolutionSelector::Custom,
    ];

    /// Exact selector string.
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionSelector::FullHd => "1920x1080",
            ResolutionSelector::Small => "786x480",
            ResolutionSelector::Vertical => "Vertical",
            ResolutionSelector::Custom => "Personalizado",
        }
    }

    /// Fixed dimensions of a preset; `None` for [`ResolutionSelector::Custom`].
    pub fn preset(self) -> Option<Resolution> {
        let (width, height) = match self {
            ResolutionSelector::FullHd => (1920, 1080),
            ResolutionSelector::Small => (786, 480),
            ResolutionSelector::Vertical => (720, 1280),
            ResolutionSelector::Custom => return None,
        };
        Some(Resolution { width, height })
    }

    /// Resolve this selector, consulting the custom dimensions only for
    /// [`ResolutionSelector::Custom`].
    pub fn resolve(
        self,
        custom_width: Option<&str>,
        custom_height: Option<&str>,
    ) -> SlidecastResult<Resolution> {
        if let Some(r) = self.preset() {
            return Ok(r);
        }
        let w = custom_width
            .map(|w| parse_dimension("width", w))
            .transpose()?;
        let h = custom_height
            .map(|h| parse_dimension("height", h))
            .transpose()?;
        self.resolve_dims(w, h)
    }

    /// Same as [`ResolutionSelector::resolve`] with already-typed custom dimensions.
    pub fn resolve_dims(
        self,
        custom_width: Option<u32>,
        custom_height: Option<u32>,
    ) -> SlidecastResult<Resolution> {
        if let Some(r) = self.preset() {
            return Ok(r);
        }
        let (Some(w), Some(h)) = (custom_width, custom_height) else {
            return Err(SlidecastError::configuration(format!(
                "selector '{}' requires both a custom width and a custom height",
                self.as_str()
            )));
        };
        Resolution::new(w, h)
    }
}

impl FromStr for ResolutionSelector {
    type Err = SlidecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sel| sel.as_str() == s)
            .ok_or_else(|| SlidecastError::unknown_selector(s))
    }
}

impl std::fmt::Display for ResolutionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Resolution {
    /// Map a selector string (plus optional custom dimensions) to a validated resolution.
    ///
    /// Pure: performs no IO, so configuration mistakes surface before any folder is touched.
    pub fn resolve(
        selector: &str,
        custom_width: Option<&str>,
        custom_height: Option<&str>,
    ) -> SlidecastResult<Resolution> {
        selector
            .parse::<ResolutionSelector>()?
            .resolve(custom_width, custom_height)
    }
}

fn parse_dimension(name: &str, raw: &str) -> SlidecastResult<u32> {
    let v = raw.trim().parse::<u32>().map_err(|_| {
        SlidecastError::configuration(format!(
            "custom {name} must be a positive integer, got '{raw}'"
        ))
    })?;
    if v == 0 {
        return Err(SlidecastError::configuration(format!(
            "custom {name} must be a positive integer, got '{raw}'"
        )));
    }
    Ok(v)
}

#[cfg(test)]
#[path = "../../tests/unit/config/resolution.rs"]
mod tests;

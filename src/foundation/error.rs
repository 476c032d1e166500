/// Convenience result type used across slidecast.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    /// Bad or missing resolution dimensions, or invalid configuration values.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Resolution selector outside the recognized set.
    #[error("unknown resolution selector: {0}")]
    UnknownSelector(String),

    /// Required folder, file, or content is absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// An image could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An audio track could not be loaded or mixed.
    #[error("audio error: {0}")]
    Audio(String),

    /// The visual sequence could not be built or combined with audio.
    #[error("composition error: {0}")]
    Composition(String),

    /// The encoder failed to produce the output file.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    /// Build a [`SlidecastError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`SlidecastError::UnknownSelector`] value.
    pub fn unknown_selector(selector: impl Into<String>) -> Self {
        Self::UnknownSelector(selector.into())
    }

    /// Build a [`SlidecastError::MissingInput`] value.
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    /// Build a [`SlidecastError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SlidecastError::Audio`] value.
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Build a [`SlidecastError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`SlidecastError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Return `true` for errors raised before any filesystem or codec work.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::UnknownSelector(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

use thiserror::Error;

/// A specialized `Result` type for matching operations.
pub type MatchingResult<T> = Result<T, MatchError>;

/// The error type for decoding, scoring and staging.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Failed to decode reference image '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot read video '{name}': {reason}")]
    Frame { name: String, reason: String },

    #[error("No reference images to match video '{video}' against")]
    NoCandidates { video: String },

    #[error("Buffers must have the same dimensions: {left:?} vs {right:?}")]
    SizeMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("Buffer of {width}x{height} is smaller than the {window}x{window} window")]
    WindowTooLarge { width: u32, height: u32, window: u32 },

    #[error("Please provide both reference images and videos")]
    MissingInput,

    #[error("Upload name '{0}' is not a usable file name")]
    InvalidName(String),

    #[error("Upload name '{0}' was given more than once")]
    DuplicateName(String),
}

impl MatchError {
    pub(crate) fn frame(name: &str, reason: impl Into<String>) -> Self {
        MatchError::Frame {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

//! Crate-wide error type

/// Errors produced by buffer construction, noise evaluation, polygon fill,
/// and the codec / config / display collaborators.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid dimensions {width}x{height} with {channels} channels")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("noise frequency {freq} out of range for extent {extent}")]
    FrequencyOutOfRange { freq: usize, extent: usize },

    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("unsupported channel count {0}")]
    UnsupportedChannels(usize),

    #[error("codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("display error: {0}")]
    Display(String),
}

impl Error {
    pub fn display<T: ToString>(msg: T) -> Self {
        Error::Display(msg.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

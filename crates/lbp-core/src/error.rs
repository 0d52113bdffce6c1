use thiserror::Error;

#[derive(Error, Debug)]
pub enum LbpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid LBP configuration: {0}")]
    Config(String),

    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Position ({y}, {x}) is outside the valid region of a {height}x{width} image")]
    InvalidPosition {
        y: usize,
        x: usize,
        height: usize,
        width: usize,
    },

    #[error("Unsupported element type: {0}")]
    UnsupportedElementType(String),
}

impl LbpError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        LbpError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LbpError>;

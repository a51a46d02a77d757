use thiserror::Error;

/// Errors produced while extracting, transforming or exporting a palette.
#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("failed to load image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("canvas unavailable: cannot allocate a {width}x{height} surface")]
    CanvasUnavailable { width: u32, height: u32 },

    #[error("failed to encode png: {0}")]
    Encode(#[source] image::ImageError),

    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),

    #[error("unable to parse font: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, PaletteError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageInError {
    #[error("Pixel ({x}, {y}, channel {channel}) out of range for {width}x{height}x{channels} image")]
    OutOfRange {
        x: usize,
        y: usize,
        channel: usize,
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid source image: {0}")]
    ImageType(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ImageInError>;

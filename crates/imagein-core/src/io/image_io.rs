use std::path::Path;

use image::{ColorType, ExtendedColorType, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::error::{ImageInError, Result};
use crate::image::PixelBuffer;
use crate::io::vff::{read_vff, write_vff};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Png,
    Bmp,
    Jpeg,
    Vff,
}

impl FileFormat {
    /// Match a file extension or format name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "vff" => Some(Self::Vff),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_name)
    }

    fn codec(self) -> Option<ImageFormat> {
        match self {
            Self::Png => Some(ImageFormat::Png),
            Self::Bmp => Some(ImageFormat::Bmp),
            Self::Jpeg => Some(ImageFormat::Jpeg),
            Self::Vff => None,
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Bmp => write!(f, "BMP"),
            Self::Jpeg => write!(f, "JPEG"),
            Self::Vff => write!(f, "VFF"),
        }
    }
}

/// Load an image file as 8-bit samples.
///
/// Gray sources give 1 channel, gray+alpha 2, RGB 3 and RGBA 4. Deeper
/// sources are reduced to 8 bits. `.vff` files go through the VFF reader.
pub fn load_image(path: &Path) -> Result<PixelBuffer<u8>> {
    if FileFormat::from_path(path) == Some(FileFormat::Vff) {
        return read_vff(path);
    }

    let img = image::open(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);
    let (channels, raw) = match img.color() {
        ColorType::L8 | ColorType::L16 => (1, img.to_luma8().into_raw()),
        ColorType::La8 | ColorType::La16 => (2, img.to_luma_alpha8().into_raw()),
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => (3, img.to_rgb8().into_raw()),
        _ => (4, img.to_rgba8().into_raw()),
    };

    Ok(PixelBuffer::from_fn(w, h, channels, |x, y, c| {
        raw[(y * w + x) * channels + c]
    }))
}

/// Save an 8-bit buffer. The format comes from `format`, or else from the
/// file extension.
///
/// JPEG cannot hold alpha, so an alpha channel is dropped for it.
pub fn save_image(buffer: &PixelBuffer<u8>, path: &Path, format: Option<FileFormat>) -> Result<()> {
    let format = format
        .or_else(|| FileFormat::from_path(path))
        .ok_or_else(|| {
            ImageInError::UnsupportedFormat(format!("cannot infer format of {}", path.display()))
        })?;

    let Some(codec) = format.codec() else {
        return write_vff(buffer, path);
    };

    let has_alpha = matches!(buffer.channels(), 2 | 4);
    let channels = if format == FileFormat::Jpeg && has_alpha {
        buffer.channels() - 1
    } else {
        buffer.channels()
    };
    let color = match channels {
        1 => ExtendedColorType::L8,
        2 => ExtendedColorType::La8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        n => {
            return Err(ImageInError::UnsupportedFormat(format!(
                "{format} cannot store {n} channels"
            )))
        }
    };

    let (w, h) = (buffer.width(), buffer.height());
    let mut interleaved = Vec::with_capacity(w * h * channels);
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                interleaved.push(buffer.pixel_at(x, y, c));
            }
        }
    }

    image::save_buffer_with_format(path, &interleaved, w as u32, h as u32, color, codec)?;
    Ok(())
}

/// Collapse color channels to one gray channel (mean of R, G and B). Alpha is dropped.
pub fn to_gray(image: &PixelBuffer<u8>) -> PixelBuffer<u8> {
    match image.channels() {
        0 | 1 => image.clone(),
        2 => PixelBuffer::from_fn(image.width(), image.height(), 1, |x, y, _| image.pixel_at(x, y, 0)),
        c => {
            let color = c.min(3);
            PixelBuffer::from_fn(image.width(), image.height(), 1, |x, y, _| {
                let sum: u32 = (0..color).map(|ch| image.pixel_at(x, y, ch) as u32).sum();
                ((sum + color as u32 / 2) / color as u32) as u8
            })
        }
    }
}

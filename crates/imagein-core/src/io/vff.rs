use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::error::{ImageInError, Result};
use crate::image::PixelBuffer;

pub const VFF_MAGIC: &[u8; 4] = b"ncaa";
const SIZE_KEY: &[u8] = b"size=";
const FORM_FEED: u8 = 0x0C;

/// Dimensions parsed from a VFF header plus the offset of the first pixel byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VffHeader {
    pub width: usize,
    pub height: usize,
    pub data_offset: usize,
}

/// Serialize an 8-bit single-channel buffer as a VFF raster.
pub fn encode_vff(image: &PixelBuffer<u8>) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(image.size() + 96);
    write_vff_to(&mut bytes, image)?;
    Ok(bytes)
}

pub fn write_vff(image: &PixelBuffer<u8>, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_vff_to(&mut writer, image)?;
    writer.flush()?;
    Ok(())
}

fn write_vff_to(w: &mut impl Write, image: &PixelBuffer<u8>) -> Result<()> {
    if image.channels() != 1 {
        return Err(ImageInError::UnsupportedFormat(format!(
            "VFF stores one 8-bit band, image has {} channels",
            image.channels()
        )));
    }
    write!(
        w,
        "ncaa\nrank=2;\nsize={} {};\nbands=1;\n",
        image.width(),
        image.height()
    )?;
    w.write_all(b"bits=8;\nformat=base;\n")?;
    w.write_all(b"type=raster;\n\n\n\n\n\n\n\n\n\x0C\n")?;
    // Rows are contiguous in the single plane.
    w.write_all(image.as_slice())?;
    Ok(())
}

/// Parse the header of a VFF byte stream.
pub fn parse_header(bytes: &[u8]) -> Result<VffHeader> {
    if !bytes.starts_with(VFF_MAGIC) {
        return Err(ImageInError::UnsupportedFormat(
            "missing ncaa magic".into(),
        ));
    }
    let form_feed = bytes
        .iter()
        .position(|&b| b == FORM_FEED)
        .ok_or_else(|| ImageInError::UnsupportedFormat("missing header terminator".into()))?;
    let header = &bytes[..form_feed];

    let size_at = header
        .windows(SIZE_KEY.len())
        .position(|w| w == SIZE_KEY)
        .ok_or_else(|| ImageInError::UnsupportedFormat("missing size= entry".into()))?;
    let rest = &header[size_at + SIZE_KEY.len()..];
    let line_end = rest.iter().position(|&b| b == b';').unwrap_or(rest.len());
    let text = std::str::from_utf8(&rest[..line_end])
        .map_err(|_| ImageInError::UnsupportedFormat("size entry is not text".into()))?;

    let mut dims = text.split_whitespace().map(str::parse::<usize>);
    let (width, height) = match (dims.next(), dims.next()) {
        (Some(Ok(w)), Some(Ok(h))) => (w, h),
        _ => {
            return Err(ImageInError::UnsupportedFormat(format!(
                "malformed size entry {text:?}"
            )))
        }
    };

    Ok(VffHeader {
        width,
        height,
        // The form feed is followed by one newline before the raster.
        data_offset: form_feed + 2,
    })
}

/// Decode a VFF byte stream into a one-channel 8-bit buffer.
pub fn decode_vff(bytes: &[u8]) -> Result<PixelBuffer<u8>> {
    let header = parse_header(bytes)?;
    let len = header
        .width
        .checked_mul(header.height)
        .ok_or_else(|| ImageInError::UnsupportedFormat("image dimensions too large".into()))?;
    let end = header
        .data_offset
        .checked_add(len)
        .ok_or_else(|| ImageInError::UnsupportedFormat("image dimensions too large".into()))?;
    if bytes.len() < end {
        return Err(ImageInError::UnsupportedFormat(format!(
            "truncated raster: expected {} bytes after the header, got {}",
            len,
            bytes.len().saturating_sub(header.data_offset)
        )));
    }
    PixelBuffer::from_slice(
        header.width,
        header.height,
        1,
        &bytes[header.data_offset..end],
    )
}

/// Memory-map and decode a VFF file.
pub fn read_vff(path: &Path) -> Result<PixelBuffer<u8>> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    decode_vff(&mmap)
}

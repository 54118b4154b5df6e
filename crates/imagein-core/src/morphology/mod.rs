//! Grey-level mathematical morphology.
//!
//! Erosion takes the minimum and dilation the maximum of the samples under
//! the set cells of a [`StructuringElement`] anchored on each pixel. Taps
//! that fall outside the image are skipped; a pixel with no tap inside the
//! image erodes to `D::MAX` and dilates to `D::MIN`. The compound operators
//! pair an operation by `E` with its adjoint by `E.transpose()`.

pub mod element;

pub use element::{Direction, StructuringElement};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{ImageInError, Result};
use crate::image::PixelBuffer;
use crate::parallel::fill_lines;
use crate::sample::Sample;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MorphologyOp {
    Erosion,
    Dilation,
    Opening,
    Closing,
    Gradient,
    WhiteTopHat,
    BlackTopHat,
}

impl std::fmt::Display for MorphologyOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Erosion => write!(f, "Erosion"),
            Self::Dilation => write!(f, "Dilation"),
            Self::Opening => write!(f, "Opening"),
            Self::Closing => write!(f, "Closing"),
            Self::Gradient => write!(f, "Gradient"),
            Self::WhiteTopHat => write!(f, "White top-hat"),
            Self::BlackTopHat => write!(f, "Black top-hat"),
        }
    }
}

/// Run `op` on `image`. Fails with `ImageType` for an empty image.
pub fn apply<D: Sample>(
    op: MorphologyOp,
    image: &PixelBuffer<D>,
    element: &StructuringElement,
) -> Result<PixelBuffer<D>> {
    if image.is_empty() {
        return Err(ImageInError::ImageType(format!(
            "cannot apply {op} to an empty image"
        )));
    }
    debug!(
        op = %op,
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        element_width = element.resolved_width(),
        element_height = element.resolved_height(),
        "morphology"
    );
    let result = match op {
        MorphologyOp::Erosion => erode(image, element),
        MorphologyOp::Dilation => dilate(image, element),
        MorphologyOp::Opening => opening(image, element),
        MorphologyOp::Closing => closing(image, element),
        MorphologyOp::Gradient => gradient(image, element),
        MorphologyOp::WhiteTopHat => white_top_hat(image, element),
        MorphologyOp::BlackTopHat => black_top_hat(image, element),
    };
    Ok(result)
}

pub fn erode<D: Sample>(image: &PixelBuffer<D>, element: &StructuringElement) -> PixelBuffer<D> {
    rank_filter(image, element, D::MAX, |acc, v| if v < acc { v } else { acc })
}

pub fn dilate<D: Sample>(image: &PixelBuffer<D>, element: &StructuringElement) -> PixelBuffer<D> {
    rank_filter(image, element, D::MIN, |acc, v| if v > acc { v } else { acc })
}

pub fn opening<D: Sample>(image: &PixelBuffer<D>, element: &StructuringElement) -> PixelBuffer<D> {
    dilate(&erode(image, element), &element.transpose())
}

pub fn closing<D: Sample>(image: &PixelBuffer<D>, element: &StructuringElement) -> PixelBuffer<D> {
    erode(&dilate(image, element), &element.transpose())
}

/// `dilate - erode`, saturating.
pub fn gradient<D: Sample>(image: &PixelBuffer<D>, element: &StructuringElement) -> PixelBuffer<D> {
    &dilate(image, element) - &erode(image, element)
}

/// `image - opening`, saturating.
pub fn white_top_hat<D: Sample>(
    image: &PixelBuffer<D>,
    element: &StructuringElement,
) -> PixelBuffer<D> {
    image - &opening(image, element)
}

/// `closing - image`, saturating.
pub fn black_top_hat<D: Sample>(
    image: &PixelBuffer<D>,
    element: &StructuringElement,
) -> PixelBuffer<D> {
    &closing(image, element) - image
}

fn rank_filter<D, F>(
    image: &PixelBuffer<D>,
    element: &StructuringElement,
    init: D,
    pick: F,
) -> PixelBuffer<D>
where
    D: Sample,
    F: Fn(D, D) -> D + Sync,
{
    let (w, h, c) = (image.width(), image.height(), image.channels());
    let mut output = PixelBuffer::from_elem(w, h, c, init);
    if image.is_empty() {
        return output;
    }

    let taps = element.tap_offsets();
    let workers = if image.size() >= PARALLEL_PIXEL_THRESHOLD {
        rayon::current_num_threads()
    } else {
        1
    };

    fill_lines(output.as_mut_slice(), w, workers, |line, row| {
        let channel = line / h;
        let y = line % h;
        for (x, out) in row.iter_mut().enumerate() {
            let mut value = init;
            for &(dx, dy) in &taps {
                let px = x as isize + dx;
                let py = y as isize + dy;
                if px < 0 || py < 0 || px >= w as isize || py >= h as isize {
                    continue;
                }
                value = pick(value, image.pixel_at(px as usize, py as usize, channel));
            }
            *out = value;
        }
    });
    output
}

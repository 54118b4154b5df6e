use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImageInError, Result};
use crate::image::PixelBuffer;
use crate::io::image_io::{load_image, save_image, to_gray};
use crate::threshold::otsu_binarize;

/// Compass direction of a two-cell structuring element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
}

/// A boolean mask with an anchor cell and an integer magnification.
///
/// During traversal every mask cell stands for a `scale x scale` block, so a
/// scaled element behaves like a `width*scale x height*scale` mask whose
/// anchor sits at `(center_x*scale, center_y*scale)`.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuringElement {
    mask: PixelBuffer<bool>,
    center_x: usize,
    center_y: usize,
    scale: usize,
}

impl StructuringElement {
    /// Wrap a single-channel boolean mask anchored at `(center_x, center_y)`.
    pub fn new(mask: PixelBuffer<bool>, center_x: usize, center_y: usize) -> Result<Self> {
        if mask.is_empty() || mask.channels() != 1 {
            return Err(ImageInError::InvalidArgument(format!(
                "structuring element mask must be a non-empty single-channel buffer, got {}x{}x{}",
                mask.width(),
                mask.height(),
                mask.channels()
            )));
        }
        if center_x >= mask.width() || center_y >= mask.height() {
            return Err(ImageInError::InvalidArgument(format!(
                "center ({center_x}, {center_y}) lies outside the {}x{} mask",
                mask.width(),
                mask.height()
            )));
        }
        Ok(Self {
            mask,
            center_x,
            center_y,
            scale: 1,
        })
    }

    /// Two-cell element pointing in `dir`: a horizontal pair for `Left`/`Right`,
    /// a vertical pair for `Top`/`Bottom`, a diagonal pair otherwise.
    pub fn from_direction(dir: Direction) -> Self {
        use Direction::*;

        let width = if matches!(dir, Top | Bottom) { 1 } else { 2 };
        let height = if matches!(dir, Left | Right) { 1 } else { 2 };
        let anti_diagonal = matches!(dir, TopRight | BottomLeft);
        let diagonal = matches!(dir, TopLeft | BottomRight);

        let mut cells = vec![!anti_diagonal, !diagonal];
        if width > 1 && height > 1 {
            cells.push(anti_diagonal);
            cells.push(diagonal);
        }

        let center_x = usize::from(matches!(dir, Left | TopLeft | BottomLeft));
        let center_y = usize::from(matches!(dir, TopLeft | Top | TopRight));

        Self {
            mask: PixelBuffer::from_fn(width, height, 1, |x, y, _| cells[y * width + x]),
            center_x,
            center_y,
            scale: 1,
        }
    }

    /// `size x size` element of all-true cells anchored in the middle.
    pub fn square(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(ImageInError::InvalidArgument(
                "square element size must be at least 1".into(),
            ));
        }
        Self::new(PixelBuffer::from_elem(size, size, 1, true), size / 2, size / 2)
    }

    /// Build an element from a grayscale picture: Otsu-binarize it and mark
    /// the dark class (at or below the threshold) as set. Anchored in the middle.
    pub fn from_gray(image: &PixelBuffer<u8>) -> Result<Self> {
        if image.is_empty() || image.channels() != 1 {
            return Err(ImageInError::InvalidArgument(format!(
                "structuring element source must be a non-empty grayscale image, got {}x{}x{}",
                image.width(),
                image.height(),
                image.channels()
            )));
        }
        let (_, binary) = otsu_binarize(image);
        let mask = binary.map(|v| v == 0);
        let (cx, cy) = (mask.width() / 2, mask.height() / 2);
        Self::new(mask, cx, cy)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let image = load_image(path)?;
        Self::from_gray(&to_gray(&image))
    }

    /// Write the mask as an 8-bit picture: set cells black, unset cells white.
    pub fn save(&self, path: &Path) -> Result<()> {
        let picture = self.mask.map(|set| if set { 0u8 } else { 255u8 });
        save_image(&picture, path, None)
    }

    pub fn with_scale(mut self, scale: usize) -> Result<Self> {
        self.set_scale(scale)?;
        Ok(self)
    }

    pub fn set_scale(&mut self, scale: usize) -> Result<()> {
        if scale == 0 {
            return Err(ImageInError::InvalidArgument(
                "structuring element scale must be at least 1".into(),
            ));
        }
        self.scale = scale;
        Ok(())
    }

    pub fn mask(&self) -> &PixelBuffer<bool> {
        &self.mask
    }

    /// Stored mask width (before scaling).
    pub fn width(&self) -> usize {
        self.mask.width()
    }

    pub fn height(&self) -> usize {
        self.mask.height()
    }

    pub fn center(&self) -> (usize, usize) {
        (self.center_x, self.center_y)
    }

    pub fn scale(&self) -> usize {
        self.scale
    }

    /// Whether the scale-resolved cell `(x, y)` is set.
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.resolved_width()
            && y < self.resolved_height()
            && self.mask.pixel_at(x / self.scale, y / self.scale, 0)
    }

    pub fn resolved_width(&self) -> usize {
        self.width() * self.scale
    }

    pub fn resolved_height(&self) -> usize {
        self.height() * self.scale
    }

    fn resolved_center(&self) -> (usize, usize) {
        (self.center_x * self.scale, self.center_y * self.scale)
    }

    /// Offsets `(dx, dy)` from the anchor of every set scale-resolved cell, row by row.
    pub fn tap_offsets(&self) -> Vec<(isize, isize)> {
        let (cx, cy) = self.resolved_center();
        let mut taps = Vec::new();
        for j in 0..self.resolved_height() {
            for i in 0..self.resolved_width() {
                if self.mask.pixel_at(i / self.scale, j / self.scale, 0) {
                    taps.push((i as isize - cx as isize, j as isize - cy as isize));
                }
            }
        }
        taps
    }

    /// Point reflection of the element through its anchor, at scale 1.
    ///
    /// The result's taps are the negated taps of `self`, which makes
    /// dilation by `transpose()` the adjoint of erosion by `self`.
    pub fn transpose(&self) -> StructuringElement {
        let (w, h) = (self.resolved_width(), self.resolved_height());
        let (cx, cy) = self.resolved_center();
        StructuringElement {
            mask: PixelBuffer::from_fn(w, h, 1, |i, j, _| self.is_set(w - 1 - i, h - 1 - j)),
            center_x: w - 1 - cx,
            center_y: h - 1 - cy,
            scale: 1,
        }
    }

    /// Grow this element by `other` (Minkowski sum of their taps).
    ///
    /// Eroding by the grown element is eroding by the old `self` and then by
    /// `other`. The result is stored at scale 1.
    pub fn dilate(&mut self, other: &StructuringElement) {
        let (w, h) = (self.resolved_width(), self.resolved_height());
        let (ocx, ocy) = other.resolved_center();
        let new_w = w + other.resolved_width() - 1;
        let new_h = h + other.resolved_height() - 1;

        let padded = PixelBuffer::from_fn(new_w, new_h, 1, |x, y, _| {
            x >= ocx && y >= ocy && self.is_set(x - ocx, y - ocy)
        });
        let grown = super::dilate(&padded, &other.transpose());

        let (cx, cy) = self.resolved_center();
        self.mask = grown;
        self.center_x = cx + ocx;
        self.center_y = cy + ocy;
        self.scale = 1;
    }
}

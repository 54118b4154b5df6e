use std::ops::Sub;

use ndarray::{concatenate, s, Array3, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};
use serde::{Deserialize, Serialize};

use crate::consts::HISTOGRAM_BINS;
use crate::error::{ImageInError, Result};
use crate::sample::Sample;

/// A planar multi-channel image.
///
/// Samples are stored channel-major: each channel is a contiguous
/// `width * height` plane, and rows are contiguous inside a plane. The
/// backing array has shape `(channels, height, width)` in standard layout,
/// so iteration visits channel 0 completely before channel 1.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer<D: Sample> {
    data: Array3<D>,
}

/// A rectangle in image coordinates for cropping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clip the rectangle to a `width x height` image. The result may have zero area.
    pub fn clipped(&self, width: usize, height: usize) -> Rect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl<D: Sample> Default for PixelBuffer<D> {
    fn default() -> Self {
        Self {
            data: Array3::default((0, 0, 0)),
        }
    }
}

impl<D: Sample> PixelBuffer<D> {
    /// A `width x height x channels` buffer filled with `D::default()`.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self::from_elem(width, height, channels, D::default())
    }

    pub fn from_elem(width: usize, height: usize, channels: usize, value: D) -> Self {
        Self {
            data: Array3::from_elem((channels, height, width), value),
        }
    }

    /// Adopt a channel-major sample vector.
    pub fn from_vec(width: usize, height: usize, channels: usize, samples: Vec<D>) -> Result<Self> {
        let expected = width * height * channels;
        if samples.len() != expected {
            return Err(ImageInError::InvalidArgument(format!(
                "expected {expected} samples for {width}x{height}x{channels}, got {}",
                samples.len()
            )));
        }
        let data = Array3::from_shape_vec((channels, height, width), samples)
            .map_err(|e| ImageInError::InvalidArgument(e.to_string()))?;
        Ok(Self { data })
    }

    /// Copy a channel-major sample slice.
    pub fn from_slice(width: usize, height: usize, channels: usize, samples: &[D]) -> Result<Self> {
        Self::from_vec(width, height, channels, samples.to_vec())
    }

    /// Wrap an array of shape `(channels, height, width)`.
    pub fn from_array(data: Array3<D>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self { data }
    }

    /// Stack the channels of several equally sized buffers, in order.
    pub fn from_channels(sources: &[&PixelBuffer<D>]) -> Result<Self> {
        let Some(first) = sources.first() else {
            return Err(ImageInError::InvalidArgument(
                "no channel sources given".into(),
            ));
        };
        let (w, h) = (first.width(), first.height());
        if let Some(bad) = sources.iter().find(|b| b.width() != w || b.height() != h) {
            return Err(ImageInError::InvalidArgument(format!(
                "channel source is {}x{}, expected {w}x{h}",
                bad.width(),
                bad.height()
            )));
        }
        let views: Vec<_> = sources.iter().map(|b| b.data.view()).collect();
        let data = concatenate(Axis(0), &views)
            .map_err(|e| ImageInError::InvalidArgument(e.to_string()))?;
        Ok(Self::from_array(data))
    }

    /// Build a buffer by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn(
        width: usize,
        height: usize,
        channels: usize,
        mut f: impl FnMut(usize, usize, usize) -> D,
    ) -> Self {
        Self {
            data: Array3::from_shape_fn((channels, height, width), |(c, y, x)| f(x, y, c)),
        }
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().0
    }

    /// Number of samples: `width * height * channels`.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_array(&self) -> &Array3<D> {
        &self.data
    }

    pub fn into_array(self) -> Array3<D> {
        self.data
    }

    /// All samples in channel-major order.
    pub fn as_slice(&self) -> &[D] {
        // Standard layout is kept by every constructor.
        self.data.as_slice().unwrap_or_default()
    }

    pub fn as_mut_slice(&mut self) -> &mut [D] {
        self.data.as_slice_mut().unwrap_or_default()
    }

    fn check(&self, x: usize, y: usize, channel: usize) -> Result<()> {
        if x < self.width() && y < self.height() && channel < self.channels() {
            Ok(())
        } else {
            Err(self.out_of_range(x, y, channel))
        }
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel < self.channels() {
            Ok(())
        } else {
            Err(self.out_of_range(0, 0, channel))
        }
    }

    pub fn get(&self, x: usize, y: usize, channel: usize) -> Result<D> {
        self.check(x, y, channel)?;
        Ok(self.data[[channel, y, x]])
    }

    pub fn set(&mut self, x: usize, y: usize, channel: usize, value: D) -> Result<()> {
        self.check(x, y, channel)?;
        self.data[[channel, y, x]] = value;
        Ok(())
    }

    #[inline]
    fn offset(&self, x: usize, y: usize, channel: usize) -> usize {
        (channel * self.height() + y) * self.width() + x
    }

    /// Read a sample without the per-axis bounds check.
    ///
    /// Only the flat index is checked, so an `x` past the row end silently reads
    /// the next row. Callers must validate their loop bounds.
    #[inline]
    pub fn pixel_at(&self, x: usize, y: usize, channel: usize) -> D {
        debug_assert!(x < self.width() && y < self.height() && channel < self.channels());
        let idx = self.offset(x, y, channel);
        self.as_slice()[idx]
    }

    #[inline]
    pub fn pixel_at_mut(&mut self, x: usize, y: usize, channel: usize) -> &mut D {
        debug_assert!(x < self.width() && y < self.height() && channel < self.channels());
        let idx = self.offset(x, y, channel);
        &mut self.as_mut_slice()[idx]
    }

    #[inline]
    pub fn set_pixel_at(&mut self, x: usize, y: usize, channel: usize, value: D) {
        *self.pixel_at_mut(x, y, channel) = value;
    }

    /// Borrow row `y` of `channel`.
    pub fn row(&self, y: usize, channel: usize) -> Result<ArrayView1<'_, D>> {
        if y >= self.height() || channel >= self.channels() {
            return Err(self.out_of_range(0, y, channel));
        }
        Ok(self.data.slice(s![channel, y, ..]))
    }

    pub fn row_mut(&mut self, y: usize, channel: usize) -> Result<ArrayViewMut1<'_, D>> {
        if y >= self.height() || channel >= self.channels() {
            return Err(self.out_of_range(0, y, channel));
        }
        Ok(self.data.slice_mut(s![channel, y, ..]))
    }

    /// Borrow column `x` of `channel` (a strided view).
    pub fn column(&self, x: usize, channel: usize) -> Result<ArrayView1<'_, D>> {
        if x >= self.width() || channel >= self.channels() {
            return Err(self.out_of_range(x, 0, channel));
        }
        Ok(self.data.slice(s![channel, .., x]))
    }

    pub fn column_mut(&mut self, x: usize, channel: usize) -> Result<ArrayViewMut1<'_, D>> {
        if x >= self.width() || channel >= self.channels() {
            return Err(self.out_of_range(x, 0, channel));
        }
        Ok(self.data.slice_mut(s![channel, .., x]))
    }

    /// Borrow the whole `height x width` plane of `channel`.
    pub fn plane(&self, channel: usize) -> Result<ArrayView2<'_, D>> {
        if channel >= self.channels() {
            return Err(self.out_of_range(0, 0, channel));
        }
        Ok(self.data.index_axis(Axis(0), channel))
    }

    pub fn plane_mut(&mut self, channel: usize) -> Result<ArrayViewMut2<'_, D>> {
        if channel >= self.channels() {
            return Err(self.out_of_range(0, 0, channel));
        }
        Ok(self.data.index_axis_mut(Axis(0), channel))
    }

    fn out_of_range(&self, x: usize, y: usize, channel: usize) -> ImageInError {
        ImageInError::OutOfRange {
            x,
            y,
            channel,
            width: self.width(),
            height: self.height(),
            channels: self.channels(),
        }
    }

    /// Iterate over every sample, channel-major then row-major.
    pub fn iter(&self) -> std::slice::Iter<'_, D> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, D> {
        self.as_mut_slice().iter_mut()
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    pub fn channel_min(&self, channel: usize) -> Result<D> {
        self.check_channel(channel)?;
        Ok(fold_min(self.data.index_axis(Axis(0), channel).iter()))
    }

    pub fn channel_max(&self, channel: usize) -> Result<D> {
        self.check_channel(channel)?;
        Ok(fold_max(self.data.index_axis(Axis(0), channel).iter()))
    }

    pub fn channel_mean(&self, channel: usize) -> Result<f64> {
        self.check_channel(channel)?;
        Ok(mean_of(self.data.index_axis(Axis(0), channel).iter()))
    }

    /// Population standard deviation of one channel (computes the mean first).
    pub fn channel_deviation(&self, channel: usize) -> Result<f64> {
        let mean = self.channel_mean(channel)?;
        self.channel_deviation_with_mean(channel, mean)
    }

    pub fn channel_deviation_with_mean(&self, channel: usize, mean: f64) -> Result<f64> {
        self.check_channel(channel)?;
        Ok(deviation_of(self.data.index_axis(Axis(0), channel).iter(), mean))
    }

    /// Smallest sample over all channels; `D::MAX` for an empty buffer.
    pub fn min(&self) -> D {
        fold_min(self.iter())
    }

    /// Largest sample over all channels; `D::MIN` for an empty buffer.
    pub fn max(&self) -> D {
        fold_max(self.iter())
    }

    pub fn mean(&self) -> f64 {
        mean_of(self.iter())
    }

    pub fn deviation(&self) -> f64 {
        self.deviation_with_mean(self.mean())
    }

    pub fn deviation_with_mean(&self, mean: f64) -> f64 {
        deviation_of(self.iter(), mean)
    }

    /// Linearly rescale every sample from the observed `[min, max]` to
    /// `[target_min, target_max]`.
    ///
    /// A constant buffer (`min == max`) is filled with `target_min`.
    pub fn normalize(&mut self, target_min: f64, target_max: f64) {
        if self.is_empty() {
            return;
        }
        let min = self.min().to_f64();
        let max = self.max().to_f64();
        let range = max - min;

        if range == 0.0 {
            let fill = D::from_f64(target_min);
            self.data.fill(fill);
            return;
        }

        let scale = (target_max - target_min) / range;
        self.data
            .mapv_inplace(|v| D::from_f64((v.to_f64() - min) * scale + target_min));
    }

    /// Copy of the intersection of `rect` with the image.
    pub fn crop(&self, rect: &Rect) -> PixelBuffer<D> {
        let r = rect.clipped(self.width(), self.height());
        if r.is_empty() {
            return PixelBuffer::new(0, 0, self.channels());
        }
        let view = self
            .data
            .slice(s![.., r.y..r.y + r.height, r.x..r.x + r.width]);
        PixelBuffer::from_array(view.to_owned())
    }

    /// Saturating per-sample `self - other` over the common extent of both buffers.
    pub fn difference(&self, other: &PixelBuffer<D>) -> PixelBuffer<D> {
        let w = self.width().min(other.width());
        let h = self.height().min(other.height());
        let c = self.channels().min(other.channels());
        PixelBuffer::from_fn(w, h, c, |x, y, ch| {
            let a = self.pixel_at(x, y, ch).to_f64();
            let b = other.pixel_at(x, y, ch).to_f64();
            D::from_f64(a - b)
        })
    }

    /// Convert every sample to another sample type, saturating.
    pub fn convert<E: Sample>(&self) -> PixelBuffer<E> {
        PixelBuffer {
            data: self.data.mapv(|v| E::from_f64(v.to_f64())),
        }
    }

    /// Apply `f` to every sample, producing a new buffer of the same shape.
    pub fn map<E: Sample>(&self, f: impl Fn(D) -> E) -> PixelBuffer<E> {
        PixelBuffer {
            data: self.data.mapv(f),
        }
    }
}

impl PixelBuffer<u8> {
    /// 256-bin histogram of one channel.
    pub fn channel_histogram(&self, channel: usize) -> Result<Vec<u64>> {
        self.check_channel(channel)?;
        let mut histogram = vec![0u64; HISTOGRAM_BINS];
        for &v in self.data.index_axis(Axis(0), channel).iter() {
            histogram[v as usize] += 1;
        }
        Ok(histogram)
    }

    /// Histogram of `channel` restricted to `rect`, clipped to the image like [`crop`](Self::crop).
    pub fn channel_histogram_in(&self, channel: usize, rect: &Rect) -> Result<Vec<u64>> {
        self.check_channel(channel)?;
        let mut histogram = vec![0u64; HISTOGRAM_BINS];
        let r = rect.clipped(self.width(), self.height());
        if r.is_empty() {
            return Ok(histogram);
        }
        let plane = self
            .data
            .slice(s![channel, r.y..r.y + r.height, r.x..r.x + r.width]);
        for &v in plane.iter() {
            histogram[v as usize] += 1;
        }
        Ok(histogram)
    }
}

impl<'a, D: Sample> IntoIterator for &'a PixelBuffer<D> {
    type Item = &'a D;
    type IntoIter = std::slice::Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<D: Sample> Sub for &PixelBuffer<D> {
    type Output = PixelBuffer<D>;

    fn sub(self, rhs: &PixelBuffer<D>) -> PixelBuffer<D> {
        self.difference(rhs)
    }
}

fn fold_min<'a, D: Sample>(values: impl Iterator<Item = &'a D>) -> D {
    values.fold(D::MAX, |acc, &v| if v < acc { v } else { acc })
}

fn fold_max<'a, D: Sample>(values: impl Iterator<Item = &'a D>) -> D {
    values.fold(D::MIN, |acc, &v| if v > acc { v } else { acc })
}

fn mean_of<'a, D: Sample>(values: impl Iterator<Item = &'a D>) -> f64 {
    let (sum, n) = values.fold((0.0f64, 0usize), |(sum, n), &v| (sum + v.to_f64(), n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn deviation_of<'a, D: Sample>(values: impl Iterator<Item = &'a D>, mean: f64) -> f64 {
    let (sum_sq, n) = values.fold((0.0f64, 0usize), |(acc, n), &v| {
        let d = v.to_f64() - mean;
        (acc + d * d, n + 1)
    });
    if n == 0 {
        0.0
    } else {
        (sum_sq / n as f64).sqrt()
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ImageInError, Result};
use crate::image::PixelBuffer;
use crate::kernel::{normalized, Kernel};
use crate::parallel::fill_lines;
use crate::sample::Sample;

/// How kernel taps that fall outside the image are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderPolicy {
    /// Taps outside the image are skipped (treated as zero).
    #[default]
    Black,
    /// Reflect around the border: `-x` below 0, `2*len - x - 1` past the end.
    Mirror,
    /// Clamp to the nearest edge sample.
    Nearest,
    /// Wrap around (toroidal image).
    Wrap,
}

impl BorderPolicy {
    /// Map a possibly out-of-range coordinate on an axis of length `len` to
    /// an in-range one, or `None` if the tap contributes nothing.
    pub fn remap(self, coord: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let n = len as isize;
        if (0..n).contains(&coord) {
            return Some(coord as usize);
        }
        match self {
            BorderPolicy::Black => None,
            BorderPolicy::Nearest => Some(coord.clamp(0, n - 1) as usize),
            BorderPolicy::Wrap => Some(coord.rem_euclid(n) as usize),
            BorderPolicy::Mirror => {
                let mut c = coord;
                while !(0..n).contains(&c) {
                    c = if c < 0 { -c } else { 2 * n - c - 1 };
                }
                Some(c as usize)
            }
        }
    }
}

/// A configured convolution: an ordered kernel list, a border policy and a
/// worker count.
///
/// Every kernel is normalized by [`normalization_factor`](crate::kernel::normalization_factor)
/// and correlated with the source (no flip). With several kernels the
/// per-pixel responses are folded left to right with `max(|a|, |b|)`; a
/// single kernel's signed response is returned unchanged.
#[derive(Clone, Debug)]
pub struct Convolution {
    kernels: Vec<Kernel>,
    policy: BorderPolicy,
    workers: usize,
}

impl Convolution {
    pub fn new(kernels: Vec<Kernel>) -> Result<Self> {
        if kernels.is_empty() {
            return Err(ImageInError::InvalidArgument(
                "convolution needs at least one kernel".into(),
            ));
        }
        if let Some(bad) = kernels.iter().find(|k| k.is_empty() || k.channels() != 1) {
            return Err(ImageInError::InvalidArgument(format!(
                "kernels must be non-empty single-channel buffers, got {}x{}x{}",
                bad.width(),
                bad.height(),
                bad.channels()
            )));
        }
        Ok(Self {
            kernels: kernels.iter().map(normalized).collect(),
            policy: BorderPolicy::default(),
            workers: rayon::current_num_threads(),
        })
    }

    pub fn with_policy(mut self, policy: BorderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of line partitions; `1` computes on the calling thread.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// The kernels as applied, i.e. after normalization.
    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    pub fn policy(&self) -> BorderPolicy {
        self.policy
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn apply<D: Sample>(&self, image: &PixelBuffer<D>) -> Result<PixelBuffer<f64>> {
        if image.is_empty() {
            return Err(ImageInError::ImageType(
                "cannot convolve an empty image".into(),
            ));
        }
        let (w, h, c) = (image.width(), image.height(), image.channels());
        debug!(
            width = w,
            height = h,
            channels = c,
            kernels = self.kernels.len(),
            workers = self.workers,
            policy = ?self.policy,
            "convolving"
        );

        let source: PixelBuffer<f64> = image.convert();
        let mut output = PixelBuffer::<f64>::new(w, h, c);
        fill_lines(output.as_mut_slice(), w, self.workers, |line, row| {
            let channel = line / h;
            let y = line % h;
            for (x, out) in row.iter_mut().enumerate() {
                let mut combined = 0.0;
                for (k, kernel) in self.kernels.iter().enumerate() {
                    let response = self.correlate(&source, kernel, x, y, channel);
                    combined = if k == 0 {
                        response
                    } else {
                        f64::max(combined.abs(), response.abs())
                    };
                }
                *out = combined;
            }
        });
        Ok(output)
    }

    fn correlate(
        &self,
        source: &PixelBuffer<f64>,
        kernel: &Kernel,
        x: usize,
        y: usize,
        channel: usize,
    ) -> f64 {
        let (kw, kh) = (kernel.width(), kernel.height());
        let (ox, oy) = ((kw / 2) as isize, (kh / 2) as isize);
        let mut sum = 0.0;
        for ky in 0..kh {
            let Some(sy) = self
                .policy
                .remap(y as isize + ky as isize - oy, source.height())
            else {
                continue;
            };
            for kx in 0..kw {
                let Some(sx) = self
                    .policy
                    .remap(x as isize + kx as isize - ox, source.width())
                else {
                    continue;
                };
                sum += source.pixel_at(sx, sy, channel) * kernel.pixel_at(kx, ky, 0);
            }
        }
        sum
    }
}

/// Convolve `image` with `kernels` using the default worker count.
pub fn convolve<D: Sample>(
    image: &PixelBuffer<D>,
    kernels: &[Kernel],
    policy: BorderPolicy,
) -> Result<PixelBuffer<f64>> {
    Convolution::new(kernels.to_vec())?
        .with_policy(policy)
        .apply(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_reflects_repeatedly() {
        assert_eq!(BorderPolicy::Mirror.remap(-1, 4), Some(1));
        assert_eq!(BorderPolicy::Mirror.remap(4, 4), Some(3));
        assert_eq!(BorderPolicy::Mirror.remap(-3, 1), Some(0));
        assert_eq!(BorderPolicy::Mirror.remap(9, 3), Some(1));
    }

    #[test]
    fn test_wrap_and_nearest() {
        assert_eq!(BorderPolicy::Wrap.remap(-1, 5), Some(4));
        assert_eq!(BorderPolicy::Wrap.remap(7, 5), Some(2));
        assert_eq!(BorderPolicy::Nearest.remap(-4, 5), Some(0));
        assert_eq!(BorderPolicy::Nearest.remap(12, 5), Some(4));
        assert_eq!(BorderPolicy::Black.remap(-1, 5), None);
        assert_eq!(BorderPolicy::Black.remap(0, 5), Some(0));
    }
}

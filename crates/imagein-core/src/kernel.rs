//! Convolution kernel factories.
//!
//! A kernel is a single-channel `f64` pixel buffer. Factories return a list
//! because some operators (Prewitt, Sobel, Roberts) are made of several
//! directional kernels whose responses are combined by the convolution
//! engine.

use std::f64::consts::PI;

use crate::consts::{GAUSSIAN_RADIUS_CUTOFF_DIVISOR, GAUSSIAN_RADIUS_SCALE};
use crate::error::{ImageInError, Result};
use crate::image::PixelBuffer;

pub type Kernel = PixelBuffer<f64>;

/// Build a one-channel kernel from rows given top to bottom.
pub fn from_rows<const W: usize>(rows: &[[f64; W]]) -> Kernel {
    Kernel::from_fn(W, rows.len(), 1, |x, y, _| rows[y][x])
}

/// `size x size` kernel of ones.
pub fn box_blur(size: usize) -> Result<Vec<Kernel>> {
    if size == 0 {
        return Err(ImageInError::InvalidArgument(
            "box blur size must be at least 1".into(),
        ));
    }
    Ok(vec![Kernel::from_elem(size, size, 1, 1.0)])
}

fn gauss(x: f64, y: f64, sigma: f64) -> f64 {
    let sigma2 = sigma * sigma;
    (-(x * x + y * y) / (2.0 * sigma2)).exp() / (2.0 * PI * sigma2)
}

/// Integer-valued Gaussian scaled so the outermost corner is 1.
pub fn gaussian_by_size(size: usize, sigma: f64) -> Result<Vec<Kernel>> {
    if size == 0 {
        return Err(ImageInError::InvalidArgument(
            "gaussian size must be at least 1".into(),
        ));
    }
    if !(sigma > 0.0) {
        return Err(ImageInError::InvalidArgument(format!(
            "gaussian sigma must be positive, got {sigma}"
        )));
    }

    let offset = ((size - 1) / 2) as f64;
    let coef = 1.0 / gauss(offset, offset, sigma);
    let kernel = Kernel::from_fn(size, size, 1, |i, j, _| {
        let x = i as f64 - offset;
        let y = j as f64 - offset;
        (coef * gauss(x, y, sigma) + 0.5).floor()
    });
    Ok(vec![kernel])
}

/// Gaussian whose radius grows until the coefficient drops below a tenth of
/// the center value.
pub fn gaussian_by_radius(alpha: f64) -> Result<Vec<Kernel>> {
    if !(alpha > 0.0) {
        return Err(ImageInError::InvalidArgument(format!(
            "gaussian alpha must be positive, got {alpha}"
        )));
    }

    let two_alpha2 = 2.0 * alpha * alpha;
    let norm = GAUSSIAN_RADIUS_SCALE / (PI * two_alpha2);
    let coef = |i: f64, j: f64| norm * (-(i * i + j * j) / two_alpha2).exp();

    let cutoff = coef(0.0, 0.0) / GAUSSIAN_RADIUS_CUTOFF_DIVISOR + 1.0;
    let radii: Vec<f64> = (0..)
        .map(|i| coef(i as f64, 0.0))
        .take_while(|&c| c >= cutoff)
        .collect();
    if radii.is_empty() {
        return Err(ImageInError::InvalidArgument(format!(
            "gaussian alpha {alpha} leaves no coefficient above the cutoff"
        )));
    }

    let k = radii.len();
    let center = k - 1;
    let size = 2 * k - 1;
    let mut kernel = Kernel::new(size, size, 1);

    for i in 0..k {
        for j in i..k {
            let value = if i == 0 {
                radii[j]
            } else {
                coef(i as f64, j as f64)
            }
            .trunc();
            // Every octant image of (i, j) around the center.
            for (dx, dy) in [(i, j), (j, i)] {
                for (sx, sy) in [(1isize, 1isize), (1, -1), (-1, 1), (-1, -1)] {
                    let x = (center as isize + sx * dx as isize) as usize;
                    let y = (center as isize + sy * dy as isize) as usize;
                    kernel.set_pixel_at(x, y, 0, value);
                }
            }
        }
    }
    Ok(vec![kernel])
}

/// Vertical-edge then horizontal-edge Prewitt kernels.
pub fn prewitt(size: usize) -> Result<Vec<Kernel>> {
    if size == 0 {
        return Err(ImageInError::InvalidArgument(
            "prewitt size must be at least 1".into(),
        ));
    }
    let vertical = Kernel::from_fn(3, size, 1, |x, _, _| match x {
        0 => -1.0,
        2 => 1.0,
        _ => 0.0,
    });
    let horizontal = Kernel::from_fn(size, 3, 1, |_, y, _| match y {
        0 => -1.0,
        2 => 1.0,
        _ => 0.0,
    });
    Ok(vec![vertical, horizontal])
}

pub fn roberts() -> Vec<Kernel> {
    vec![
        from_rows(&[[0.0, 1.0], [-1.0, 0.0]]),
        from_rows(&[[-1.0, 0.0], [0.0, 1.0]]),
    ]
}

/// x-derivative then y-derivative.
pub fn sobel() -> Vec<Kernel> {
    vec![
        from_rows(&[[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]]),
        from_rows(&[[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]]),
    ]
}

pub fn laplacian() -> Vec<Kernel> {
    vec![from_rows(&[[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]])]
}

/// `max(sum of positive coefficients, |sum of negative coefficients|)`.
pub fn normalization_factor(kernel: &Kernel) -> f64 {
    let (pos, neg) = kernel.iter().fold((0.0, 0.0), |(pos, neg), &v| {
        if v > 0.0 {
            (pos + v, neg)
        } else {
            (pos, neg - v)
        }
    });
    f64::max(pos, neg)
}

/// Kernel divided by its normalization factor. A zero factor leaves it as is.
pub fn normalized(kernel: &Kernel) -> Kernel {
    let factor = normalization_factor(kernel);
    if factor == 0.0 {
        kernel.clone()
    } else {
        kernel.map(|v| v / factor)
    }
}

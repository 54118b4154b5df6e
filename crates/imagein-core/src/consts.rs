/// Minimum sample count (w*h*c) before morphology splits work across the Rayon pool.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Scale applied to the radius-grown Gaussian before truncation to integers.
pub const GAUSSIAN_RADIUS_SCALE: f64 = 10_000.0;

/// The radius-grown Gaussian keeps radii whose value is at least
/// `g(0) / GAUSSIAN_RADIUS_CUTOFF_DIVISOR + 1`.
pub const GAUSSIAN_RADIUS_CUTOFF_DIVISOR: f64 = 10.0;

/// Histogram bins used for 8-bit statistics and Otsu thresholding.
pub const HISTOGRAM_BINS: usize = 256;

/// Largest sample value of an 8-bit image, used as the default normalization target.
pub const MAX_8BIT: f64 = 255.0;

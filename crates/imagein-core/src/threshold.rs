use crate::consts::HISTOGRAM_BINS;
use crate::image::PixelBuffer;

/// Otsu's thresholding on a 256-bin histogram: the bin that maximizes the
/// between-class variance. Samples `<=` the returned value form the
/// background class.
pub fn otsu_threshold(histogram: &[u64]) -> u8 {
    let total: f64 = histogram.iter().map(|&c| c as f64).sum();
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut weight_bg: f64 = 0.0;
    let mut sum_bg: f64 = 0.0;
    let mut best_variance = 0.0_f64;
    let mut best_bin = 0usize;

    for (i, &count) in histogram.iter().enumerate().take(HISTOGRAM_BINS) {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += i as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between_variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if between_variance > best_variance {
            best_variance = between_variance;
            best_bin = i;
        }
    }

    best_bin as u8
}

/// Otsu-binarize the first channel of `image`: samples at or below the
/// threshold become 0, the rest 255. Returns the threshold with the result.
pub fn otsu_binarize(image: &PixelBuffer<u8>) -> (u8, PixelBuffer<u8>) {
    if image.is_empty() {
        return (0, PixelBuffer::new(image.width(), image.height(), 1));
    }
    let histogram = image.channel_histogram(0).unwrap_or_default();
    let threshold = otsu_threshold(&histogram);
    let binary = PixelBuffer::from_fn(image.width(), image.height(), 1, |x, y, _| {
        if image.pixel_at(x, y, 0) <= threshold {
            0
        } else {
            255
        }
    });
    (threshold, binary)
}

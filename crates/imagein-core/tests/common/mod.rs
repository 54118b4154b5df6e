#![allow(dead_code)]

use imagein_core::image::PixelBuffer;

/// Deterministic pseudo-random 8-bit image (xorshift), channel-major fill.
pub fn noise_u8(width: usize, height: usize, channels: usize, seed: u32) -> PixelBuffer<u8> {
    let mut state = seed.max(1);
    let samples = (0..width * height * channels)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    PixelBuffer::from_vec(width, height, channels, samples).unwrap()
}

/// 4x4 single-channel image with values 0..16 in row-major order.
pub fn counting_4x4() -> PixelBuffer<u8> {
    PixelBuffer::from_vec(4, 4, 1, (0..16).collect()).unwrap()
}

/// Single-channel image that is `low` left of column `edge_x` and `high` from it on.
pub fn vertical_edge(width: usize, height: usize, edge_x: usize, low: f64, high: f64) -> PixelBuffer<f64> {
    PixelBuffer::from_fn(width, height, 1, |x, _, _| if x < edge_x { low } else { high })
}

/// Brute-force grey-level erosion by a `size x size` square anchored at its middle.
pub fn naive_square_erode(image: &PixelBuffer<u8>, size: usize) -> PixelBuffer<u8> {
    let r = (size / 2) as isize;
    let (w, h) = (image.width() as isize, image.height() as isize);
    PixelBuffer::from_fn(image.width(), image.height(), image.channels(), |x, y, c| {
        let mut v = u8::MAX;
        for dy in -r..(size as isize - r) {
            for dx in -r..(size as isize - r) {
                let (px, py) = (x as isize + dx, y as isize + dy);
                if px >= 0 && py >= 0 && px < w && py < h {
                    v = v.min(image.pixel_at(px as usize, py as usize, c));
                }
            }
        }
        v
    })
}

mod common;

use imagein_core::error::ImageInError;
use imagein_core::image::PixelBuffer;
use imagein_core::morphology::{
    apply, black_top_hat, closing, dilate, erode, gradient, opening, white_top_hat, Direction,
    MorphologyOp, StructuringElement,
};

use common::{naive_square_erode, noise_u8};

fn elements() -> Vec<StructuringElement> {
    let cross = StructuringElement::new(
        PixelBuffer::from_fn(3, 3, 1, |x, y, _| x == 1 || y == 1),
        1,
        1,
    )
    .unwrap();
    vec![
        StructuringElement::square(3).unwrap(),
        cross.clone(),
        cross.with_scale(2).unwrap(),
        StructuringElement::from_direction(Direction::TopRight),
        StructuringElement::from_direction(Direction::Left)
            .with_scale(3)
            .unwrap(),
    ]
}

/// A 6x5 block with a one-pixel spur to its right, an isolated dot, and a
/// ring with a one-pixel hole.
fn binary_shapes() -> PixelBuffer<u8> {
    PixelBuffer::from_fn(24, 18, 1, |x, y, _| {
        let block = (3..9).contains(&x) && (3..8).contains(&y);
        let spur = (9..15).contains(&x) && y == 5;
        let dot = x == 18 && y == 14;
        let ring = (3..8).contains(&x) && (11..16).contains(&y) && !(x == 5 && y == 13);
        if block || spur || dot || ring {
            255
        } else {
            0
        }
    })
}

fn all_le(a: &PixelBuffer<u8>, b: &PixelBuffer<u8>) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x <= y)
}

// ---------------------------------------------------------------------------
// Erosion and dilation
// ---------------------------------------------------------------------------

#[test]
fn test_identity_element() {
    let point = StructuringElement::square(1).unwrap();
    let image = noise_u8(13, 9, 2, 5);
    assert_eq!(erode(&image, &point), image);
    assert_eq!(dilate(&image, &point), image);

    let floats = image.convert::<f64>();
    assert_eq!(erode(&floats, &point), floats);
    assert_eq!(dilate(&floats, &point), floats);
}

#[test]
fn test_impulse_dilates_to_element_shape() {
    let mut image = PixelBuffer::<u8>::new(5, 5, 1);
    image.set(2, 2, 0, 255).unwrap();
    let square = StructuringElement::square(3).unwrap();

    let dilated = dilate(&image, &square);
    for y in 0..5 {
        for x in 0..5 {
            let inside = (1..=3).contains(&x) && (1..=3).contains(&y);
            assert_eq!(dilated.pixel_at(x, y, 0), if inside { 255 } else { 0 });
        }
    }
    assert!(erode(&image, &square).iter().all(|&v| v == 0));
}

#[test]
fn test_erosion_matches_brute_force() {
    let image = noise_u8(31, 17, 3, 99);
    let square = StructuringElement::square(3).unwrap();
    assert_eq!(erode(&image, &square), naive_square_erode(&image, 3));
}

#[test]
fn test_large_image_uses_same_result() {
    // Above the parallel threshold.
    let image = noise_u8(300, 250, 1, 2024);
    let square = StructuringElement::square(5).unwrap();
    assert_eq!(erode(&image, &square), naive_square_erode(&image, 5));
}

#[test]
fn test_border_taps_are_skipped() {
    let image = PixelBuffer::from_elem(6, 4, 1, 100u8);
    let square = StructuringElement::square(3).unwrap();
    assert!(erode(&image, &square).iter().all(|&v| v == 100));
    assert!(dilate(&image, &square).iter().all(|&v| v == 100));
}

#[test]
fn test_no_tap_inside_gives_type_extremes() {
    // Only tap is 4 pixels to the right of the anchor.
    let mask = PixelBuffer::from_fn(5, 1, 1, |x, _, _| x == 4);
    let far = StructuringElement::new(mask, 0, 0).unwrap();
    let image = noise_u8(3, 3, 1, 8);
    assert!(erode(&image, &far).iter().all(|&v| v == u8::MAX));
    assert!(dilate(&image, &far).iter().all(|&v| v == u8::MIN));

    let floats = image.convert::<f32>();
    assert!(dilate(&floats, &far).iter().all(|&v| v == f32::MIN));
}

#[test]
fn test_scaled_element_matches_resolved_mask() {
    let image = noise_u8(20, 15, 1, 3);
    let scaled = StructuringElement::square(1).unwrap().with_scale(3).unwrap();
    let resolved = StructuringElement::new(PixelBuffer::from_elem(3, 3, 1, true), 0, 0).unwrap();
    assert_eq!(erode(&image, &scaled), erode(&image, &resolved));
    assert_eq!(dilate(&image, &scaled), dilate(&image, &resolved));
}

#[test]
fn test_directional_dilation_shifts() {
    let mut image = PixelBuffer::<u8>::new(4, 1, 1);
    image.set(2, 0, 0, 9).unwrap();
    let left = StructuringElement::from_direction(Direction::Left);
    // Taps (-1, 0) and (0, 0): a pixel sees itself and its left neighbour.
    let out = dilate(&image, &left);
    assert_eq!(out.as_slice(), &[0, 0, 9, 9]);
}

// ---------------------------------------------------------------------------
// Compound operators
// ---------------------------------------------------------------------------

#[test]
fn test_opening_is_idempotent() {
    let image = noise_u8(19, 14, 2, 17);
    for e in elements() {
        let once = opening(&image, &e);
        assert_eq!(opening(&once, &e), once);
    }
}

#[test]
fn test_opening_is_idempotent_on_binary_shapes() {
    let image = binary_shapes();
    for e in elements() {
        let once = opening(&image, &e);
        assert_eq!(opening(&once, &e), once);
        assert!(once.iter().all(|&v| v == 0 || v == 255));
    }
}

#[test]
fn test_opening_removes_thin_protrusions() {
    let image = binary_shapes();
    let opened = opening(&image, &StructuringElement::square(3).unwrap());
    // The block survives whole.
    for y in 3..8 {
        for x in 3..9 {
            assert_eq!(opened.pixel_at(x, y, 0), 255, "({x}, {y})");
        }
    }
    // The one-pixel spur and the isolated dot are gone.
    for x in 9..15 {
        assert_eq!(opened.pixel_at(x, 5, 0), 0, "spur at {x}");
    }
    assert_eq!(opened.pixel_at(18, 14, 0), 0);
}

#[test]
fn test_closing_is_idempotent() {
    let image = noise_u8(19, 14, 1, 23);
    for e in elements() {
        let once = closing(&image, &e);
        assert_eq!(closing(&once, &e), once);
    }
}

#[test]
fn test_opening_and_closing_bracket_image() {
    let image = noise_u8(16, 12, 1, 31);
    for e in elements() {
        assert!(all_le(&opening(&image, &e), &image));
        assert!(all_le(&image, &closing(&image, &e)));
    }
}

#[test]
fn test_gradient_is_dilation_minus_erosion() {
    let image = noise_u8(15, 11, 2, 41);
    let e = StructuringElement::square(3).unwrap();
    assert_eq!(gradient(&image, &e), &dilate(&image, &e) - &erode(&image, &e));

    let floats = image.convert::<f64>();
    let g = gradient(&floats, &e);
    assert!(g.iter().all(|&v| v >= 0.0));
}

#[test]
fn test_top_hats() {
    let image = noise_u8(15, 11, 1, 43);
    let e = StructuringElement::square(3).unwrap();
    assert_eq!(white_top_hat(&image, &e), &image - &opening(&image, &e));
    assert_eq!(black_top_hat(&image, &e), &closing(&image, &e) - &image);
}

#[test]
fn test_white_top_hat_isolates_small_peak() {
    let mut image = PixelBuffer::from_elem(7, 7, 1, 20u8);
    image.set(3, 3, 0, 200).unwrap();
    let e = StructuringElement::square(3).unwrap();
    let hat = white_top_hat(&image, &e);
    assert_eq!(hat.pixel_at(3, 3, 0), 180);
    assert_eq!(hat.iter().filter(|&&v| v != 0).count(), 1);
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_apply_matches_direct_calls() {
    let image = noise_u8(10, 8, 1, 53);
    let e = StructuringElement::square(3).unwrap();
    assert_eq!(apply(MorphologyOp::Erosion, &image, &e).unwrap(), erode(&image, &e));
    assert_eq!(apply(MorphologyOp::Dilation, &image, &e).unwrap(), dilate(&image, &e));
    assert_eq!(apply(MorphologyOp::Opening, &image, &e).unwrap(), opening(&image, &e));
    assert_eq!(apply(MorphologyOp::Closing, &image, &e).unwrap(), closing(&image, &e));
    assert_eq!(apply(MorphologyOp::Gradient, &image, &e).unwrap(), gradient(&image, &e));
    assert_eq!(
        apply(MorphologyOp::WhiteTopHat, &image, &e).unwrap(),
        white_top_hat(&image, &e)
    );
    assert_eq!(
        apply(MorphologyOp::BlackTopHat, &image, &e).unwrap(),
        black_top_hat(&image, &e)
    );
}

#[test]
fn test_apply_rejects_empty_image() {
    let e = StructuringElement::square(3).unwrap();
    let empty = PixelBuffer::<u8>::default();
    assert!(matches!(
        apply(MorphologyOp::Opening, &empty, &e),
        Err(ImageInError::ImageType(_))
    ));
}

#[test]
fn test_op_display() {
    assert_eq!(format!("{}", MorphologyOp::WhiteTopHat), "White top-hat");
    assert_eq!(format!("{}", MorphologyOp::Erosion), "Erosion");
}

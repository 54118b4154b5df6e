mod common;

use approx::assert_relative_eq;

use imagein_core::convolution::{convolve, BorderPolicy, Convolution};
use imagein_core::error::ImageInError;
use imagein_core::image::PixelBuffer;
use imagein_core::kernel::{box_blur, from_rows, gaussian_by_radius, laplacian, prewitt, sobel, Kernel};

use common::{noise_u8, vertical_edge};

const ALL_POLICIES: [BorderPolicy; 4] = [
    BorderPolicy::Black,
    BorderPolicy::Mirror,
    BorderPolicy::Nearest,
    BorderPolicy::Wrap,
];

// ---------------------------------------------------------------------------
// Identity and validation
// ---------------------------------------------------------------------------

#[test]
fn test_identity_kernel_returns_input() {
    let image = noise_u8(11, 7, 3, 42);
    let expected = image.convert::<f64>();
    let one = vec![Kernel::from_elem(1, 1, 1, 1.0)];
    let centered = vec![from_rows(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]])];
    for policy in ALL_POLICIES {
        assert_eq!(convolve(&image, &one, policy).unwrap(), expected);
        assert_eq!(convolve(&image, &centered, policy).unwrap(), expected);
    }
}

#[test]
fn test_empty_kernel_list_rejected() {
    assert!(matches!(
        Convolution::new(Vec::new()),
        Err(ImageInError::InvalidArgument(_))
    ));
}

#[test]
fn test_multichannel_kernel_rejected() {
    let k = Kernel::from_elem(3, 3, 2, 1.0);
    assert!(Convolution::new(vec![k]).is_err());
}

#[test]
fn test_empty_image_is_image_type_error() {
    let image = PixelBuffer::<u8>::default();
    let result = convolve(&image, &sobel(), BorderPolicy::Black);
    assert!(matches!(result, Err(ImageInError::ImageType(_))));
}

#[test]
fn test_kernels_are_normalized_on_construction() {
    let conv = Convolution::new(sobel()).unwrap();
    assert_eq!(conv.kernels()[0].pixel_at(0, 1, 0), -0.5);
    assert_eq!(conv.kernels()[1].pixel_at(1, 2, 0), 0.5);
}

#[test]
fn test_builder_defaults() {
    let conv = Convolution::new(laplacian()).unwrap();
    assert_eq!(conv.policy(), BorderPolicy::Black);
    assert_eq!(conv.workers(), rayon::current_num_threads());
    let conv = conv.with_workers(0).with_policy(BorderPolicy::Wrap);
    assert_eq!(conv.workers(), 1);
    assert_eq!(conv.policy(), BorderPolicy::Wrap);
}

// ---------------------------------------------------------------------------
// Border policies
// ---------------------------------------------------------------------------

#[test]
fn test_policies_on_left_border() {
    let image = PixelBuffer::from_vec(3, 1, 1, vec![3.0f64, 6.0, 9.0]).unwrap();
    let kernel = vec![Kernel::from_elem(3, 1, 1, 1.0)];
    let at_zero = |policy| convolve(&image, &kernel, policy).unwrap().pixel_at(0, 0, 0);

    assert_relative_eq!(at_zero(BorderPolicy::Black), 3.0, epsilon = 1e-12);
    assert_relative_eq!(at_zero(BorderPolicy::Nearest), 4.0, epsilon = 1e-12);
    assert_relative_eq!(at_zero(BorderPolicy::Mirror), 5.0, epsilon = 1e-12);
    assert_relative_eq!(at_zero(BorderPolicy::Wrap), 6.0, epsilon = 1e-12);
}

#[test]
fn test_policies_on_right_border() {
    let image = PixelBuffer::from_vec(3, 1, 1, vec![3.0f64, 6.0, 9.0]).unwrap();
    let kernel = vec![Kernel::from_elem(3, 1, 1, 1.0)];
    let at_end = |policy| convolve(&image, &kernel, policy).unwrap().pixel_at(2, 0, 0);

    assert_relative_eq!(at_end(BorderPolicy::Black), 5.0, epsilon = 1e-12);
    assert_relative_eq!(at_end(BorderPolicy::Nearest), 8.0, epsilon = 1e-12);
    // x = 3 reflects to 2 * 3 - 3 - 1 = 2.
    assert_relative_eq!(at_end(BorderPolicy::Mirror), 8.0, epsilon = 1e-12);
    assert_relative_eq!(at_end(BorderPolicy::Wrap), 6.0, epsilon = 1e-12);
}

#[test]
fn test_blur_of_constant_image_without_black_border() {
    let image = PixelBuffer::from_elem(9, 6, 2, 50u8);
    let kernels = gaussian_by_radius(1.0).unwrap();
    for policy in [BorderPolicy::Mirror, BorderPolicy::Nearest, BorderPolicy::Wrap] {
        let out = convolve(&image, &kernels, policy).unwrap();
        let sum: f64 = kernels[0].iter().sum();
        let factor = kernels[0].iter().filter(|&&v| v > 0.0).sum::<f64>();
        for &v in out.iter() {
            assert_relative_eq!(v, 50.0 * sum / factor, epsilon = 1e-9);
        }
    }
}

// ---------------------------------------------------------------------------
// Edge detection
// ---------------------------------------------------------------------------

#[test]
fn test_sobel_vertical_edge_interior_rows() {
    let image = vertical_edge(6, 5, 3, 0.0, 100.0);
    let out = convolve(&image, &sobel(), BorderPolicy::Nearest).unwrap();
    for y in 1..4 {
        let row: Vec<f64> = (0..6).map(|x| out.pixel_at(x, y, 0)).collect();
        assert_eq!(row, vec![0.0, 0.0, 100.0, 100.0, 0.0, 0.0], "row {y}");
    }
}

#[test]
fn test_sobel_fold_is_absolute_on_black_border() {
    let image = vertical_edge(6, 5, 3, 0.0, 100.0);
    let out = convolve(&image, &sobel(), BorderPolicy::Black).unwrap();
    // The missing column past the right edge leaves only the negative taps.
    assert_eq!(out.pixel_at(5, 2, 0), 100.0);
    // Top row: x response 300/4 beats the y response 100/4.
    assert_eq!(out.pixel_at(2, 0, 0), 75.0);
}

#[test]
fn test_sobel_fold_matches_per_kernel_responses() {
    let image = vertical_edge(6, 5, 3, 0.0, 100.0);
    let kernels = sobel();
    let gx = convolve(&image, &kernels[..1], BorderPolicy::Black).unwrap();
    let gy = convolve(&image, &kernels[1..], BorderPolicy::Black).unwrap();
    let folded = convolve(&image, &kernels, BorderPolicy::Black).unwrap();

    // Interior rows see no vertical change.
    for y in 1..4 {
        assert_eq!(gy.row(y, 0).unwrap().to_vec(), vec![0.0; 6]);
        assert_eq!(
            gx.row(y, 0).unwrap().to_vec(),
            vec![0.0, 0.0, 100.0, 100.0, 0.0, -100.0]
        );
    }
    for y in 0..5 {
        for x in 0..6 {
            let expected = f64::max(gx.pixel_at(x, y, 0).abs(), gy.pixel_at(x, y, 0).abs());
            assert_eq!(folded.pixel_at(x, y, 0), expected, "({x}, {y})");
        }
    }
}

#[test]
fn test_single_kernel_keeps_sign() {
    let image = vertical_edge(6, 5, 3, 0.0, 100.0);
    let x_only = vec![sobel().remove(0)];
    let out = convolve(&image, &x_only, BorderPolicy::Black).unwrap();
    assert_eq!(out.pixel_at(5, 2, 0), -100.0);
    assert_eq!(out.pixel_at(2, 2, 0), 100.0);
}

#[test]
fn test_even_kernel_tap_offset() {
    let mut image = PixelBuffer::<f64>::new(4, 4, 1);
    image.set(1, 1, 0, 1.0).unwrap();
    let kernel = vec![from_rows(&[[0.0, 1.0], [-1.0, 0.0]])];
    let out = convolve(&image, &kernel, BorderPolicy::Black).unwrap();
    assert_eq!(out.pixel_at(1, 2, 0), 1.0);
    assert_eq!(out.pixel_at(2, 1, 0), -1.0);
    assert_eq!(out.iter().filter(|&&v| v != 0.0).count(), 2);
}

#[test]
fn test_channels_are_independent() {
    let image = noise_u8(8, 6, 3, 9);
    let out = convolve(&image, &laplacian(), BorderPolicy::Mirror).unwrap();
    for c in 0..3 {
        let plane = PixelBuffer::from_array(
            image
                .as_array()
                .slice(ndarray::s![c..c + 1, .., ..])
                .to_owned(),
        );
        let single = convolve(&plane, &laplacian(), BorderPolicy::Mirror).unwrap();
        assert_eq!(single.plane(0).unwrap(), out.plane(c).unwrap());
    }
}

// ---------------------------------------------------------------------------
// Parallel execution
// ---------------------------------------------------------------------------

#[test]
fn test_worker_count_does_not_change_result() {
    let image = noise_u8(37, 23, 3, 1234);
    for policy in ALL_POLICIES {
        for kernels in [sobel(), prewitt(5).unwrap(), box_blur(4).unwrap()] {
            let reference = Convolution::new(kernels.clone())
                .unwrap()
                .with_policy(policy)
                .with_workers(1)
                .apply(&image)
                .unwrap();
            for workers in [2, 3, 7, 16, 200] {
                let out = Convolution::new(kernels.clone())
                    .unwrap()
                    .with_policy(policy)
                    .with_workers(workers)
                    .apply(&image)
                    .unwrap();
                assert_eq!(out, reference, "policy {policy:?}, workers {workers}");
            }
        }
    }
}

//! Planar multi-channel images with convolution, grey-level morphology and
//! VFF/raster file I/O.

pub mod consts;
pub mod convolution;
pub mod error;
pub mod image;
pub mod io;
pub mod kernel;
pub mod morphology;
pub mod parallel;
pub mod pipeline;
pub mod sample;
pub mod threshold;

pub use convolution::{convolve, BorderPolicy, Convolution};
pub use error::{ImageInError, Result};
pub use image::{PixelBuffer, Rect};
pub use kernel::Kernel;
pub use morphology::{Direction, MorphologyOp, StructuringElement};
pub use sample::Sample;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::convolution::BorderPolicy;
use crate::error::Result;
use crate::image::Rect;
use crate::io::image_io::FileFormat;
use crate::kernel::{self, Kernel};
use crate::morphology::{Direction, MorphologyOp, StructuringElement};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Output format; inferred from the output extension when absent.
    #[serde(default)]
    pub format: Option<FileFormat>,
    #[serde(default)]
    pub steps: Vec<ProcessingStep>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.png"),
            output: PathBuf::from("output.png"),
            format: None,
            steps: vec![
                ProcessingStep::Convolve(ConvolveStep {
                    kernel: KernelSpec::GaussianSize {
                        size: 3,
                        sigma: 1.0,
                    },
                    policy: BorderPolicy::Mirror,
                    normalize: false,
                    workers: None,
                }),
                ProcessingStep::Morphology(MorphologyStep {
                    op: MorphologyOp::Opening,
                    element: ElementSpec::default(),
                }),
            ],
        }
    }
}

/// One stage of the processing chain, applied in order to 8-bit images.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ProcessingStep {
    Crop(Rect),
    /// Linear rescale of the sample range to `[min, max]`.
    Normalize { min: f64, max: f64 },
    Convolve(ConvolveStep),
    Morphology(MorphologyStep),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConvolveStep {
    pub kernel: KernelSpec,
    #[serde(default)]
    pub policy: BorderPolicy,
    /// Rescale the response to `[0, 255]` before converting back to 8 bits.
    #[serde(default)]
    pub normalize: bool,
    /// Line partitions; defaults to the Rayon pool size.
    #[serde(default)]
    pub workers: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum KernelSpec {
    Box { size: usize },
    GaussianSize { size: usize, sigma: f64 },
    GaussianRadius { alpha: f64 },
    Prewitt { size: usize },
    Roberts,
    Sobel,
    Laplacian,
}

impl KernelSpec {
    pub fn build(&self) -> Result<Vec<Kernel>> {
        match *self {
            Self::Box { size } => kernel::box_blur(size),
            Self::GaussianSize { size, sigma } => kernel::gaussian_by_size(size, sigma),
            Self::GaussianRadius { alpha } => kernel::gaussian_by_radius(alpha),
            Self::Prewitt { size } => kernel::prewitt(size),
            Self::Roberts => Ok(kernel::roberts()),
            Self::Sobel => Ok(kernel::sobel()),
            Self::Laplacian => Ok(kernel::laplacian()),
        }
    }
}

impl std::fmt::Display for KernelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Box { size } => write!(f, "box {size}x{size}"),
            Self::GaussianSize { size, sigma } => write!(f, "gaussian {size}x{size} (sigma {sigma})"),
            Self::GaussianRadius { alpha } => write!(f, "gaussian (alpha {alpha})"),
            Self::Prewitt { size } => write!(f, "prewitt {size}"),
            Self::Roberts => write!(f, "roberts"),
            Self::Sobel => write!(f, "sobel"),
            Self::Laplacian => write!(f, "laplacian"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MorphologyStep {
    pub op: MorphologyOp,
    pub element: ElementSpec,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementSpec {
    pub shape: ElementShape,
    #[serde(default = "default_scale")]
    pub scale: usize,
}

fn default_scale() -> usize {
    1
}

impl Default for ElementSpec {
    fn default() -> Self {
        Self {
            shape: ElementShape::Square(3),
            scale: 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ElementShape {
    Square(usize),
    Direction(Direction),
    /// Picture whose dark pixels mark the set cells.
    File(PathBuf),
}

impl ElementSpec {
    pub fn build(&self) -> Result<StructuringElement> {
        let element = match &self.shape {
            ElementShape::Square(size) => StructuringElement::square(*size)?,
            ElementShape::Direction(dir) => StructuringElement::from_direction(*dir),
            ElementShape::File(path) => StructuringElement::from_file(path)?,
        };
        element.with_scale(self.scale)
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use imagein_core::convolution::BorderPolicy;
use imagein_core::io::image_io::{load_image, save_image};
use imagein_core::pipeline::apply_step;
use imagein_core::pipeline::config::{ConvolveStep, KernelSpec, ProcessingStep};

#[derive(Clone, ValueEnum)]
pub enum KernelArg {
    Box,
    Gaussian,
    GaussianRadius,
    Prewitt,
    Roberts,
    Sobel,
    Laplacian,
}

#[derive(Clone, ValueEnum)]
pub enum PolicyArg {
    Black,
    Mirror,
    Nearest,
    Wrap,
}

impl From<&PolicyArg> for BorderPolicy {
    fn from(arg: &PolicyArg) -> Self {
        match arg {
            PolicyArg::Black => BorderPolicy::Black,
            PolicyArg::Mirror => BorderPolicy::Mirror,
            PolicyArg::Nearest => BorderPolicy::Nearest,
            PolicyArg::Wrap => BorderPolicy::Wrap,
        }
    }
}

#[derive(Args)]
pub struct FilterArgs {
    /// Input image file
    pub file: PathBuf,

    /// Kernel family
    #[arg(long, value_enum, default_value = "gaussian")]
    pub kernel: KernelArg,

    /// Kernel side length (box, gaussian, prewitt)
    #[arg(long, default_value = "3")]
    pub size: usize,

    /// Gaussian sigma for the size-based kernel
    #[arg(long, default_value = "1.0")]
    pub sigma: f64,

    /// Gaussian alpha for the radius-based kernel
    #[arg(long, default_value = "1.0")]
    pub alpha: f64,

    /// How taps outside the image are resolved
    #[arg(long, value_enum, default_value = "black")]
    pub policy: PolicyArg,

    /// Rescale the response to the full 8-bit range
    #[arg(long)]
    pub normalize: bool,

    /// Number of line partitions (defaults to the thread pool size)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Output file path
    #[arg(short, long, default_value = "filtered.png")]
    pub output: PathBuf,
}

pub fn kernel_spec(kernel: &KernelArg, size: usize, sigma: f64, alpha: f64) -> KernelSpec {
    match kernel {
        KernelArg::Box => KernelSpec::Box { size },
        KernelArg::Gaussian => KernelSpec::GaussianSize { size, sigma },
        KernelArg::GaussianRadius => KernelSpec::GaussianRadius { alpha },
        KernelArg::Prewitt => KernelSpec::Prewitt { size },
        KernelArg::Roberts => KernelSpec::Roberts,
        KernelArg::Sobel => KernelSpec::Sobel,
        KernelArg::Laplacian => KernelSpec::Laplacian,
    }
}

pub fn run(args: &FilterArgs) -> Result<()> {
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    println!(
        "Loaded {}x{} image ({} channels)",
        image.width(),
        image.height(),
        image.channels()
    );

    let step = ConvolveStep {
        kernel: kernel_spec(&args.kernel, args.size, args.sigma, args.alpha),
        policy: BorderPolicy::from(&args.policy),
        normalize: args.normalize,
        workers: args.workers,
    };
    println!(
        "Applying {} kernel, {:?} borders{}",
        step.kernel,
        step.policy,
        if step.normalize { ", normalized" } else { "" }
    );

    let filtered = apply_step(&image, &ProcessingStep::Convolve(step))
        .context("Convolution failed")?;

    save_image(&filtered, &args.output, None)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());

    Ok(())
}

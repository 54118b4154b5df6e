use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use imagein_core::image::Rect;
use imagein_core::morphology::MorphologyOp;
use imagein_core::pipeline::config::{ConvolveStep, MorphologyStep, PipelineConfig, ProcessingStep};
use imagein_core::pipeline::{run_pipeline_reported, PipelineStage, ProgressReporter};

use super::filter::{kernel_spec, KernelArg, PolicyArg};
use super::morpho::{element_spec, ElementArg, OpArg};
use crate::summary::print_pipeline_summary;

#[derive(Args)]
pub struct RunArgs {
    /// Input image file
    pub file: PathBuf,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Crop rectangle: "x,y,width,height"
    #[arg(long)]
    pub crop: Option<String>,

    /// Convolution kernel family
    #[arg(long, value_enum)]
    pub kernel: Option<KernelArg>,

    /// Kernel side length
    #[arg(long, default_value = "3")]
    pub size: usize,

    /// Gaussian sigma
    #[arg(long, default_value = "1.0")]
    pub sigma: f64,

    /// Gaussian alpha for the radius-based kernel
    #[arg(long, default_value = "1.0")]
    pub alpha: f64,

    /// Border policy for the convolution
    #[arg(long, value_enum, default_value = "black")]
    pub policy: PolicyArg,

    /// Rescale the convolution response to the full 8-bit range
    #[arg(long)]
    pub normalize: bool,

    /// Morphological operator applied after the convolution
    #[arg(long, value_enum)]
    pub op: Option<OpArg>,

    /// Built-in structuring element
    #[arg(long, value_enum, default_value = "square")]
    pub element: ElementArg,

    /// Side length of the square element
    #[arg(long, default_value = "3")]
    pub element_size: usize,

    /// Integer magnification of the element
    #[arg(long, default_value = "1")]
    pub scale: usize,

    /// Number of line partitions for the convolution
    #[arg(long)]
    pub workers: Option<usize>,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Drives an indicatif bar from pipeline stage callbacks.
struct BarReporter {
    pb: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.pb.set_message(stage.to_string());
    }

    fn finish_stage(&self) {
        self.pb.inc(1);
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let mut config: PipelineConfig =
            toml::from_str(&contents).context("Invalid pipeline config")?;
        config.input = args.file.clone();
        config
    } else {
        build_config_from_args(args)?
    };
    if let Some(ref output) = args.output {
        config.output = output.clone();
    }

    print_pipeline_summary(&config);

    // Reading and writing count as one stage each.
    let pb = ProgressBar::new(config.steps.len() as u64 + 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );

    let reporter = Arc::new(BarReporter { pb: pb.clone() });
    let result = run_pipeline_reported(&config, reporter)?;

    pb.finish_with_message("Done");
    println!(
        "\nOutput saved to {} ({}x{})",
        config.output.display(),
        result.width(),
        result.height()
    );

    Ok(())
}

fn parse_crop(s: &str) -> Result<Rect> {
    let parts: Vec<usize> = s
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .context("Invalid crop format (expected 'x,y,width,height')")?;
    if parts.len() != 4 {
        anyhow::bail!("Crop requires exactly 4 values: x,y,width,height");
    }
    Ok(Rect::new(parts[0], parts[1], parts[2], parts[3]))
}

fn build_config_from_args(args: &RunArgs) -> Result<PipelineConfig> {
    let mut steps = Vec::new();

    if let Some(ref crop) = args.crop {
        steps.push(ProcessingStep::Crop(parse_crop(crop)?));
    }

    if let Some(ref kernel) = args.kernel {
        steps.push(ProcessingStep::Convolve(ConvolveStep {
            kernel: kernel_spec(kernel, args.size, args.sigma, args.alpha),
            policy: (&args.policy).into(),
            normalize: args.normalize,
            workers: args.workers,
        }));
    }

    if let Some(ref op) = args.op {
        steps.push(ProcessingStep::Morphology(MorphologyStep {
            op: MorphologyOp::from(op),
            element: element_spec(&args.element, args.element_size, None, args.scale),
        }));
    }

    Ok(PipelineConfig {
        input: args.file.clone(),
        output: PathBuf::from("result.png"),
        format: None,
        steps,
    })
}

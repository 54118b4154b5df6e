use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::image::PixelBuffer;
use crate::io::image_io::{load_image, save_image};

use super::config::PipelineConfig;
use super::steps::apply_step;
use super::types::{NoOpReporter, PipelineStage, ProgressReporter};

/// Run the processing chain with a thread-safe progress reporter.
///
/// Reads `config.input`, applies every step in order, writes the result to
/// `config.output` and returns it.
pub fn run_pipeline_reported(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PixelBuffer<u8>> {
    reporter.begin_stage(PipelineStage::Reading, None);
    let mut image = load_image(&config.input)?;
    info!(
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        "Loaded {}",
        config.input.display()
    );
    reporter.finish_stage();

    let total = config.steps.len();
    for (i, step) in config.steps.iter().enumerate() {
        reporter.begin_stage(step.stage(), Some(1));
        image = apply_step(&image, step)?;
        info!(step = i + 1, total, "{} complete", step.stage());
        reporter.advance(1);
        reporter.finish_stage();
    }

    reporter.begin_stage(PipelineStage::Writing, None);
    save_image(&image, &config.output, config.format)?;
    info!(output = %config.output.display(), "Wrote result");
    reporter.finish_stage();

    Ok(image)
}

/// Run the processing chain without progress reporting.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PixelBuffer<u8>> {
    run_pipeline_reported(config, Arc::new(NoOpReporter))
}

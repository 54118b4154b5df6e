use tracing::info;

use crate::consts::MAX_8BIT;
use crate::convolution::Convolution;
use crate::error::Result;
use crate::image::PixelBuffer;
use crate::morphology;

use super::config::{ConvolveStep, MorphologyStep, ProcessingStep};
use super::types::PipelineStage;

impl ProcessingStep {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Crop(_) => PipelineStage::Cropping,
            Self::Normalize { .. } => PipelineStage::Normalizing,
            Self::Convolve(_) => PipelineStage::Convolving,
            Self::Morphology(_) => PipelineStage::Morphology,
        }
    }
}

/// Apply a single processing step to an 8-bit image.
pub fn apply_step(image: &PixelBuffer<u8>, step: &ProcessingStep) -> Result<PixelBuffer<u8>> {
    match step {
        ProcessingStep::Crop(rect) => {
            info!(?rect, "Cropping");
            Ok(image.crop(rect))
        }
        ProcessingStep::Normalize { min, max } => {
            info!(min, max, "Normalizing");
            let mut out = image.clone();
            out.normalize(*min, *max);
            Ok(out)
        }
        ProcessingStep::Convolve(step) => convolve_step(image, step),
        ProcessingStep::Morphology(step) => morphology_step(image, step),
    }
}

fn convolve_step(image: &PixelBuffer<u8>, step: &ConvolveStep) -> Result<PixelBuffer<u8>> {
    info!(kernel = %step.kernel, policy = ?step.policy, "Convolving");
    let mut conv = Convolution::new(step.kernel.build()?)?.with_policy(step.policy);
    if let Some(workers) = step.workers {
        conv = conv.with_workers(workers);
    }
    let mut response = conv.apply(image)?;
    if step.normalize {
        response.normalize(0.0, MAX_8BIT);
    }
    Ok(response.convert())
}

fn morphology_step(image: &PixelBuffer<u8>, step: &MorphologyStep) -> Result<PixelBuffer<u8>> {
    info!(op = %step.op, "Applying morphology");
    let element = step.element.build()?;
    morphology::apply(step.op, image, &element)
}

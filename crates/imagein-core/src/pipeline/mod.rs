pub mod config;
mod orchestrator;
mod steps;
mod types;

pub use orchestrator::{run_pipeline, run_pipeline_reported};
pub use steps::apply_step;
pub use types::{PipelineStage, ProgressReporter};

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    Cropping,
    Normalizing,
    Convolving,
    Morphology,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading image"),
            Self::Cropping => write!(f, "Cropping"),
            Self::Normalizing => write!(f, "Normalizing"),
            Self::Convolving => write!(f, "Convolving"),
            Self::Morphology => write!(f, "Applying morphology"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage, if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_pipeline` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

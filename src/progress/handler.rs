//! Progress handler trait and events

use crate::pipeline::PipelineStage;
use std::path::PathBuf;
use std::time::Duration;

/// Events emitted while a repository is processed
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started { url: String },

    /// Clone in progress
    Cloning { url: String },

    /// Walking the working tree
    Extracting { path: PathBuf },

    /// Extraction finished
    Extracted {
        files: usize,
        skipped: usize,
        code_bytes: usize,
    },

    /// Analysis request sent
    Analyzing { files: usize },

    /// Analysis reply received
    Analyzed { response_time: Duration },

    /// README request sent
    Generating,

    /// Writing the README to disk
    Saving { path: PathBuf },

    /// Run completed successfully
    Completed { output: PathBuf, total_time: Duration },

    /// Run failed
    Failed { stage: PipelineStage, error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

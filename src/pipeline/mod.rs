//! End-to-end run: clone, extract, analyze, generate, save

mod error;
mod orchestrator;

pub use error::{PipelineError, PipelineStage};
pub use orchestrator::{analyze_repository, analyze_repository_with, Pipeline, PipelineOutcome};

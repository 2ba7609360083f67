//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { url } => {
                info!(url = %url, "Starting README generation");
            }
            ProgressEvent::Cloning { url } => {
                info!(url = %url, "Cloning repository");
            }
            ProgressEvent::Extracting { path } => {
                info!(path = %path.display(), "Extracting source files");
            }
            ProgressEvent::Extracted {
                files,
                skipped,
                code_bytes,
            } => {
                if *files == 0 {
                    warn!(skipped, "No source files found, continuing with empty input");
                } else if *skipped > 0 {
                    warn!(files, skipped, code_bytes, "Extraction complete with skipped files");
                } else {
                    info!(files, code_bytes, "Extraction complete");
                }
            }
            ProgressEvent::Analyzing { files } => {
                info!(files, "Analyzing code");
            }
            ProgressEvent::Analyzed { response_time } => {
                debug!(
                    response_time_ms = response_time.as_millis(),
                    "Analysis received"
                );
            }
            ProgressEvent::Generating => {
                info!("Generating README");
            }
            ProgressEvent::Saving { path } => {
                info!(path = %path.display(), "Saving README");
            }
            ProgressEvent::Completed { output, total_time } => {
                info!(
                    output = %output.display(),
                    total_time_ms = total_time.as_millis(),
                    "README written"
                );
            }
            ProgressEvent::Failed { stage, error } => {
                error!(stage = %stage, error = %error, "Run failed");
            }
        }
    }
}

use crate::config::ConfigError;
use crate::llm::BackendError;
use crate::repository::{ExtractError, FetchError};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Step of a run, used to attribute failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Configure,
    Fetch,
    Extract,
    Analyze,
    Generate,
    Save,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Configure => "configure",
            PipelineStage::Fetch => "fetch",
            PipelineStage::Extract => "extract",
            PipelineStage::Analyze => "analyze",
            PipelineStage::Generate => "generate",
            PipelineStage::Save => "save",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch repository: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to extract source files: {0}")]
    Extract(#[from] ExtractError),

    #[error("Code analysis failed: {0}")]
    Analysis(#[source] BackendError),

    #[error("README generation failed: {0}")]
    Generation(#[source] BackendError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Config(_) => PipelineStage::Configure,
            PipelineError::Fetch(_) => PipelineStage::Fetch,
            PipelineError::Extract(_) => PipelineStage::Extract,
            PipelineError::Analysis(_) => PipelineStage::Analyze,
            PipelineError::Generation(_) => PipelineStage::Generate,
            PipelineError::Write { .. } => PipelineStage::Save,
        }
    }

    /// Returns a user-facing message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            PipelineError::Config(ConfigError::MissingApiKey { provider, env_var }) => {
                format!(
                    "Error: No API key configured for {}\n\n\
                    Help: Set the key in your environment or in a .env file:\n\
                    export {}=your-key-here\n\n\
                    Or pick a provider that runs locally:\n\
                    export REPOINSIGHT_PROVIDER=ollama",
                    provider, env_var
                )
            }
            PipelineError::Config(e) => {
                format!(
                    "Error: Invalid configuration\n\n\
                    Help: Check the REPOINSIGHT_* environment variables and command-line flags.\n\n\
                    Details: {}",
                    e
                )
            }
            PipelineError::Fetch(FetchError::Spawn { program, .. }) => {
                format!(
                    "Error: Could not run '{}'\n\n\
                    Help: Cloning requires git. Install it and make sure it is on your PATH.\n\n\
                    Details: {}",
                    program, self
                )
            }
            PipelineError::Fetch(FetchError::CloneFailed { url, stderr, .. }) => {
                format!(
                    "Error: Could not clone {}\n\n\
                    Help: Check that:\n\
                    - The URL is spelled correctly\n\
                    - The host is reachable from this machine\n\
                    - You have read access (private repositories need git credentials)\n\n\
                    git said: {}",
                    url, stderr
                )
            }
            PipelineError::Fetch(e) => format!("Error: {}", e),
            PipelineError::Extract(e) => {
                format!(
                    "Error: Source extraction failed\n\n\
                    Help: The cloned working tree could not be read. Check free space and permissions in the temporary directory.\n\n\
                    Details: {}",
                    e
                )
            }
            PipelineError::Analysis(e) | PipelineError::Generation(e) => backend_help(self.stage(), e),
            PipelineError::Write { path, source } => {
                format!(
                    "Error: Could not write {}\n\n\
                    Help: Check that the directory exists and is writable, or choose another path with --output.\n\n\
                    Details: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

fn backend_help(stage: PipelineStage, error: &BackendError) -> String {
    let hint = match error {
        BackendError::AuthenticationError { .. } => {
            "The provider rejected the API key. Check that it is valid and has not expired."
        }
        BackendError::TimeoutError { .. } => {
            "The model did not answer in time. Large repositories produce long prompts; \
            raise --timeout or narrow the input with --ignore."
        }
        BackendError::ApiError {
            status_code: Some(429),
            ..
        } => "The provider is rate limiting requests. Wait a moment and try again.",
        BackendError::ApiError { .. } => {
            "The provider returned an error. The prompt may exceed the model's context window; \
            try --ignore to exclude large files or pick a model with a larger context."
        }
        BackendError::InvalidResponse { .. } => {
            "The model returned an unusable reply. Try again or use a different model."
        }
        BackendError::ConfigurationError { .. } => {
            "The model client is misconfigured. Check REPOINSIGHT_MODEL and REPOINSIGHT_API_BASE_URL."
        }
        BackendError::Other { .. } => "An unexpected error occurred while talking to the model.",
    };

    format!(
        "Error: Model request failed during {} stage\n\nHelp: {}\n\nDetails: {}",
        stage, hint, error
    )
}

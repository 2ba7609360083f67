//! repoinsight - README generation for source repositories
//!
//! Clones a repository into a temporary directory, concatenates its source files,
//! asks a large language model for a structured analysis and then, continuing the
//! same conversation, for a README. The README is written to disk.
//!
//! # Example Usage
//!
//! ```no_run
//! use repoinsight::{analyze_repository, InsightConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InsightConfig::from_env()?;
//! let outcome = analyze_repository("https://github.com/user/project.git", &config).await?;
//!
//! println!("Analyzed {} files", outcome.file_index.len());
//! println!("README written to {}", outcome.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`repository`]: cloning and source extraction
//! - [`analysis`]: the two model exchanges and their prompts
//! - [`llm`]: provider-neutral chat client abstraction
//! - [`pipeline`]: sequencing, error attribution and output
//! - [`config`]: environment-based configuration

pub mod analysis;
pub mod cli;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod progress;
pub mod repository;
pub mod util;

pub use analysis::{CodeAnalyzer, PromptSet, ReadmeGenerator};
pub use config::{ApiKey, ConfigError, InsightConfig};
pub use llm::{BackendError, Conversation, GenAIClient, LLMClient, MockLLMClient};
pub use pipeline::{
    analyze_repository, analyze_repository_with, Pipeline, PipelineError, PipelineOutcome,
    PipelineStage,
};
pub use repository::{CodeExtractor, ExtractedCode, GitFetcher, RepositoryFetcher};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_repoinsight() {
        assert_eq!(NAME, "repoinsight");
    }
}

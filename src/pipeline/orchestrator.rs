use super::error::{PipelineError, PipelineStage};
use crate::analysis::{CodeAnalyzer, PromptSet, ReadmeGenerator};
use crate::config::InsightConfig;
use crate::llm::{Conversation, LLMClient};
use crate::progress::{LoggingHandler, ProgressEvent, ProgressHandler};
use crate::repository::{
    CodeExtractor, ExtractedCode, ExtractionWarning, ExtractorConfig, GitFetcher,
    RepositoryFetcher,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Where the README was written
    pub output_path: PathBuf,
    pub file_index: Vec<String>,
    /// All five messages: system, analysis request and reply, README request and reply
    pub conversation: Conversation,
    pub readme: String,
    pub warnings: Vec<ExtractionWarning>,
}

/// Clone, extract, analyze, generate, save
pub struct Pipeline {
    fetcher: Arc<dyn RepositoryFetcher>,
    client: Arc<dyn LLMClient>,
    extractor: ExtractorConfig,
    prompts: PromptSet,
    max_tokens: Option<u32>,
    output_path: PathBuf,
    transcript_path: Option<PathBuf>,
    progress: Arc<dyn ProgressHandler>,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn RepositoryFetcher>, client: Arc<dyn LLMClient>) -> Self {
        Self {
            fetcher,
            client,
            extractor: ExtractorConfig::default(),
            prompts: PromptSet::default(),
            max_tokens: None,
            output_path: PathBuf::from("README.md"),
            transcript_path: None,
            progress: Arc::new(LoggingHandler),
        }
    }

    /// Builds a pipeline with a git fetcher and every setting taken from `config`
    pub fn from_config(config: &InsightConfig, client: Arc<dyn LLMClient>) -> Self {
        let fetcher = GitFetcher::new().with_depth(config.clone_depth);

        Self::new(Arc::new(fetcher), client)
            .with_extractor_config(ExtractorConfig {
                ignore_patterns: config.ignore_patterns.clone(),
                source_extensions: config.source_extensions.clone(),
            })
            .with_prompts(config.prompts.clone())
            .with_max_tokens(config.max_tokens)
            .with_output_path(config.output_path.clone())
            .with_transcript_path(config.transcript_path.clone())
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn RepositoryFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_extractor_config(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_transcript_path(mut self, path: Option<PathBuf>) -> Self {
        self.transcript_path = path;
        self
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = handler;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Runs every stage for the repository at `url`
    ///
    /// A `Failed` progress event carrying the stage is emitted before any error
    /// is returned.
    pub async fn run(&self, url: &str) -> Result<PipelineOutcome, PipelineError> {
        let start = Instant::now();
        self.emit(ProgressEvent::Started {
            url: url.to_string(),
        });

        match self.execute(url).await {
            Ok(outcome) => {
                self.emit(ProgressEvent::Completed {
                    output: outcome.output_path.clone(),
                    total_time: start.elapsed(),
                });
                Ok(outcome)
            }
            Err(e) => {
                self.emit(ProgressEvent::Failed {
                    stage: e.stage(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn execute(&self, url: &str) -> Result<PipelineOutcome, PipelineError> {
        let extracted = self.fetch_and_extract(url).await?;

        self.emit(ProgressEvent::Analyzing {
            files: extracted.file_count(),
        });
        let analysis_start = Instant::now();
        let analyzer = CodeAnalyzer::new(self.client.clone(), self.prompts.clone())
            .with_max_tokens(self.max_tokens);
        let mut conversation = analyzer
            .analyze(&extracted.index, &extracted.blob)
            .await
            .map_err(PipelineError::Analysis)?;
        self.emit(ProgressEvent::Analyzed {
            response_time: analysis_start.elapsed(),
        });

        self.emit(ProgressEvent::Generating);
        let generator = ReadmeGenerator::new(self.client.clone(), self.prompts.clone())
            .with_max_tokens(self.max_tokens);
        let readme = generator
            .generate(&mut conversation)
            .await
            .map_err(PipelineError::Generation)?;

        self.emit(ProgressEvent::Saving {
            path: self.output_path.clone(),
        });
        write_file(&self.output_path, readme.as_bytes())?;
        info!(path = %self.output_path.display(), bytes = readme.len(), "README saved");

        if let Some(path) = &self.transcript_path {
            let json = serde_json::to_vec_pretty(&conversation).map_err(|e| PipelineError::Write {
                path: path.clone(),
                source: e.into(),
            })?;
            write_file(path, &json)?;
            debug!(path = %path.display(), messages = conversation.len(), "Transcript saved");
        }

        Ok(PipelineOutcome {
            output_path: self.output_path.clone(),
            file_index: extracted.index,
            conversation,
            readme,
            warnings: extracted.warnings,
        })
    }

    /// The working tree lives only for the duration of this call
    async fn fetch_and_extract(&self, url: &str) -> Result<ExtractedCode, PipelineError> {
        self.emit(ProgressEvent::Cloning {
            url: url.to_string(),
        });
        let repository = self.fetcher.fetch(url).await?;

        self.emit(ProgressEvent::Extracting {
            path: repository.path().to_path_buf(),
        });
        let extractor = CodeExtractor::new(self.extractor.clone());
        let extracted = extractor.extract(repository.path())?;

        self.emit(ProgressEvent::Extracted {
            files: extracted.file_count(),
            skipped: extracted.warnings.len(),
            code_bytes: extracted.blob.len(),
        });

        if let Err(e) = repository.close() {
            warn!(error = %e, "Failed to remove working tree");
        }
        Ok(extracted)
    }

    fn emit(&self, event: ProgressEvent) {
        self.progress.on_progress(&event);
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("client", &self.client.name())
            .field("extractor", &self.extractor)
            .field("max_tokens", &self.max_tokens)
            .field("output_path", &self.output_path)
            .field("transcript_path", &self.transcript_path)
            .finish()
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), PipelineError> {
    fs::write(path, contents).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Clones `url`, analyzes its sources and writes a README as configured
///
/// The configuration is validated, including the credential check, before
/// anything is cloned.
pub async fn analyze_repository(
    url: &str,
    config: &InsightConfig,
) -> Result<PipelineOutcome, PipelineError> {
    let fetcher = GitFetcher::new().with_depth(config.clone_depth);
    analyze_repository_with(url, config, Arc::new(fetcher)).await
}

/// [`analyze_repository`] with a caller-supplied fetcher
pub async fn analyze_repository_with(
    url: &str,
    config: &InsightConfig,
    fetcher: Arc<dyn RepositoryFetcher>,
) -> Result<PipelineOutcome, PipelineError> {
    config.validate()?;
    let client = config.create_client()?;

    debug!(provider = config.provider.as_str(), model = %config.model, "Model client ready");

    Pipeline::from_config(config, client)
        .with_fetcher(fetcher)
        .run(url)
        .await
}

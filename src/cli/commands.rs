use crate::config::{self, InsightConfig};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

/// Generate a README for a git repository using a large language model
#[derive(Parser, Debug)]
#[command(
    name = "repoinsight",
    about = "Generate a README for a git repository using a large language model",
    version,
    author,
    long_about = "repoinsight clones a repository into a temporary directory, collects its \
                  source files, asks a language model to analyze them and then to write a \
                  README from that analysis.\n\n\
                  Examples:\n  \
                  repoinsight https://github.com/user/project.git\n  \
                  repoinsight -o docs/README.md -i 'tests/*' https://github.com/user/project.git\n  \
                  repoinsight --provider ollama --model llama3.2 ./local/checkout"
)]
pub struct CliArgs {
    #[arg(value_name = "REPO_URL", help = "Repository to clone (any URL or path git accepts)")]
    pub repo_url: String,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Where to write the README [default: README.md]"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'i',
        long = "ignore",
        value_name = "PATTERN",
        help = "fnmatch pattern matched against repository-relative paths to skip (repeatable) [default: .git]"
    )]
    pub ignore: Vec<String>,

    #[arg(
        long = "no-ignore",
        conflicts_with = "ignore",
        help = "Skip nothing, not even the default .git pattern"
    )]
    pub no_ignore: bool,

    #[arg(
        short = 'e',
        long = "extension",
        value_name = "SUFFIX",
        help = "Source file suffix to include (repeatable) [default: .py]"
    )]
    pub extensions: Vec<String>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model name (provider-specific)")]
    pub model: Option<String>,

    #[arg(
        short = 'p',
        long,
        value_name = "PROVIDER",
        value_parser = parse_provider_name,
        help = "Model provider (openai, anthropic, gemini, groq, xai, deepseek, cohere, ollama)"
    )]
    pub provider: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Timeout for each model request")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "N", help = "Shallow clone with the last N commits")]
    pub depth: Option<u32>,

    #[arg(long, value_name = "FILE", help = "TOML file overriding the built-in prompts")]
    pub prompts: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Also write the model conversation as JSON"
    )]
    pub transcript: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - only errors are logged"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// Scalar settings given on the command line, keyed by their environment variable
    pub fn env_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                overrides.insert(key.to_string(), value);
            }
        };

        set(config::ENV_PROVIDER, self.provider.clone());
        set(config::ENV_MODEL, self.model.clone());
        set(config::ENV_REQUEST_TIMEOUT, self.timeout.map(|t| t.to_string()));
        set(config::ENV_CLONE_DEPTH, self.depth.map(|d| d.to_string()));
        set(config::ENV_OUTPUT, path_string(&self.output));
        set(config::ENV_PROMPTS_FILE, path_string(&self.prompts));
        set(config::ENV_TRANSCRIPT, path_string(&self.transcript));
        set(config::ENV_LOG_LEVEL, self.effective_log_level());

        overrides
    }

    /// Replaces list settings with the ones given on the command line, if any
    pub fn apply_lists(&self, config: &mut InsightConfig) {
        if self.no_ignore {
            config.ignore_patterns.clear();
        } else if !self.ignore.is_empty() {
            config.ignore_patterns = self.ignore.clone();
        }
        if !self.extensions.is_empty() {
            config.source_extensions = self.extensions.clone();
        }
    }

    /// Level implied by `--log-level`, `--verbose` or `--quiet`, in that order
    pub fn effective_log_level(&self) -> Option<String> {
        if let Some(level) = &self.log_level {
            Some(level.to_lowercase())
        } else if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        }
    }
}

fn path_string(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.to_string_lossy().into_owned())
}

fn parse_provider_name(s: &str) -> Result<String, String> {
    config::parse_provider(s)
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}

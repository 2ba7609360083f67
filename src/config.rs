//! Configuration management for repoinsight
//!
//! Settings are loaded once, at process start, from environment variables (after
//! reading an optional `.env` file in the working directory) and then passed
//! explicitly to every stage. Nothing reads the environment after that point.
//!
//! # Environment Variables
//!
//! - `REPOINSIGHT_PROVIDER`: genai adapter (openai|anthropic|gemini|groq|xai|ollama|...) - default: "openai"
//! - `REPOINSIGHT_MODEL`: Model name - default: "gpt-4o-mini"
//! - `REPOINSIGHT_API_BASE_URL`: Optional endpoint override
//! - `REPOINSIGHT_REQUEST_TIMEOUT`: Timeout in seconds per model call - default: "120"
//! - `REPOINSIGHT_MAX_TOKENS`: Optional cap on generated tokens
//! - `REPOINSIGHT_IGNORE`: Comma-separated fnmatch patterns - default: ".git".
//!   Set but empty means no patterns.
//! - `REPOINSIGHT_EXTENSIONS`: Comma-separated source suffixes - default: ".py"
//! - `REPOINSIGHT_OUTPUT`: README destination - default: "README.md"
//! - `REPOINSIGHT_CLONE_DEPTH`: Optional shallow clone depth
//! - `REPOINSIGHT_PROMPTS_FILE`: Optional TOML file overriding the prompts
//! - `REPOINSIGHT_TRANSCRIPT`: Optional path for a JSON dump of the conversation
//! - `REPOINSIGHT_LOG_LEVEL`: Logging level - default: "info"
//!
//! The credential is read from the variable the selected provider defines
//! (`OPENAI_API_KEY` for OpenAI, `ANTHROPIC_API_KEY` for Anthropic, ...).
//! Providers without a key variable, such as Ollama, need no credential.

use crate::analysis::PromptSet;
use crate::llm::{BackendError, GenAIClient};
use genai::adapter::AdapterKind;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const ENV_PROVIDER: &str = "REPOINSIGHT_PROVIDER";
pub const ENV_MODEL: &str = "REPOINSIGHT_MODEL";
pub const ENV_API_BASE_URL: &str = "REPOINSIGHT_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "REPOINSIGHT_REQUEST_TIMEOUT";
pub const ENV_MAX_TOKENS: &str = "REPOINSIGHT_MAX_TOKENS";
pub const ENV_IGNORE: &str = "REPOINSIGHT_IGNORE";
pub const ENV_EXTENSIONS: &str = "REPOINSIGHT_EXTENSIONS";
pub const ENV_OUTPUT: &str = "REPOINSIGHT_OUTPUT";
pub const ENV_CLONE_DEPTH: &str = "REPOINSIGHT_CLONE_DEPTH";
pub const ENV_PROMPTS_FILE: &str = "REPOINSIGHT_PROMPTS_FILE";
pub const ENV_TRANSCRIPT: &str = "REPOINSIGHT_TRANSCRIPT";
pub const ENV_LOG_LEVEL: &str = "REPOINSIGHT_LOG_LEVEL";

/// Default values for configuration
const DEFAULT_PROVIDER: AdapterKind = AdapterKind::OpenAI;
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const DEFAULT_OUTPUT: &str = "README.md";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_IGNORE: &[&str] = &[".git"];
const DEFAULT_EXTENSIONS: &[&str] = &[".py"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The selected provider needs a credential and none was found
    #[error("{env_var} not found in environment variables (required by provider {provider})")]
    MissingApiKey {
        provider: String,
        env_var: String,
    },

    /// Invalid provider name
    #[error("Invalid provider: {0}. Valid options: openai, anthropic, gemini, groq, xai, deepseek, cohere, ollama")]
    InvalidProvider(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    /// Prompt override file could not be loaded
    #[error("Failed to load prompts from {path}: {message}")]
    PromptFile { path: PathBuf, message: String },

    /// Client initialization failed
    #[error("Client initialization failed: {0}")]
    ClientInitError(#[from] BackendError),
}

/// Secret credential for the inference service
///
/// `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Main configuration structure for repoinsight
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// LLM provider (genai adapter)
    pub provider: AdapterKind,

    /// Model identifier, passed to the provider as-is
    pub model: String,

    /// Resolved credential; `None` only for providers that need none
    pub api_key: Option<ApiKey>,

    /// Optional endpoint override
    pub api_base_url: Option<String>,

    /// Request timeout in seconds, applied to each model call
    pub request_timeout_secs: u64,

    /// Optional cap on generated tokens
    pub max_tokens: Option<u32>,

    /// Glob patterns matched against paths relative to the repository root
    pub ignore_patterns: Vec<String>,

    /// File name suffixes that count as source files
    pub source_extensions: Vec<String>,

    /// Where the generated README is written
    pub output_path: PathBuf,

    /// Shallow clone depth; `None` clones the full history
    pub clone_depth: Option<u32>,

    /// Prompts sent to the model
    pub prompts: PromptSet,

    /// Where to dump the final conversation as JSON, if anywhere
    pub transcript_path: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl InsightConfig {
    /// Loads `.env` (if present) and then the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), with `overrides` taking precedence
    /// over the process environment
    pub fn from_env_with_overrides(overrides: &HashMap<String, String>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| overrides.get(key).cloned().or_else(|| env::var(key).ok()))
    }

    /// Loads the configuration through an arbitrary key lookup
    ///
    /// Empty values are treated as unset, except for `REPOINSIGHT_IGNORE` where
    /// an empty value clears the default patterns.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get(ENV_PROVIDER) {
            Some(name) => parse_provider(&name)?,
            None => DEFAULT_PROVIDER,
        };

        let model = get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_key = resolve_api_key(provider, &get)?;

        let request_timeout_secs = match get(ENV_REQUEST_TIMEOUT) {
            Some(v) => parse_number::<u64>(ENV_REQUEST_TIMEOUT, &v)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let max_tokens = get(ENV_MAX_TOKENS)
            .map(|v| parse_number::<u32>(ENV_MAX_TOKENS, &v))
            .transpose()?;

        let clone_depth = get(ENV_CLONE_DEPTH)
            .map(|v| parse_number::<u32>(ENV_CLONE_DEPTH, &v))
            .transpose()?;

        let ignore_patterns = lookup(ENV_IGNORE)
            .map(|v| split_list(&v))
            .unwrap_or_else(|| DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect());

        let source_extensions = get(ENV_EXTENSIONS)
            .map(|v| split_list(&v))
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect());

        let prompts = match get(ENV_PROMPTS_FILE) {
            Some(path) => load_prompts(Path::new(&path))?,
            None => PromptSet::default(),
        };

        let log_level = get(ENV_LOG_LEVEL)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Ok(Self {
            provider,
            model,
            api_key,
            api_base_url: get(ENV_API_BASE_URL),
            request_timeout_secs,
            max_tokens,
            ignore_patterns,
            source_extensions,
            output_path: get(ENV_OUTPUT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            clone_depth,
            prompts,
            transcript_path: get(ENV_TRANSCRIPT).map(PathBuf::from),
            log_level,
        })
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` if the provider needs a credential and
    /// none is set, otherwise `ConfigError::ValidationFailed` describing the first
    /// invalid field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(env_var) = self.provider.default_key_env_name() {
            if self.api_key.is_none() {
                return Err(ConfigError::MissingApiKey {
                    provider: self.provider.as_str().to_string(),
                    env_var: env_var.to_string(),
                });
            }
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name must not be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.max_tokens == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "Max tokens must be greater than zero".to_string(),
            ));
        }

        if self.clone_depth == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "Clone depth must be greater than zero".to_string(),
            ));
        }

        if self.source_extensions.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one source file extension is required".to_string(),
            ));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Output path must not be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Creates the LLM client for the configured provider and credential
    pub fn create_client(&self) -> Result<Arc<GenAIClient>, ConfigError> {
        let client = GenAIClient::new(
            self.provider,
            self.model.clone(),
            self.api_key.clone(),
            self.api_base_url.clone(),
            self.request_timeout(),
        )?;

        Ok(Arc::new(client))
    }
}

impl fmt::Display for InsightConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Repoinsight Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(
            f,
            "  API Key: {}",
            if self.api_key.is_some() { "set" } else { "not set" }
        )?;
        if let Some(ref url) = self.api_base_url {
            writeln!(f, "  API Base URL: {}", url)?;
        }
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Ignore Patterns: {}", self.ignore_patterns.join(", "))?;
        writeln!(f, "  Source Extensions: {}", self.source_extensions.join(", "))?;
        writeln!(f, "  Output: {}", self.output_path.display())?;
        if let Some(depth) = self.clone_depth {
            writeln!(f, "  Clone Depth: {}", depth)?;
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

/// Parses a genai adapter name, accepting a few common aliases
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    let lowered = name.trim().to_lowercase();
    let canonical = match lowered.as_str() {
        "claude" => "anthropic",
        "grok" => "xai",
        other => other,
    };
    AdapterKind::from_lower_str(canonical).ok_or_else(|| ConfigError::InvalidProvider(name.to_string()))
}

fn resolve_api_key<F>(provider: AdapterKind, get: &F) -> Result<Option<ApiKey>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match provider.default_key_env_name() {
        Some(env_var) => get(env_var).map(|key| Some(ApiKey::new(key))).ok_or_else(|| {
            ConfigError::MissingApiKey {
                provider: provider.as_str().to_string(),
                env_var: env_var.to_string(),
            }
        }),
        None => Ok(None),
    }
}

fn parse_number<T>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
        field: field.to_string(),
        error: e.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_prompts(path: &Path) -> Result<PromptSet, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::PromptFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    toml::from_str(&raw).map_err(|e| ConfigError::PromptFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMClient;
    use serial_test::serial;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    fn test_default_configuration() {
        let config = InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.provider, AdapterKind::OpenAI);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_key, Some(ApiKey::new("sk-test")));
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.ignore_patterns, vec![".git".to_string()]);
        assert_eq!(config.source_extensions, vec![".py".to_string()]);
        assert_eq!(config.output_path, PathBuf::from("README.md"));
        assert_eq!(config.clone_depth, None);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let result = InsightConfig::from_lookup(lookup_from(&[]));
        match result {
            Err(ConfigError::MissingApiKey { env_var, .. }) => {
                assert_eq!(env_var, "OPENAI_API_KEY");
            }
            other => panic!("Expected MissingApiKey, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_ignore_clears_defaults() {
        let config = InsightConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            (ENV_IGNORE, ""),
        ]))
        .unwrap();
        assert!(config.ignore_patterns.is_empty());

        let config =
            InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.ignore_patterns, vec![".git".to_string()]);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let result = InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey { .. })));
    }

    #[test]
    fn test_provider_without_key_variable() {
        let config = InsightConfig::from_lookup(lookup_from(&[
            (ENV_PROVIDER, "ollama"),
            (ENV_MODEL, "qwen2.5-coder:7b"),
        ]))
        .unwrap();

        assert_eq!(config.provider, AdapterKind::Ollama);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_environment_value_parsing() {
        let config = InsightConfig::from_lookup(lookup_from(&[
            (ENV_PROVIDER, "claude"),
            ("ANTHROPIC_API_KEY", "ak-test"),
            (ENV_MODEL, "claude-sonnet-4-5"),
            (ENV_REQUEST_TIMEOUT, "60"),
            (ENV_MAX_TOKENS, "4096"),
            (ENV_IGNORE, ".git, tests/*, *.min.py"),
            (ENV_EXTENSIONS, ".py,.pyi"),
            (ENV_OUTPUT, "docs/README.md"),
            (ENV_CLONE_DEPTH, "1"),
            (ENV_TRANSCRIPT, "conversation.json"),
            (ENV_LOG_LEVEL, "DEBUG"),
        ]))
        .unwrap();

        assert_eq!(config.provider, AdapterKind::Anthropic);
        assert_eq!(config.model, "claude-sonnet-4-5");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.max_tokens, Some(4096));
        assert_eq!(
            config.ignore_patterns,
            vec![".git".to_string(), "tests/*".to_string(), "*.min.py".to_string()]
        );
        assert_eq!(config.source_extensions, vec![".py".to_string(), ".pyi".to_string()]);
        assert_eq!(config.output_path, PathBuf::from("docs/README.md"));
        assert_eq!(config.clone_depth, Some(1));
        assert_eq!(config.transcript_path, Some(PathBuf::from("conversation.json")));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_provider() {
        let result = InsightConfig::from_lookup(lookup_from(&[(ENV_PROVIDER, "skynet")]));
        assert!(matches!(result, Err(ConfigError::InvalidProvider(_))));
    }

    #[test]
    fn test_unparseable_timeout() {
        let result = InsightConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            (ENV_REQUEST_TIMEOUT, "soon"),
        ]));
        match result {
            Err(ConfigError::ParseError { field, .. }) => assert_eq!(field, ENV_REQUEST_TIMEOUT),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let mut config =
            InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = MAX_REQUEST_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_fnmatch_patterns() {
        let mut config =
            InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        config.ignore_patterns.push("[unclosed".to_string());
        config.ignore_patterns.push("vendor**".to_string());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_requires_extensions_and_level() {
        let mut config =
            InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        config.source_extensions.clear();
        assert!(config.validate().is_err());

        let mut config =
            InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prompts_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.toml");
        fs::write(&path, "system = \"You review Go services.\"\n").unwrap();

        let config = InsightConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            (ENV_PROMPTS_FILE, path.to_str().unwrap()),
        ]))
        .unwrap();

        assert_eq!(config.prompts.system, "You review Go services.");
        assert_eq!(config.prompts.readme, PromptSet::default().readme);
    }

    #[test]
    fn test_missing_prompts_file() {
        let result = InsightConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            (ENV_PROMPTS_FILE, "/nonexistent/prompts.toml"),
        ]));
        assert!(matches!(result, Err(ConfigError::PromptFile { .. })));
    }

    #[test]
    fn test_key_never_displayed() {
        let config =
            InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-secret-value")]))
                .unwrap();

        let display = format!("{}", config);
        assert!(display.contains("Repoinsight Configuration:"));
        assert!(display.contains("API Key: set"));
        assert!(!display.contains("sk-secret-value"));
        assert!(!format!("{:?}", config).contains("sk-secret-value"));
    }

    #[test]
    fn test_provider_aliases() {
        assert_eq!(parse_provider("OpenAI").unwrap(), AdapterKind::OpenAI);
        assert_eq!(parse_provider("claude").unwrap(), AdapterKind::Anthropic);
        assert_eq!(parse_provider("ollama").unwrap(), AdapterKind::Ollama);
        assert!(parse_provider("invalid").is_err());
    }

    #[test]
    fn test_create_client() {
        let config =
            InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        let client = config.create_client().unwrap();
        assert_eq!(client.model_info(), Some(DEFAULT_MODEL.to_string()));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        let _guards = vec![
            EnvGuard::set("OPENAI_API_KEY", "sk-from-env"),
            EnvGuard::set(ENV_MODEL, "gpt-4o"),
            EnvGuard::set(ENV_PROVIDER, "openai"),
        ];

        let config = InsightConfig::from_env().unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key, Some(ApiKey::new("sk-from-env")));
    }

    #[test]
    #[serial]
    fn test_overrides_take_precedence() {
        let _guards = vec![
            EnvGuard::set(ENV_MODEL, "gpt-4o"),
            EnvGuard::set(ENV_PROVIDER, "openai"),
        ];

        let mut overrides = HashMap::new();
        overrides.insert(ENV_PROVIDER.to_string(), "ollama".to_string());
        overrides.insert(ENV_MODEL.to_string(), "llama3.2".to_string());

        let config = InsightConfig::from_env_with_overrides(&overrides).unwrap();
        assert_eq!(config.provider, AdapterKind::Ollama);
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_validation_requires_key_for_keyed_provider() {
        let mut config =
            InsightConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert!(config.validate().is_ok());

        config.api_key = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingApiKey { env_var, .. }) if env_var == "OPENAI_API_KEY"
        ));
    }
}

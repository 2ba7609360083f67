//! Source extraction
//!
//! Walks a working tree and concatenates every non-empty source file into a
//! single text blob, each file preceded by a `---- File: <path> ----` line.
//! Paths are relative to the root and always use `/` as separator.

use glob::Pattern;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const DEFAULT_IGNORES: &[&str] = &[".git"];
const DEFAULT_EXTENSIONS: &[&str] = &[".py"];

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// A file that was skipped without aborting extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionWarning {
    /// Content is not valid UTF-8
    InvalidUtf8 { path: String },
    /// The file could not be read
    Unreadable { path: String, message: String },
    /// A directory entry could not be visited
    WalkFailed { path: Option<String>, message: String },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::InvalidUtf8 { path } => {
                write!(f, "Unable to decode {} as UTF-8. Skipping.", path)
            }
            ExtractionWarning::Unreadable { path, message } => {
                write!(f, "Error reading file {}: {}", path, message)
            }
            ExtractionWarning::WalkFailed { path, message } => match path {
                Some(p) => write!(f, "Error visiting {}: {}", p, message),
                None => write!(f, "Error walking repository: {}", message),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// fnmatch-style patterns matched against root-relative paths
    ///
    /// `*` also matches `/`, `**` means the same as `*`, and a `[` with no
    /// closing `]` matches itself. Every string is a usable pattern.
    pub ignore_patterns: Vec<String>,
    /// Accepted file name suffixes
    pub source_extensions: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect(),
            source_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// File index and concatenated code of one working tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedCode {
    /// Included files, in walk order
    pub index: Vec<String>,
    /// Headers and contents of the included files, in the same order
    pub blob: String,
    /// Files skipped because of read or decode errors
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractedCode {
    pub fn file_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Delimiter line written before each file's content
pub fn file_header(relative_path: &str) -> String {
    format!("---- File: {} ----\n", relative_path)
}

pub struct CodeExtractor {
    patterns: Vec<Pattern>,
    extensions: Vec<String>,
}

impl CodeExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            patterns: config.ignore_patterns.iter().map(|p| compile_ignore_pattern(p)).collect(),
            extensions: config.source_extensions,
        }
    }

    /// True if a root-relative path matches any ignore pattern
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(relative_path))
    }

    pub fn is_source_file(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
    }

    /// Walks `root` and collects every included file
    ///
    /// Ignored directories are pruned with everything below them. Per-file
    /// failures are logged, recorded in [`ExtractedCode::warnings`] and skipped.
    /// Symbolic links are not followed.
    pub fn extract(&self, root: &Path) -> Result<ExtractedCode, ExtractError> {
        if !root.exists() {
            return Err(ExtractError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ExtractError::NotADirectory(root.to_path_buf()));
        }

        let mut extracted = ExtractedCode::default();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_ignored(&relative_path(root, e.path())));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let warning = ExtractionWarning::WalkFailed {
                        path: e.path().map(|p| relative_path(root, p)),
                        message: e.to_string(),
                    };
                    warn!("{}", warning);
                    extracted.warnings.push(warning);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if !self.is_source_file(&file_name) {
                continue;
            }

            let rel = relative_path(root, entry.path());
            let bytes = match fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    let warning = ExtractionWarning::Unreadable {
                        path: rel,
                        message: e.to_string(),
                    };
                    warn!("{}", warning);
                    extracted.warnings.push(warning);
                    continue;
                }
            };

            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => {
                    let warning = ExtractionWarning::InvalidUtf8 { path: rel };
                    warn!("{}", warning);
                    extracted.warnings.push(warning);
                    continue;
                }
            };

            if content.trim().is_empty() {
                debug!(path = %rel, "Skipping empty file");
                continue;
            }

            extracted.blob.push_str(&file_header(&rel));
            extracted.blob.push_str(&content);
            extracted.index.push(rel);
        }

        info!(
            files = extracted.index.len(),
            bytes = extracted.blob.len(),
            skipped = extracted.warnings.len(),
            "Extraction complete"
        );

        Ok(extracted)
    }
}

impl fmt::Debug for CodeExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeExtractor")
            .field(
                "patterns",
                &self.patterns.iter().map(Pattern::as_str).collect::<Vec<_>>(),
            )
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Compiles an fnmatch-style ignore pattern
pub fn compile_ignore_pattern(pattern: &str) -> Pattern {
    Pattern::new(&fnmatch_to_glob(pattern))
        .or_else(|_| Pattern::new(&Pattern::escape(pattern)))
        .unwrap_or_default()
}

/// Rewrites fnmatch syntax into what `glob::Pattern` accepts
///
/// Runs of `*` collapse into one and an unterminated `[` is escaped.
fn fnmatch_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
            }
            '[' => {
                let mut j = i + 1;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str("[[]");
                } else {
                    out.extend(&chars[i..=j]);
                    i = j;
                }
            }
            c => out.push(c),
        }
        i += 1;
    }

    out
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

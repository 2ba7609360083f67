//! Repository fetching
//!
//! A fetch produces a [`ClonedRepository`], which owns the temporary directory
//! holding the working tree. The directory is deleted when the handle is dropped,
//! whichever way the caller leaves its scope.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

const TEMP_DIR_PREFIX: &str = "repoinsight-";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Repository URL must not be empty")]
    EmptyUrl,

    #[error("Failed to create temporary directory: {0}")]
    TempDir(#[source] io::Error),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Cloning {url} failed ({status}): {stderr}")]
    CloneFailed {
        url: String,
        status: String,
        stderr: String,
    },
}

/// A working tree materialized in a scoped temporary directory
#[derive(Debug)]
pub struct ClonedRepository {
    url: String,
    workdir: TempDir,
}

impl ClonedRepository {
    /// Wraps an already-populated temporary directory
    pub fn new(url: impl Into<String>, workdir: TempDir) -> Self {
        Self {
            url: url.into(),
            workdir,
        }
    }

    pub fn path(&self) -> &Path {
        self.workdir.path()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deletes the working tree now, reporting any failure
    ///
    /// Dropping the handle also deletes it, but silently.
    pub fn close(self) -> io::Result<()> {
        let path = self.workdir.path().to_path_buf();
        self.workdir.close()?;
        debug!(path = %path.display(), "Removed working tree");
        Ok(())
    }
}

#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    /// Materializes the repository at `url` in a fresh temporary directory
    async fn fetch(&self, url: &str) -> Result<ClonedRepository, FetchError>;
}

/// Fetcher backed by the `git` command-line tool
///
/// Any URL form git understands (HTTPS, SSH, local paths) is accepted. Terminal
/// credential prompts are disabled so an unauthenticated clone fails instead of
/// blocking.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    program: String,
    depth: Option<u32>,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl GitFetcher {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
            depth: None,
        }
    }

    /// Limits the clone to the last `depth` commits
    pub fn with_depth(mut self, depth: Option<u32>) -> Self {
        self.depth = depth;
        self
    }

    /// Uses a different git executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn clone_args(&self, url: &str, dest: &Path) -> Vec<String> {
        let mut args = vec!["clone".to_string(), "--quiet".to_string()];
        if let Some(depth) = self.depth {
            args.push("--depth".to_string());
            args.push(depth.to_string());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args.push(dest.to_string_lossy().into_owned());
        args
    }
}

#[async_trait]
impl RepositoryFetcher for GitFetcher {
    async fn fetch(&self, url: &str) -> Result<ClonedRepository, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::EmptyUrl);
        }

        let workdir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir()
            .map_err(FetchError::TempDir)?;

        debug!(
            url,
            path = %workdir.path().display(),
            depth = ?self.depth,
            "Running git clone"
        );

        let output = Command::new(&self.program)
            .args(self.clone_args(url, workdir.path()))
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(url, status = %output.status, "git clone failed");
            return Err(FetchError::CloneFailed {
                url: url.to_string(),
                status: output.status.to_string(),
                stderr,
            });
        }

        info!(url, path = %workdir.path().display(), "Repository cloned");
        Ok(ClonedRepository::new(url, workdir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run_git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    #[test]
    fn test_clone_args_full_history() {
        let fetcher = GitFetcher::new();
        let args = fetcher.clone_args("https://example.com/repo.git", Path::new("/tmp/x"));
        assert_eq!(
            args,
            vec!["clone", "--quiet", "--", "https://example.com/repo.git", "/tmp/x"]
        );
    }

    #[test]
    fn test_clone_args_shallow() {
        let fetcher = GitFetcher::new().with_depth(Some(1));
        let args = fetcher.clone_args("git@host:repo.git", Path::new("/tmp/x"));
        assert_eq!(
            args,
            vec!["clone", "--quiet", "--depth", "1", "--", "git@host:repo.git", "/tmp/x"]
        );
    }

    #[tokio::test]
    async fn test_empty_url_rejected() {
        let result = GitFetcher::new().fetch("   ").await;
        assert!(matches!(result, Err(FetchError::EmptyUrl)));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let fetcher = GitFetcher::new().with_program("definitely-not-a-git-binary");
        let result = fetcher.fetch("https://example.com/repo.git").await;
        assert!(matches!(result, Err(FetchError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_invalid_repository_fails() {
        if !git_available() {
            return;
        }
        let missing = tempfile::tempdir().unwrap();
        let url = missing.path().join("no-such-repo");

        let result = GitFetcher::new().fetch(url.to_str().unwrap()).await;
        match result {
            Err(FetchError::CloneFailed { stderr, .. }) => assert!(!stderr.is_empty()),
            other => panic!("Expected CloneFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clone_local_repository_and_cleanup() {
        if !git_available() {
            return;
        }

        let origin = tempfile::tempdir().unwrap();
        run_git(origin.path(), &["init", "--quiet"]);
        fs::write(origin.path().join("app.py"), "print('hello')\n").unwrap();
        run_git(origin.path(), &["add", "app.py"]);
        run_git(origin.path(), &["commit", "--quiet", "-m", "initial"]);

        let cloned = GitFetcher::new()
            .fetch(origin.path().to_str().unwrap())
            .await
            .unwrap();

        let clone_path: PathBuf = cloned.path().to_path_buf();
        assert!(clone_path.join("app.py").is_file());
        assert!(clone_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(TEMP_DIR_PREFIX));

        drop(cloned);
        assert!(!clone_path.exists());
    }

    #[test]
    fn test_close_removes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        let repo = ClonedRepository::new("local", dir);
        assert_eq!(repo.url(), "local");

        repo.close().unwrap();
        assert!(!path.exists());
    }
}

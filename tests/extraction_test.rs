//! Extraction behavior on realistic repository layouts

use repoinsight::repository::{file_header, CodeExtractor, ExtractionWarning, ExtractorConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A small Python project with the usual clutter around it
fn python_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, ".git/config", b"[core]\n");
    write(root, ".git/hooks/update.py", b"print('hook')\n");
    write(root, "setup.py", b"from setuptools import setup\nsetup()\n");
    write(root, "src/app/__init__.py", b"\n");
    write(root, "src/app/cli.py", b"def main():\n    pass\n");
    write(root, "src/app/vendor/six.py", b"PY2 = False\n");
    write(root, "tests/test_cli.py", b"def test_main():\n    assert True\n");
    write(root, "docs/conf.py", b"project = 'app'\n");
    write(root, "README.rst", b"App\n===\n");

    dir
}

fn extractor(ignores: &[&str]) -> CodeExtractor {
    CodeExtractor::new(ExtractorConfig {
        ignore_patterns: ignores.iter().map(|s| s.to_string()).collect(),
        source_extensions: vec![".py".to_string()],
    })
}

#[test]
fn test_default_config_skips_git_metadata() {
    let repo = python_project();
    let code = CodeExtractor::new(ExtractorConfig::default())
        .extract(repo.path())
        .unwrap();

    assert_eq!(
        code.index,
        vec![
            "docs/conf.py",
            "setup.py",
            "src/app/cli.py",
            "src/app/vendor/six.py",
            "tests/test_cli.py",
        ]
    );
    assert!(!code.blob.contains("hook"));
    assert!(!code.blob.contains("App\n==="));
}

#[test]
fn test_ignore_patterns_prune_directories_and_files() {
    let repo = python_project();
    let code = extractor(&[".git", "tests", "src/*/vendor", "docs/*.py"])
        .extract(repo.path())
        .unwrap();

    assert_eq!(code.index, vec!["setup.py", "src/app/cli.py"]);
    for excluded in ["test_main", "PY2", "project = 'app'"] {
        assert!(!code.blob.contains(excluded), "{} leaked into blob", excluded);
    }
}

#[test]
fn test_blob_is_exact_concatenation() {
    let repo = python_project();
    let code = extractor(&[".git", "tests", "docs", "src"])
        .extract(repo.path())
        .unwrap();

    let expected = format!(
        "{}{}",
        file_header("setup.py"),
        "from setuptools import setup\nsetup()\n"
    );
    assert_eq!(code.blob, expected);
}

#[test]
fn test_one_undecodable_file_among_three() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.py", b"one = 1\n");
    write(dir.path(), "two.py", b"two = '\xe9t\xe9'\n");
    write(dir.path(), "three.py", b"three = 3\n");

    let code = extractor(&[]).extract(dir.path()).unwrap();

    assert_eq!(code.file_count(), 2);
    assert_eq!(code.index, vec!["one.py", "three.py"]);
    assert!(matches!(
        code.warnings.as_slice(),
        [ExtractionWarning::InvalidUtf8 { path }] if path == "two.py"
    ));
}

#[test]
fn test_each_index_entry_has_exactly_one_header() {
    let repo = python_project();
    let code = extractor(&[]).extract(repo.path()).unwrap();

    assert!(!code.is_empty());
    for path in &code.index {
        assert_eq!(code.blob.matches(&file_header(path)).count(), 1, "{}", path);
    }
    assert_eq!(code.blob.matches("---- File: ").count(), code.index.len());
}

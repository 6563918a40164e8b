//! Record discovery and parsing.

use serde_yaml::Value;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extensions recognized as contributor records.
pub const RECORD_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Why a record file could not be turned into a generic value.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    Read(#[source] io::Error),
    #[error("Failed to parse YAML: {0}")]
    Parse(#[source] serde_yaml::Error),
}

/// Whether `path` carries a recognized record extension (case-insensitive).
pub fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            RECORD_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List record files directly inside `dir`, sorted by file name.
pub async fn discover(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_record_file(&path) {
            continue;
        }
        if entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read `path` and parse it as YAML.
pub async fn parse_record(path: &Path) -> Result<Value, LoadError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(LoadError::Read)?;
    parse_text(&text)
}

/// Parse record text into a generic value.
pub fn parse_text(text: &str) -> Result<Value, LoadError> {
    serde_yaml::from_str(text).map_err(LoadError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn recognizes_both_extensions_in_any_case() {
        assert!(is_record_file(Path::new("a.yaml")));
        assert!(is_record_file(Path::new("b.YML")));
        assert!(!is_record_file(Path::new("c.json")));
        assert!(!is_record_file(Path::new("yaml")));
    }

    #[tokio::test]
    async fn discover_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.yml", "a.yaml", "notes.md", "c.yaml"] {
            fs::write(dir.path().join(name), "name: x\n").expect("write");
        }
        fs::create_dir(dir.path().join("nested.yaml")).expect("mkdir");

        let files = discover(dir.path()).await.expect("discover");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yml", "c.yaml"]);
    }

    #[tokio::test]
    async fn discover_reports_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = discover(&dir.path().join("absent")).await.expect_err("missing");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn parse_failures_are_prefixed() {
        let err = parse_text("name: [unclosed\n").expect_err("broken yaml");
        assert!(matches!(err, LoadError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse YAML: "));
    }
}

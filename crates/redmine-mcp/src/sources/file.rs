//! Filesystem source.

use std::io::ErrorKind;
use std::path::Path;

use redmine_core::{Error, Result};

/// File content plus the name it will be uploaded under.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Read `path` fully. The upload filename is `filename` when given,
/// otherwise the last path segment.
pub async fn read_local_file(path: &Path, filename: Option<&str>) -> Result<LocalFile> {
    let filename = match filename.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Cannot derive a filename from '{}'; pass `filename`",
                    path.display()
                ))
            })?,
    };

    let content = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "read local file");
    Ok(LocalFile { filename, content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_reads_file_with_basename() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"col\n1\n").unwrap();

        let local = read_local_file(file.path(), None).await.unwrap();
        assert_eq!(local.content, b"col\n1\n");
        assert_eq!(
            local.filename,
            file.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[tokio::test]
    async fn test_filename_override() {
        let file = NamedTempFile::new().unwrap();
        let local = read_local_file(file.path(), Some("report.csv")).await.unwrap();
        assert_eq!(local.filename, "report.csv");
        assert!(local.content.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");

        let err = read_local_file(&path, None).await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound(ref p) if p == &path));
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("missing.png"));
    }
}

use std::path::Path;
use tokio::fs;
use crate::utils::{CompressorError, CompressorResult};

/// Read a whole file
pub async fn read_file(path: impl AsRef<Path>) -> CompressorResult<Vec<u8>> {
    fs::read(path.as_ref())
        .await
        .map_err(|e| CompressorError::io(format!("Failed to read {}: {}", path.as_ref().display(), e)))
}

/// Write a whole file, creating the parent directory if needed
pub async fn write_file(path: impl AsRef<Path>, bytes: &[u8]) -> CompressorResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path).await?;
    fs::write(path, bytes)
        .await
        .map_err(|e| CompressorError::io(format!("Failed to write {}: {}", path.display(), e)))
}

pub async fn ensure_parent_dir(path: &Path) -> CompressorResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Final path component, or the input when it has none
pub fn extract_filename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn filename_is_last_component() {
        assert_eq!(extract_filename("/a/b/photo.jpg"), "photo.jpg");
        assert_eq!(extract_filename("photo.jpg"), "photo.jpg");
    }

    #[tokio::test]
    async fn write_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("nested").join("out.png");
        write_file(&target, b"abc").await.unwrap();
        assert_eq!(read_file(&target).await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn read_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = read_file(tmp.path().join("missing.jpg")).await.unwrap_err();
        assert!(matches!(err, CompressorError::Io(_)));
    }
}

use std::path::{Path, PathBuf};

use crate::client::BackendClient;
use crate::error::DownloadError;

/// Fetch `filename` from the backend and save it into `dir`.
///
/// Nothing is written unless the full body arrived.
pub async fn fetch_and_save(
    client: &BackendClient,
    filename: &str,
    dir: &Path,
) -> Result<PathBuf, DownloadError> {
    check_name(filename)?;
    let bytes = client.download(filename).await?;
    save(dir, filename, &bytes).await
}

/// Write `bytes` to `dir/filename` via a temporary file and a rename, so
/// a half-written file never shows up under the real name.
pub async fn save(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
    check_name(filename)?;
    tokio::fs::create_dir_all(dir).await?;

    let target = dir.join(filename);
    let partial = dir.join(format!(".{}.part", filename));
    tokio::fs::write(&partial, bytes).await?;
    if let Err(e) = tokio::fs::rename(&partial, &target).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    Ok(target)
}

fn check_name(filename: &str) -> Result<(), DownloadError> {
    let unsafe_name = filename.is_empty()
        || filename == "."
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\');
    if unsafe_name {
        return Err(DownloadError::InvalidName(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_writes_under_given_name() {
        let dir = tempfile::tempdir().unwrap();

        let path = save(dir.path(), "SOP-001.docx", b"PK\x03\x04").await.unwrap();

        assert_eq!(path, dir.path().join("SOP-001.docx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04");
        assert!(!dir.path().join(".SOP-001.docx.part").exists());
    }

    #[tokio::test]
    async fn save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("downloads").join("sops");

        let path = save(&nested, "a.txt", b"hello").await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn save_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();

        for name in ["../evil.docx", "nested/file.docx", "a\\b.docx", ""] {
            let err = save(dir.path(), name, b"x").await.unwrap_err();
            assert!(matches!(err, DownloadError::InvalidName(_)), "{name}");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

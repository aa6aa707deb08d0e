//! File upload helper: validate, then move into the upload directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file is {size} bytes, limit is {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("invalid file name '{0}'")]
    InvalidName(String),

    #[error("failed to move upload to {}: {source}", .destination.display())]
    Io {
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A file received by the HTTP layer and parked in a temporary location.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    /// Client-supplied file name.
    pub name: String,
    pub content_type: String,
    pub tmp_path: PathBuf,
    pub size: u64,
}

/// Metadata recorded for the last stored file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub content_type: String,
    pub tmp_path: PathBuf,
    pub size: u64,
    pub directory: PathBuf,
    pub uploader_ip: String,
    /// Seconds since the Unix epoch.
    pub uploaded_at: u64,
}

/// Upload settings plus the record of the last successful upload.
#[derive(Debug)]
pub struct Upload {
    /// Limit in bytes.
    max_size: Option<u64>,
    directory: PathBuf,
    last_file: Mutex<Option<StoredFile>>,
}

impl Upload {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            max_size: None,
            directory: directory.into(),
            last_file: Mutex::new(None),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        let upload = Self::new(&config.directory);
        match config.max_size_kb {
            Some(kb) => upload.with_max_size_kb(kb),
            None => upload,
        }
    }

    /// Set the maximum size in kB.
    pub fn with_max_size_kb(mut self, kb: f64) -> Self {
        self.max_size = Some((kb.max(0.0) * 1024.0) as u64);
        self
    }

    /// Store into `directory` instead.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.set_directory(directory);
        self
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = directory.into();
    }

    /// Maximum size in bytes.
    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether `filename` has one of the comma-separated `formats` as extension.
    pub fn matches_format(filename: &str, formats: &str) -> bool {
        let formats: Vec<&str> = formats.split(',').collect();
        Self::matches_any(filename, &formats)
    }

    pub fn matches_any(filename: &str, formats: &[&str]) -> bool {
        let Some(ext) = Path::new(filename).extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        formats.iter().any(|f| f.trim().to_lowercase() == ext)
    }

    /// Validate `file` and move it into the upload directory.
    pub fn store(&self, file: &UploadedFile, uploader_ip: &str) -> Result<StoredFile, UploadError> {
        if let Some(max) = self.max_size {
            if file.size > max {
                tracing::warn!(name = %file.name, size = file.size, max, "Upload rejected: too large");
                return Err(UploadError::TooLarge { size: file.size, max });
            }
        }

        // Only the final component of the client name is used.
        let name = Path::new(&file.name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| *n == file.name && !n.starts_with('.'))
            .ok_or_else(|| UploadError::InvalidName(file.name.clone()))?;

        let destination = self.directory.join(name);
        move_file(&file.tmp_path, &self.directory, &destination).map_err(|source| UploadError::Io {
            destination: destination.clone(),
            source,
        })?;

        let stored = StoredFile {
            name: name.to_string(),
            content_type: file.content_type.clone(),
            tmp_path: file.tmp_path.clone(),
            size: file.size,
            directory: self.directory.clone(),
            uploader_ip: uploader_ip.to_string(),
            uploaded_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        tracing::info!(name = %stored.name, size = stored.size, ip = %stored.uploader_ip, "File uploaded");
        *self.last_file.lock().unwrap_or_else(PoisonError::into_inner) = Some(stored.clone());
        Ok(stored)
    }

    /// Info about the last stored file.
    pub fn last_file(&self) -> Option<StoredFile> {
        self.last_file.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn move_file(from: &Path, dir: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    fs::copy(from, to)?;
    fs::remove_file(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parked(dir: &Path, name: &str, content: &[u8]) -> UploadedFile {
        let tmp_path = dir.join(format!("upload{}.tmp", content.len()));
        fs::write(&tmp_path, content).unwrap();
        UploadedFile {
            name: name.to_string(),
            content_type: "image/png".to_string(),
            tmp_path,
            size: content.len() as u64,
        }
    }

    #[test]
    fn test_matches_format() {
        assert!(Upload::matches_format("photo.PNG", "jpg, png"));
        assert!(Upload::matches_any("doc.pdf", &["PDF"]));
        assert!(!Upload::matches_format("archive.tar.gz", "tar"));
        assert!(!Upload::matches_format("README", "md"));
    }

    #[test]
    fn test_store_moves_file_and_records_it() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("uploads");
        let upload = Upload::new(&target).with_max_size_kb(1.0);
        let file = parked(tmp.path(), "logo.png", b"png-bytes");

        let stored = upload.store(&file, "127.0.0.1").unwrap();

        assert!(target.join("logo.png").exists());
        assert!(!file.tmp_path.exists());
        assert_eq!(stored.uploader_ip, "127.0.0.1");
        assert_eq!(upload.last_file(), Some(stored));
    }

    #[test]
    fn test_directory_can_be_changed() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");

        let mut upload = Upload::new("unused").with_directory(&first);
        assert_eq!(upload.directory(), first.as_path());
        upload.store(&parked(tmp.path(), "a.png", b"a"), "::1").unwrap();

        upload.set_directory(&second);
        let stored = upload.store(&parked(tmp.path(), "b.png", b"bb"), "::1").unwrap();

        assert!(first.join("a.png").exists());
        assert!(second.join("b.png").exists());
        assert!(!first.join("b.png").exists());
        assert_eq!(stored.directory, second);
    }

    #[test]
    fn test_store_rejects_oversized() {
        let tmp = tempfile::tempdir().unwrap();
        let upload = Upload::new(tmp.path().join("uploads")).with_max_size_kb(0.001);
        assert_eq!(upload.max_size(), Some(1));

        let file = parked(tmp.path(), "big.png", b"too big");
        assert!(matches!(upload.store(&file, "::1"), Err(UploadError::TooLarge { size: 7, max: 1 })));
        assert!(upload.last_file().is_none());
        assert!(file.tmp_path.exists());
    }

    #[test]
    fn test_store_rejects_path_names() {
        let tmp = tempfile::tempdir().unwrap();
        let upload = Upload::new(tmp.path().join("uploads"));
        for name in ["../evil.png", "a/b.png", ".htaccess", ""] {
            let file = parked(tmp.path(), name, b"x");
            assert!(matches!(upload.store(&file, "::1"), Err(UploadError::InvalidName(_))), "{name:?}");
        }
    }
}

//! Allow-list persistence.
//!
//! The file format is one IP literal per line. Blank lines are ignored and
//! duplicates collapse on read, so a hand-edited file is still a set.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("allow-list I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Backing storage for the allowed IP set.
pub trait AllowListStore: Send + Sync {
    /// Read the whole set.
    fn load(&self) -> Result<Vec<String>, StoreError>;

    /// Replace the whole set.
    fn save(&self, ips: &[String]) -> Result<(), StoreError>;
}

/// Parse the line-oriented format.
pub fn parse_lines(content: &str) -> Vec<String> {
    let mut ips: Vec<String> = Vec::new();
    for line in content.lines() {
        let ip = line.trim();
        if !ip.is_empty() && !ips.iter().any(|known| known == ip) {
            ips.push(ip.to_string());
        }
    }
    ips
}

/// Allow-list stored in a text file.
#[derive(Debug, Clone)]
pub struct FileAllowList {
    path: PathBuf,
}

impl FileAllowList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl AllowListStore for FileAllowList {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(parse_lines(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    // Written to a sibling temp file and renamed over the target so readers
    // never observe a half-written list.
    fn save(&self, ips: &[String]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            for ip in ips {
                writeln!(file, "{ip}")?;
            }
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&temp);
            self.io_error(e)
        })?;

        tracing::debug!(path = %self.path.display(), entries = ips.len(), "Allow-list saved");
        Ok(())
    }
}

/// Allow-list kept in memory.
#[derive(Debug, Default)]
pub struct MemoryAllowList {
    ips: Mutex<Vec<String>>,
}

impl MemoryAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ips<I, S>(ips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined: Vec<String> = ips.into_iter().map(Into::into).collect();
        Self {
            ips: Mutex::new(parse_lines(&joined.join("\n"))),
        }
    }
}

impl AllowListStore for MemoryAllowList {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.ips.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, ips: &[String]) -> Result<(), StoreError> {
        *self.ips.lock().unwrap_or_else(PoisonError::into_inner) = ips.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let ips = parse_lines("10.0.0.1\n\n  192.168.1.2 \n10.0.0.1\n::1\n");
        assert_eq!(ips, vec!["10.0.0.1", "192.168.1.2", "::1"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAllowList::new(dir.path().join("nope.txt"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system/maintenance_whitelist.txt");
        let store = FileAllowList::new(&path);

        store.save(&["192.168.1.2".to_string(), "10.0.0.7".to_string()]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "192.168.1.2\n10.0.0.7\n");
        assert_eq!(store.load().unwrap(), vec!["192.168.1.2", "10.0.0.7"]);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryAllowList::with_ips(["1.1.1.1", "1.1.1.1", "2.2.2.2"]);
        assert_eq!(store.load().unwrap(), vec!["1.1.1.1", "2.2.2.2"]);
        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}

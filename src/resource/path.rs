//! Path sanitization.
//!
//! # Responsibilities
//! - Normalize a raw path fragment (separators, redundant slashes)
//! - Reject parent-directory segments
//! - Reduce every segment to the allowed alphabet
//!
//! # Design Decisions
//! - `ResourcePath` can only be obtained from `sanitize` (or as a prefix of
//!   another `ResourcePath`), so any function taking one can rely on it
//! - `..` is rejected, never rewritten
//! - Output contains only `[A-Za-z0-9_-]` and single `/`, so sanitizing
//!   twice is a no-op

use std::fmt;

use thiserror::Error;

/// Errors produced by [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty after normalization")]
    Empty,

    #[error("path '{0}' contains a parent-directory segment")]
    Traversal(String),
}

/// A sanitized, slash-separated resource path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath(String);

impl ResourcePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Last segment of the path.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Split at the last `/` into (parent, last segment).
    ///
    /// Returns `None` for single-segment paths.
    pub fn split_last(&self) -> Option<(ResourcePath, &str)> {
        let idx = self.0.rfind('/')?;
        Some((ResourcePath(self.0[..idx].to_string()), &self.0[idx + 1..]))
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Normalize and validate a raw path fragment.
pub fn sanitize(raw: &str) -> Result<ResourcePath, PathError> {
    let mut segments: Vec<String> = Vec::new();

    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(PathError::Traversal(raw.to_string())),
            _ => {}
        }

        let cleaned: String = segment.chars().filter(|c| is_allowed(*c)).collect();
        if !cleaned.is_empty() {
            segments.push(cleaned);
        }
    }

    if segments.is_empty() {
        return Err(PathError::Empty);
    }

    Ok(ResourcePath(segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "blog",
        "/blog/show/",
        "blog//show",
        "admin\\users",
        "./blog/./show",
        "blog/sh<o>w",
        "a b/c%20d",
        "pöst/ünïcode",
        "nul\0byte",
        "..hidden/x..y",
        "_404",
        "--/__",
        "a/./b/.//c/",
    ];

    #[test]
    fn test_normalizes_slashes() {
        assert_eq!(sanitize("/blog/show/").unwrap().as_str(), "blog/show");
        assert_eq!(sanitize("blog//show").unwrap().as_str(), "blog/show");
        assert_eq!(sanitize("admin\\users").unwrap().as_str(), "admin/users");
        assert_eq!(sanitize("./blog/./show").unwrap().as_str(), "blog/show");
    }

    #[test]
    fn test_strips_disallowed_characters() {
        assert_eq!(sanitize("blog/sh<o>w").unwrap().as_str(), "blog/show");
        assert_eq!(sanitize("nul\0byte").unwrap().as_str(), "nulbyte");
        assert_eq!(sanitize("..hidden/x..y").unwrap().as_str(), "hidden/xy");
        assert_eq!(sanitize("my-page_2").unwrap().as_str(), "my-page_2");
    }

    #[test]
    fn test_rejects_traversal() {
        for raw in ["../etc/passwd", "blog/../../secret", "..", "a\\..\\b", "/x/../"] {
            assert!(
                matches!(sanitize(raw), Err(PathError::Traversal(_))),
                "expected traversal error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_rejects_empty() {
        for raw in ["", "/", "//", ".", "./.", "<>", "%%/!!"] {
            assert_eq!(sanitize(raw), Err(PathError::Empty), "input {raw:?}");
        }
    }

    #[test]
    fn test_idempotent() {
        for raw in SAMPLES {
            let once = sanitize(raw).unwrap();
            let twice = sanitize(once.as_str()).unwrap();
            assert_eq!(once, twice, "input {raw:?}");
        }
    }

    #[test]
    fn test_output_stays_inside_base() {
        for raw in SAMPLES {
            let path = sanitize(raw).unwrap();
            assert!(!path.as_str().starts_with('/'));
            assert!(path.segments().all(|s| !s.is_empty() && s.chars().all(is_allowed)));
        }
    }

    #[test]
    fn test_split_last() {
        let path = sanitize("admin/blog/show").unwrap();
        let (parent, last) = path.split_last().unwrap();
        assert_eq!(parent.as_str(), "admin/blog");
        assert_eq!(last, "show");
        assert_eq!(path.name(), "show");

        assert!(sanitize("blog").unwrap().split_last().is_none());
        assert_eq!(sanitize("blog").unwrap().name(), "blog");
    }
}

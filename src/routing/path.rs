//! Path values.
//!
//! A path is an ordered sequence of whole segments. Equality is positional
//! and exact; the only normalization is splitting on `/` and dropping empty
//! segments.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// An ordered sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    /// The empty path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Split a `/`-separated string, dropping empty segments.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Resolve `href` against `base` and return its path.
    ///
    /// Returns `None` when the link leaves the origin of `base` or cannot be
    /// parsed. Segments are percent-decoded.
    pub fn from_href(base: &Url, href: &str) -> Option<Self> {
        let target = base.join(href).ok()?;
        if target.origin() != base.origin() {
            return None;
        }
        let segments = target
            .path_segments()?
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        Some(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `prefix` matches the leading segments of this path.
    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.0.starts_with(prefix)
    }

    /// Remove `prefix` from the front, if present.
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        self.0
            .strip_prefix(prefix.segments())
            .map(|rest| Path(rest.to_vec()))
    }

    /// Everything from segment `n` onward. Saturates at the end.
    pub fn skip(&self, n: usize) -> Path {
        Path(self.0.get(n..).map(<[String]>::to_vec).unwrap_or_default())
    }

    /// The first `n` segments. Saturates at the end.
    pub fn take(&self, n: usize) -> Path {
        Path(self.0.iter().take(n).cloned().collect())
    }

    /// Concatenate two paths.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Path(segments)
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for Path {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl FromIterator<String> for Path {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_empty_segments() {
        assert_eq!(Path::parse("/a//b/"), Path::from(["a", "b"]));
        assert!(Path::parse("/").is_empty());
        assert!(Path::parse("").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Path::from(["a", "b"]).to_string(), "/a/b");
        assert_eq!(Path::root().to_string(), "/");
    }

    #[test]
    fn test_prefix_ops() {
        let path = Path::from(["app", "users", "42"]);
        assert!(path.starts_with(&["app".to_string()]));
        assert_eq!(
            path.strip_prefix(&Path::from(["app"])),
            Some(Path::from(["users", "42"]))
        );
        assert_eq!(path.strip_prefix(&Path::from(["other"])), None);
        assert_eq!(path.skip(1), Path::from(["users", "42"]));
        assert_eq!(path.skip(10), Path::root());
        assert_eq!(path.take(2), Path::from(["app", "users"]));
    }

    #[test]
    fn test_from_href_same_origin() {
        let base = Url::parse("http://example.com/app/home").unwrap();
        assert_eq!(
            Path::from_href(&base, "/app/users/john%20doe"),
            Some(Path::from(["app", "users", "john doe"]))
        );
        assert_eq!(
            Path::from_href(&base, "settings"),
            Some(Path::from(["app", "settings"]))
        );
        assert_eq!(Path::from_href(&base, "http://other.com/app"), None);
    }

    #[test]
    fn test_from_href_decodes_multibyte_and_keeps_malformed_escapes() {
        let base = Url::parse("http://example.com/").unwrap();
        assert_eq!(
            Path::from_href(&base, "/caf%C3%A9/100%zz"),
            Some(Path::from(["café", "100%zz"]))
        );
    }
}

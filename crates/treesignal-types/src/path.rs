use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hierarchical channel identifier: an ordered sequence of non-empty
/// segments.
///
/// The wire form joins segments with `.` (`prod.api.auth`); responses carry
/// the segment array instead of the dotted string. The empty sequence
/// denotes the synthetic root, which is never rendered and cannot be
/// produced by [`ChannelPath::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelPath(Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelPathError {
    Empty,
}

impl fmt::Display for ChannelPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "channel path must not be empty"),
        }
    }
}

impl Error for ChannelPathError {}

impl ChannelPath {
    /// The synthetic root path (zero segments).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parses a dotted channel string. Empty segments (leading, trailing,
    /// or consecutive dots) are skipped; a path with no remaining segments
    /// is an error.
    pub fn parse(raw: &str) -> Result<Self, ChannelPathError> {
        let segments: Vec<String> = raw
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Err(ChannelPathError::Empty);
        }
        Ok(Self(segments))
    }

    /// Builds a path from pre-split segments. Empty segments are dropped.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            segments
                .into_iter()
                .map(Into::into)
                .filter(|segment: &String| !segment.is_empty())
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<ChannelPath> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The first `len` segments as a new path.
    pub fn prefix(&self, len: usize) -> ChannelPath {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// True when `self` equals `other` or lies strictly beneath it.
    pub fn starts_with(&self, other: &ChannelPath) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }
}

impl fmt::Display for ChannelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for ChannelPath {
    type Err = ChannelPathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_dots() {
        let path = ChannelPath::parse("prod.api.auth").unwrap();
        assert_eq!(path.segments(), ["prod", "api", "auth"]);
        assert_eq!(path.depth(), 3);
        assert_eq!(path.to_string(), "prod.api.auth");
    }

    #[test]
    fn parse_skips_empty_segments() {
        let path = ChannelPath::parse(".alpha..beta.").unwrap();
        assert_eq!(path.segments(), ["alpha", "beta"]);
    }

    #[test]
    fn parse_rejects_paths_with_no_segments() {
        assert_eq!(ChannelPath::parse("."), Err(ChannelPathError::Empty));
        assert_eq!(ChannelPath::parse(""), Err(ChannelPathError::Empty));
        assert_eq!(ChannelPath::parse("..."), Err(ChannelPathError::Empty));
    }

    #[test]
    fn parent_walks_towards_root() {
        let path = ChannelPath::parse("a.b.c").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.segments(), ["a", "b"]);
        assert_eq!(ChannelPath::root().parent(), None);
    }

    #[test]
    fn starts_with_covers_self_and_descendants() {
        let base = ChannelPath::parse("a.b").unwrap();
        assert!(ChannelPath::parse("a.b").unwrap().starts_with(&base));
        assert!(ChannelPath::parse("a.b.c").unwrap().starts_with(&base));
        assert!(!ChannelPath::parse("a").unwrap().starts_with(&base));
        assert!(!ChannelPath::parse("a.c").unwrap().starts_with(&base));
    }

    #[test]
    fn serialises_as_segment_array() {
        let path = ChannelPath::parse("a.b").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
    }
}

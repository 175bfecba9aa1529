//! Route matching logic.
//!
//! # Responsibilities
//! - Match one template segment against one path segment
//! - Combine segment matchers with AND semantics over a path prefix
//! - Collect named parameters bound by parameter markers
//!
//! # Design Decisions
//! - Literal matching is exact and case-sensitive
//! - Matching is strictly per whole segment, never partial
//! - An empty template matches only an empty path (index route)
//! - Pattern segments are tested unanchored; anchor in the pattern if needed

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::routing::path::Path;

/// Named parameters extracted by a match.
pub type Params = BTreeMap<String, String>;

/// An invalid template segment.
#[derive(Debug, Error)]
#[error("invalid pattern segment `{segment}`: {source}")]
pub struct PatternError {
    pub segment: String,
    #[source]
    pub source: regex::Error,
}

/// Trait for matching a single path segment.
pub trait SegmentMatcher: Send + Sync + fmt::Debug {
    /// Returns true if `segment` matches. May bind parameters.
    fn matches(&self, segment: &str, params: &mut Params) -> bool;
}

/// One segment of a route template.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Always matches and binds the path segment under this name.
    Param(String),
    /// Must test true against the path segment.
    Pattern(Regex),
}

impl Segment {
    /// Parse the textual form: `:name`, `~regex`, or a literal.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if let Some(name) = raw.strip_prefix(':') {
            Ok(Segment::Param(name.to_string()))
        } else if let Some(pattern) = raw.strip_prefix('~') {
            Regex::new(pattern)
                .map(Segment::Pattern)
                .map_err(|source| PatternError {
                    segment: raw.to_string(),
                    source,
                })
        } else {
            Ok(Segment::Literal(raw.to_string()))
        }
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Param(a), Segment::Param(b)) => a == b,
            (Segment::Pattern(a), Segment::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => f.write_str(s),
            Segment::Param(name) => write!(f, ":{}", name),
            Segment::Pattern(re) => write!(f, "~{}", re.as_str()),
        }
    }
}

impl SegmentMatcher for Segment {
    fn matches(&self, segment: &str, params: &mut Params) -> bool {
        match self {
            Segment::Literal(expected) => expected == segment,
            Segment::Param(name) => {
                params.insert(name.clone(), segment.to_string());
                true
            }
            Segment::Pattern(re) => re.is_match(segment),
        }
    }
}

/// Parse a `/`-separated template such as `users/:id/~^\d+$`.
///
/// Empty segments are dropped, so `""` and `"/"` give the index template.
pub fn parse_template(raw: &str) -> Result<Vec<Segment>, PatternError> {
    raw.split('/')
        .filter(|s| !s.is_empty())
        .map(Segment::parse)
        .collect()
}

/// The result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// The leading segments consumed by the template.
    pub consumed: Path,
    pub params: Params,
}

/// Matches a path prefix segment by segment (AND semantics).
#[derive(Debug)]
pub struct PathMatcher {
    matchers: Vec<Box<dyn SegmentMatcher>>,
    template: String,
}

impl PathMatcher {
    pub fn new(segments: Vec<Segment>) -> Self {
        let template = segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");
        let matchers = segments
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn SegmentMatcher>)
            .collect();
        Self { matchers, template }
    }

    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        parse_template(raw).map(Self::new)
    }

    /// Number of segments the template consumes.
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Human-readable template, used in logs.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn match_path(&self, path: &Path) -> Option<PathMatch> {
        // An index template needs a more specific child when path remains.
        if self.matchers.is_empty() && !path.is_empty() {
            return None;
        }
        if path.len() < self.matchers.len() {
            return None;
        }

        let mut params = Params::new();
        let all = self
            .matchers
            .iter()
            .zip(path.segments())
            .all(|(m, segment)| m.matches(segment, &mut params));
        if !all {
            return None;
        }

        Some(PathMatch {
            consumed: path.take(self.matchers.len()),
            params,
        })
    }
}

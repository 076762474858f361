//! Dotted/bracketed key path parsing.
//!
//! `a.b[c]` and `a[b].c` both address the segments `["a", "b", "c"]`.
//! Brackets are stripped rather than interpreted, so `list[0]` yields the
//! string segment `"0"`; sources decide what a segment means. There is no
//! escaping: a literal `.` or `[` cannot appear inside a segment.

use std::fmt;
use std::str::FromStr;

/// Ordered sequence of key segments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a raw key string into its segments
    pub fn parse(key: &str) -> Self {
        let segments = key
            .replace(']', "")
            .split(|c| c == '[' || c == '.')
            .map(str::to_string)
            .collect();

        Self { segments }
    }

    /// Build a key path from already split segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Borrow the segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Iterate over the segments in order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.segments.iter()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the path has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for KeyPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        Self::parse(key)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

//! Version labels and inclusive version ranges.
//!
//! Scientific packages carry version labels like `1.24.0`, `3.4`, or
//! `1.0rc1` rather than strict semver. A label is an opaque sequence of
//! components separated by `.`, `-`, or `_`; components compare
//! numerically where both sides are numeric and lexicographically
//! otherwise, and a strict prefix orders before its extensions
//! (`1.24 < 1.24.0`).

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur when parsing version labels and ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("version label cannot be empty")]
    Empty,

    #[error("version label '{0}' contains an empty component")]
    EmptyComponent(String),

    #[error("version label '{0}' contains characters outside [A-Za-z0-9._-]")]
    InvalidCharacter(String),

    #[error("version range '{0}' contains more than one ':'")]
    MalformedRange(String),

    #[error("version range '{0}' is empty: lower bound exceeds upper bound")]
    EmptyRange(String),
}

/// One component of a version label.
///
/// Numeric components order before alphanumeric ones, which keeps
/// `1.0 < 1.0a` and gives the whole label a total order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Component {
    Number(u64),
    Text(String),
}

/// An opaque, comparable version label.
///
/// Equality and ordering compare the parsed components; the original
/// spelling is preserved for display, so `1.24.0` round-trips exactly.
#[derive(Debug, Clone)]
pub struct Version {
    label: String,
    parts: Vec<Component>,
}

impl Version {
    /// Parse a version label.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is empty, contains an empty
    /// component, or contains characters outside `[A-Za-z0-9._-]`.
    pub fn parse(label: &str) -> Result<Self, VersionError> {
        if label.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut parts = Vec::new();
        for piece in label.split(['.', '-', '_']) {
            if piece.is_empty() {
                return Err(VersionError::EmptyComponent(label.to_string()));
            }
            if !piece.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(VersionError::InvalidCharacter(label.to_string()));
            }

            // All-digit components compare numerically. Oversized digit
            // runs fall back to text, which still orders after any u64.
            if piece.chars().all(|c| c.is_ascii_digit()) {
                match piece.parse::<u64>() {
                    Ok(n) => parts.push(Component::Number(n)),
                    Err(_) => parts.push(Component::Text(piece.to_string())),
                }
            } else {
                parts.push(Component::Text(piece.to_string()));
            }
        }

        Ok(Self {
            label: label.to_string(),
            parts,
        })
    }

    /// Returns the label as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

/// An inclusive range of version labels.
///
/// Written `lo:hi`; either bound may be omitted (`1.24:`, `:2.0`), and a
/// bare `:` matches every version. A bare label with no `:` matches
/// exactly that version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionRange {
    /// Matches exactly one version.
    Exact(Version),

    /// Matches every version between the bounds, inclusive.
    Between {
        lo: Option<Version>,
        hi: Option<Version>,
    },
}

impl VersionRange {
    /// Parse a version range.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is not a valid version label, the
    /// range contains more than one `:`, or the lower bound exceeds the
    /// upper bound.
    pub fn parse(range: &str) -> Result<Self, VersionError> {
        let pieces: Vec<&str> = range.split(':').collect();
        match pieces.as_slice() {
            [single] => Ok(Self::Exact(Version::parse(single)?)),
            [lo, hi] => {
                let lo = if lo.is_empty() {
                    None
                } else {
                    Some(Version::parse(lo)?)
                };
                let hi = if hi.is_empty() {
                    None
                } else {
                    Some(Version::parse(hi)?)
                };
                if let (Some(lo), Some(hi)) = (&lo, &hi) {
                    if lo > hi {
                        return Err(VersionError::EmptyRange(range.to_string()));
                    }
                }
                Ok(Self::Between { lo, hi })
            }
            _ => Err(VersionError::MalformedRange(range.to_string())),
        }
    }

    /// Check whether a version falls inside the range.
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        match self {
            Self::Exact(v) => v == version,
            Self::Between { lo, hi } => {
                lo.as_ref().map_or(true, |lo| lo <= version)
                    && hi.as_ref().map_or(true, |hi| version <= hi)
            }
        }
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "{v}"),
            Self::Between { lo, hi } => {
                if let Some(lo) = lo {
                    write!(f, "{lo}")?;
                }
                write!(f, ":")?;
                if let Some(hi) = hi {
                    write!(f, "{hi}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::str::FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(label: &str) -> Version {
        Version::parse(label).unwrap()
    }

    #[test]
    fn parse_numeric_label() {
        let version = v("1.24.0");
        assert_eq!(version.as_str(), "1.24.0");
        assert_eq!(version.to_string(), "1.24.0");
    }

    #[test]
    fn parse_alphanumeric_label() {
        assert!(Version::parse("1.0rc1").is_ok());
        assert!(Version::parse("2017-01-24").is_ok());
        assert!(Version::parse("3.4_p1").is_ok());
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Version::parse(""), Err(VersionError::Empty));
    }

    #[test]
    fn parse_rejects_empty_component() {
        assert!(matches!(
            Version::parse("1..0"),
            Err(VersionError::EmptyComponent(_))
        ));
        assert!(matches!(
            Version::parse("1.0."),
            Err(VersionError::EmptyComponent(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_characters() {
        assert!(matches!(
            Version::parse("1.0+beta"),
            Err(VersionError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn numeric_components_compare_numerically() {
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.2") < v("1.10.0"));
    }

    #[test]
    fn text_components_compare_lexically() {
        assert!(v("1.0a") < v("1.0b"));
    }

    #[test]
    fn prefix_orders_before_extension() {
        assert!(v("1.24") < v("1.24.0"));
        assert!(v("3.4") < v("3.4.0"));
    }

    #[test]
    fn numbers_order_before_text() {
        assert!(v("1.0") < v("1.rc1"));
    }

    #[test]
    fn separators_do_not_affect_equality() {
        assert_eq!(v("1-24-0"), v("1.24.0"));
        assert_eq!(v("1-24-0").to_string(), "1-24-0");
    }

    #[test]
    fn range_exact_matches_only_itself() {
        let range = VersionRange::parse("1.24.0").unwrap();
        assert!(range.contains(&v("1.24.0")));
        assert!(!range.contains(&v("1.24.1")));
        assert!(!range.contains(&v("1.24")));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = VersionRange::parse("1.24.0:1.24.9").unwrap();
        assert!(range.contains(&v("1.24.0")));
        assert!(range.contains(&v("1.24.5")));
        assert!(range.contains(&v("1.24.9")));
        assert!(!range.contains(&v("1.23.9")));
        assert!(!range.contains(&v("2.0.0")));
    }

    #[test]
    fn range_open_lower_bound() {
        let range = VersionRange::parse(":1.24").unwrap();
        assert!(range.contains(&v("0.1")));
        assert!(range.contains(&v("1.24")));
        assert!(!range.contains(&v("1.24.0")));
    }

    #[test]
    fn range_open_upper_bound() {
        let range = VersionRange::parse("1.24:").unwrap();
        assert!(range.contains(&v("1.24")));
        assert!(range.contains(&v("99.0")));
        assert!(!range.contains(&v("1.23")));
    }

    #[test]
    fn range_fully_open() {
        let range = VersionRange::parse(":").unwrap();
        assert!(range.contains(&v("0.0.1")));
        assert!(range.contains(&v("99.99")));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(matches!(
            VersionRange::parse("2.0:1.0"),
            Err(VersionError::EmptyRange(_))
        ));
    }

    #[test]
    fn range_rejects_extra_separator() {
        assert!(matches!(
            VersionRange::parse("1.0:2.0:3.0"),
            Err(VersionError::MalformedRange(_))
        ));
    }

    #[test]
    fn range_display_round_trips() {
        for text in ["1.24.0", "1.24.0:1.24.9", "1.24:", ":2.0", ":"] {
            let range = VersionRange::parse(text).unwrap();
            assert_eq!(range.to_string(), text);
        }
    }
}

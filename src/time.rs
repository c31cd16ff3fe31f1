//! NHN Cloud timestamp handling
//!
//! The API emits timestamps in several formats depending on version and
//! region. The primary format is `"2024-02-13 10:45:57"` (space-separated,
//! no timezone) rather than standard RFC3339, so [`ApiTime`] tries an
//! ordered list of known patterns and normalizes everything to UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Canonical output format, matching what the API itself emits
const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Known input patterns, tried in order; first match wins
enum Pattern {
    /// Naive local pattern interpreted as UTC
    Naive(&'static str),
    /// Full RFC3339 with explicit offset
    Rfc3339,
}

const PATTERNS: [Pattern; 6] = [
    Pattern::Naive("%Y-%m-%d %H:%M:%S"), // most common format
    Pattern::Naive("%Y-%m-%dT%H:%M:%S"), // alternative format without timezone
    Pattern::Naive("%Y-%m-%dT%H:%M:%SZ"), // UTC format
    Pattern::Rfc3339,
    Pattern::Naive("%Y-%m-%d %H:%M:%S%.f"), // with microseconds
    Pattern::Naive("%Y-%m-%dT%H:%M:%S%.fZ"), // UTC with microseconds
];

/// A timestamp as reported by the NHN Cloud API
///
/// Wraps a single absolute point in time normalized to UTC. An unset/zero
/// timestamp serializes to JSON `null`, never to a formatted string; a set
/// timestamp always serializes to the canonical `YYYY-MM-DD HH:MM:SS` form
/// regardless of which input pattern produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApiTime(Option<DateTime<Utc>>);

impl ApiTime {
    /// Parse a timestamp string using the known API patterns.
    ///
    /// Empty strings and the literal `"null"` yield the unset value. If no
    /// pattern matches, the error carries the original string and the last
    /// underlying parser error.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() || s == "null" {
            return Ok(Self(None));
        }

        let mut last_err = None;
        for pattern in &PATTERNS {
            match pattern {
                Pattern::Naive(fmt) => match NaiveDateTime::parse_from_str(s, fmt) {
                    Ok(naive) => return Ok(Self(Some(naive.and_utc()))),
                    Err(e) => last_err = Some(e),
                },
                Pattern::Rfc3339 => match DateTime::parse_from_rfc3339(s) {
                    Ok(dt) => return Ok(Self(Some(dt.with_timezone(&Utc)))),
                    Err(e) => last_err = Some(e),
                },
            }
        }

        // last_err is always set here: PATTERNS is non-empty
        Err(Error::TimestampParse {
            value: s.to_string(),
            source: last_err.unwrap(),
        })
    }

    /// The underlying instant, or `None` when unset
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    /// Whether a timestamp value is present
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl From<DateTime<Utc>> for ApiTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(Some(dt))
    }
}

impl std::fmt::Display for ApiTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(dt) => write!(f, "{}", dt.format(CANONICAL_FORMAT)),
            None => f.write_str("null"),
        }
    }
}

impl Serialize for ApiTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Some(dt) => serializer.serialize_str(&dt.format(CANONICAL_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ApiTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(Self(None)),
            Some(s) => Self::parse(&s).map_err(D::Error::custom),
        }
    }
}

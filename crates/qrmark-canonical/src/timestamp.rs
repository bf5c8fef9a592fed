use crate::validation::ValidationError;
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,9})?Z$").expect("invalid regex")
    })
}

/// UTC RFC3339 timestamp with `Z` suffix.
///
/// The text is kept as parsed, with 0 to 9 fractional digits. Equality,
/// hashing and ordering follow the instant, so `12:00:00Z` equals
/// `12:00:00.000Z` and sorts before `12:00:00.500Z`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    text: String,
    instant: DateTime<Utc>,
}

impl Timestamp {
    /// Current wall-clock time, with millisecond precision.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Formats a chrono UTC datetime with millisecond precision.
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        let text = value.to_rfc3339_opts(SecondsFormat::Millis, true);
        let instant = value
            .with_nanosecond(value.nanosecond() / 1_000_000 * 1_000_000)
            .unwrap_or(value);
        Self { text, instant }
    }

    /// Parses a validated timestamp.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let text = value.into();
        let instant = if pattern().is_match(&text) {
            DateTime::parse_from_rfc3339(&text).ok()
        } else {
            None
        };
        match instant {
            Some(instant) => Ok(Self {
                instant: instant.with_timezone(&Utc),
                text,
            }),
            None => Err(ValidationError::PatternMismatch {
                field: "Timestamp",
                value: text,
            }),
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instant.hash(state);
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.text
    }
}

impl AsRef<str> for Timestamp {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

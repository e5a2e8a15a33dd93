use std::cmp::Ordering;
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix meaning "the instant immediately before the parsed value".
pub const PRECEDING_MARKER: char = '<';

const MEDIAWIKI_FORMAT: &str = "%Y%m%d%H%M%S";
const FULL_TOKEN_DEFAULTS: &str = "00000101000000";

/// Errors raised while parsing a compact timestamp token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("timestamp token is empty")]
    Empty,
    #[error("timestamp '{0}' must be 4 to 14 digits (YYYY[MM[DD[hh[mm[ss]]]]])")]
    Malformed(String),
    #[error("timestamp '{0}' does not name a valid calendar instant")]
    OutOfRange(String),
}

/// Canonical instant with its wiki-database and human-readable renderings.
#[derive(Debug, Clone)]
pub struct Timestamp {
    instant: NaiveDateTime,
    mediawiki: String,
    readable: String,
}

impl Timestamp {
    /// Parse `YYYY[MM[DD[hh[mm[ss]]]]]`, optionally prefixed with `<`.
    ///
    /// Missing trailing components default to the start of their unit. The `<` prefix
    /// moves the result back by exactly one second.
    pub fn parse(token: &str) -> Result<Self, TimestampError> {
        let trimmed = token.trim();
        let (preceding, digits) = match trimmed.strip_prefix(PRECEDING_MARKER) {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        if digits.is_empty() {
            return Err(TimestampError::Empty);
        }

        let well_formed = digits.bytes().all(|byte| byte.is_ascii_digit())
            && matches!(digits.len(), 4 | 6 | 8 | 10 | 12 | 14);
        if !well_formed {
            return Err(TimestampError::Malformed(trimmed.to_string()));
        }

        let padded = format!("{digits}{}", &FULL_TOKEN_DEFAULTS[digits.len()..]);
        let mut instant = NaiveDateTime::parse_from_str(&padded, MEDIAWIKI_FORMAT)
            .map_err(|_| TimestampError::OutOfRange(trimmed.to_string()))?;

        if preceding {
            instant = instant
                .checked_sub_signed(Duration::seconds(1))
                .ok_or_else(|| TimestampError::OutOfRange(trimmed.to_string()))?;
        }

        Ok(Self::from_instant(instant))
    }

    pub fn from_instant(instant: NaiveDateTime) -> Self {
        let mediawiki = instant.format(MEDIAWIKI_FORMAT).to_string();
        let readable = if instant.num_seconds_from_midnight() == 0 {
            instant.format("%-d %B %Y").to_string()
        } else {
            instant.format("%-d %B %Y %H:%M:%S").to_string()
        };

        Self {
            instant,
            mediawiki,
            readable,
        }
    }

    /// Midnight at the start of the given calendar day.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_instant(date.and_time(chrono::NaiveTime::MIN))
    }

    pub fn instant(&self) -> NaiveDateTime {
        self.instant
    }

    /// Sortable `YYYYMMDDhhmmss` form used by wiki databases.
    pub fn mediawiki(&self) -> &str {
        &self.mediawiki
    }

    pub fn readable(&self) -> &str {
        &self.readable
    }

    /// Whole days elapsed from `self` to `later` (negative if `later` is earlier).
    pub fn days_until(&self, later: &Timestamp) -> i64 {
        (later.instant - self.instant).num_days()
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

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

impl std::hash::Hash for Timestamp {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.instant.hash(state);
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.readable)
    }
}

impl std::str::FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.mediawiki)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

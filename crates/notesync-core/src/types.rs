use crate::{CoreError, Result};
use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Utc, Weekday};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use std::time::SystemTime;

/// Wire format of a version (RFC 1123 / HTTP IMF-fixdate, always UTC)
pub const VERSION_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Layout after the weekday and before the zone designator, used when parsing
const NAIVE_VERSION_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Version stamp of the stored document
///
/// A wall-clock UTC timestamp truncated to whole seconds. Every constructor
/// truncates, so equality and ordering never observe sub-second precision and
/// a token always survives a trip through [`VERSION_FORMAT`] unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VersionToken(DateTime<Utc>);

impl VersionToken {
    /// The version a client holds when it has nothing (the Unix epoch)
    pub fn zero() -> Self {
        Self(DateTime::<Utc>::default())
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Build a token from any UTC timestamp, dropping sub-second precision
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(0))
    }

    /// Build a token from seconds since the Unix epoch
    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(seconds, 0).map(Self)
    }

    /// Parse the wire format
    ///
    /// Accepts the `GMT` or `UTC` zone designator and falls back to RFC 2822
    /// with a numeric offset. The weekday must be a three-letter day name but
    /// is not checked against the date.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid_version_format(input, "empty version"));
        }

        if let Some(naive) = trimmed
            .strip_suffix(" GMT")
            .or_else(|| trimmed.strip_suffix(" UTC"))
        {
            let (weekday, date) = naive
                .split_once(", ")
                .ok_or_else(|| CoreError::invalid_version_format(input, "missing weekday"))?;
            if weekday.len() != 3 || weekday.parse::<Weekday>().is_err() {
                return Err(CoreError::invalid_version_format(
                    input,
                    format!("unknown weekday '{}'", weekday),
                ));
            }

            return NaiveDateTime::parse_from_str(date, NAIVE_VERSION_FORMAT)
                .map(|parsed| Self::from_datetime(parsed.and_utc()))
                .map_err(|e| CoreError::invalid_version_format(input, e.to_string()));
        }

        DateTime::parse_from_rfc2822(trimmed)
            .map(|parsed| Self::from_datetime(parsed.with_timezone(&Utc)))
            .map_err(|e| CoreError::invalid_version_format(input, e.to_string()))
    }

    /// Render the wire format
    pub fn to_header(&self) -> String {
        self.0.format(VERSION_FORMAT).to_string()
    }

    /// Seconds since the Unix epoch
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// The underlying timestamp
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Convert for use as a file modification time
    pub fn to_system_time(&self) -> SystemTime {
        SystemTime::from(self.0)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_header())
    }
}

impl FromStr for VersionToken {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<DateTime<Utc>> for VersionToken {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

impl From<SystemTime> for VersionToken {
    fn from(time: SystemTime) -> Self {
        Self::from_datetime(DateTime::<Utc>::from(time))
    }
}

impl Add<TimeDelta> for VersionToken {
    type Output = VersionToken;

    fn add(self, delta: TimeDelta) -> Self::Output {
        Self::from_datetime(self.0 + delta)
    }
}

impl Sub<TimeDelta> for VersionToken {
    type Output = VersionToken;

    fn sub(self, delta: TimeDelta) -> Self::Output {
        Self::from_datetime(self.0 - delta)
    }
}

/// Where the synced document lives: a key inside a bucket namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    /// Bucket (namespace) name
    pub bucket: String,
    /// Object key within the bucket
    pub key: String,
}

impl ObjectLocation {
    /// Create a validated location
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        let key = key.into();

        if bucket.is_empty() {
            return Err(CoreError::invalid_location("bucket cannot be empty"));
        }
        if bucket.contains('/') {
            return Err(CoreError::invalid_location(format!(
                "bucket '{}' cannot contain '/'",
                bucket
            )));
        }
        if key.is_empty() {
            return Err(CoreError::invalid_location("key cannot be empty"));
        }
        if key.starts_with('/') || key.ends_with('/') {
            return Err(CoreError::invalid_location(format!(
                "key '{}' cannot start or end with '/'",
                key
            )));
        }

        Ok(Self { bucket, key })
    }

    /// Storage key encoding: {bucket}/{key}
    pub fn storage_key(&self) -> String {
        format!("{}/{}", self.bucket, self.key)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

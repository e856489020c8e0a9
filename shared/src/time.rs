use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Invalid time value: {0:?}")]
    InvalidTime(String),

    #[error("Invalid date key (expected YYYY-MM-DD): {0:?}")]
    InvalidDate(String),

    #[error("Time range start must be before end ({start} >= {end})")]
    EmptyRange { start: WallTime, end: WallTime },
}

/// Wall-clock time of day as minutes since midnight.
///
/// All conflict arithmetic happens on this integer form; the 24-hour `"HH:MM"`
/// wire form and the 12-hour `"H:MM AM/PM"` display form are conversions at
/// the edges, never compared as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime(u16);

pub const MINUTES_PER_DAY: u16 = 24 * 60;

impl WallTime {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Parses either 12-hour (`"9:30 PM"`, `"12 AM"`) or 24-hour (`"21:30"`,
    /// `"9"`) notation. Missing minutes mean `:00`.
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let err = || TimeParseError::InvalidTime(input.to_string());

        let trimmed = input.trim();
        let upper = trimmed.to_ascii_uppercase();
        let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
            (rest.trim_end(), Some(false))
        } else if let Some(rest) = upper.strip_suffix("PM") {
            (rest.trim_end(), Some(true))
        } else {
            (upper.as_str(), None)
        };

        let mut parts = clock.splitn(2, ':');
        let hour: u16 = parts
            .next()
            .and_then(|h| h.trim().parse().ok())
            .ok_or_else(err)?;
        let minute: u16 = match parts.next() {
            Some(m) => m.trim().parse().map_err(|_| err())?,
            None => 0,
        };

        if meridiem.is_some() && !(1..=12).contains(&hour) {
            return Err(err());
        }
        let hour = match meridiem {
            // 12 AM is midnight, 12 PM is noon
            Some(false) if hour == 12 => 0,
            Some(true) if hour != 12 => hour + 12,
            Some(_) | None => hour,
        };

        Self::from_hm(hour, minute).ok_or_else(err)
    }

    /// 24-hour `"HH:MM"` form, the one exchanged with the backend.
    pub fn format_24(self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    /// 12-hour `"H:MM AM/PM"` display form.
    pub fn format_12(self) -> String {
        let (hour, meridiem) = match self.hour() {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{}:{:02} {}", hour, self.minute(), meridiem)
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_24())
    }
}

impl FromStr for WallTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format_24())
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Converts any accepted time notation to the 24-hour wire form.
/// Idempotent: inputs already in `"HH:MM"` pass through unchanged.
pub fn to_24_hour(input: &str) -> Result<String, TimeParseError> {
    Ok(WallTime::parse(input)?.format_24())
}

/// Converts any accepted time notation to the 12-hour display form.
/// Idempotent on inputs already in `"H:MM AM/PM"`.
pub fn to_12_hour(input: &str) -> Result<String, TimeParseError> {
    Ok(WallTime::parse(input)?.format_12())
}

/// Minutes since midnight for any accepted time notation.
pub fn to_minutes(input: &str) -> Result<u16, TimeParseError> {
    Ok(WallTime::parse(input)?.minutes())
}

/// A half-open `[start, end)` window within one calendar day.
///
/// Never wraps midnight: `start < end` is enforced on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: WallTime,
    pub end: WallTime,
}

impl TimeRange {
    pub fn new(start: WallTime, end: WallTime) -> Result<Self, TimeParseError> {
        if start >= end {
            return Err(TimeParseError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    /// The shared conflict rule: a genuine overlap, or the exact same window.
    /// Adjacency (one range ending exactly where another starts) is allowed.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        (self.start < other.end && self.end > other.start)
            || (self.start == other.start && self.end == other.end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Canonical `YYYY-MM-DD` key for one calendar day.
///
/// Every date that crosses a boundary (URL path, backend payload, editor key)
/// goes through this type so there is exactly one notion of "which day".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Day key for an instant, resolved in the business timezone. Taking the
    /// zoned date (rather than reconstructing a date from a formatted string)
    /// is what guards against the classic off-by-one across UTC offsets.
    pub fn from_instant(instant: DateTime<Utc>, timezone: Tz) -> Self {
        Self(instant.with_timezone(&timezone).date_naive())
    }

    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| TimeParseError::InvalidDate(input.to_string()))
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Re-materializes the day as an instant pinned to local noon, the only
    /// time-of-day that cannot shift the date under any UTC offset or DST rule.
    pub fn noon(self, timezone: Tz) -> Option<DateTime<Utc>> {
        self.0
            .and_hms_opt(12, 0, 0)
            .and_then(|naive| naive.and_local_timezone(timezone).single())
            .map(|zoned| zoned.with_timezone(&Utc))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

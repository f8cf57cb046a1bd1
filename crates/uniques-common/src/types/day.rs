//! Day - UTC calendar day that events are bucketed into
//!
//! Every timestamp is truncated to its UTC calendar day before it reaches a
//! store, so the `(client, day)` uniqueness constraint stays meaningful.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::DAY_FORMAT;

/// UTC calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Day(NaiveDate);

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year/month/day, `None` if the date does not exist
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Current UTC day
    pub fn today() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.date_naive())
    }

    /// Day containing the given Unix epoch second (UTC)
    pub fn from_unix_seconds(secs: i64) -> Result<Self, ValidationError> {
        DateTime::<Utc>::from_timestamp(secs, 0)
            .map(Self::from_datetime)
            .ok_or(ValidationError::TimestampOutOfRange(secs))
    }

    /// Parse a caller-supplied Unix epoch timestamp (seconds)
    pub fn parse_timestamp(raw: &str) -> Result<Self, ValidationError> {
        let secs: i64 = raw
            .parse()
            .map_err(|_| ValidationError::InvalidTimestamp(raw.to_string()))?;
        Self::from_unix_seconds(secs)
    }

    /// Parse a `YYYYMMDD` date
    ///
    /// Exactly eight ASCII digits are accepted; chrono alone would also take
    /// signs and extra year digits.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidDate(raw.to_string()));
        }
        NaiveDate::parse_from_str(raw, DAY_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Days since 0001-01-01 (CE day 1); monotonic over the whole range
    pub fn ordinal(&self) -> i32 {
        self.0.num_days_from_ce()
    }

    /// Next calendar day, `None` at the end of the representable range
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Same day-of-month one calendar month earlier, clamped to the last
    /// day of the shorter month (March 31 becomes February 28 or 29).
    pub fn minus_one_month(&self) -> Self {
        self.0
            .checked_sub_months(Months::new(1))
            .map(Self)
            .unwrap_or(Self(NaiveDate::MIN))
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

/// Inclusive range of days `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: Day,
    pub end: Day,
}

impl DayWindow {
    pub fn new(start: Day, end: Day) -> Self {
        Self { start, end }
    }

    /// Trailing calendar month ending at (and including) `end`
    pub fn trailing_month(end: Day) -> Self {
        Self {
            start: end.minus_one_month(),
            end,
        }
    }

    /// An inverted window holds no days
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days covered
    pub fn len_days(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end.0 - self.start.0).num_days() as u64 + 1
        }
    }

    /// Every day in the window, oldest first
    pub fn days(&self) -> impl Iterator<Item = Day> {
        let end = self.end;
        let first = if self.is_empty() { None } else { Some(self.start) };
        std::iter::successors(first, move |day| day.succ().filter(|next| *next <= end))
    }
}

impl std::fmt::Display for DayWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

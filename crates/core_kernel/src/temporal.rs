//! Calendar and clock utilities
//!
//! This module provides the date arithmetic used by the policy domain:
//! - Ages and age groups of policyholders
//! - Days until a renewal date and the "due soon" predicate
//! - Month labels used to bucket renewals
//! - A `Clock` port so that "now" and "today" can be controlled in tests

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Default lookahead window, in days, for a renewal to count as due soon
pub const DEFAULT_DUE_SOON_DAYS: i64 = 30;

/// Timezone wrapper for the agent's local calendar
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s.trim())
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the calendar date of the given instant in this timezone
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Returns the UTC instant of `hour:00` local time on `date`
    ///
    /// Returns `None` when the hour is out of range. For local times that
    /// fall in a DST gap the next valid instant is not searched for; the
    /// earliest mapping of an ambiguous time is used.
    pub fn at_hour(&self, date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
        date.and_hms_opt(hour, 0, 0)?
            .and_local_timezone(self.0)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}

/// Source of the current instant
///
/// Services take a clock instead of calling `Utc::now()` directly so tests
/// can pin and advance time.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;

    /// Returns the timezone used to derive calendar dates
    fn timezone(&self) -> Timezone {
        Timezone::default()
    }

    /// Returns today's calendar date in the clock's timezone
    fn today(&self) -> NaiveDate {
        self.timezone().date_of(self.now())
    }
}

/// Wall clock in a fixed timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    timezone: Timezone,
}

impl ManualClock {
    /// Creates a clock pinned at `now` in UTC
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_timezone(now, Timezone::default())
    }

    pub fn with_timezone(now: DateTime<Utc>, timezone: Timezone) -> Self {
        Self {
            now: Mutex::new(now),
            timezone,
        }
    }

    /// Moves the clock to a specific instant
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// Age bracket of a policyholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeGroup {
    Under18,
    From18To25,
    From26To35,
    From36To45,
    From46To55,
    From56To65,
    Over65,
}

impl AgeGroup {
    /// Buckets an age in whole years
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=17 => AgeGroup::Under18,
            18..=25 => AgeGroup::From18To25,
            26..=35 => AgeGroup::From26To35,
            36..=45 => AgeGroup::From36To45,
            46..=55 => AgeGroup::From46To55,
            56..=65 => AgeGroup::From56To65,
            _ => AgeGroup::Over65,
        }
    }

    /// Display label, also used as the statistics key
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Under18 => "Under 18",
            AgeGroup::From18To25 => "18-25",
            AgeGroup::From26To35 => "26-35",
            AgeGroup::From36To45 => "36-45",
            AgeGroup::From46To55 => "46-55",
            AgeGroup::From56To65 => "56-65",
            AgeGroup::Over65 => "66+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AgeGroup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// Whole years between `date_of_birth` and `today`
///
/// A birth date in the future yields 0.
pub fn calculate_age(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(date_of_birth).unwrap_or(0)
}

/// Shorthand for `AgeGroup::from_age`
pub fn age_group(age: u32) -> AgeGroup {
    AgeGroup::from_age(age)
}

/// Calendar days from `today` until `renewal_date`, negative when overdue
pub fn days_until_renewal(renewal_date: NaiveDate, today: NaiveDate) -> i64 {
    (renewal_date - today).num_days()
}

/// Returns true when the renewal falls within `window_days` from today
///
/// Overdue renewals are not due soon; a renewal today is.
pub fn is_renewal_due_soon(renewal_date: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    let days = days_until_renewal(renewal_date, today);
    (0..=window_days).contains(&days)
}

/// English short month name and four-digit year, e.g. `Jan 2025`
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Next occurrence of the month/day of `date` on or after `from`
///
/// February 29th falls back to February 28th in non-leap years.
pub fn next_anniversary(date: NaiveDate, from: NaiveDate) -> NaiveDate {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, date.month(), date.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1))
            .unwrap_or(date)
    };

    let this_year = in_year(from.year());
    if this_year >= from {
        this_year
    } else {
        in_year(from.year() + 1)
    }
}

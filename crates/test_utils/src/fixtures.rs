//! Pre-built Test Fixtures
//!
//! Provides ready-to-use dates, instants and clocks. Every fixture is fixed
//! so tests do not depend on the wall clock.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use core_kernel::ManualClock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Reference "now" used by fixture clocks (June 1, 2025 10:00 UTC)
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    /// Calendar date of `now()`
    pub fn today() -> NaiveDate {
        Self::now().date_naive()
    }

    /// A date `days` after `today()` (negative for the past)
    pub fn days_from_today(days: i64) -> NaiveDate {
        Self::today() + Duration::days(days)
    }

    /// Birth date of someone turning `age` on `today()`
    pub fn birth_date_for_age(age: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025 - age, 6, 1).unwrap()
    }

    /// Manual clock pinned at `now()`
    pub fn clock() -> ManualClock {
        ManualClock::new(Self::now())
    }
}

/// Shorthand for a valid calendar date
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Fixture for premium amounts
pub struct PremiumFixtures;

impl PremiumFixtures {
    pub fn standard() -> Decimal {
        dec!(1200)
    }

    pub fn small() -> Decimal {
        dec!(250)
    }
}

// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Time as whole seconds since 00:00:00 on 1 January of year 0 AD
//! (proleptic Gregorian calendar).
//!
//! Counting from year 0 keeps ordering and arithmetic total over every date
//! an X.509 validity field can express, including pre-UNIX ones.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Number of seconds in one day.
pub const ONE_DAY_IN_SECONDS: u64 = 86_400;

/// Seconds between year 0 AD and the UNIX epoch.
const UNIX_EPOCH_OFFSET: u64 = days_before_year(1970) * ONE_DAY_IN_SECONDS;

/// Returns the number of days in years `[0, year)`, counting year 0 as a
/// leap year.
pub const fn days_before_year(year: u64) -> u64 {
    365 * year + (year + 3) / 4 - (year + 99) / 100 + (year + 399) / 400
}

const fn is_leap_year(year: u64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

const fn days_in_month(year: u64, month: u8) -> u64 {
    const DAYS_IN_MONTH: [u64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let days = DAYS_IN_MONTH[(month - 1) as usize];
    if month == 2 && is_leap_year(year) {
        days + 1
    } else {
        days
    }
}

/// A point in time, in whole seconds since year 0 AD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u64);

impl Time {
    /// Wraps a raw count of seconds since year 0 AD.
    pub const fn from_elapsed_seconds_ad(seconds: u64) -> Self {
        Time(seconds)
    }

    /// Returns the raw count of seconds since year 0 AD.
    pub const fn elapsed_seconds_ad(self) -> u64 {
        self.0
    }

    /// Converts a non-negative UNIX timestamp.
    pub const fn from_unix(timestamp: u64) -> Self {
        Time(UNIX_EPOCH_OFFSET + timestamp)
    }

    /// Converts a possibly-negative UNIX timestamp; `None` if the moment
    /// precedes year 0 AD.
    pub fn from_unix_signed(timestamp: i64) -> Option<Self> {
        let total = UNIX_EPOCH_OFFSET as i128 + timestamp as i128;
        u64::try_from(total).ok().map(Time)
    }

    /// Returns the current wall-clock time.
    pub fn now() -> Self {
        let unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        Time::from_unix(unix)
    }

    /// Returns this time moved `seconds` forward.
    pub const fn add_seconds(self, seconds: u64) -> Self {
        Time(self.0 + seconds)
    }

    /// Returns this time moved `seconds` backward, saturating at year 0.
    pub const fn sub_seconds(self, seconds: u64) -> Self {
        Time(self.0.saturating_sub(seconds))
    }
}

/// Builds a [`Time`] from calendar components.
///
/// Panics on out-of-range components; callers pass literals.
pub fn ymdhms(year: u16, month: u8, day: u8, hour: u8, minutes: u8, seconds: u8) -> Time {
    assert!(year <= 9999);
    assert!((1..=12).contains(&month));
    assert!(day >= 1 && u64::from(day) <= days_in_month(u64::from(year), month));
    assert!(hour < 24);
    assert!(minutes < 60);
    assert!(seconds < 60);

    let mut days = days_before_year(u64::from(year));
    let mut m = 1;
    while m < month {
        days += days_in_month(u64::from(year), m);
        m += 1;
    }
    days += u64::from(day) - 1;

    let mut total = days * ONE_DAY_IN_SECONDS;
    total += u64::from(hour) * 60 * 60;
    total += u64::from(minutes) * 60;
    total += u64::from(seconds);
    Time(total)
}

/// Calendar components of a [`Time`], for DER time encoding.
pub(crate) struct ExplodedTime {
    pub year: u64,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

pub(crate) fn explode(time: Time) -> ExplodedTime {
    let days = time.0 / ONE_DAY_IN_SECONDS;
    let day_seconds = time.0 % ONE_DAY_IN_SECONDS;

    let mut year = days / 366;
    while days_before_year(year + 1) <= days {
        year += 1;
    }
    let mut day_of_year = days - days_before_year(year);

    let mut month: u8 = 1;
    loop {
        let in_month = days_in_month(year, month);
        if day_of_year < in_month {
            break;
        }
        day_of_year -= in_month;
        month += 1;
    }

    ExplodedTime {
        year,
        month,
        day: (day_of_year + 1) as u8,
        hour: (day_seconds / 3600) as u8,
        minute: ((day_seconds % 3600) / 60) as u8,
        second: (day_seconds % 60) as u8,
    }
}

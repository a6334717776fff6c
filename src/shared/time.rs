use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Largest shift a bulk offset may represent, one day minus a second.
pub const OFFSET_MODULUS: i32 = 86_399;

/// Seconds since midnight of the service day.
///
/// Values may exceed 24 hours (GTFS allows trips past midnight) and may go
/// negative after a bulk shift, which is why this is signed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Time(i32);

impl From<i32> for Time {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Sub<Time> for Time {
    type Output = i32;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let rhs = i32::try_from(rhs.0).unwrap_or(i32::MAX);
        Self(self.0.saturating_add(rhs))
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Time {
    pub const fn from_seconds(secs: i32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> i32 {
        self.0
    }

    /// Shifts by `seconds`, wrapped so the shift never spans more than a day.
    pub const fn offset(self, seconds: i32) -> Self {
        Self(self.0.saturating_add(seconds % OFFSET_MODULUS))
    }

    pub fn to_hms_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let secs = self.0.unsigned_abs();
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        let s = secs % 60;
        format!("{sign}{:02}:{:02}:{:02}", h, m, s)
    }

    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: i32 = 60 * 60;
        const MINUTE_TO_SEC: i32 = 60;
        let mut split = time.trim().split(':');
        let hours: i32 = split.next()?.parse().ok()?;
        let minutes: i32 = split.next()?.parse().ok()?;
        let seconds: i32 = split.next()?.parse().ok()?;
        if split.next().is_some() || hours < 0 || !(0..60).contains(&minutes) {
            return None;
        }
        if !(0..60).contains(&seconds) {
            return None;
        }
        let secs = hours
            .checked_mul(HOUR_TO_SEC)?
            .checked_add(minutes * MINUTE_TO_SEC + seconds)?;
        Some(Self(secs))
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Duration(u32);

impl From<u32> for Duration {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes * 60)
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self(hours * 60 * 60)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    /// Rough human wording, e.g. `"a few seconds"`, `"5 minutes"`, `"an hour"`.
    pub fn humanize(&self) -> String {
        const MINUTE: f64 = 60.0;
        const HOUR: f64 = 60.0 * MINUTE;
        const DAY: f64 = 24.0 * HOUR;
        let secs = self.0 as f64;
        let minutes = (secs / MINUTE).round();
        let hours = (secs / HOUR).round();
        let days = (secs / DAY).round();
        if secs < 45.0 {
            "a few seconds".to_string()
        } else if secs < 90.0 {
            "a minute".to_string()
        } else if minutes < 45.0 {
            format!("{minutes} minutes")
        } else if minutes < 90.0 {
            "an hour".to_string()
        } else if hours < 22.0 {
            format!("{hours} hours")
        } else if hours < 36.0 {
            "a day".to_string()
        } else {
            format!("{days} days")
        }
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "12:30:30";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_past_midnight() {
    let time = "25:10:00";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 90_600);
}

#[test]
fn parse_rejects_overflowing_hours() {
    assert_eq!(Time::from_hms("596524:00:00"), None);
    assert_eq!(Time::from_hms("596523:00:00").unwrap().as_seconds(), 2_147_482_800);
}

#[test]
fn adding_duration_saturates() {
    let mut time = Time::from_seconds(i32::MAX - 10);
    time += Duration::from_seconds(u32::MAX);
    assert_eq!(time.as_seconds(), i32::MAX);
    assert_eq!(Time::from_seconds(0) + Duration::from_seconds(90), Time::from_seconds(90));
}

#[test]
fn negative_time_formats_with_sign() {
    assert_eq!(Time::from_seconds(-90).to_hms_string(), "-00:01:30");
}

#[test]
fn offset_wraps_at_modulus() {
    let time = Time::from_seconds(100);
    assert_eq!(time.offset(OFFSET_MODULUS + 5).as_seconds(), 105);
    assert_eq!(time.offset(-30).as_seconds(), 70);
}

#[test]
fn humanize_minutes() {
    assert_eq!(Duration::from_seconds(10).humanize(), "a few seconds");
    assert_eq!(Duration::from_seconds(60).humanize(), "a minute");
    assert_eq!(Duration::from_minutes(5).humanize(), "5 minutes");
    assert_eq!(Duration::from_hours(1).humanize(), "an hour");
    assert_eq!(Duration::from_hours(3).humanize(), "3 hours");
}

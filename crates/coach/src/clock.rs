//! Wall-clock access and timezone arithmetic.
//!
//! All "now" lookups go through [`Clock`] so that tests can pin time.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::CoachError;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = at;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Parse an IANA timezone name.
pub fn parse_timezone(tz: &str) -> Result<Tz, CoachError> {
    tz.trim()
        .parse::<Tz>()
        .map_err(|_| CoachError::InvalidTimezone(tz.to_string()))
}

/// Local hour (0..=23) at `now` in `tz`.
pub fn current_hour(tz: &str, now: DateTime<Utc>) -> Result<u32, CoachError> {
    let tz = parse_timezone(tz)?;
    Ok(now.with_timezone(&tz).hour())
}

/// Local calendar date at `now` in `tz`.
pub fn local_date(tz: &str, now: DateTime<Utc>) -> Result<NaiveDate, CoachError> {
    let tz = parse_timezone(tz)?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// Local calendar date, falling back to UTC for a missing or invalid zone.
pub fn local_date_or_utc(tz: Option<&str>, now: DateTime<Utc>) -> NaiveDate {
    tz.and_then(|tz| local_date(tz, now).ok())
        .unwrap_or_else(|| now.date_naive())
}

/// The instant at which the local day containing `now` began in `tz`.
///
/// When midnight does not exist (a DST gap at 00:00) the day starts at the
/// first valid local instant after it; when it is ambiguous the earlier
/// instant wins.
pub fn start_of_local_day(tz: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, CoachError> {
    let zone = parse_timezone(tz)?;
    let date = now.with_timezone(&zone).date_naive();
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CoachError::InvalidTimezone(tz.to_string()))?;

    // Gaps are at most a few hours; step forward minute by minute.
    for offset in 0..(24 * 60) {
        let candidate = midnight + Duration::minutes(offset);
        match zone.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => continue,
        }
    }

    Err(CoachError::InvalidTimezone(tz.to_string()))
}

//! Wall-clock sources

use chrono::{NaiveDateTime, Utc};

/// A source of "now" for activation date generation.
///
/// The generator never reads the system clock directly, so tests can pin
/// the upper bound of the activation date range.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use kms_epid_gen::{Clock, FixedClock};
///
/// let now = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// assert_eq!(FixedClock(now).now(), now);
/// ```
pub trait Clock {
    /// Returns the current time in UTC.
    fn now(&self) -> NaiveDateTime;
}

/// UTC system clock.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// A clock stuck at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

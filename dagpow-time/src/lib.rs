// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Network time management.
//!
//! The network counts time in ticks of 1/1024 second since 01/01/1970.
//! A main period (one mining cycle) is 2^16 ticks, i.e. 64 seconds.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod error;
pub use error::TimeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use std::{
    convert::{TryFrom, TryInto},
    str::FromStr,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Ticks per second.
pub const TICKS_PER_SECOND: u64 = 1024;

/// Time structure used everywhere.
/// 1/1024 seconds since 01/01/1970.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DagTime(u64);

impl fmt::Display for DagTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl TryFrom<Duration> for DagTime {
    type Error = TimeError;

    /// Conversion from `std::time::Duration`.
    /// ```
    /// # use std::time::Duration;
    /// # use dagpow_time::*;
    /// # use std::convert::TryFrom;
    /// let time = DagTime::try_from(Duration::from_secs(2)).unwrap();
    /// assert_eq!(time, DagTime::from_ticks(2048));
    /// ```
    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        let ticks = value
            .as_micros()
            .checked_mul(u128::from(TICKS_PER_SECOND))
            .ok_or(TimeError::TimeOverflowError)?
            / 1_000_000;
        Ok(DagTime(
            ticks.try_into().map_err(|_| TimeError::ConversionError)?,
        ))
    }
}

impl TryFrom<i64> for DagTime {
    type Error = TimeError;

    /// Conversion from a signed tick count. Negative values are rejected.
    /// ```
    /// # use dagpow_time::*;
    /// # use std::convert::TryFrom;
    /// assert!(DagTime::try_from(-1i64).is_err());
    /// assert_eq!(DagTime::try_from(5i64).unwrap(), DagTime::from_ticks(5));
    /// ```
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(DagTime)
            .map_err(|_| TimeError::NegativeTime(value))
    }
}

impl From<DagTime> for Duration {
    fn from(value: DagTime) -> Self {
        value.to_duration()
    }
}

impl FromStr for DagTime {
    type Err = crate::TimeError;

    /// Parses a tick count, decimal or `0x` prefixed hexadecimal.
    ///
    /// ```
    /// # use dagpow_time::*;
    /// # use std::str::FromStr;
    /// assert_eq!(DagTime::from_str("42").unwrap(), DagTime::from_ticks(42));
    /// assert_eq!(DagTime::from_str("0x10000").unwrap(), DagTime::from_ticks(1 << 16));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => u64::from_str(s),
        };
        Ok(DagTime(parsed.map_err(|_| Self::Err::ConversionError)?))
    }
}

impl DagTime {
    /// Smallest time interval
    pub const EPSILON: DagTime = DagTime(1);

    /// Zero
    pub const ZERO: DagTime = DagTime(0);

    /// Build from a raw tick count.
    pub const fn from_ticks(value: u64) -> Self {
        DagTime(value)
    }

    /// Raw tick count.
    pub const fn to_ticks(&self) -> u64 {
        self.0
    }

    /// Conversion from milliseconds, rounding down to the tick.
    /// ```
    /// # use dagpow_time::*;
    /// assert_eq!(DagTime::from_millis(1000), DagTime::from_ticks(1024));
    /// ```
    pub const fn from_millis(value: u64) -> Self {
        DagTime(((value as u128 * TICKS_PER_SECOND as u128) / 1000) as u64)
    }

    /// Conversion to milliseconds, rounding down.
    /// ```
    /// # use dagpow_time::*;
    /// assert_eq!(DagTime::from_ticks(2048).to_millis(), 2000);
    /// ```
    pub const fn to_millis(&self) -> u64 {
        ((self.0 as u128 * 1000) / TICKS_PER_SECOND as u128) as u64
    }

    /// Conversion from whole seconds.
    pub const fn from_secs(value: u64) -> Self {
        DagTime(value.saturating_mul(TICKS_PER_SECOND))
    }

    /// Gets current network time.
    ///
    /// ```
    /// # use dagpow_time::*;
    /// let a = DagTime::now().unwrap();
    /// let b = DagTime::now().unwrap();
    /// assert!(a <= b);
    /// ```
    pub fn now() -> Result<Self, TimeError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::TimeOverflowError)?;
        DagTime::try_from(since_epoch)
    }

    /// Conversion to `std::time::Duration`.
    /// ```
    /// # use std::time::Duration;
    /// # use dagpow_time::*;
    /// assert_eq!(DagTime::from_ticks(512).to_duration(), Duration::from_millis(500));
    /// ```
    pub fn to_duration(&self) -> Duration {
        let micros = (u128::from(self.0) * 1_000_000) / u128::from(TICKS_PER_SECOND);
        Duration::from_micros(micros.try_into().unwrap_or(u64::MAX))
    }

    /// Estimate the local `Instant` matching this network time.
    pub fn estimate_instant(self) -> Result<Instant, TimeError> {
        let (cur_timestamp, cur_instant) = (DagTime::now()?, Instant::now());
        if self >= cur_timestamp {
            cur_instant.checked_add(self.saturating_sub(cur_timestamp).to_duration())
        } else {
            cur_instant.checked_sub(cur_timestamp.saturating_sub(self).to_duration())
        }
        .ok_or(TimeError::TimeOverflowError)
    }

    /// Index of the period of length `period` containing this time.
    /// ```
    /// # use dagpow_time::*;
    /// let period = DagTime::from_ticks(1 << 16);
    /// assert_eq!(DagTime::from_ticks(0x2_ffff).period_index(period).unwrap(), 2);
    /// ```
    pub fn period_index(self, period: DagTime) -> Result<u64, TimeError> {
        self.checked_div_time(period)
    }

    /// Last tick of the period of length `period` containing this time.
    /// ```
    /// # use dagpow_time::*;
    /// let period = DagTime::from_ticks(1 << 16);
    /// assert_eq!(
    ///     DagTime::from_ticks(0x2_0000).end_of_period(period).unwrap(),
    ///     DagTime::from_ticks(0x2_ffff)
    /// );
    /// ```
    pub fn end_of_period(self, period: DagTime) -> Result<DagTime, TimeError> {
        let index = self.period_index(period)?;
        index
            .checked_add(1)
            .and_then(|next| next.checked_mul(period.0))
            .map(|start| DagTime(start - 1))
            .ok_or(TimeError::TimeOverflowError)
    }

    /// ```
    /// # use dagpow_time::*;
    /// let res = DagTime::from_ticks(42).saturating_sub(DagTime::from_ticks(50));
    /// assert_eq!(res, DagTime::ZERO)
    /// ```
    #[must_use]
    pub fn saturating_sub(self, t: DagTime) -> Self {
        DagTime(self.0.saturating_sub(t.0))
    }

    /// ```
    /// # use dagpow_time::*;
    /// let res = DagTime::from_ticks(42).saturating_add(DagTime::from_ticks(7));
    /// assert_eq!(res, DagTime::from_ticks(49))
    /// ```
    #[must_use]
    pub fn saturating_add(self, t: DagTime) -> Self {
        DagTime(self.0.saturating_add(t.0))
    }

    /// ```
    /// # use dagpow_time::*;
    /// assert!(DagTime::from_ticks(7).checked_sub(DagTime::from_ticks(42)).is_err());
    /// ```
    pub fn checked_sub(self, t: DagTime) -> Result<Self, TimeError> {
        self.0
            .checked_sub(t.0)
            .ok_or_else(|| TimeError::CheckedOperationError("subtraction error".to_string()))
            .map(DagTime)
    }

    /// ```
    /// # use dagpow_time::*;
    /// assert!(DagTime::from_ticks(u64::MAX).checked_add(DagTime::EPSILON).is_err());
    /// ```
    pub fn checked_add(self, t: DagTime) -> Result<Self, TimeError> {
        self.0
            .checked_add(t.0)
            .ok_or_else(|| TimeError::CheckedOperationError("addition error".to_string()))
            .map(DagTime)
    }

    /// ```
    /// # use dagpow_time::*;
    /// let res = DagTime::from_ticks(42).checked_div_time(DagTime::from_ticks(7)).unwrap();
    /// assert_eq!(res, 6)
    /// ```
    pub fn checked_div_time(self, t: DagTime) -> Result<u64, TimeError> {
        self.0
            .checked_div(t.0)
            .ok_or_else(|| TimeError::CheckedOperationError("division error".to_string()))
    }

    /// ```
    /// # use dagpow_time::*;
    /// assert_eq!(DagTime::from_ticks(42).saturating_mul(2), DagTime::from_ticks(84))
    /// ```
    #[must_use]
    pub const fn saturating_mul(self, n: u64) -> DagTime {
        DagTime(self.0.saturating_mul(n))
    }

    /// ```
    /// # use dagpow_time::*;
    /// let time1 = DagTime::from_ticks(42);
    /// let time2 = DagTime::from_ticks(84);
    /// assert_eq!(time1.abs_diff(time2), DagTime::from_ticks(42));
    /// ```
    pub fn abs_diff(&self, t: DagTime) -> DagTime {
        DagTime(self.0.abs_diff(t.0))
    }

    /// RFC 3339 rendering, for logs.
    /// ```
    /// # use dagpow_time::*;
    /// let time = DagTime::from_secs(1_640_995_200);
    /// assert_eq!(time.format_instant(), String::from("2022-01-01T00:00:00Z"))
    /// ```
    pub fn format_instant(&self) -> String {
        let secs = self.0 / TICKS_PER_SECOND;
        i64::try_from(secs)
            .ok()
            .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
            .and_then(|date| date.format(&Rfc3339).ok())
            .unwrap_or_else(|| self.to_string())
    }

    /// Get max DagTime value
    pub fn max() -> DagTime {
        DagTime(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_round_trip_is_lossy_downwards() {
        let time = DagTime::from_millis(1001);
        assert_eq!(time.to_ticks(), 1025);
        assert_eq!(time.to_millis(), 1000);
    }

    #[test]
    fn test_end_of_period_on_boundary() {
        let period = DagTime::from_ticks(1 << 16);
        assert_eq!(
            DagTime::from_ticks(0x1_ffff).end_of_period(period).unwrap(),
            DagTime::from_ticks(0x1_ffff)
        );
        assert_eq!(
            DagTime::from_ticks(0x1_ffff + 1).end_of_period(period).unwrap(),
            DagTime::from_ticks(0x2_ffff)
        );
        assert!(DagTime::from_ticks(5).end_of_period(DagTime::ZERO).is_err());
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(
            DagTime::try_from(-64i64),
            Err(TimeError::NegativeTime(-64))
        );
    }

    #[test]
    fn test_now_matches_system_clock() {
        let system = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        let now = DagTime::now().unwrap();
        let converted = DagTime::try_from(system).unwrap();
        assert!(now.abs_diff(converted) < DagTime::from_secs(1));
    }

    #[test]
    fn test_serde_json() {
        let time = DagTime::from_ticks(123);
        let serialized = serde_json::to_string(&time).unwrap();
        assert_eq!(serialized, "123");
        let deserialized: DagTime = serde_json::from_str(&serialized).unwrap();
        assert_eq!(time, deserialized);
    }
}

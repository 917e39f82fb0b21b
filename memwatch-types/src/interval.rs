//! Sampling interval with an enforced valid range.

use core::fmt;
use core::time::Duration;

/// Time between two samples, in milliseconds.
///
/// Always within [`Interval::MIN_MILLIS`]..=[`Interval::MAX_MILLIS`]; there is
/// no way to construct an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
pub struct Interval(u32);

impl Interval {
    /// 100 ms.
    pub const MIN_MILLIS: u64 = 100;
    /// One hour.
    pub const MAX_MILLIS: u64 = 3_600_000;

    /// Two seconds.
    pub const DEFAULT: Interval = Interval(2_000);

    /// Create from milliseconds, or `None` if out of range.
    pub const fn from_millis(millis: u64) -> Option<Self> {
        if millis >= Self::MIN_MILLIS && millis <= Self::MAX_MILLIS {
            Some(Self(millis as u32))
        } else {
            None
        }
    }

    /// Create from (possibly fractional) seconds.
    ///
    /// Sub-millisecond digits are truncated, so `0.0999` seconds is 99 ms and
    /// rejected. NaN and infinities are rejected.
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        // `as` truncates toward zero and saturates.
        Self::from_millis((secs * 1000.0) as u64)
    }

    /// Get the value in milliseconds.
    pub const fn as_millis(&self) -> u64 {
        self.0 as u64
    }

    /// Convert to a standard Duration.
    pub const fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0 as u64)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Interval> for Duration {
    fn from(interval: Interval) -> Self {
        interval.as_duration()
    }
}

impl From<Interval> for u64 {
    fn from(interval: Interval) -> Self {
        interval.as_millis()
    }
}

impl TryFrom<u64> for Interval {
    type Error = IntervalOutOfRange;

    fn try_from(millis: u64) -> Result<Self, Self::Error> {
        Self::from_millis(millis).ok_or(IntervalOutOfRange(millis))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Rejected interval, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalOutOfRange(pub u64);

impl fmt::Display for IntervalOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interval {}ms outside {}..={}ms",
            self.0,
            Interval::MIN_MILLIS,
            Interval::MAX_MILLIS
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IntervalOutOfRange {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Interval::from_millis(100).map(|i| i.as_millis()), Some(100));
        assert_eq!(
            Interval::from_millis(3_600_000).map(|i| i.as_millis()),
            Some(3_600_000)
        );
    }

    #[test]
    fn rejects_outside_bounds() {
        assert!(Interval::from_millis(0).is_none());
        assert!(Interval::from_millis(99).is_none());
        assert!(Interval::from_millis(3_600_001).is_none());
        assert!(Interval::from_millis(u64::MAX).is_none());
    }

    #[test]
    fn from_secs_truncates_to_millis() {
        assert_eq!(Interval::from_secs_f64(2.0).unwrap().as_millis(), 2000);
        assert_eq!(Interval::from_secs_f64(0.1).unwrap().as_millis(), 100);
        assert_eq!(Interval::from_secs_f64(1.2345).unwrap().as_millis(), 1234);
        assert!(Interval::from_secs_f64(0.0999).is_none());
        assert_eq!(Interval::from_secs_f64(3600.0).unwrap().as_millis(), 3_600_000);
        assert!(Interval::from_secs_f64(3600.001).is_none());
    }

    #[test]
    fn from_secs_rejects_non_finite_and_negative() {
        assert!(Interval::from_secs_f64(f64::NAN).is_none());
        assert!(Interval::from_secs_f64(f64::INFINITY).is_none());
        assert!(Interval::from_secs_f64(-1.0).is_none());
    }

    #[test]
    fn default_is_two_seconds() {
        assert_eq!(Interval::default().as_duration(), Duration::from_secs(2));
    }

    #[test]
    fn try_from_reports_rejected_value() {
        assert_eq!(Interval::try_from(50), Err(IntervalOutOfRange(50)));
        assert_eq!(Interval::try_from(500).map(u64::from), Ok(500));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_millis_with_range_check() {
        let interval = Interval::from_millis(1500).unwrap();
        assert_eq!(serde_json::to_string(&interval).unwrap(), "1500");

        let parsed: Interval = serde_json::from_str("250").unwrap();
        assert_eq!(parsed.as_millis(), 250);

        assert!(serde_json::from_str::<Interval>("50").is_err());
        assert!(serde_json::from_str::<Interval>("3600001").is_err());
        assert!(serde_json::from_str::<Interval>("-1").is_err());
    }
}

use std::time::Duration;

use anyhow::{bail, Result};
use memwatch_sdk::Interval;

/// Suffix to milliseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ms", 1.0),
    ("s", 1_000.0),
    ("m", 60_000.0),
    ("h", 3_600_000.0),
];

/// Parse duration strings like "500ms", "2s", "1.5m".
///
/// A bare number is seconds, matching the `interval` setting.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            return millis(val_str, *multiplier, s);
        }
    }

    millis(s, 1_000.0, s)
}

fn millis(val_str: &str, multiplier: f64, original: &str) -> Result<Duration> {
    let val: f64 = match val_str.trim().parse() {
        Ok(val) => val,
        Err(_) => bail!("Unknown duration format: {}", original),
    };
    if !val.is_finite() || val < 0.0 {
        bail!("Duration must be a non-negative number: {}", original);
    }
    Ok(Duration::from_millis((val * multiplier) as u64))
}

/// Parse a sampling interval, rejecting values outside 100ms..=1h.
pub fn parse_interval(s: &str) -> Result<Interval> {
    let d = parse_duration(s)?;
    let millis = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
    Ok(Interval::try_from(millis)?)
}

/// Parse a polling period, which must be non-zero.
pub fn parse_poll_period(s: &str) -> Result<Duration> {
    let d = parse_duration(s)?;
    if d.is_zero() {
        bail!("Polling period must be greater than zero: {}", s.trim());
    }
    Ok(d)
}

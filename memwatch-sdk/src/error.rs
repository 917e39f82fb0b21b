//! Error types for the sampler.

use memwatch_types::IntervalOutOfRange;
use thiserror::Error;

/// Errors from converting a byte count into a reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Byte counts can't be negative; the sample source is broken.
    #[error("negative byte count: {0}")]
    NegativeByteCount(i64),
}

/// Errors from folding a raw setting into the configuration.
///
/// None of these are surfaced to the user. The setting is ignored and the
/// previous value is kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Interval outside 100ms..=1h.
    #[error(transparent)]
    IntervalOutOfRange(#[from] IntervalOutOfRange),

    /// Not one of B, KB, KiB, MB, MiB, GB, GiB.
    #[error("unknown unit: {0:?}")]
    UnknownUnit(String),

    /// Not one of `,` `-` ` ` or empty.
    #[error("unknown grouping separator: {0:?}")]
    UnknownSeparator(String),

    /// Value has the wrong type for the setting.
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// Setting name not recognised.
    #[error("unknown setting: {0}")]
    UnknownSetting(String),
}

/// Errors from a memory sample source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The target is gone (process exited, handle torn down).
    #[error("sample unavailable for {0}")]
    Unavailable(String),
}

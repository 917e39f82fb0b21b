//! Configuration - the settings every sampling tick reads.

use crate::{GroupingSeparator, Interval, Unit};

/// Sampling and display settings.
///
/// A `Configuration` is a plain value: it is replaced whole whenever a
/// setting changes, never patched in place while a tick is reading it.
///
/// # Example
///
/// ```rust
/// use memwatch_types::{Configuration, GroupingSeparator, Interval, Unit};
///
/// let config = Configuration::default()
///     .with_unit(Unit::GiB)
///     .with_separator(GroupingSeparator::Comma)
///     .with_show_unit(false);
///
/// assert_eq!(config.interval, Interval::default());
/// assert_eq!(config.unit, Unit::GiB);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Configuration {
    /// Time between samples.
    pub interval: Interval,

    /// Unit readings are expressed in.
    pub unit: Unit,

    /// Whether to append the unit symbol to readings.
    pub show_unit: bool,

    /// Separator between groups of three digits.
    pub separator: GroupingSeparator,
}

impl Configuration {
    /// Create a configuration with every field given.
    pub const fn new(
        interval: Interval,
        unit: Unit,
        show_unit: bool,
        separator: GroupingSeparator,
    ) -> Self {
        Self {
            interval,
            unit,
            show_unit,
            separator,
        }
    }

    /// Replace the sampling interval.
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the display unit.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Show or hide the unit suffix.
    pub fn with_show_unit(mut self, show_unit: bool) -> Self {
        self.show_unit = show_unit;
        self
    }

    /// Replace the grouping separator.
    pub fn with_separator(mut self, separator: GroupingSeparator) -> Self {
        self.separator = separator;
        self
    }

    /// True if `other` differs from `self` in anything but the interval.
    pub fn format_differs(&self, other: &Configuration) -> bool {
        self.unit != other.unit
            || self.show_unit != other.show_unit
            || self.separator != other.separator
    }
}

impl Configuration {
    /// Two-second interval, MiB, suffix shown, space-grouped.
    pub const DEFAULT: Configuration = Configuration {
        interval: Interval::DEFAULT,
        unit: Unit::MiB,
        show_unit: true,
        separator: GroupingSeparator::Space,
    };
}

impl Default for Configuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

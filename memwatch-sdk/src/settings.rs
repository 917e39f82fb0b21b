//! Raw setting changes and how they fold into a [`Configuration`].
//!
//! Settings arrive from a [`ConfigStore`] one key at a time, as untyped
//! values. Each is validated on its own; a bad value is rejected without
//! touching the rest of the configuration.

use std::fmt;

use memwatch_types::{Configuration, GroupingSeparator, Interval, IntervalOutOfRange, Unit};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::ConfigError;

/// A recognised setting name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Seconds between samples, fractional allowed.
    Interval,
    /// Unit symbol, case-insensitive.
    Unit,
    /// Whether readings carry the unit symbol.
    ShowUnit,
    /// Digit grouping separator token.
    Separator,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::Interval,
        SettingKey::Unit,
        SettingKey::ShowUnit,
        SettingKey::Separator,
    ];

    /// Name used in settings files and change notifications.
    pub const fn name(&self) -> &'static str {
        match self {
            SettingKey::Interval => "interval",
            SettingKey::Unit => "unit",
            SettingKey::ShowUnit => "show_unit",
            SettingKey::Separator => "separator",
        }
    }

    /// Look up a setting by its exact name.
    pub fn parse(name: &str) -> Option<SettingKey> {
        SettingKey::ALL.into_iter().find(|key| key.name() == name)
    }

    /// The raw value `config` holds for this key, in the same shape a store
    /// would deliver it.
    pub fn raw_value(&self, config: &Configuration) -> Value {
        match self {
            SettingKey::Interval => {
                Value::from(config.interval.as_millis() as f64 / 1000.0)
            }
            SettingKey::Unit => Value::from(config.unit.symbol()),
            SettingKey::ShowUnit => Value::from(config.show_unit),
            SettingKey::Separator => Value::from(config.separator.as_str()),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One modified setting, as delivered by a [`ConfigStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
    pub key: String,
    pub value: Value,
}

impl ConfigChange {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Validate `value` for the setting `key` and return `current` with that
/// one field replaced.
///
/// # Example
///
/// ```rust
/// use memwatch_sdk::settings::apply_setting;
/// use memwatch_sdk::{Configuration, Unit};
/// use serde_json::json;
///
/// let config = Configuration::default();
/// let config = apply_setting(&config, "unit", &json!("gib")).unwrap();
/// assert_eq!(config.unit, Unit::GiB);
///
/// // Out of range intervals are rejected.
/// assert!(apply_setting(&config, "interval", &json!(7200)).is_err());
/// ```
pub fn apply_setting(
    current: &Configuration,
    key: &str,
    value: &Value,
) -> Result<Configuration, ConfigError> {
    let setting = SettingKey::parse(key).ok_or_else(|| ConfigError::UnknownSetting(key.to_string()))?;
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    let updated = match setting {
        SettingKey::Interval => {
            let secs = match value {
                Value::Number(n) => n.as_f64().ok_or_else(invalid)?,
                Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
                _ => return Err(invalid()),
            };
            current.with_interval(parse_interval_secs(secs)?)
        }
        SettingKey::Unit => {
            let symbol = value.as_str().ok_or_else(invalid)?;
            let unit = Unit::parse(symbol).ok_or_else(|| ConfigError::UnknownUnit(symbol.to_string()))?;
            current.with_unit(unit)
        }
        SettingKey::ShowUnit => {
            let show = match value {
                Value::Bool(b) => *b,
                Value::String(s) if s.eq_ignore_ascii_case("true") => true,
                Value::String(s) if s.eq_ignore_ascii_case("false") => false,
                _ => return Err(invalid()),
            };
            current.with_show_unit(show)
        }
        SettingKey::Separator => {
            let token = value.as_str().ok_or_else(invalid)?;
            let separator = GroupingSeparator::parse(token)
                .ok_or_else(|| ConfigError::UnknownSeparator(token.to_string()))?;
            current.with_separator(separator)
        }
    };

    Ok(updated)
}

fn parse_interval_secs(secs: f64) -> Result<Interval, ConfigError> {
    Interval::from_secs_f64(secs).ok_or_else(|| {
        let millis = if secs.is_finite() && secs > 0.0 {
            (secs * 1000.0) as u64
        } else {
            0
        };
        ConfigError::IntervalOutOfRange(IntervalOutOfRange(millis))
    })
}

/// A configuration backend that reports changes one setting at a time.
///
/// `get` is read once when a front end starts. After that the sampler only
/// sees what `poll_changes` hands it.
pub trait ConfigStore: Send {
    /// The full configuration as currently stored. Invalid stored values are
    /// replaced by defaults.
    fn get(&self) -> Configuration;

    /// Changes since the previous call, one entry per modified setting.
    /// Returns an empty vec when nothing changed.
    fn poll_changes(&mut self) -> Vec<ConfigChange>;
}

/// A [`ConfigStore`] fed by a channel.
///
/// Useful for embedding the sampler where the host already has its own
/// preference system: forward its notifications into the sender.
///
/// # Example
///
/// ```rust
/// use memwatch_sdk::settings::{ChannelStore, ConfigChange, ConfigStore};
/// use memwatch_sdk::Configuration;
///
/// let (tx, mut store) = ChannelStore::new(Configuration::default());
/// tx.send(ConfigChange::new("unit", "KB")).unwrap();
///
/// assert_eq!(store.poll_changes().len(), 1);
/// assert!(store.poll_changes().is_empty());
/// ```
#[derive(Debug)]
pub struct ChannelStore {
    current: Configuration,
    receiver: mpsc::UnboundedReceiver<ConfigChange>,
}

impl ChannelStore {
    /// Create a store starting at `initial`, plus the sender that feeds it.
    pub fn new(initial: Configuration) -> (mpsc::UnboundedSender<ConfigChange>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Self {
            current: initial,
            receiver: rx,
        };
        (tx, store)
    }
}

impl ConfigStore for ChannelStore {
    fn get(&self) -> Configuration {
        self.current
    }

    fn poll_changes(&mut self) -> Vec<ConfigChange> {
        let mut changes = Vec::new();
        while let Ok(change) = self.receiver.try_recv() {
            if let Ok(updated) = apply_setting(&self.current, &change.key, &change.value) {
                self.current = updated;
            }
            changes.push(change);
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interval_accepts_seconds_as_number_or_string() {
        let base = Configuration::default();

        let c = apply_setting(&base, "interval", &json!(5)).unwrap();
        assert_eq!(c.interval.as_millis(), 5000);

        let c = apply_setting(&base, "interval", &json!("0.25")).unwrap();
        assert_eq!(c.interval.as_millis(), 250);

        let c = apply_setting(&base, "interval", &json!(0.1)).unwrap();
        assert_eq!(c.interval.as_millis(), 100);
    }

    #[test]
    fn interval_out_of_range_is_rejected() {
        let base = Configuration::default();

        assert_eq!(
            apply_setting(&base, "interval", &json!(0.05)),
            Err(ConfigError::IntervalOutOfRange(IntervalOutOfRange(50)))
        );
        assert!(apply_setting(&base, "interval", &json!(3600.5)).is_err());
        assert!(apply_setting(&base, "interval", &json!(-1)).is_err());
        assert!(apply_setting(&base, "interval", &json!("soon")).is_err());
        assert!(apply_setting(&base, "interval", &json!(true)).is_err());
    }

    #[test]
    fn unit_is_case_insensitive() {
        let base = Configuration::default();
        let c = apply_setting(&base, "unit", &json!("kib")).unwrap();
        assert_eq!(c.unit, Unit::KiB);

        assert_eq!(
            apply_setting(&base, "unit", &json!("TB")),
            Err(ConfigError::UnknownUnit("TB".to_string()))
        );
        assert!(apply_setting(&base, "unit", &json!(3)).is_err());
    }

    #[test]
    fn show_unit_accepts_bool_and_string() {
        let base = Configuration::default();
        assert!(!apply_setting(&base, "show_unit", &json!(false)).unwrap().show_unit);
        assert!(!apply_setting(&base, "show_unit", &json!("FALSE")).unwrap().show_unit);
        assert!(apply_setting(&base.with_show_unit(false), "show_unit", &json!("true"))
            .unwrap()
            .show_unit);
        assert!(apply_setting(&base, "show_unit", &json!(1)).is_err());
    }

    #[test]
    fn separator_accepts_only_known_tokens() {
        let base = Configuration::default();
        let c = apply_setting(&base, "separator", &json!("")).unwrap();
        assert_eq!(c.separator, GroupingSeparator::None);

        let c = apply_setting(&base, "separator", &json!(",")).unwrap();
        assert_eq!(c.separator, GroupingSeparator::Comma);

        assert_eq!(
            apply_setting(&base, "separator", &json!(".")),
            Err(ConfigError::UnknownSeparator(".".to_string()))
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let base = Configuration::default();
        assert_eq!(
            apply_setting(&base, "colour", &json!("red")),
            Err(ConfigError::UnknownSetting("colour".to_string()))
        );
    }

    #[test]
    fn rejected_setting_leaves_other_fields_alone() {
        let base = Configuration::default().with_unit(Unit::GB);
        let c = apply_setting(&base, "separator", &json!("-")).unwrap();
        assert_eq!(c.unit, Unit::GB);
        assert_eq!(c.interval, base.interval);
    }

    #[test]
    fn raw_value_round_trips() {
        let config = Configuration::default()
            .with_unit(Unit::KB)
            .with_show_unit(false)
            .with_separator(GroupingSeparator::Hyphen)
            .with_interval(Interval::from_millis(1500).unwrap());

        let mut rebuilt = Configuration::default();
        for key in SettingKey::ALL {
            rebuilt = apply_setting(&rebuilt, key.name(), &key.raw_value(&config)).unwrap();
        }
        assert_eq!(rebuilt, config);
    }

    #[test]
    fn channel_store_tracks_valid_changes() {
        let (tx, mut store) = ChannelStore::new(Configuration::default());

        tx.send(ConfigChange::new("unit", "GiB")).unwrap();
        tx.send(ConfigChange::new("interval", 99_999)).unwrap();

        let changes = store.poll_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(store.get().unit, Unit::GiB);
        assert_eq!(store.get().interval, Interval::default());
    }
}

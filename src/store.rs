//! Settings file store.
//!
//! Reads sampler settings from a file (TOML, JSON, YAML, anything the
//! `config` crate recognises by extension) layered under `MEMWATCH_*`
//! environment variables, and reports per-key changes when the file is
//! rewritten.
//!
//! ```toml
//! interval = 2        # seconds, fractional allowed
//! unit = "MiB"        # B, KB, KiB, MB, MiB, GB, GiB
//! show_unit = true
//! separator = " "     # ",", "-", " " or ""
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;
use config::{Config, Environment, File};
use memwatch_sdk::settings::{apply_setting, SettingKey};
use memwatch_sdk::{ConfigChange, ConfigStore, Configuration};
use serde_json::Value;
use tracing::warn;

/// Prefix for environment overrides, e.g. `MEMWATCH_UNIT=GiB`.
pub const ENV_PREFIX: &str = "MEMWATCH";

/// A [`ConfigStore`] backed by a settings file.
///
/// The store tracks the file's modification time and only re-reads it when
/// the file has been updated. A file that disappears or fails to parse keeps
/// the last good values.
#[derive(Debug)]
pub struct SettingsFile {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    raw: BTreeMap<String, Value>,
    last_error: Option<String>,
}

impl SettingsFile {
    /// Open a settings file. A missing file is fine (all defaults); one that
    /// exists but can't be parsed is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let last_modified = modified_time(&path);
        let raw = load_raw(&path)?;
        Ok(Self {
            path,
            last_modified,
            raw,
            last_error: None,
        })
    }

    /// Returns the path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The error from the last failed re-read, if any.
    pub fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn reload(&mut self) -> Option<BTreeMap<String, Value>> {
        match load_raw(&self.path) {
            Ok(raw) => {
                self.last_error = None;
                Some(raw)
            }
            Err(e) => {
                warn!("Keeping previous settings, failed to read {}: {}", self.path.display(), e);
                self.last_error = Some(e.to_string());
                None
            }
        }
    }
}

impl ConfigStore for SettingsFile {
    fn get(&self) -> Configuration {
        let mut config = Configuration::default();
        for (key, value) in &self.raw {
            match apply_setting(&config, key, value) {
                Ok(updated) => config = updated,
                Err(e) => warn!("Ignoring {} in {}: {}", key, self.path.display(), e),
            }
        }
        config
    }

    fn poll_changes(&mut self) -> Vec<ConfigChange> {
        let current_modified = modified_time(&self.path);

        // Check if file has been modified since last read
        let file_changed = match (&self.last_modified, &current_modified) {
            (None, None) => false,
            (None, Some(_)) => true,  // File appeared
            (Some(_), None) => false, // File disappeared, don't update
            (Some(last), Some(current)) => current > last,
        };

        if !file_changed {
            return Vec::new();
        }

        let Some(raw) = self.reload() else {
            return Vec::new();
        };
        self.last_modified = current_modified;

        let defaults = Configuration::default();
        let changes = SettingKey::ALL
            .into_iter()
            .filter_map(|key| {
                let name = key.name();
                match (self.raw.get(name), raw.get(name)) {
                    (old, Some(new)) if old != Some(new) => Some(ConfigChange::new(name, new.clone())),
                    // Removed from the file: back to the default.
                    (Some(_), None) => Some(ConfigChange::new(name, key.raw_value(&defaults))),
                    _ => None,
                }
            })
            .collect();

        self.raw = raw;
        changes
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

/// Read every known setting from the file and the environment.
fn load_raw(path: &Path) -> Result<BTreeMap<String, Value>> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()?;

    let raw = SettingKey::ALL
        .into_iter()
        .filter_map(|key| {
            config
                .get::<Value>(key.name())
                .ok()
                .map(|value| (key.name().to_string(), value))
        })
        .collect();

    Ok(raw)
}

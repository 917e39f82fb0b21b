//! Wiring between the command line, the settings store and the sampler.

use std::time::Duration;

use anyhow::Result;
use memwatch_sdk::format::format_bytes;
use memwatch_sdk::{
    Configuration, GroupingSeparator, Interval, MemorySampleSource, Sampler, SampleError, Unit,
};
use tracing::info;

use crate::store::SettingsFile;

/// Settings given on the command line. They win over the settings file's
/// initial values; later edits to the file still apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub interval: Option<Interval>,
    pub unit: Option<Unit>,
    pub separator: Option<GroupingSeparator>,
    pub hide_unit: bool,
}

impl Overrides {
    pub fn apply(&self, mut config: Configuration) -> Configuration {
        if let Some(interval) = self.interval {
            config = config.with_interval(interval);
        }
        if let Some(unit) = self.unit {
            config = config.with_unit(unit);
        }
        if let Some(separator) = self.separator {
            config = config.with_separator(separator);
        }
        if self.hide_unit {
            config = config.with_show_unit(false);
        }
        config
    }
}

/// Sample every target once, without timers.
pub fn read_once(
    source: &dyn MemorySampleSource,
    targets: &[String],
    config: &Configuration,
) -> Vec<(String, Result<String, SampleError>)> {
    targets
        .iter()
        .map(|target| {
            let reading = source
                .sample(target)
                .map(|bytes| format_bytes(bytes, config));
            (target.clone(), reading)
        })
        .collect()
}

/// Monitor `targets` until Ctrl-C or until every target is gone.
pub async fn run(
    sampler: Sampler,
    targets: &[String],
    store: Option<SettingsFile>,
    watch_every: Duration,
) -> Result<()> {
    if let Some(store) = store {
        info!("Watching {} for changes", store.path().display());
        sampler.follow(store, watch_every);
    }

    for target in targets {
        sampler.start(target);
    }

    let mut check = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            _ = check.tick() => {
                if all_inert(&sampler, targets) {
                    info!("Every monitored target is gone");
                    break;
                }
            }
        }
    }

    sampler.shutdown();
    Ok(())
}

fn all_inert(sampler: &Sampler, targets: &[String]) -> bool {
    targets.iter().all(|target| {
        sampler
            .handle(target)
            .map_or(true, |handle| handle.is_inert())
    })
}

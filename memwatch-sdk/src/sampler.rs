//! The Sampler: owns one monitor per target and the shared configuration.

use std::sync::Arc;
use std::time::Duration;

use memwatch_types::{Configuration, Interval};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::handle::MonitorHandle;
use crate::output::Output;
use crate::settings::{apply_setting, ConfigStore};
use crate::source::MemorySampleSource;
use crate::state::SharedState;

/// Lower bound for [`Sampler::follow`]'s polling period.
const MIN_POLL_PERIOD: Duration = Duration::from_millis(10);

/// The main entry point for sampling memory.
///
/// A Sampler keeps one [`MonitorHandle`] per monitored target. Each handle
/// samples once when started, then again every configured interval, and
/// publishes the formatted reading to every output.
///
/// Dropping the sampler stops every handle.
///
/// # Example
///
/// ```rust,no_run
/// use memwatch_sdk::{Output, ProcessMemorySource, Sampler};
///
/// #[tokio::main]
/// async fn main() {
///     let sampler = Sampler::builder(ProcessMemorySource::new())
///         .output(Output::terminal())
///         .build();
///
///     // Sample this process
///     let handle = sampler.start("self");
///
///     // Keep the application running
///     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
///     handle.stop();
/// }
/// ```
#[derive(Debug)]
pub struct Sampler {
    shared: Arc<SharedState>,
}

impl Sampler {
    /// Create a builder around the source every handle samples from.
    pub fn builder(source: impl MemorySampleSource + 'static) -> SamplerBuilder {
        SamplerBuilder::new(source)
    }

    /// Start monitoring `target`.
    ///
    /// Takes one sample immediately, then arms the recurring timer at the
    /// current interval. If that first sample fails the returned handle is
    /// already inert and no timer is armed.
    ///
    /// A live handle already registered for `target` is stopped first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, target: &str) -> MonitorHandle {
        let handle = MonitorHandle::new(target, self.shared.clone());
        let previous = self
            .shared
            .handles
            .write()
            .insert(target.to_string(), handle.clone());
        if let Some(previous) = previous {
            previous.stop();
        }

        if handle.tick() {
            let period = self.shared.config().interval.as_duration();
            arm_at_current(&self.shared, &handle, period);
            info!("Monitoring {} every {:?}", target, period);
        }

        handle
    }

    /// Stop monitoring `target`.
    ///
    /// Returns `true` if the target had a handle. Stopping an unknown or
    /// already stopped target is a no-op.
    pub fn stop(&self, target: &str) -> bool {
        let handle = self.shared.handles.write().remove(target);
        match handle {
            Some(handle) => handle.stop(),
            None => false,
        }
    }

    /// Stop every handle.
    pub fn shutdown(&self) {
        self.shared.close();
        let handles = std::mem::take(&mut *self.shared.handles.write());
        for handle in handles.into_values() {
            handle.stop();
        }
    }

    /// Replace the whole configuration.
    ///
    /// If the interval changed, every active handle is re-armed so its next
    /// tick fires one full new interval from now. Format changes take effect
    /// on each handle's next tick without touching its timer.
    pub fn reconfigure(&self, config: Configuration) {
        let result = self
            .shared
            .update_config(|_| Ok::<_, ConfigError>(config));
        if let Ok((old, new)) = result {
            self.after_update(&old, &new);
        }
    }

    /// Change only the interval. Out-of-range values are rejected and the
    /// previous interval is kept.
    pub fn set_interval_millis(&self, millis: u64) -> Result<(), ConfigError> {
        let interval = Interval::try_from(millis)?;
        let (old, new) = self
            .shared
            .update_config(|c| Ok::<_, ConfigError>(c.with_interval(interval)))?;
        self.after_update(&old, &new);
        Ok(())
    }

    /// Fold one raw setting change into the configuration.
    ///
    /// This is the change-notification entry point for a [`ConfigStore`].
    /// Invalid values are rejected with the previous setting kept. Returns
    /// whether the configuration changed.
    pub fn apply_change(&self, key: &str, value: &Value) -> Result<bool, ConfigError> {
        apply_change(&self.shared, key, value)
    }

    /// Poll `store` every `poll_every` and apply whatever changed.
    ///
    /// Periods shorter than 10ms, including zero, are raised to 10ms.
    ///
    /// Rejected settings are logged at debug level and otherwise ignored.
    /// The task ends when the sampler shuts down.
    pub fn follow<S>(&self, mut store: S, poll_every: Duration) -> JoinHandle<()>
    where
        S: ConfigStore + 'static,
    {
        let shared = self.shared.clone();
        let poll_every = poll_every.max(MIN_POLL_PERIOD);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_every);
            loop {
                ticker.tick().await;
                if shared.is_closed() {
                    break;
                }

                for change in store.poll_changes() {
                    match apply_change(&shared, &change.key, &change.value) {
                        Ok(true) => debug!("Applied setting {} = {}", change.key, change.value),
                        Ok(false) => {}
                        Err(e) => debug!("Ignoring setting {} = {}: {}", change.key, change.value, e),
                    }
                }
            }
        })
    }

    /// The current configuration.
    pub fn config(&self) -> Configuration {
        self.shared.config()
    }

    /// Handle registered for `target`, if any.
    pub fn handle(&self, target: &str) -> Option<MonitorHandle> {
        self.shared.handles.read().get(target).cloned()
    }

    /// Registered targets, including ones whose handle has gone inert after a
    /// failed sample but hasn't been stopped yet.
    pub fn targets(&self) -> Vec<String> {
        self.shared.handles.read().keys().cloned().collect()
    }

    fn after_update(&self, old: &Configuration, new: &Configuration) {
        rearm_all(&self.shared, old, new);
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn apply_change(shared: &SharedState, key: &str, value: &Value) -> Result<bool, ConfigError> {
    let (old, new) = shared.update_config(|c| apply_setting(c, key, value))?;
    rearm_all(shared, &old, &new);
    Ok(old != new)
}

/// Re-arm every handle if the interval changed.
///
/// Concurrent updates may finish in any order, so the period comes from the
/// shared configuration as it is now rather than from `new`.
fn rearm_all(shared: &SharedState, old: &Configuration, new: &Configuration) {
    if old.format_differs(new) {
        debug!("Reading format changed, applies from the next tick");
    }
    if old.interval == new.interval {
        return;
    }

    let period = shared.config().interval.as_duration();
    for handle in shared.handles.read().values() {
        handle.rearm(period);
    }
}

/// Arm a freshly started handle, then catch up with any interval change
/// that landed while it was still unarmed and so was skipped by
/// [`rearm_all`].
fn arm_at_current(shared: &SharedState, handle: &MonitorHandle, period: Duration) {
    handle.arm(period);
    let current = shared.config().interval.as_duration();
    if current != period {
        handle.rearm(current);
    }
}

/// Builder for configuring a Sampler.
pub struct SamplerBuilder {
    source: Box<dyn MemorySampleSource>,
    outputs: Vec<Output>,
    config: Option<Configuration>,
}

impl SamplerBuilder {
    /// Create a new builder.
    pub fn new(source: impl MemorySampleSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            outputs: Vec::new(),
            config: None,
        }
    }

    /// Add an output destination.
    ///
    /// Multiple outputs can be added; readings will be published to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the initial configuration.
    ///
    /// Defaults to [`Configuration::default()`] if not specified.
    pub fn config(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the sampler.
    pub fn build(self) -> Sampler {
        Sampler {
            shared: Arc::new(SharedState::new(
                self.config.unwrap_or_default(),
                self.source,
                self.outputs,
            )),
        }
    }
}

impl std::fmt::Debug for SamplerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplerBuilder")
            .field("outputs", &self.outputs)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

//! State shared between the sampler, its handles and their timer tasks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use memwatch_types::Configuration;
use parking_lot::RwLock;

use crate::handle::MonitorHandle;
use crate::output::{DisplaySink, Output};
use crate::source::MemorySampleSource;

/// Everything a tick needs, behind one `Arc`.
pub(crate) struct SharedState {
    /// Replaced whole on every change. Ticks copy it out under the read lock,
    /// so they see either the old or the new value, never a mix.
    config: RwLock<Configuration>,
    pub(crate) source: Box<dyn MemorySampleSource>,
    outputs: Vec<Output>,
    pub(crate) handles: RwLock<BTreeMap<String, MonitorHandle>>,
    closed: AtomicBool,
}

impl SharedState {
    pub(crate) fn new(
        config: Configuration,
        source: Box<dyn MemorySampleSource>,
        outputs: Vec<Output>,
    ) -> Self {
        Self {
            config: RwLock::new(config),
            source,
            outputs,
            handles: RwLock::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Copy of the current configuration.
    pub(crate) fn config(&self) -> Configuration {
        *self.config.read()
    }

    /// Replace the configuration with whatever `update` derives from the
    /// current one. Returns `(old, new)`; nothing is written on error.
    pub(crate) fn update_config<E>(
        &self,
        update: impl FnOnce(&Configuration) -> Result<Configuration, E>,
    ) -> Result<(Configuration, Configuration), E> {
        let mut config = self.config.write();
        let old = *config;
        let new = update(&old)?;
        *config = new;
        Ok((old, new))
    }

    pub(crate) fn publish(&self, target: &str, text: &str) {
        for output in &self.outputs {
            output.publish(target, text);
        }
    }

    pub(crate) fn clear(&self, target: &str) {
        for output in &self.outputs {
            output.clear(target);
        }
    }

    /// Remove `handle` from the registry, unless its slot has already been
    /// taken over by a newer handle for the same target.
    pub(crate) fn unregister(&self, handle: &MonitorHandle) {
        let mut handles = self.handles.write();
        if handles
            .get(handle.target())
            .is_some_and(|registered| registered.same_handle(handle))
        {
            handles.remove(handle.target());
        }
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("config", &*self.config.read())
            .field("outputs", &self.outputs)
            .field("targets", &self.handles.read().keys().collect::<Vec<_>>())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SampleError};
    use memwatch_types::Unit;

    fn state() -> Arc<SharedState> {
        let source = |_: &str| -> Result<u64, SampleError> { Ok(0) };
        Arc::new(SharedState::new(
            Configuration::default(),
            Box::new(source),
            Vec::new(),
        ))
    }

    #[test]
    fn update_config_swaps_whole_value() {
        let state = state();
        let (old, new) = state
            .update_config(|c| Ok::<_, ConfigError>(c.with_unit(Unit::KB)))
            .unwrap();

        assert_eq!(old.unit, Unit::MiB);
        assert_eq!(new.unit, Unit::KB);
        assert_eq!(state.config().unit, Unit::KB);
    }

    #[test]
    fn failed_update_keeps_previous_value() {
        let state = state();
        let result = state.update_config(|_| Err(ConfigError::UnknownSetting("x".into())));

        assert!(result.is_err());
        assert_eq!(state.config(), Configuration::default());
    }

    #[test]
    fn concurrent_readers_never_see_partial_config() {
        use std::thread;

        let state = state();
        let a = Configuration::default();
        let b = Configuration::default()
            .with_unit(Unit::GB)
            .with_show_unit(false);

        let writer = {
            let state = state.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    let next = if i % 2 == 0 { b } else { a };
                    let _ = state.update_config(|_| Ok::<_, ConfigError>(next));
                }
            })
        };

        for _ in 0..1000 {
            let seen = state.config();
            assert!(seen == a || seen == b);
        }

        writer.join().unwrap();
    }

    #[test]
    fn close_is_sticky() {
        let state = state();
        assert!(!state.is_closed());
        state.close();
        assert!(state.is_closed());
    }
}

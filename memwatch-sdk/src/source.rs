//! Memory sample sources.

use crate::error::SampleError;

/// Produces the raw resident byte count for a monitored target.
///
/// Called once per tick from the target's timer task, so it must not block
/// for long. Return [`SampleError::Unavailable`] once the target is gone;
/// the sampler then retires that target's handle.
///
/// Any `Fn(&str) -> Result<u64, SampleError>` closure is a source:
///
/// ```rust
/// use memwatch_sdk::{MemorySampleSource, SampleError};
///
/// let fixed = |_target: &str| -> Result<u64, SampleError> { Ok(64 * 1024 * 1024) };
/// assert_eq!(fixed.sample("anything").unwrap(), 67_108_864);
/// ```
pub trait MemorySampleSource: Send + Sync {
    /// Take one sample for `target`.
    fn sample(&self, target: &str) -> Result<u64, SampleError>;
}

impl<F> MemorySampleSource for F
where
    F: Fn(&str) -> Result<u64, SampleError> + Send + Sync,
{
    fn sample(&self, target: &str) -> Result<u64, SampleError> {
        self(target)
    }
}

#[cfg(feature = "process")]
pub use process::ProcessMemorySource;

#[cfg(feature = "process")]
mod process {
    use parking_lot::Mutex;
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

    use super::MemorySampleSource;
    use crate::error::SampleError;

    /// Resident set size of an OS process, read through sysinfo.
    ///
    /// Target ids are either `"self"` (this process) or a numeric PID.
    pub struct ProcessMemorySource {
        system: Mutex<System>,
    }

    impl ProcessMemorySource {
        /// Target id naming the current process.
        pub const SELF: &'static str = "self";

        pub fn new() -> Self {
            Self {
                system: Mutex::new(System::new()),
            }
        }

        fn resolve(target: &str) -> Option<Pid> {
            if target == Self::SELF {
                return sysinfo::get_current_pid().ok();
            }
            target.trim().parse::<u32>().ok().map(Pid::from_u32)
        }
    }

    impl Default for ProcessMemorySource {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for ProcessMemorySource {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ProcessMemorySource").finish_non_exhaustive()
        }
    }

    impl MemorySampleSource for ProcessMemorySource {
        fn sample(&self, target: &str) -> Result<u64, SampleError> {
            let pid = Self::resolve(target).ok_or_else(|| SampleError::Unavailable(target.to_string()))?;

            let mut system = self.system.lock();
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::nothing().with_memory(),
            );

            system
                .process(pid)
                .map(|process| process.memory())
                .ok_or_else(|| SampleError::Unavailable(target.to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn samples_own_process() {
            let source = ProcessMemorySource::new();
            let bytes = source.sample(ProcessMemorySource::SELF).unwrap();
            assert!(bytes > 0);
        }

        #[test]
        fn samples_own_process_by_pid() {
            let source = ProcessMemorySource::new();
            let pid = std::process::id().to_string();
            assert!(source.sample(&pid).unwrap() > 0);
        }

        #[test]
        fn unparseable_target_is_unavailable() {
            let source = ProcessMemorySource::new();
            assert_eq!(
                source.sample("window-1"),
                Err(SampleError::Unavailable("window-1".to_string()))
            );
        }

        #[test]
        fn missing_process_is_unavailable() {
            let source = ProcessMemorySource::new();
            // PIDs this high are never handed out on Linux, macOS or Windows.
            assert!(source.sample("4294967294").is_err());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_a_source() {
        let source = |target: &str| -> Result<u64, SampleError> {
            if target == "gone" {
                Err(SampleError::Unavailable(target.to_string()))
            } else {
                Ok(42)
            }
        };
        assert_eq!(source.sample("a"), Ok(42));
        assert!(source.sample("gone").is_err());
    }
}

//! Monitor handle: one timer per monitored target.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::format::format_bytes;
use crate::state::SharedState;

/// Lifecycle of a [`MonitorHandle`].
///
/// `Unarmed -> Active -> Inert`. `Inert` is terminal: restarting a target
/// creates a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Created, first sample not yet taken.
    Unarmed,
    /// Timer running.
    Active,
    /// Stopped, or retired after a failed sample.
    Inert,
}

const UNARMED: u8 = 0;
const ACTIVE: u8 = 1;
const FAILED: u8 = 2;
const STOPPED: u8 = 3;

/// What the timer task should be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Timer {
    Unarmed,
    Armed(Duration),
    Cancelled,
}

struct HandleInner {
    target: String,
    status: AtomicU8,
    generation: AtomicU64,
    timer: watch::Sender<Timer>,
    /// Held for the whole of a tick and of a stop, so a reading can never be
    /// published after the target was cleared.
    tick_lock: Mutex<()>,
    shared: Arc<SharedState>,
}

/// A handle for one monitored target.
///
/// Obtain a handle by calling `Sampler::start()`. Clones refer to the same
/// timer.
///
/// # Example
///
/// ```rust
/// use memwatch_sdk::{HandleState, Output, Sampler, SampleError};
///
/// # tokio_test::block_on(async {
/// let (output, _rx) = Output::channel(16);
/// let sampler = Sampler::builder(|_: &str| -> Result<u64, SampleError> { Ok(1 << 20) })
///     .output(output)
///     .build();
///
/// let handle = sampler.start("window-1");
/// assert_eq!(handle.state(), HandleState::Active);
///
/// handle.stop();
/// assert_eq!(handle.state(), HandleState::Inert);
/// # });
/// ```
#[derive(Clone)]
pub struct MonitorHandle {
    inner: Arc<HandleInner>,
}

impl MonitorHandle {
    pub(crate) fn new(target: &str, shared: Arc<SharedState>) -> Self {
        let (timer, _) = watch::channel(Timer::Unarmed);
        Self {
            inner: Arc::new(HandleInner {
                target: target.to_string(),
                status: AtomicU8::new(UNARMED),
                generation: AtomicU64::new(0),
                timer,
                tick_lock: Mutex::new(()),
                shared,
            }),
        }
    }

    /// The monitored target's id.
    pub fn target(&self) -> &str {
        &self.inner.target
    }

    /// Where the handle is in its lifecycle.
    pub fn state(&self) -> HandleState {
        match self.inner.status.load(Ordering::Acquire) {
            UNARMED => HandleState::Unarmed,
            ACTIVE => HandleState::Active,
            _ => HandleState::Inert,
        }
    }

    /// `true` once stopped or retired after a failed sample.
    pub fn is_inert(&self) -> bool {
        self.state() == HandleState::Inert
    }

    /// Period the timer is currently armed with, if any.
    pub fn period(&self) -> Option<Duration> {
        match *self.inner.timer.borrow() {
            Timer::Armed(period) => Some(period),
            Timer::Unarmed | Timer::Cancelled => None,
        }
    }

    /// Number of times the timer has been armed. Format-only configuration
    /// changes leave it alone; interval changes bump it.
    pub fn timer_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Cancel the timer and clear the target's display.
    ///
    /// Returns `false` if the handle was already stopped; the display is
    /// cleared only once.
    pub fn stop(&self) -> bool {
        let _tick = self.inner.tick_lock.lock();
        let previous = self.inner.status.swap(STOPPED, Ordering::AcqRel);
        if previous == STOPPED {
            return false;
        }

        self.inner.timer.send_replace(Timer::Cancelled);
        self.inner.shared.clear(&self.inner.target);
        self.inner.shared.unregister(self);
        info!("Stopped monitoring {}", self.inner.target);
        true
    }

    pub(crate) fn same_handle(&self, other: &MonitorHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Sample, format and publish once.
    ///
    /// Returns `false` once the handle is inert, either already or because
    /// this sample failed.
    pub(crate) fn tick(&self) -> bool {
        let _tick = self.inner.tick_lock.lock();
        if matches!(self.inner.status.load(Ordering::Acquire), FAILED | STOPPED) {
            return false;
        }

        let shared = &self.inner.shared;
        let config = shared.config();
        match shared.source.sample(&self.inner.target) {
            Ok(bytes) => {
                let reading = format_bytes(bytes, &config);
                shared.publish(&self.inner.target, &reading);
                true
            }
            Err(e) => {
                warn!("Sampling {} failed, retiring its monitor: {}", self.inner.target, e);
                self.inner.status.store(FAILED, Ordering::Release);
                self.inner.timer.send_replace(Timer::Cancelled);
                false
            }
        }
    }

    /// Arm the timer for the first time and spawn its task.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn arm(&self, period: Duration) {
        if self
            .inner
            .status
            .compare_exchange(UNARMED, ACTIVE, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.timer.send_replace(Timer::Armed(period));

        let handle = self.clone();
        let control = self.inner.timer.subscribe();
        tokio::spawn(run_timer(handle, control));
    }

    /// Restart the timer with a new period if it differs from the armed one.
    /// The next tick fires one full `period` from now.
    pub(crate) fn rearm(&self, period: Duration) -> bool {
        if self.state() != HandleState::Active {
            return false;
        }

        let rearmed = self.inner.timer.send_if_modified(|timer| match timer {
            Timer::Armed(current) if *current != period => {
                *timer = Timer::Armed(period);
                true
            }
            _ => false,
        });

        if rearmed {
            self.inner.generation.fetch_add(1, Ordering::AcqRel);
            debug!("Re-armed {} at {:?}", self.inner.target, period);
        }
        rearmed
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("target", &self.inner.target)
            .field("state", &self.state())
            .field("period", &self.period())
            .finish()
    }
}

/// Timer task body. Runs until the handle is stopped or a tick fails.
async fn run_timer(handle: MonitorHandle, mut control: watch::Receiver<Timer>) {
    loop {
        let current = *control.borrow_and_update();
        let period = match current {
            Timer::Armed(period) => period,
            Timer::Cancelled => return,
            Timer::Unarmed => {
                if control.changed().await.is_err() {
                    return;
                }
                continue;
            }
        };

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !handle.tick() {
                        return;
                    }
                }
                changed = control.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // Pick up the new period (or the cancellation) above.
                    break;
                }
            }
        }
    }
}

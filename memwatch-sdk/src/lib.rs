//! # memwatch-sdk
//!
//! Periodic memory sampling with configurable formatting.
//!
//! A [`Sampler`] keeps one [`MonitorHandle`] per monitored target. Each
//! handle samples its target's resident memory once when started, then on a
//! recurring timer, and publishes a human-readable reading such as
//! `"512 MiB"` to the configured [`Output`]s. Settings can be changed while
//! everything is running: a new interval re-arms the timers, a new unit or
//! separator shows up on the next tick.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memwatch_sdk::{Configuration, Output, ProcessMemorySource, Sampler, Unit};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sampler = Sampler::builder(ProcessMemorySource::new())
//!         .output(Output::terminal())
//!         .config(Configuration::default().with_unit(Unit::MB))
//!         .build();
//!
//!     // One handle per monitored process
//!     sampler.start("self");
//!
//!     // Change settings live
//!     sampler.set_interval_millis(500).unwrap();
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//! }
//! ```
//!
//! ## Features
//!
//! - **Fail-soft**: a target whose sample fails is retired quietly; others keep going
//! - **Live reconfiguration**: interval, unit, suffix and grouping change without restart
//! - **Multiple outputs**: Terminal status line, file, channel, or custom sink
//! - **Pluggable sources**: sysinfo-backed process RSS, or any closure

mod handle;
mod output;
mod sampler;
mod source;
mod state;

pub mod error;
pub mod format;
pub mod settings;

pub use error::{ConfigError, FormatError, SampleError};
pub use handle::{HandleState, MonitorHandle};
pub use output::{Board, DisplayEvent, DisplaySink, Output};
pub use sampler::{Sampler, SamplerBuilder};
pub use settings::{ConfigChange, ConfigStore};
pub use source::MemorySampleSource;

#[cfg(feature = "process")]
pub use source::ProcessMemorySource;

// Re-export types for convenience
pub use memwatch_types::{Configuration, GroupingSeparator, Interval, Unit};

//! # memwatch
//!
//! Command-line front end for [`memwatch_sdk`]: shows the resident memory of
//! one or more processes on a single, continuously refreshed status line.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         memwatch                           │
//! │  ┌──────────┐    ┌───────────┐    ┌──────────────────────┐ │
//! │  │  store   │───▶│  Sampler  │───▶│ Output (terminal,    │ │
//! │  │(settings)│    │ (one timer│    │  file, channel)      │ │
//! │  └──────────┘    │ per target│    └──────────────────────┘ │
//! │                  └─────┬─────┘                             │
//! │                        ▼                                   │
//! │               ProcessMemorySource (sysinfo)                │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`store`]**: settings file + `MEMWATCH_*` environment, watched for edits
//! - **[`app`]**: command-line overrides and the run loop
//! - **[`duration`]**: parsing of `500ms` / `2s` style intervals
//!
//! ## Usage
//!
//! ```bash
//! # This process's own memory, default settings
//! memwatch
//!
//! # Two processes, in MB, refreshed twice a second
//! memwatch --pid 1234 --pid 5678 --unit MB --interval 500ms
//!
//! # Settings from a file that can be edited while running
//! memwatch --pid 1234 --config ~/.config/memwatch.toml
//! ```

pub mod app;
pub mod duration;
pub mod store;

pub use app::Overrides;
pub use store::SettingsFile;

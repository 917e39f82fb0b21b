//! # memwatch-types
//!
//! Value types shared by the memwatch sampler and its front ends: the unit a
//! reading is expressed in, the digit grouping separator, the sampling
//! interval and the [`Configuration`] that bundles them.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Valid by construction**: an [`Interval`] can never hold an out-of-range value
//! - **Optional serialization**: Enable the `serde` feature to read settings from files
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: Serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use memwatch_types::{Configuration, Interval, Unit};
//!
//! let config = Configuration::default()
//!     .with_interval(Interval::from_millis(500).unwrap())
//!     .with_unit(Unit::KiB);
//!
//! assert_eq!(config.unit.factor(), 1024);
//! assert!(Interval::from_millis(50).is_none());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod config;
mod interval;
mod separator;
mod unit;

pub use config::*;
pub use interval::*;
pub use separator::*;
pub use unit::*;

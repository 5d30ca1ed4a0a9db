// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Wraparound-safe kernel counter arithmetic and connection identity keys.
//!
//! The pure core (`address`, `counter`, `key`, `iostats`,
//! `connection_stats`) takes a current and a previous snapshot and returns
//! derived values; it keeps no state between calls. The remaining modules
//! are the thin collaborators an agent check needs around it.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

pub mod address;
pub mod check;
pub mod cli;
pub mod config;
pub mod connection;
pub mod connection_stats;
pub mod counter;
pub mod diskstats;
mod errors;
pub mod iostats;
pub mod key;
mod procfs;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export the public API
pub use address::Address;
pub use check::{Clock, IoCheck, MonotonicClock};
pub use connection::{
    ConnectionDirection, ConnectionFamily, ConnectionRecord, ConnectionType, IpTranslation,
};
pub use counter::{MAX_LONG, MAX_U32, delta};
pub use errors::{Error, Result};
pub use iostats::{DeviceIOSample, DeviceMetrics, IoSnapshot};
pub use key::{ConnectionKey, beautify_key, decode, encode};
pub use sink::{MetricKind, MetricSink};

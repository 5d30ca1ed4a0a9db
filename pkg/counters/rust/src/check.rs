// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! The I/O check: threads the previous snapshot and the clock through the
//! stateless iostat computation, once per tick.

use std::time::Instant;

use anyhow::Result;
use log::{debug, error};
use regex::Regex;

use crate::config::IoCheckConfig;
use crate::diskstats::SnapshotProvider;
use crate::iostats::{self, IoSnapshot};
use crate::sink::MetricSink;

/// Monotonic time source, in nanoseconds.
pub trait Clock {
    fn now_nanos(&self) -> u64;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_nanos(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

struct LastRun {
    timestamp_ms: u64,
    stats: IoSnapshot,
}

pub struct IoCheck<P, C> {
    provider: P,
    clock: C,
    blacklist: Option<Regex>,
    lowercase_device_tag: bool,
    last: Option<LastRun>,
}

impl<P: SnapshotProvider, C: Clock> IoCheck<P, C> {
    pub fn new(provider: P, clock: C, config: &IoCheckConfig) -> Result<Self> {
        Ok(IoCheck {
            provider,
            clock,
            blacklist: config.blacklist()?,
            lowercase_device_tag: config.lowercase_device_tag,
            last: None,
        })
    }

    fn is_blacklisted(&self, device: &str) -> bool {
        self.blacklist.as_ref().is_some_and(|re| re.is_match(device))
    }

    /// Samples the devices, submits their metrics and commits the sink.
    ///
    /// The sink is not committed when sampling fails.
    pub fn run(&mut self, sink: &mut dyn MetricSink) -> Result<()> {
        let mut stats = match self.provider.snapshot() {
            Ok(stats) => stats,
            Err(e) => {
                error!("system.IOCheck: could not retrieve io stats: {e:#}");
                return Err(e);
            }
        };
        stats.retain(|device, _| !self.is_blacklisted(device));

        // tick in millisecond
        let now = self.clock.now_nanos() / 1_000_000;
        let empty = IoSnapshot::new();
        let (elapsed_ms, previous) = match &self.last {
            Some(last) => (now.saturating_sub(last.timestamp_ms), &last.stats),
            None => {
                debug!("First run - only cumulative io stats are available.");
                (0, &empty)
            }
        };

        for device in iostats::compute(&stats, previous, elapsed_ms)? {
            let tags = device.tags(self.lowercase_device_tag);
            device.submit(sink, &tags);
        }

        self.last = Some(LastRun {
            timestamp_ms: now,
            stats,
        });
        sink.commit();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::iostats::{IO_R_S, IO_RKB_S, IO_UTIL};
    use crate::sink::Buffer;
    use crate::test_utils::{FakeClock, ScriptedProvider, device_sample, snapshot};

    fn sda(read_count: u64, read_bytes: u64) -> crate::DeviceIOSample {
        let mut s = device_sample("sda");
        s.read_count = read_count;
        s.read_bytes = read_bytes;
        s
    }

    #[test]
    fn test_two_ticks() {
        let provider = ScriptedProvider::new([
            snapshot([sda(1000, 5_000_000)]),
            snapshot([sda(1100, 5_500_000)]),
        ]);
        let clock = FakeClock::new([1_000_000_000, 2_000_000_000]);
        let mut check = IoCheck::new(provider, clock, &IoCheckConfig::default()).unwrap();
        let mut sink = Buffer::default();

        check.run(&mut sink).unwrap();
        assert_eq!(sink.get(IO_R_S).unwrap().value, 1000.0);
        assert!(sink.get(IO_RKB_S).is_none());
        assert_eq!(sink.commits, 1);
        sink.drain();

        check.run(&mut sink).unwrap();
        assert_eq!(sink.get(IO_R_S).unwrap().value, 1100.0);
        assert_eq!(sink.get(IO_RKB_S).unwrap().value, 488.28);
        assert_eq!(sink.commits, 2);
    }

    #[test]
    fn test_zero_elapsed_only_cumulative() {
        let provider = ScriptedProvider::new([
            snapshot([sda(1000, 5_000_000)]),
            snapshot([sda(1100, 5_500_000)]),
        ]);
        let clock = FakeClock::new([5_000_000, 5_000_000]);
        let mut check = IoCheck::new(provider, clock, &IoCheckConfig::default()).unwrap();
        let mut sink = Buffer::default();

        check.run(&mut sink).unwrap();
        sink.drain();
        check.run(&mut sink).unwrap();
        assert!(sink.get(IO_R_S).is_some());
        assert!(sink.get(IO_UTIL).is_none());
    }

    #[test]
    fn test_blacklist() {
        let provider = ScriptedProvider::new([snapshot([sda(1, 1), device_sample("loop0")])]);
        let config = IoCheckConfig {
            device_blacklist_re: Some("^loop".to_string()),
            lowercase_device_tag: false,
        };
        let mut check = IoCheck::new(provider, FakeClock::new([0]), &config).unwrap();
        let mut sink = Buffer::default();

        check.run(&mut sink).unwrap();
        assert!(!sink.metrics.is_empty());
        assert!(
            sink.metrics
                .iter()
                .all(|m| m.tags == vec!["device:sda".to_string()])
        );
    }

    #[test]
    fn test_provider_error_skips_commit() {
        let provider = ScriptedProvider::new(Vec::new());
        let mut check =
            IoCheck::new(provider, FakeClock::new([0]), &IoCheckConfig::default()).unwrap();
        let mut sink = Buffer::default();

        assert!(check.run(&mut sink).is_err());
        assert_eq!(sink.commits, 0);
        assert!(sink.metrics.is_empty());
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::default();
        let a = clock.now_nanos();
        let b = clock.now_nanos();
        assert!(b >= a);
    }
}

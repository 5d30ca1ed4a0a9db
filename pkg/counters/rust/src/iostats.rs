// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Per-device iostat metrics, aligned with what sysstat reports.
//!
//! See: https://www.xaprb.com/blog/2010/01/09/how-linux-iostat-computes-its-results/
//!      https://www.kernel.org/doc/Documentation/iostats.txt

use std::collections::HashMap;

use log::debug;

use crate::counter::{MAX_LONG, MAX_U32, delta};
use crate::errors::Result;
use crate::sink::MetricSink;

pub const KB: f64 = 1024.0;
pub const SECTOR_SIZE: i64 = 512;

pub const IO_R_S: &str = "system.io.r_s";
pub const IO_W_S: &str = "system.io.w_s";
pub const IO_RRQM_S: &str = "system.io.rrqm_s";
pub const IO_WRQM_S: &str = "system.io.wrqm_s";
pub const IO_RKB_S: &str = "system.io.rkb_s";
pub const IO_WKB_S: &str = "system.io.wkb_s";
pub const IO_AVG_RQ_SZ: &str = "system.io.avg_rq_sz";
pub const IO_AWAIT: &str = "system.io.await";
pub const IO_R_AWAIT: &str = "system.io.r_await";
pub const IO_W_AWAIT: &str = "system.io.w_await";
pub const IO_AVG_Q_SZ: &str = "system.io.avg_q_sz";
pub const IO_SVCTM: &str = "system.io.svctm";
pub const IO_UTIL: &str = "system.io.util";

/// Cumulative I/O counters of one block device, as read from the kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIOSample {
    pub name: String,
    /// Only used for tagging.
    pub label: String,
    pub read_count: u64,
    pub merged_read_count: u64,
    pub write_count: u64,
    pub merged_write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    /// Milliseconds spent reading. The kernel keeps this as 32 bits.
    pub read_time: u64,
    /// Milliseconds spent writing. The kernel keeps this as 32 bits.
    pub write_time: u64,
    pub iops_in_progress: u64,
    /// Milliseconds the device had I/O in flight.
    pub io_time: u64,
    pub weighted_io: u64,
}

/// Device name to its counters, for one tick.
pub type IoSnapshot = HashMap<String, DeviceIOSample>;

/// Metrics that need a previous sample and a non-empty time window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedIoMetrics {
    pub read_kbs: f64,
    pub write_kbs: f64,
    pub avg_request_size: f64,
    pub await_ms: f64,
    pub read_await_ms: f64,
    pub write_await_ms: f64,
    pub avg_queue_size: f64,
    pub service_time_ms: f64,
    pub util_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMetrics {
    pub device: String,
    pub label: String,
    pub read_count: u64,
    pub write_count: u64,
    pub merged_read_count: u64,
    pub merged_write_count: u64,
    /// `None` on a device's first observation or when no time elapsed.
    pub derived: Option<DerivedIoMetrics>,
}

impl DeviceMetrics {
    /// `device:<name>` plus `device_label:<label>` when the device has one.
    pub fn tags(&self, lowercase_device: bool) -> Vec<String> {
        let mut tags = Vec::with_capacity(2);
        if lowercase_device {
            tags.push(format!("device:{}", self.device.to_lowercase()));
        } else {
            tags.push(format!("device:{}", self.device));
        }
        if !self.label.is_empty() {
            tags.push(format!("device_label:{}", self.label));
        }
        tags
    }

    /// Submits every available metric of this device.
    ///
    /// The request counts are sent raw as rates: the aggregator derives the
    /// per-second value between flushes.
    pub fn submit(&self, sink: &mut dyn MetricSink, tags: &[String]) {
        sink.rate(IO_R_S, self.read_count as f64, tags);
        sink.rate(IO_W_S, self.write_count as f64, tags);
        sink.rate(IO_RRQM_S, self.merged_read_count as f64, tags);
        sink.rate(IO_WRQM_S, self.merged_write_count as f64, tags);

        let Some(d) = &self.derived else {
            return;
        };
        sink.gauge(IO_RKB_S, d.read_kbs, tags);
        sink.gauge(IO_WKB_S, d.write_kbs, tags);
        sink.gauge(IO_AVG_RQ_SZ, d.avg_request_size, tags);
        sink.gauge(IO_AWAIT, d.await_ms, tags);
        sink.gauge(IO_R_AWAIT, d.read_await_ms, tags);
        sink.gauge(IO_W_AWAIT, d.write_await_ms, tags);
        sink.gauge(IO_AVG_Q_SZ, d.avg_queue_size, tags);
        sink.gauge(IO_SVCTM, d.service_time_ms, tags);
        sink.gauge(IO_UTIL, d.util_percent, tags);
    }
}

/// Rounds to 2 decimals, halves away from zero.
pub fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

/// Computes the delta based metrics of one device over `elapsed_ms`.
///
/// Returns `None` when no time elapsed.
pub fn derive(
    current: &DeviceIOSample,
    last: &DeviceIOSample,
    elapsed_ms: u64,
) -> Result<Option<DerivedIoMetrics>> {
    if elapsed_ms == 0 {
        return Ok(None);
    }
    let elapsed = elapsed_ms as f64;
    let elapsed_s = elapsed / 1000.0;

    let read_bytes = delta(current.read_bytes, last.read_bytes, MAX_LONG)?;
    let write_bytes = delta(current.write_bytes, last.write_bytes, MAX_LONG)?;
    let weighted_io = delta(current.weighted_io, last.weighted_io, MAX_LONG)?;

    let reads = delta(current.read_count, last.read_count, MAX_LONG)?;
    let writes = delta(current.write_count, last.write_count, MAX_LONG)?;
    let read_time = delta(current.read_time, last.read_time, MAX_U32)?;
    let write_time = delta(current.write_time, last.write_time, MAX_U32)?;

    let read_await_ms = if reads != 0 {
        read_time as f64 / reads as f64
    } else {
        0.0
    };
    let write_await_ms = if writes != 0 {
        write_time as f64 / writes as f64
    } else {
        0.0
    };

    let ops = reads.saturating_add(writes);
    let (avg_request_size, await_ms) = if ops != 0 {
        let sectors = read_bytes.saturating_add(write_bytes) / SECTOR_SIZE;
        (
            sectors as f64 / ops as f64,
            read_time.saturating_add(write_time) as f64 / ops as f64,
        )
    } else {
        (0.0, 0.0)
    };

    // itv is the interval in 1/100th of a second, as in sysstat.
    let itv = elapsed / 10.0;
    let throughput = ops as f64 * 100.0 / itv;
    let util = delta(current.io_time, last.io_time, MAX_LONG)? as f64 / itv * 100.0;
    let service_time_ms = if throughput != 0.0 {
        util / throughput
    } else {
        0.0
    };

    Ok(Some(DerivedIoMetrics {
        read_kbs: round2(read_bytes as f64 / KB / elapsed_s),
        write_kbs: round2(write_bytes as f64 / KB / elapsed_s),
        avg_request_size: round2(avg_request_size),
        await_ms: round2(await_ms),
        read_await_ms: round2(read_await_ms),
        write_await_ms: round2(write_await_ms),
        avg_queue_size: round2(weighted_io as f64 / KB / elapsed_s),
        service_time_ms: round2(service_time_ms),
        // Stats are per device, there are no device groups to divide by.
        // See: https://github.com/sysstat/sysstat/blob/v11.5.6/iostat.c#L1033-L1040
        util_percent: round2(util / 10.0),
    }))
}

/// Computes the metrics of every device in `current`, ordered by name.
///
/// Devices missing from `previous` (hotplug, first tick) only get their
/// cumulative counts.
pub fn compute(
    current: &IoSnapshot,
    previous: &IoSnapshot,
    elapsed_ms: u64,
) -> Result<Vec<DeviceMetrics>> {
    let mut devices: Vec<_> = current.iter().collect();
    devices.sort_by(|a, b| a.0.cmp(b.0));

    let mut metrics = Vec::with_capacity(devices.len());
    for (device, stats) in devices {
        let derived = match previous.get(device) {
            Some(last) => {
                let derived = derive(stats, last, elapsed_ms)?;
                if derived.is_none() {
                    debug!("No delta to compute for {device} - skipping.");
                }
                derived
            }
            None => {
                debug!("New device stats for {device} (possible hotplug) - full stats unavailable this iteration.");
                None
            }
        };

        metrics.push(DeviceMetrics {
            device: device.clone(),
            label: stats.label.clone(),
            read_count: stats.read_count,
            write_count: stats.write_count,
            merged_read_count: stats.merged_read_count,
            merged_write_count: stats.merged_write_count,
            derived,
        });
    }

    Ok(metrics)
}

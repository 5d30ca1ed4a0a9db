// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Shared builders and fakes for unit tests

use std::cell::Cell;
use std::collections::VecDeque;
use std::net::Ipv4Addr;

use crate::check::Clock;
use crate::connection::{ConnectionRecord, ConnectionType};
use crate::diskstats::SnapshotProvider;
use crate::iostats::{DeviceIOSample, IoSnapshot};

pub fn device_sample(name: &str) -> DeviceIOSample {
    DeviceIOSample {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn snapshot(samples: impl IntoIterator<Item = DeviceIOSample>) -> IoSnapshot {
    samples
        .into_iter()
        .map(|s| (s.name.clone(), s))
        .collect()
}

/// TCP flow from 10.0.0.1 to 10.0.0.2.
pub fn tcp_v4(pid: u32, source_port: u16, dest_port: u16) -> ConnectionRecord {
    ConnectionRecord::new(
        pid,
        ConnectionType::Tcp,
        Ipv4Addr::new(10, 0, 0, 1).into(),
        source_port,
        Ipv4Addr::new(10, 0, 0, 2).into(),
        dest_port,
    )
}

/// Returns the given timestamps in order, then keeps returning the last one.
pub struct FakeClock {
    ticks: Vec<u64>,
    next: Cell<usize>,
}

impl FakeClock {
    pub fn new(ticks: impl IntoIterator<Item = u64>) -> Self {
        FakeClock {
            ticks: ticks.into_iter().collect(),
            next: Cell::new(0),
        }
    }
}

impl Clock for FakeClock {
    fn now_nanos(&self) -> u64 {
        let i = self.next.get();
        self.next.set(i + 1);
        self.ticks
            .get(i)
            .or(self.ticks.last())
            .copied()
            .unwrap_or_default()
    }
}

/// Hands out the given snapshots in order, then fails.
pub struct ScriptedProvider {
    snapshots: VecDeque<IoSnapshot>,
}

impl ScriptedProvider {
    pub fn new(snapshots: impl IntoIterator<Item = IoSnapshot>) -> Self {
        ScriptedProvider {
            snapshots: snapshots.into_iter().collect(),
        }
    }
}

impl SnapshotProvider for ScriptedProvider {
    fn snapshot(&mut self) -> anyhow::Result<IoSnapshot> {
        self.snapshots
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no more snapshots"))
    }
}

// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::net::{Ipv4Addr, Ipv6Addr};

use dd_counters::connection_stats::{self, index_connections};
use dd_counters::iostats::{self, IO_AWAIT, IO_R_S, IO_RKB_S, IO_W_S, IoSnapshot};
use dd_counters::sink::Buffer;
use dd_counters::{
    Address, ConnectionRecord, ConnectionType, DeviceIOSample, Error, MetricKind, MAX_LONG,
    MAX_U32, beautify_key, decode, delta,
};

fn sda(read_count: u64, read_bytes: u64) -> DeviceIOSample {
    DeviceIOSample {
        name: "sda".to_string(),
        read_count,
        read_bytes,
        ..Default::default()
    }
}

fn snapshot(sample: DeviceIOSample) -> IoSnapshot {
    IoSnapshot::from([(sample.name.clone(), sample)])
}

#[test]
fn test_sda_one_second_scenario() {
    let previous = snapshot(sda(1000, 5_000_000));
    let current = snapshot(sda(1100, 5_500_000));

    let devices = iostats::compute(&current, &previous, 1000).unwrap();
    let mut sink = Buffer::default();
    for device in &devices {
        device.submit(&mut sink, &device.tags(false));
    }

    let r_s = sink.get(IO_R_S).unwrap();
    assert_eq!(r_s.kind, MetricKind::Rate);
    assert_eq!(r_s.value, 1100.0);
    assert_eq!(sink.get(IO_W_S).unwrap().value, 0.0);

    let rkb_s = sink.get(IO_RKB_S).unwrap();
    assert_eq!(rkb_s.kind, MetricKind::Gauge);
    assert_eq!(rkb_s.value, 488.28);

    // 100 reads but no read time accounted
    assert_eq!(sink.get(IO_AWAIT).unwrap().value, 0.0);
}

#[test]
fn test_first_tick_only_cumulative() {
    let current = snapshot(sda(1000, 5_000_000));
    let devices = iostats::compute(&current, &IoSnapshot::new(), 1000).unwrap();

    let mut sink = Buffer::default();
    devices[0].submit(&mut sink, &devices[0].tags(false));

    assert_eq!(sink.metrics.len(), 4);
    assert!(sink.metrics.iter().all(|m| m.kind == MetricKind::Rate));
}

#[test]
fn test_delta_contract() {
    assert_eq!(delta(5, 4_294_967_290, MAX_U32), Ok(11));
    assert_eq!(delta(100, 40, 7), Ok(60));
    assert_eq!(delta(100, 40, MAX_LONG), Ok(60));
    assert_eq!(delta(1, 2, 0), Err(Error::InvalidModulus { modulus: 0 }));
}

#[test]
fn test_connection_tracking_across_ticks() {
    let mut buffer = Vec::with_capacity(64);

    let mut v4 = ConnectionRecord::new(
        31337,
        ConnectionType::Tcp,
        Ipv4Addr::new(172, 17, 0, 2).into(),
        51234,
        Ipv4Addr::new(93, 184, 216, 34).into(),
        443,
    );
    let mut v6 = ConnectionRecord::new(
        53,
        ConnectionType::Udp,
        Ipv6Addr::LOCALHOST.into(),
        53,
        Ipv6Addr::LOCALHOST.into(),
        40000,
    );
    let previous = index_connections([v4.clone(), v6.clone()], &mut buffer).unwrap();

    v4.monotonic_sent_bytes = 4096;
    v6.monotonic_recv_bytes = 512;
    let current = index_connections([v4.clone(), v6.clone()], &mut buffer).unwrap();

    let metrics = connection_stats::compute(&current, &previous, 1000).unwrap();
    assert_eq!(metrics.len(), 2);
    for m in &metrics {
        let key = decode(&m.key).unwrap();
        assert_eq!(beautify_key(&m.key).unwrap(), m.beautified_key);
        let deltas = m.deltas.unwrap();
        match key.protocol {
            ConnectionType::Tcp => {
                assert_eq!(key.pid, 31337);
                assert_eq!(key.dest, Address::from(Ipv4Addr::new(93, 184, 216, 34)));
                assert_eq!(deltas.sent_bytes, 4096);
            }
            ConnectionType::Udp => {
                assert_eq!(key.source, Address::from(Ipv6Addr::LOCALHOST));
                assert_eq!(deltas.recv_bytes, 512);
            }
        }
    }
}

#[test]
fn test_invalid_address_and_key() {
    assert_eq!(
        Address::from_bytes(&[1, 2, 3, 4, 5]),
        Err(Error::InvalidLength { len: 5 })
    );
    let mut truncated = vec![0u8; 17];
    truncated[8] = 0x10;
    assert!(matches!(decode(&truncated), Err(Error::MalformedKey { .. })));
}

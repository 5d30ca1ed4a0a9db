// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Per-connection byte and retransmit deltas, keyed by identity key.

use std::collections::HashMap;

use log::debug;

use crate::connection::ConnectionRecord;
use crate::counter::{MAX_LONG, MAX_U32, delta};
use crate::errors::Result;
use crate::iostats::round2;
use crate::key;

/// Identity key to the connection it identifies, for one tick.
pub type ConnectionSnapshot = HashMap<Vec<u8>, ConnectionRecord>;

/// Indexes `records` by identity key, encoding every key through `buffer`.
///
/// Two records with the same identity collapse into the last one seen.
pub fn index_connections(
    records: impl IntoIterator<Item = ConnectionRecord>,
    buffer: &mut Vec<u8>,
) -> Result<ConnectionSnapshot> {
    let mut snapshot = ConnectionSnapshot::new();
    for record in records {
        let id = key::encode(&record, buffer)?.to_vec();
        snapshot.insert(id, record);
    }
    Ok(snapshot)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionDeltas {
    pub sent_bytes: i64,
    pub recv_bytes: i64,
    pub retransmits: i64,
    pub sent_bytes_per_sec: f64,
    pub recv_bytes_per_sec: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionMetrics {
    pub key: Vec<u8>,
    /// Debug rendering of `key`.
    pub beautified_key: String,
    pub monotonic_sent_bytes: u64,
    pub monotonic_recv_bytes: u64,
    pub monotonic_retransmits: u32,
    /// `None` the first time a flow is seen, or when no time elapsed.
    pub deltas: Option<ConnectionDeltas>,
}

/// Computes the deltas of one flow between two of its samples.
///
/// Returns `None` when no time elapsed.
pub fn derive(
    current: &ConnectionRecord,
    last: &ConnectionRecord,
    elapsed_ms: u64,
) -> Result<Option<ConnectionDeltas>> {
    if elapsed_ms == 0 {
        return Ok(None);
    }
    let elapsed_s = elapsed_ms as f64 / 1000.0;

    let sent_bytes = delta(
        current.monotonic_sent_bytes,
        last.monotonic_sent_bytes,
        MAX_LONG,
    )?;
    let recv_bytes = delta(
        current.monotonic_recv_bytes,
        last.monotonic_recv_bytes,
        MAX_LONG,
    )?;
    let retransmits = delta(
        u64::from(current.monotonic_retransmits),
        u64::from(last.monotonic_retransmits),
        MAX_U32,
    )?;

    Ok(Some(ConnectionDeltas {
        sent_bytes,
        recv_bytes,
        retransmits,
        sent_bytes_per_sec: round2(sent_bytes as f64 / elapsed_s),
        recv_bytes_per_sec: round2(recv_bytes as f64 / elapsed_s),
    }))
}

/// Computes the metrics of every flow in `current`, ordered by key.
pub fn compute(
    current: &ConnectionSnapshot,
    previous: &ConnectionSnapshot,
    elapsed_ms: u64,
) -> Result<Vec<ConnectionMetrics>> {
    let mut flows: Vec<_> = current.iter().collect();
    flows.sort_by(|a, b| a.0.cmp(b.0));

    let mut metrics = Vec::with_capacity(flows.len());
    for (id, conn) in flows {
        let deltas = match previous.get(id) {
            Some(last) => {
                let deltas = derive(conn, last, elapsed_ms)?;
                if deltas.is_none() {
                    debug!("No delta to compute for connection {conn} - skipping.");
                }
                deltas
            }
            None => {
                debug!("new connection {conn}, deltas unavailable this iteration");
                None
            }
        };

        metrics.push(ConnectionMetrics {
            key: id.clone(),
            beautified_key: key::beautify_key(id)?,
            monotonic_sent_bytes: conn.monotonic_sent_bytes,
            monotonic_recv_bytes: conn.monotonic_recv_bytes,
            monotonic_retransmits: conn.monotonic_retransmits,
            deltas,
        });
    }

    Ok(metrics)
}

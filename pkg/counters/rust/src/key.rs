// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Binary identity key of a tracked connection.
//!
//! ```text
//!    32b     16b     16b      4b      4b     32/128b      32/128b
//! |  PID  | SPORT | DPORT | Family | Type |  SrcAddr  |  DestAddr
//! ```
//!
//! The first 64 bits are a little-endian word. Counters, direction,
//! timestamps and NAT info are not part of the key, so every sample of the
//! same flow maps to the same key.

use std::fmt;

use crate::address::Address;
use crate::connection::{ConnectionFamily, ConnectionRecord, ConnectionType};
use crate::errors::{Error, Result};

/// PID + ports word, then the family/type byte.
pub const KEY_HEADER_LEN: usize = 9;

/// Total key length for a family.
pub fn key_len(family: ConnectionFamily) -> usize {
    KEY_HEADER_LEN + 2 * family.address_len()
}

/// Identity fields recovered from a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub pid: u32,
    pub source_port: u16,
    pub dest_port: u16,
    pub family: ConnectionFamily,
    pub protocol: ConnectionType,
    pub source: Address,
    pub dest: Address,
}

impl From<&ConnectionRecord> for ConnectionKey {
    fn from(record: &ConnectionRecord) -> Self {
        ConnectionKey {
            pid: record.pid,
            source_port: record.source_port,
            dest_port: record.dest_port,
            family: record.family,
            protocol: record.protocol,
            source: record.source,
            dest: record.dest,
        }
    }
}

/// Encodes the identity of `record` into `buffer`.
///
/// The buffer is cleared, not reallocated, so a caller processing many
/// connections can reuse one buffer for all of them. Workers running in
/// parallel need one buffer each.
pub fn encode<'a>(record: &ConnectionRecord, buffer: &'a mut Vec<u8>) -> Result<&'a [u8]> {
    if record.source.family() != record.family || record.dest.family() != record.family {
        return Err(Error::FamilyMismatch {
            family: record.family as u8,
            source_len: record.source.bytes().len(),
            dest_len: record.dest.bytes().len(),
        });
    }

    buffer.clear();
    buffer.reserve(key_len(record.family));

    // Byte-packing to improve creation speed
    // PID (32 bits) + SPort (16 bits) + DPort (16 bits) = 64 bits
    let p0 = u64::from(record.pid) << 32
        | u64::from(record.source_port) << 16
        | u64::from(record.dest_port);
    buffer.extend_from_slice(&p0.to_le_bytes());

    // Family (4 bits) + Type (4 bits) = 8 bits
    buffer.push((record.family as u8) << 4 | record.protocol as u8);

    buffer.extend_from_slice(record.source.bytes());
    buffer.extend_from_slice(record.dest.bytes());

    Ok(buffer.as_slice())
}

/// Decodes a key produced by [`encode`].
///
/// The address width comes from the family nibble, never from the length of
/// `key`. Bytes past the end of the dest address are ignored.
pub fn decode(key: &[u8]) -> Result<ConnectionKey> {
    let Some((head, rest)) = key.split_first_chunk::<8>() else {
        return Err(Error::MalformedKey {
            reason: format!("{} bytes is too short for the pid/port header", key.len()),
        });
    };
    let Some((&family_type, addrs)) = rest.split_first() else {
        return Err(Error::MalformedKey {
            reason: "missing family/type byte".to_string(),
        });
    };

    let h = u64::from_le_bytes(*head);
    let pid = (h >> 32) as u32;
    let source_port = (h >> 16) as u16;
    let dest_port = h as u16;

    let family = ConnectionFamily::try_from((family_type >> 4) & 0xf)?;
    let protocol = ConnectionType::try_from(family_type & 0xf)?;

    let width = family.address_len();
    let (Some(source), Some(dest)) = (addrs.get(..width), addrs.get(width..2 * width)) else {
        return Err(Error::MalformedKey {
            reason: format!(
                "{} bytes is too short for a {family:?} key ({} bytes)",
                key.len(),
                key_len(family)
            ),
        });
    };

    Ok(ConnectionKey {
        pid,
        source_port,
        dest_port,
        family,
        protocol,
        source: Address::from_bytes(source)?,
        dest: Address::from_bytes(dest)?,
    })
}

/// Human readable form of a key, for debug endpoints only.
pub fn beautify_key(key: &[u8]) -> Result<String> {
    Ok(decode(key)?.to_string())
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p:{}|src:{}:{}|dst:{}:{}|f:{}|t:{}",
            self.pid,
            self.source,
            self.source_port,
            self.dest,
            self.dest_port,
            self.family as u8,
            self.protocol as u8,
        )
    }
}

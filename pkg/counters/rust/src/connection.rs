// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;

use crate::address::Address;
use crate::errors::{Error, Result};
use crate::key;

/// Transport protocol of a connection. The discriminant is the value stored
/// in the low nibble of the key's family/type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    Tcp = 0,
    Udp = 1,
}

impl TryFrom<u8> for ConnectionType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Tcp),
            1 => Ok(Self::Udp),
            _ => Err(Error::MalformedKey {
                reason: format!("unknown connection type: {value}"),
            }),
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionType::Tcp => f.write_str("TCP"),
            ConnectionType::Udp => f.write_str("UDP"),
        }
    }
}

/// Address family of a connection, stored in the high nibble of the key's
/// family/type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionFamily {
    V4 = 0,
    V6 = 1,
}

impl ConnectionFamily {
    /// Width in bytes of one address of this family.
    pub fn address_len(self) -> usize {
        match self {
            ConnectionFamily::V4 => crate::address::V4_LEN,
            ConnectionFamily::V6 => crate::address::V6_LEN,
        }
    }
}

impl TryFrom<u8> for ConnectionFamily {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::V4),
            1 => Ok(Self::V6),
            _ => Err(Error::MalformedKey {
                reason: format!("unknown connection family: {value}"),
            }),
        }
    }
}

/// Whether the connection is inbound, outbound or stays on the host. Set by
/// an external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionDirection {
    #[default]
    Incoming = 1,
    Outgoing = 2,
    Local = 3,
}

impl fmt::Display for ConnectionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionDirection::Incoming => f.write_str("incoming"),
            ConnectionDirection::Outgoing => f.write_str("outgoing"),
            ConnectionDirection::Local => f.write_str("local"),
        }
    }
}

/// NAT rewrite observed for a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpTranslation {
    pub repl_src_ip: Address,
    pub repl_dst_ip: Address,
    pub repl_src_port: u16,
    pub repl_dst_port: u16,
}

/// One tracked network flow, with its cumulative counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub source: Address,
    pub dest: Address,

    pub monotonic_sent_bytes: u64,
    pub last_sent_bytes: u64,

    pub monotonic_recv_bytes: u64,
    pub last_recv_bytes: u64,

    /// Last time the stats for this connection were updated
    pub last_update_epoch: u64,

    pub monotonic_retransmits: u32,
    pub last_retransmits: u32,

    pub pid: u32,
    pub net_ns: u32,

    pub source_port: u16,
    pub dest_port: u16,
    pub protocol: ConnectionType,
    pub family: ConnectionFamily,
    pub direction: ConnectionDirection,
    pub translation: Option<IpTranslation>,
}

impl ConnectionRecord {
    /// A record with zeroed counters; the family is taken from `source`.
    pub fn new(
        pid: u32,
        protocol: ConnectionType,
        source: Address,
        source_port: u16,
        dest: Address,
        dest_port: u16,
    ) -> Self {
        ConnectionRecord {
            source,
            dest,
            monotonic_sent_bytes: 0,
            last_sent_bytes: 0,
            monotonic_recv_bytes: 0,
            last_recv_bytes: 0,
            last_update_epoch: 0,
            monotonic_retransmits: 0,
            last_retransmits: 0,
            pid,
            net_ns: 0,
            source_port,
            dest_port,
            protocol,
            family: source.family(),
            direction: ConnectionDirection::default(),
            translation: None,
        }
    }

    /// Writes this connection's identity key into `buffer` and returns it.
    pub fn byte_key<'a>(&self, buffer: &'a mut Vec<u8>) -> Result<&'a [u8]> {
        key::encode(self, buffer)
    }
}

impl fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [PID: {}] [{}:{} ⇄ {}:{}] ({}) {} bytes sent (+{}), {} bytes received (+{}), {} retransmits (+{})",
            self.protocol,
            self.pid,
            self.source,
            self.source_port,
            self.dest,
            self.dest_port,
            self.direction,
            self.monotonic_sent_bytes,
            self.last_sent_bytes,
            self.monotonic_recv_bytes,
            self.last_recv_bytes,
            self.monotonic_retransmits,
            self.last_retransmits,
        )
    }
}
